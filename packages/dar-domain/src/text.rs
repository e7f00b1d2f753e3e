use unicode_normalization::UnicodeNormalization;

/// Canonical form used by the similarity measures: NFKC, lower-cased, trimmed.
pub fn normalize_for_scoring(input: &str) -> String {
	let folded: String = input.nfkc().collect();

	folded.to_lowercase().trim().to_string()
}

/// Canonical form used for exact question lookup. Internal whitespace runs collapse to one space.
pub fn normalize_for_lookup(input: &str) -> String {
	let scored = normalize_for_scoring(input);
	let mut out = String::with_capacity(scored.len());

	for word in scored.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}

		out.push_str(word);
	}

	out
}
