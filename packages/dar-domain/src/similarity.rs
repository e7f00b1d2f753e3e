//! Weighted ensemble of string-similarity measures used to match chat messages against
//! knowledge-base questions.
//!
//! | Measure | Default weight | Catches |
//! |---------|----------------|---------|
//! | Character edit (Levenshtein) | 0.20 | typos |
//! | Word-set Jaccard | 0.30 | reordering |
//! | Term-frequency cosine | 0.30 | repetition, reordering |
//! | Keyword Jaccard (tokens of 3+ chars) | 0.20 | domain terms |
//!
//! Every measure and the combined score live on a 0-100 scale. Inputs are normalized internally
//! (NFKC, lower-case, trimmed), so callers pass raw text.

use std::collections::{BTreeMap, BTreeSet};

use dar_config::SimilarityWeights;

use crate::text;

pub const EDIT_WEIGHT: f64 = 0.20;
pub const JACCARD_WEIGHT: f64 = 0.30;
pub const COSINE_WEIGHT: f64 = 0.30;
pub const KEYWORD_WEIGHT: f64 = 0.20;

/// Tokens shorter than this many characters are not keywords.
pub const KEYWORD_MIN_CHARS: usize = 3;

pub const TAG_BOOST_PER_MATCH: f64 = 5.0;
pub const TAG_BOOST_CAP: f64 = 15.0;
/// The answer boost only applies when the message resembles the answer above this score.
pub const ANSWER_BOOST_MIN_SCORE: f64 = 30.0;
pub const ANSWER_BOOST_FACTOR: f64 = 0.1;
pub const ANSWER_BOOST_CAP: f64 = 10.0;

pub const MAX_SCORE: f64 = 100.0;

pub const DEFAULT_WEIGHTS: SimilarityWeights = SimilarityWeights {
	edit: EDIT_WEIGHT,
	jaccard: JACCARD_WEIGHT,
	cosine: COSINE_WEIGHT,
	keyword: KEYWORD_WEIGHT,
};

/// Per-measure breakdown of one comparison, before weighting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreBreakdown {
	pub edit: f64,
	pub jaccard: f64,
	pub cosine: f64,
	pub keyword: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct SimilarityEngine {
	weights: SimilarityWeights,
}
impl SimilarityEngine {
	pub fn new(weights: SimilarityWeights) -> Self {
		Self { weights }
	}

	pub fn weights(&self) -> SimilarityWeights {
		self.weights
	}

	/// Scores `message` against `question` on a 0-100 scale, rounded to two decimals.
	///
	/// Identical normalized inputs score exactly 100, including two empty inputs. A single empty
	/// input scores 0.
	pub fn score(&self, message: &str, question: &str) -> f64 {
		let message = text::normalize_for_scoring(message);
		let question = text::normalize_for_scoring(question);

		if message == question {
			return MAX_SCORE;
		}
		if message.is_empty() || question.is_empty() {
			return 0.0;
		}

		let breakdown = breakdown_normalized(&message, &question);
		let combined = self.weights.edit * breakdown.edit
			+ self.weights.jaccard * breakdown.jaccard
			+ self.weights.cosine * breakdown.cosine
			+ self.weights.keyword * breakdown.keyword;

		round2(combined.clamp(0.0, MAX_SCORE))
	}

	/// [`Self::score`] plus the tag and answer boosts, clamped to 0-100.
	pub fn score_with_context(
		&self,
		message: &str,
		question: &str,
		answer: &str,
		tags: &[String],
	) -> f64 {
		let base = self.score(message, question);
		let tag_boost = tag_boost(message, tags);
		let answer_boost = answer_boost(self.score(message, answer));

		round2((base + tag_boost + answer_boost).clamp(0.0, MAX_SCORE))
	}
}
impl Default for SimilarityEngine {
	fn default() -> Self {
		Self::new(DEFAULT_WEIGHTS)
	}
}

/// [`SimilarityEngine::score`] with the default weights.
pub fn score(message: &str, question: &str) -> f64 {
	SimilarityEngine::default().score(message, question)
}

/// [`SimilarityEngine::score_with_context`] with the default weights.
pub fn score_with_context(message: &str, question: &str, answer: &str, tags: &[String]) -> f64 {
	SimilarityEngine::default().score_with_context(message, question, answer, tags)
}

/// Unweighted measures for two raw inputs, for tracing and curator tooling.
pub fn breakdown(message: &str, question: &str) -> ScoreBreakdown {
	let message = text::normalize_for_scoring(message);
	let question = text::normalize_for_scoring(question);

	breakdown_normalized(&message, &question)
}

fn breakdown_normalized(a: &str, b: &str) -> ScoreBreakdown {
	ScoreBreakdown {
		edit: edit_similarity(a, b),
		jaccard: jaccard_similarity(a, b),
		cosine: cosine_similarity(a, b),
		keyword: keyword_similarity(a, b),
	}
}

/// Counts tags found in the message. A tag matches a message word when either contains the
/// other, ignoring case. Each tag counts once.
pub fn tag_boost(message: &str, tags: &[String]) -> f64 {
	let message = text::normalize_for_scoring(message);
	let words: Vec<&str> = message.split_whitespace().collect();

	if words.is_empty() {
		return 0.0;
	}

	let mut matched = 0_usize;

	for tag in tags {
		let tag = text::normalize_for_scoring(tag);

		if tag.is_empty() {
			continue;
		}
		if words.iter().any(|word| word.contains(tag.as_str()) || tag.contains(word)) {
			matched += 1;
		}
	}

	(TAG_BOOST_PER_MATCH * matched as f64).min(TAG_BOOST_CAP)
}

pub fn answer_boost(answer_score: f64) -> f64 {
	if answer_score > ANSWER_BOOST_MIN_SCORE {
		(ANSWER_BOOST_FACTOR * answer_score).min(ANSWER_BOOST_CAP)
	} else {
		0.0
	}
}

/// Wagner-Fischer edit distance over chars, keeping two rows.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
	let a_chars: Vec<char> = a.chars().collect();
	let b_chars: Vec<char> = b.chars().collect();
	let (short, long) =
		if a_chars.len() <= b_chars.len() { (&a_chars, &b_chars) } else { (&b_chars, &a_chars) };
	let mut prev: Vec<usize> = (0..=short.len()).collect();
	let mut curr = vec![0; short.len() + 1];

	for (j, long_ch) in long.iter().enumerate() {
		curr[0] = j + 1;

		for (i, short_ch) in short.iter().enumerate() {
			let cost = usize::from(short_ch != long_ch);

			curr[i + 1] = (prev[i + 1] + 1).min(curr[i] + 1).min(prev[i] + cost);
		}

		std::mem::swap(&mut prev, &mut curr);
	}

	prev[short.len()]
}

pub fn edit_similarity(a: &str, b: &str) -> f64 {
	let max_len = a.chars().count().max(b.chars().count());

	if max_len == 0 {
		return MAX_SCORE;
	}

	let distance = levenshtein_distance(a, b);

	MAX_SCORE * (max_len - distance) as f64 / max_len as f64
}

pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
	set_overlap(&a.split_whitespace().collect(), &b.split_whitespace().collect())
}

pub fn cosine_similarity(a: &str, b: &str) -> f64 {
	let a_tf = term_frequencies(a);
	let b_tf = term_frequencies(b);
	let vocabulary: BTreeSet<&str> = a_tf.keys().chain(b_tf.keys()).copied().collect();
	let mut dot = 0.0;
	let mut a_norm = 0.0;
	let mut b_norm = 0.0;

	for term in vocabulary {
		let a_count = a_tf.get(term).copied().unwrap_or(0) as f64;
		let b_count = b_tf.get(term).copied().unwrap_or(0) as f64;

		dot += a_count * b_count;
		a_norm += a_count * a_count;
		b_norm += b_count * b_count;
	}

	if a_norm == 0.0 || b_norm == 0.0 {
		return 0.0;
	}

	let magnitude = a_norm.sqrt() * b_norm.sqrt();

	(MAX_SCORE * dot / magnitude).min(MAX_SCORE)
}

pub fn keyword_similarity(a: &str, b: &str) -> f64 {
	let a_keywords = keywords(a);
	let b_keywords = keywords(b);

	match (a_keywords.is_empty(), b_keywords.is_empty()) {
		(true, true) => MAX_SCORE,
		(true, false) | (false, true) => 0.0,
		(false, false) => set_overlap(&a_keywords, &b_keywords),
	}
}

fn keywords(input: &str) -> BTreeSet<&str> {
	input.split_whitespace().filter(|word| word.chars().count() >= KEYWORD_MIN_CHARS).collect()
}

fn term_frequencies(input: &str) -> BTreeMap<&str, usize> {
	let mut out = BTreeMap::new();

	for word in input.split_whitespace() {
		*out.entry(word).or_insert(0) += 1;
	}

	out
}

fn set_overlap(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
	let union = a.union(b).count();

	if union == 0 {
		return MAX_SCORE;
	}

	let intersection = a.intersection(b).count();

	MAX_SCORE * intersection as f64 / union as f64
}

fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}
