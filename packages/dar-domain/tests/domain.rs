use dar_domain::{
	knowledge::{EntryLanguage, KnowledgeEntry},
	language::{Language, detect_language},
	similarity::{self, SimilarityEngine},
	text,
};

const PHRASES: &[&str] = &[
	"How do I schedule an appointment?",
	"how can i book a viewing",
	"Do you have 3 bedroom villas for rent in Al Olaya?",
	"What's the weather like today?",
	"price",
	"هل لديكم شقق للإيجار في حي الملقا؟",
	"ابغى فيلا",
	"Villa villa villa",
	"   ",
	"ok",
	"I want an apartment near the metro, budget 60k",
];

fn tags(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn every_non_empty_phrase_scores_one_hundred_against_itself() {
	for phrase in PHRASES {
		if text::normalize_for_scoring(phrase).is_empty() {
			continue;
		}

		assert_eq!(similarity::score(phrase, phrase), 100.0, "identity failed for {phrase:?}");
	}
}

#[test]
fn scores_are_symmetric() {
	for a in PHRASES {
		for b in PHRASES {
			assert_eq!(
				similarity::score(a, b),
				similarity::score(b, a),
				"symmetry failed for {a:?} / {b:?}"
			);
		}
	}
}

#[test]
fn scores_stay_in_range_with_and_without_context() {
	let tag_sets = [tags(&[]), tags(&["villa", "rent", "apartment", "viewing", "شقق"])];

	for a in PHRASES {
		for b in PHRASES {
			let base = similarity::score(a, b);

			assert!((0.0..=100.0).contains(&base), "base {base} out of range for {a:?} / {b:?}");

			for tags in &tag_sets {
				let boosted = similarity::score_with_context(a, b, b, tags);

				assert!(
					(0.0..=100.0).contains(&boosted),
					"boosted {boosted} out of range for {a:?} / {b:?}"
				);
				assert!(boosted >= base, "boosts must never lower the score");
			}
		}
	}
}

#[test]
fn unrelated_question_stays_below_noise_floor() {
	let value = similarity::score_with_context(
		"What's the weather like today?",
		"Do you have villas for rent?",
		"Yes, we list villas across the city. Tell us your budget and preferred area.",
		&tags(&["villa", "rent"]),
	);

	assert!(value <= 20.0, "unexpected score {value}");
}

#[test]
fn engine_with_default_weights_matches_free_functions() {
	let engine = SimilarityEngine::default();

	for a in PHRASES {
		assert_eq!(engine.score(a, PHRASES[0]), similarity::score(a, PHRASES[0]));
	}
}

#[test]
fn breakdown_reports_each_measure_on_the_same_scale() {
	let breakdown = similarity::breakdown("rent villa", "villa rent");

	assert_eq!(breakdown.jaccard, 100.0);
	assert_eq!(breakdown.keyword, 100.0);
	assert!((breakdown.cosine - 100.0).abs() < 1e-9);
	assert!(breakdown.edit < 100.0);
}

#[test]
fn entries_match_normalized_messages_exactly() {
	let entry = KnowledgeEntry {
		entry_id: KnowledgeEntry::derived_id("How do I schedule an appointment?"),
		question: "How do I schedule an appointment?".to_string(),
		answer: "Reply with a day and time and we will confirm.".to_string(),
		category: "appointments".to_string(),
		language: EntryLanguage::En,
		tags: tags(&["appointment"]),
		priority: 1,
		active: true,
	};

	assert!(entry.matches_exactly(&text::normalize_for_lookup("how do I  schedule an APPOINTMENT?")));
	assert!(!entry.matches_exactly(&text::normalize_for_lookup("how do I schedule an appointment")));
}

#[test]
fn detects_both_supported_languages() {
	assert_eq!(detect_language(PHRASES[0]), Language::English);
	assert_eq!(detect_language(PHRASES[5]), Language::Arabic);
}
