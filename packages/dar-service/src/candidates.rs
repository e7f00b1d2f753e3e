use std::cmp::Ordering;

use serde::Serialize;
use uuid::Uuid;

use dar_domain::{
	knowledge::{EntryLanguage, KnowledgeEntry},
	language::Language,
	similarity::MAX_SCORE,
};

/// A knowledge entry paired with its similarity to the current message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredCandidate {
	pub entry_id: Uuid,
	pub question: String,
	pub answer: String,
	pub category: String,
	pub language: EntryLanguage,
	pub tags: Vec<String>,
	pub priority: i32,
	pub similarity: f64,
}
impl ScoredCandidate {
	pub fn from_entry(entry: KnowledgeEntry, similarity: f64) -> Self {
		Self {
			entry_id: entry.entry_id,
			question: entry.question,
			answer: entry.answer,
			category: entry.category,
			language: entry.language,
			tags: entry.tags,
			priority: entry.priority,
			similarity,
		}
	}

	pub fn exact(entry: KnowledgeEntry) -> Self {
		Self::from_entry(entry, MAX_SCORE)
	}
}

/// What the router would match for a message, without calling the generative fallback.
#[derive(Clone, Debug, Serialize)]
pub struct MatchReport {
	pub language: Language,
	pub exact_match: bool,
	pub candidates: Vec<ScoredCandidate>,
}

/// Sorts by similarity, then priority, both descending, and keeps the first `top_n`.
///
/// Remaining ties prefer entries written for `language`, then order by question text so the
/// result does not depend on knowledge-base order.
pub fn rank(
	mut candidates: Vec<ScoredCandidate>,
	language: Language,
	top_n: usize,
) -> Vec<ScoredCandidate> {
	candidates.sort_by(|a, b| compare(a, b, language));
	candidates.truncate(top_n);

	candidates
}

fn compare(a: &ScoredCandidate, b: &ScoredCandidate, language: Language) -> Ordering {
	b.similarity
		.total_cmp(&a.similarity)
		.then_with(|| b.priority.cmp(&a.priority))
		.then_with(|| b.language.serves(language).cmp(&a.language.serves(language)))
		.then_with(|| a.question.cmp(&b.question))
}
