//! Chooses between a knowledge-base answer, a generative answer, and the static greeting.
//!
//! Each message walks [`FALLBACK_CHAIN`] in order. Every strategy either resolves the message or
//! declines, and the last strategy always resolves, so routing cannot fail:
//!
//! | Condition | Outcome |
//! |---|---|
//! | exact question match | knowledge answer, no scoring |
//! | best score >= high | knowledge answer |
//! | hint <= best score < high, generative succeeds | generative answer + related-topic hint |
//! | best score < hint or no candidate, generative succeeds | generative answer |
//! | generative fails, candidate above the floor | knowledge answer |
//! | generative fails, no candidate | static greeting |

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
	CandidateScorer, EnsembleScorer, Error, GenerativeProvider, KnowledgeBase, LanguageDetector,
	Result, ScriptLanguageDetector,
	candidates::{self, MatchReport, ScoredCandidate},
};
use dar_config::{Config, Messages};
use dar_domain::{language::Language, similarity::SimilarityEngine, text};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
	ExactKnowledgeMatch,
	HighSimilarityKnowledgeMatch,
	GenerativeFallback,
	GenerativeFallbackWithHint,
	KnowledgeFallbackAfterGenerativeFailure,
	StaticDefault,
}
impl DecisionSource {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::ExactKnowledgeMatch => "exact_knowledge_match",
			Self::HighSimilarityKnowledgeMatch => "high_similarity_knowledge_match",
			Self::GenerativeFallback => "generative_fallback",
			Self::GenerativeFallbackWithHint => "generative_fallback_with_hint",
			Self::KnowledgeFallbackAfterGenerativeFailure =>
				"knowledge_fallback_after_generative_failure",
			Self::StaticDefault => "static_default",
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoutingDecision {
	/// Never empty.
	pub response: String,
	pub source: DecisionSource,
	pub language: Language,
	/// Similarity of the best candidate, when one survived the floor.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub best_score: Option<f64>,
	/// Question of the entry that produced or hinted the response.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub matched_question: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
	ExactMatch,
	HighSimilarity,
	Generative,
	KnowledgeFallback,
	StaticDefault,
}

pub const FALLBACK_CHAIN: [Strategy; 5] = [
	Strategy::ExactMatch,
	Strategy::HighSimilarity,
	Strategy::Generative,
	Strategy::KnowledgeFallback,
	Strategy::StaticDefault,
];

#[derive(Clone, Debug, PartialEq)]
pub enum Attempt {
	Resolved(RoutingDecision),
	Declined,
}

#[derive(Clone, Debug)]
pub struct RoutingPolicy {
	pub floor_score: f64,
	pub hint_score: f64,
	pub high_score: f64,
	pub top_n: usize,
	pub generative_enabled: bool,
	pub generative_timeout: Duration,
	pub messages: Messages,
}
impl RoutingPolicy {
	pub fn from_config(cfg: &Config) -> Self {
		Self {
			floor_score: cfg.routing.floor_score,
			hint_score: cfg.routing.hint_score,
			high_score: cfg.routing.high_score,
			top_n: cfg.routing.top_n as usize,
			generative_enabled: cfg.routing.generative_enabled,
			generative_timeout: Duration::from_millis(cfg.routing.generative_timeout_ms),
			messages: cfg.messages.clone(),
		}
	}

	pub fn static_default(&self, language: Language) -> &str {
		match language {
			Language::Arabic => &self.messages.static_default_ar,
			Language::English => &self.messages.static_default_en,
		}
	}

	pub fn with_hint(&self, generated: &str, question: &str, language: Language) -> String {
		let prefix = match language {
			Language::Arabic => &self.messages.hint_prefix_ar,
			Language::English => &self.messages.hint_prefix_en,
		};

		format!("{generated}\n\n{prefix} {question}")
	}
}
impl Default for RoutingPolicy {
	fn default() -> Self {
		Self {
			floor_score: 20.0,
			hint_score: 50.0,
			high_score: 90.0,
			top_n: 5,
			generative_enabled: true,
			generative_timeout: Duration::from_secs(8),
			messages: Messages::default(),
		}
	}
}

/// Everything the strategies look at for one message. Built once per message from a single
/// knowledge-base read.
struct RoutingContext<'a> {
	message: &'a str,
	caller_id: Option<&'a str>,
	language: Language,
	exact: Vec<ScoredCandidate>,
	candidates: Vec<ScoredCandidate>,
}
impl RoutingContext<'_> {
	fn best(&self) -> Option<&ScoredCandidate> {
		self.candidates.first()
	}
}

pub struct ResponseRouter {
	policy: RoutingPolicy,
	knowledge: Arc<dyn KnowledgeBase>,
	generative: Arc<dyn GenerativeProvider>,
	detector: Arc<dyn LanguageDetector>,
	scorer: Arc<dyn CandidateScorer>,
}
impl ResponseRouter {
	/// Router with the script-based language detector and the default similarity ensemble.
	pub fn new(
		policy: RoutingPolicy,
		knowledge: Arc<dyn KnowledgeBase>,
		generative: Arc<dyn GenerativeProvider>,
	) -> Self {
		Self {
			policy,
			knowledge,
			generative,
			detector: Arc::new(ScriptLanguageDetector),
			scorer: Arc::new(EnsembleScorer::default()),
		}
	}

	pub fn from_config(
		cfg: &Config,
		knowledge: Arc<dyn KnowledgeBase>,
		generative: Arc<dyn GenerativeProvider>,
	) -> Self {
		let engine = SimilarityEngine::new(cfg.routing.weights);

		Self::new(RoutingPolicy::from_config(cfg), knowledge, generative)
			.with_scorer(Arc::new(EnsembleScorer::new(engine)))
	}

	pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
		self.detector = detector;

		self
	}

	pub fn with_scorer(mut self, scorer: Arc<dyn CandidateScorer>) -> Self {
		self.scorer = scorer;

		self
	}

	pub fn policy(&self) -> &RoutingPolicy {
		&self.policy
	}

	/// Routes one message to a response. Never fails and never returns empty text.
	pub async fn route(&self, message: &str, caller_id: Option<&str>) -> RoutingDecision {
		let language = self.detector.detect(message);
		let exact = self.exact_candidates(message, language).await;
		let candidates = if exact.is_empty() {
			self.score_candidates(message, language).await
		} else {
			Vec::new()
		};
		let ctx = RoutingContext { message, caller_id, language, exact, candidates };

		for strategy in FALLBACK_CHAIN {
			if let Attempt::Resolved(decision) = self.attempt(strategy, &ctx).await {
				tracing::info!(
					source = decision.source.as_str(),
					language = language.as_str(),
					best_score = ?decision.best_score,
					"Message routed."
				);

				return decision;
			}
		}

		self.static_default(language)
	}

	/// Ranked candidates for a message without invoking the generative fallback.
	pub async fn explain(&self, message: &str) -> Result<MatchReport> {
		let language = self.detector.detect(message);
		let normalized = text::normalize_for_lookup(message);
		let exact = self.knowledge.find_exact_matches(&normalized).await?;

		if !exact.is_empty() {
			let exact = exact.into_iter().map(ScoredCandidate::exact).collect();

			return Ok(MatchReport {
				language,
				exact_match: true,
				candidates: candidates::rank(exact, language, self.policy.top_n),
			});
		}

		let entries = self.knowledge.list_active_entries().await?;

		Ok(MatchReport {
			language,
			exact_match: false,
			candidates: self.rank_entries(message, language, entries),
		})
	}

	async fn attempt(&self, strategy: Strategy, ctx: &RoutingContext<'_>) -> Attempt {
		match strategy {
			Strategy::ExactMatch => self.resolve_exact(ctx),
			Strategy::HighSimilarity => self.resolve_high_similarity(ctx),
			Strategy::Generative => self.resolve_generative(ctx).await,
			Strategy::KnowledgeFallback => self.resolve_knowledge_fallback(ctx),
			Strategy::StaticDefault => Attempt::Resolved(self.static_default(ctx.language)),
		}
	}

	fn resolve_exact(&self, ctx: &RoutingContext<'_>) -> Attempt {
		let Some(top) = ctx.exact.first() else { return Attempt::Declined };

		Attempt::Resolved(knowledge_decision(top, DecisionSource::ExactKnowledgeMatch, ctx.language))
	}

	fn resolve_high_similarity(&self, ctx: &RoutingContext<'_>) -> Attempt {
		match ctx.best() {
			Some(best) if best.similarity >= self.policy.high_score => Attempt::Resolved(
				knowledge_decision(best, DecisionSource::HighSimilarityKnowledgeMatch, ctx.language),
			),
			_ => Attempt::Declined,
		}
	}

	async fn resolve_generative(&self, ctx: &RoutingContext<'_>) -> Attempt {
		if !self.policy.generative_enabled {
			return Attempt::Declined;
		}

		let text = match self.generate(ctx).await {
			Ok(text) => text,
			Err(err) => {
				tracing::warn!(
					error = %err,
					has_candidate = ctx.best().is_some(),
					"Generative fallback failed."
				);

				return Attempt::Declined;
			},
		};
		let best_score = ctx.best().map(|best| best.similarity);
		let decision = match ctx.best() {
			Some(best) if best.similarity >= self.policy.hint_score => RoutingDecision {
				response: self.policy.with_hint(&text, &best.question, ctx.language),
				source: DecisionSource::GenerativeFallbackWithHint,
				language: ctx.language,
				best_score,
				matched_question: Some(best.question.clone()),
			},
			_ => RoutingDecision {
				response: text,
				source: DecisionSource::GenerativeFallback,
				language: ctx.language,
				best_score,
				matched_question: None,
			},
		};

		Attempt::Resolved(decision)
	}

	fn resolve_knowledge_fallback(&self, ctx: &RoutingContext<'_>) -> Attempt {
		let Some(best) = ctx.best() else { return Attempt::Declined };

		Attempt::Resolved(knowledge_decision(
			best,
			DecisionSource::KnowledgeFallbackAfterGenerativeFailure,
			ctx.language,
		))
	}

	/// Calls the generative provider under the policy timeout. Timeouts and blank replies count
	/// as failures.
	async fn generate(&self, ctx: &RoutingContext<'_>) -> Result<String> {
		let timeout = self.policy.generative_timeout;
		let call = self.generative.generate(ctx.message, ctx.language, ctx.caller_id);
		let reply = tokio::time::timeout(timeout, call)
			.await
			.map_err(|_| Error::GenerativeTimeout { timeout_ms: timeout.as_millis() as u64 })??;
		let text = reply.text.trim();

		if text.is_empty() {
			return Err(Error::Provider { message: "Generative reply is empty.".to_string() });
		}

		Ok(text.to_string())
	}

	fn static_default(&self, language: Language) -> RoutingDecision {
		RoutingDecision {
			response: self.policy.static_default(language).to_string(),
			source: DecisionSource::StaticDefault,
			language,
			best_score: None,
			matched_question: None,
		}
	}

	async fn exact_candidates(&self, message: &str, language: Language) -> Vec<ScoredCandidate> {
		let normalized = text::normalize_for_lookup(message);

		if normalized.is_empty() {
			return Vec::new();
		}

		match self.knowledge.find_exact_matches(&normalized).await {
			Ok(entries) => {
				let exact = entries
					.into_iter()
					.filter(|entry| entry.active && !entry.answer.trim().is_empty())
					.map(ScoredCandidate::exact)
					.collect();

				candidates::rank(exact, language, self.policy.top_n)
			},
			Err(err) => {
				tracing::warn!(error = %err, "Exact-match lookup failed; continuing with scoring.");

				Vec::new()
			},
		}
	}

	async fn score_candidates(&self, message: &str, language: Language) -> Vec<ScoredCandidate> {
		match self.knowledge.list_active_entries().await {
			Ok(entries) => self.rank_entries(message, language, entries),
			Err(err) => {
				tracing::warn!(error = %err, "Knowledge base unavailable; routing without candidates.");

				Vec::new()
			},
		}
	}

	fn rank_entries(
		&self,
		message: &str,
		language: Language,
		entries: Vec<dar_domain::knowledge::KnowledgeEntry>,
	) -> Vec<ScoredCandidate> {
		let mut scored = Vec::new();

		for entry in entries {
			if !entry.active {
				continue;
			}

			match self.scorer.score(message, &entry) {
				Ok(similarity) if similarity > self.policy.floor_score => {
					scored.push(ScoredCandidate::from_entry(entry, similarity.min(100.0)));
				},
				Ok(_) => {},
				Err(err) => {
					tracing::warn!(error = %err, entry_id = %entry.entry_id, "Skipping unscorable knowledge entry.");
				},
			}
		}

		candidates::rank(scored, language, self.policy.top_n)
	}
}

fn knowledge_decision(
	candidate: &ScoredCandidate,
	source: DecisionSource,
	language: Language,
) -> RoutingDecision {
	RoutingDecision {
		response: candidate.answer.clone(),
		source,
		language,
		best_score: Some(candidate.similarity),
		matched_question: Some(candidate.question.clone()),
	}
}

#[cfg(test)]
mod tests {
	use super::{DecisionSource, FALLBACK_CHAIN, RoutingPolicy, Strategy};
	use dar_domain::language::Language;

	#[test]
	fn chain_ends_with_static_default() {
		assert_eq!(FALLBACK_CHAIN.first(), Some(&Strategy::ExactMatch));
		assert_eq!(FALLBACK_CHAIN.last(), Some(&Strategy::StaticDefault));
	}

	#[test]
	fn hint_uses_language_prefix() {
		let policy = RoutingPolicy::default();

		assert_eq!(
			policy.with_hint("We have several.", "Do you have villas for rent?", Language::English),
			"We have several.\n\nRelated topic: Do you have villas for rent?"
		);
		assert!(
			policy
				.with_hint("نعم", "هل لديكم شقق للإيجار؟", Language::Arabic)
				.ends_with("موضوع ذو صلة: هل لديكم شقق للإيجار؟")
		);
	}

	#[test]
	fn source_names_match_serde() {
		for source in [
			DecisionSource::ExactKnowledgeMatch,
			DecisionSource::HighSimilarityKnowledgeMatch,
			DecisionSource::GenerativeFallback,
			DecisionSource::GenerativeFallbackWithHint,
			DecisionSource::KnowledgeFallbackAfterGenerativeFailure,
			DecisionSource::StaticDefault,
		] {
			let encoded = serde_json::to_string(&source).expect("Failed to encode source.");

			assert_eq!(encoded, format!("\"{}\"", source.as_str()));
		}
	}

	#[test]
	fn static_default_follows_language() {
		let policy = RoutingPolicy::default();

		assert!(policy.static_default(Language::English).starts_with("Hello"));
		assert!(policy.static_default(Language::Arabic).starts_with("أهلاً"));
	}
}
