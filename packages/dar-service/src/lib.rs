pub mod candidates;
pub mod knowledge;
pub mod routing;

mod error;

pub use candidates::{MatchReport, ScoredCandidate};
pub use error::{Error, Result};
pub use knowledge::PgKnowledgeBase;
pub use routing::{
	Attempt, DecisionSource, FALLBACK_CHAIN, ResponseRouter, RoutingDecision, RoutingPolicy,
	Strategy,
};

use std::{future::Future, pin::Pin, sync::Arc};

use dar_config::GenerativeProviderConfig;
use dar_domain::{
	knowledge::KnowledgeEntry,
	language::{self, Language},
	similarity::SimilarityEngine,
};
use dar_providers::{GenerativeReply, generative};
use dar_storage::file::FileKnowledgeBase;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the active knowledge entries.
pub trait KnowledgeBase
where
	Self: Send + Sync,
{
	fn list_active_entries<'a>(&'a self) -> BoxFuture<'a, Result<Vec<KnowledgeEntry>>>;

	/// `normalized_text` is in lookup form, see [`dar_domain::text::normalize_for_lookup`].
	fn find_exact_matches<'a>(
		&'a self,
		normalized_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<KnowledgeEntry>>>;
}

pub trait GenerativeProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		message: &'a str,
		language: Language,
		caller_id: Option<&'a str>,
	) -> BoxFuture<'a, Result<GenerativeReply>>;
}

pub trait LanguageDetector
where
	Self: Send + Sync,
{
	fn detect(&self, text: &str) -> Language;
}

/// Scores one message against one knowledge entry on a 0-100 scale.
pub trait CandidateScorer
where
	Self: Send + Sync,
{
	fn score(&self, message: &str, entry: &KnowledgeEntry) -> Result<f64>;
}

/// Generative fallback backed by an OpenAI-compatible chat completions endpoint.
pub struct HttpGenerativeProvider {
	cfg: GenerativeProviderConfig,
}
impl HttpGenerativeProvider {
	pub fn new(cfg: GenerativeProviderConfig) -> Self {
		Self { cfg }
	}
}
impl GenerativeProvider for HttpGenerativeProvider {
	fn generate<'a>(
		&'a self,
		message: &'a str,
		language: Language,
		caller_id: Option<&'a str>,
	) -> BoxFuture<'a, Result<GenerativeReply>> {
		Box::pin(async move {
			let reply = generative::generate(&self.cfg, message, language, caller_id).await?;

			Ok(reply)
		})
	}
}

pub struct ScriptLanguageDetector;
impl LanguageDetector for ScriptLanguageDetector {
	fn detect(&self, text: &str) -> Language {
		language::detect_language(text)
	}
}

/// The weighted similarity ensemble with tag and answer boosts.
pub struct EnsembleScorer {
	engine: SimilarityEngine,
}
impl EnsembleScorer {
	pub fn new(engine: SimilarityEngine) -> Self {
		Self { engine }
	}
}
impl Default for EnsembleScorer {
	fn default() -> Self {
		Self::new(SimilarityEngine::default())
	}
}
impl CandidateScorer for EnsembleScorer {
	fn score(&self, message: &str, entry: &KnowledgeEntry) -> Result<f64> {
		if entry.question.trim().is_empty() {
			return Err(Error::InvalidEntry {
				entry_id: entry.entry_id,
				message: "question text is empty.".to_string(),
			});
		}
		if entry.answer.trim().is_empty() {
			return Err(Error::InvalidEntry {
				entry_id: entry.entry_id,
				message: "answer text is empty.".to_string(),
			});
		}

		let score =
			self.engine.score_with_context(message, &entry.question, &entry.answer, &entry.tags);

		if !score.is_finite() {
			return Err(Error::InvalidEntry {
				entry_id: entry.entry_id,
				message: "similarity is not a finite number.".to_string(),
			});
		}

		Ok(score)
	}
}

impl KnowledgeBase for FileKnowledgeBase {
	fn list_active_entries<'a>(&'a self) -> BoxFuture<'a, Result<Vec<KnowledgeEntry>>> {
		Box::pin(async move { Ok(FileKnowledgeBase::list_active_entries(self)) })
	}

	fn find_exact_matches<'a>(
		&'a self,
		normalized_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<KnowledgeEntry>>> {
		Box::pin(async move { Ok(FileKnowledgeBase::find_exact_matches(self, normalized_text)) })
	}
}

/// Routing plus the knowledge-base handles the HTTP surface needs.
pub struct DarService {
	pub router: ResponseRouter,
	file_knowledge: Option<Arc<FileKnowledgeBase>>,
}
impl DarService {
	pub fn new(router: ResponseRouter) -> Self {
		Self { router, file_knowledge: None }
	}

	pub fn with_file_knowledge(router: ResponseRouter, knowledge: Arc<FileKnowledgeBase>) -> Self {
		Self { router, file_knowledge: Some(knowledge) }
	}

	pub async fn route(&self, message: &str, caller_id: Option<&str>) -> Result<RoutingDecision> {
		if message.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "message must be non-empty.".to_string() });
		}

		Ok(self.router.route(message, caller_id).await)
	}

	pub async fn explain(&self, message: &str) -> Result<MatchReport> {
		if message.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "message must be non-empty.".to_string() });
		}

		self.router.explain(message).await
	}

	/// Re-reads the seed file. Only the file backend supports this.
	pub fn reload_knowledge(&self) -> Result<usize> {
		let Some(knowledge) = self.file_knowledge.as_ref() else {
			return Err(Error::ReloadUnsupported { backend: "postgres" });
		};
		let count = knowledge.reload()?;

		tracing::info!(entries = count, "Knowledge base reloaded.");

		Ok(count)
	}
}
