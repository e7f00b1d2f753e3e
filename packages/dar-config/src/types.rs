use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub routing: Routing,
	#[serde(default)]
	pub messages: Messages,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	/// Entries live in the `knowledge_entries` Postgres table.
	Postgres,
	/// Entries are seeded from a TOML or JSON file and held in memory.
	File,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	pub postgres: Option<Postgres>,
	pub file: Option<KnowledgeFile>,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeFile {
	pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub generative: GenerativeProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GenerativeProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
	/// Overrides the built-in assistant persona when set.
	pub system_prompt: Option<String>,
	/// Reported with every successful reply; chat completions carry no native confidence.
	#[serde(default = "default_confidence")]
	pub default_confidence: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Routing {
	pub generative_enabled: bool,
	/// Candidates at or below this score are dropped as noise.
	pub floor_score: f64,
	/// Lowest best score that earns a related-topic hint on a generative answer.
	pub hint_score: f64,
	/// Lowest best score answered verbatim from the knowledge base.
	pub high_score: f64,
	pub top_n: u32,
	pub generative_timeout_ms: u64,
	pub weights: SimilarityWeights,
}
impl Default for Routing {
	fn default() -> Self {
		Self {
			generative_enabled: true,
			floor_score: 20.0,
			hint_score: 50.0,
			high_score: 90.0,
			top_n: 5,
			generative_timeout_ms: 8_000,
			weights: SimilarityWeights::default(),
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
	pub edit: f64,
	pub jaccard: f64,
	pub cosine: f64,
	pub keyword: f64,
}
impl SimilarityWeights {
	pub fn total(&self) -> f64 {
		self.edit + self.jaccard + self.cosine + self.keyword
	}
}
impl Default for SimilarityWeights {
	fn default() -> Self {
		Self { edit: 0.20, jaccard: 0.30, cosine: 0.30, keyword: 0.20 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Messages {
	pub static_default_en: String,
	pub static_default_ar: String,
	pub hint_prefix_en: String,
	pub hint_prefix_ar: String,
}
impl Default for Messages {
	fn default() -> Self {
		Self {
			static_default_en: "Hello and welcome! I can help you find a property, arrange a \
			                    viewing, or connect you with one of our agents. What are you \
			                    looking for today?"
				.to_string(),
			static_default_ar: "أهلاً وسهلاً! يمكنني مساعدتك في إيجاد عقار مناسب، أو ترتيب موعد \
			                    للمعاينة، أو التواصل مع أحد وكلائنا. كيف يمكنني مساعدتك اليوم؟"
				.to_string(),
			hint_prefix_en: "Related topic:".to_string(),
			hint_prefix_ar: "موضوع ذو صلة:".to_string(),
		}
	}
}

fn default_max_tokens() -> u32 {
	512
}

fn default_confidence() -> f32 {
	0.8
}
