mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, GenerativeProviderConfig, KnowledgeFile, Messages, Postgres, Providers, Routing,
	Service, SimilarityWeights, Storage, StorageBackend,
};

use std::{fs, path::Path};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(path, &raw)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(validation("service.http_bind must be non-empty."));
	}

	match cfg.storage.backend {
		StorageBackend::Postgres => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(validation(
					"storage.postgres must be present when storage.backend is postgres.",
				));
			};

			if postgres.dsn.trim().is_empty() {
				return Err(validation("storage.postgres.dsn must be non-empty."));
			}
			if postgres.pool_max_conns == 0 {
				return Err(validation("storage.postgres.pool_max_conns must be greater than zero."));
			}
		},
		StorageBackend::File => {
			let Some(file) = cfg.storage.file.as_ref() else {
				return Err(validation("storage.file must be present when storage.backend is file."));
			};

			if file.path.trim().is_empty() {
				return Err(validation("storage.file.path must be non-empty."));
			}
		},
	}

	validate_routing(&cfg.routing)?;

	let generative = &cfg.providers.generative;

	if cfg.routing.generative_enabled && generative.api_key.trim().is_empty() {
		return Err(validation(
			"providers.generative.api_key must be non-empty when routing.generative_enabled is true.",
		));
	}
	if generative.timeout_ms == 0 {
		return Err(validation("providers.generative.timeout_ms must be greater than zero."));
	}
	if !generative.temperature.is_finite() || !(0.0..=2.0).contains(&generative.temperature) {
		return Err(validation("providers.generative.temperature must be in the range 0.0-2.0."));
	}
	if !generative.default_confidence.is_finite()
		|| !(0.0..=1.0).contains(&generative.default_confidence)
	{
		return Err(validation(
			"providers.generative.default_confidence must be in the range 0.0-1.0.",
		));
	}

	for (label, value) in [
		("messages.static_default_en", &cfg.messages.static_default_en),
		("messages.static_default_ar", &cfg.messages.static_default_ar),
		("messages.hint_prefix_en", &cfg.messages.hint_prefix_en),
		("messages.hint_prefix_ar", &cfg.messages.hint_prefix_ar),
	] {
		if value.trim().is_empty() {
			return Err(validation(format!("{label} must be non-empty.")));
		}
	}

	Ok(())
}

fn validate_routing(routing: &Routing) -> Result<()> {
	for (label, value) in [
		("routing.floor_score", routing.floor_score),
		("routing.hint_score", routing.hint_score),
		("routing.high_score", routing.high_score),
	] {
		if !value.is_finite() {
			return Err(validation(format!("{label} must be a finite number.")));
		}
		if !(0.0..=100.0).contains(&value) {
			return Err(validation(format!("{label} must be in the range 0-100.")));
		}
	}

	if routing.floor_score >= routing.hint_score {
		return Err(validation("routing.floor_score must be less than routing.hint_score."));
	}
	if routing.hint_score > routing.high_score {
		return Err(validation("routing.hint_score must not exceed routing.high_score."));
	}
	if routing.top_n == 0 {
		return Err(validation("routing.top_n must be greater than zero."));
	}
	if routing.generative_timeout_ms == 0 {
		return Err(validation("routing.generative_timeout_ms must be greater than zero."));
	}

	let weights = routing.weights;

	for (label, value) in [
		("routing.weights.edit", weights.edit),
		("routing.weights.jaccard", weights.jaccard),
		("routing.weights.cosine", weights.cosine),
		("routing.weights.keyword", weights.keyword),
	] {
		if !value.is_finite() {
			return Err(validation(format!("{label} must be a finite number.")));
		}
		if value < 0.0 {
			return Err(validation(format!("{label} must be zero or greater.")));
		}
	}

	if (weights.total() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
		return Err(validation("routing.weights must sum to 1.0."));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let generative = &mut cfg.providers.generative;

	if generative.system_prompt.as_deref().map(|prompt| prompt.trim().is_empty()).unwrap_or(false)
	{
		generative.system_prompt = None;
	}

	generative.api_base = generative.api_base.trim_end_matches('/').to_string();
}

fn validation(message: impl Into<String>) -> Error {
	Error::Validation { message: message.into() }
}
