use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU64, Ordering},
};

use toml::Value;

use dar_config::{Config, Error, StorageBackend};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(0);

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn with_table<F>(section: &[&str], f: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value = sample_value();
	let mut table = value.as_table_mut().expect("Template config must be a table.");

	for key in section {
		table = table
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{key}]."));
	}

	f(table);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn parse(raw: &str) -> dar_config::Result<Config> {
	dar_config::parse(Path::new("inline.toml"), raw)
}

fn expect_validation(raw: &str, needle: &str) {
	match parse(raw) {
		Err(Error::Validation { message }) => {
			assert!(message.contains(needle), "Unexpected validation message: {message}");
		},
		other => panic!("Expected validation error containing {needle:?}, got {other:?}."),
	}
}

fn write_temp_config(raw: &str) -> PathBuf {
	let id = NEXT_FILE_ID.fetch_add(1, Ordering::SeqCst);
	let path = env::temp_dir().join(format!("dar_config_{}_{id}.toml", std::process::id()));

	fs::write(&path, raw).expect("Failed to write temp config.");

	path
}

#[test]
fn sample_config_loads_with_defaults() {
	let path = write_temp_config(SAMPLE_CONFIG_TEMPLATE_TOML);
	let cfg = dar_config::load(&path).expect("Sample config must load.");

	fs::remove_file(&path).ok();

	assert_eq!(cfg.storage.backend, StorageBackend::File);
	assert_eq!(cfg.routing.top_n, 5);
	assert_eq!(cfg.routing.high_score, 90.0);
	assert_eq!(cfg.providers.generative.max_tokens, 512);
	assert!((cfg.providers.generative.default_confidence - 0.8).abs() < f32::EPSILON);
	assert!(!cfg.messages.static_default_en.is_empty());
	assert!(!cfg.messages.static_default_ar.is_empty());
}

#[test]
fn trailing_slash_is_trimmed_from_api_base() {
	let cfg = parse(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Sample config must parse.");

	assert_eq!(cfg.providers.generative.api_base, "https://api.openai.com/v1");
}

#[test]
fn routing_section_is_optional() {
	let mut value = sample_value();

	value.as_table_mut().expect("table").remove("routing");

	let raw = toml::to_string(&value).expect("render");
	let cfg = parse(&raw).expect("Config without [routing] must parse.");

	assert_eq!(cfg.routing.floor_score, 20.0);
	assert_eq!(cfg.routing.hint_score, 50.0);
	assert_eq!(cfg.routing.high_score, 90.0);
	assert!((cfg.routing.weights.total() - 1.0).abs() < 1e-9);
}

#[test]
fn blank_system_prompt_is_normalized_to_none() {
	let raw = with_table(&["providers", "generative"], |table| {
		table.insert("system_prompt".to_string(), Value::String("   ".to_string()));
	});
	let cfg = parse(&raw).expect("Config must parse.");

	assert!(cfg.providers.generative.system_prompt.is_none());
}

#[test]
fn missing_file_is_reported_as_read_error() {
	let err = dar_config::load(Path::new("/nonexistent/dar.toml")).expect_err("Load must fail.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}

#[test]
fn malformed_toml_is_reported_as_parse_error() {
	let err = parse("[service\nhttp_bind = ").expect_err("Parse must fail.");

	assert!(matches!(err, Error::ParseConfig { .. }));
}

#[test]
fn rejects_weights_that_do_not_sum_to_one() {
	let raw = with_table(&["routing", "weights"], |table| {
		table.insert("edit".to_string(), Value::Float(0.5));
	});

	expect_validation(&raw, "routing.weights must sum to 1.0.");
}

#[test]
fn rejects_negative_weight() {
	let raw = with_table(&["routing", "weights"], |table| {
		table.insert("edit".to_string(), Value::Float(-0.1));
		table.insert("keyword".to_string(), Value::Float(0.5));
	});

	expect_validation(&raw, "routing.weights.edit must be zero or greater.");
}

#[test]
fn rejects_floor_at_or_above_hint_band() {
	let raw = with_table(&["routing"], |table| {
		table.insert("floor_score".to_string(), Value::Float(50.0));
	});

	expect_validation(&raw, "routing.floor_score must be less than routing.hint_score.");
}

#[test]
fn rejects_hint_band_above_high_threshold() {
	let raw = with_table(&["routing"], |table| {
		table.insert("hint_score".to_string(), Value::Float(95.0));
	});

	expect_validation(&raw, "routing.hint_score must not exceed routing.high_score.");
}

#[test]
fn rejects_threshold_outside_score_range() {
	let raw = with_table(&["routing"], |table| {
		table.insert("high_score".to_string(), Value::Float(120.0));
	});

	expect_validation(&raw, "routing.high_score must be in the range 0-100.");
}

#[test]
fn rejects_zero_top_n() {
	let raw = with_table(&["routing"], |table| {
		table.insert("top_n".to_string(), Value::Integer(0));
	});

	expect_validation(&raw, "routing.top_n must be greater than zero.");
}

#[test]
fn rejects_empty_api_key_when_generative_is_enabled() {
	let raw = with_table(&["providers", "generative"], |table| {
		table.insert("api_key".to_string(), Value::String(" ".to_string()));
	});

	expect_validation(&raw, "providers.generative.api_key must be non-empty");
}

#[test]
fn allows_empty_api_key_when_generative_is_disabled() {
	let mut value = sample_value();
	let root = value.as_table_mut().expect("table");

	root.get_mut("providers")
		.and_then(Value::as_table_mut)
		.and_then(|providers| providers.get_mut("generative"))
		.and_then(Value::as_table_mut)
		.expect("generative table")
		.insert("api_key".to_string(), Value::String(String::new()));
	root.get_mut("routing")
		.and_then(Value::as_table_mut)
		.expect("routing table")
		.insert("generative_enabled".to_string(), Value::Boolean(false));

	let raw = toml::to_string(&value).expect("render");

	parse(&raw).expect("Disabled generative fallback must not require an api key.");
}

#[test]
fn rejects_postgres_backend_without_postgres_section() {
	let mut value = sample_value();
	let storage = value
		.as_table_mut()
		.and_then(|root| root.get_mut("storage"))
		.and_then(Value::as_table_mut)
		.expect("storage table");

	storage.insert("backend".to_string(), Value::String("postgres".to_string()));
	storage.remove("postgres");

	let raw = toml::to_string(&value).expect("render");

	expect_validation(&raw, "storage.postgres must be present");
}

#[test]
fn rejects_blank_static_default_message() {
	let mut value = sample_value();
	let mut messages = toml::Table::new();

	messages.insert("static_default_en".to_string(), Value::String(String::new()));
	value.as_table_mut().expect("table").insert("messages".to_string(), Value::Table(messages));

	let raw = toml::to_string(&value).expect("render");

	expect_validation(&raw, "messages.static_default_en must be non-empty.");
}
