use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};
use dar_config::GenerativeProviderConfig;
use dar_domain::language::Language;

const DEFAULT_SYSTEM_PROMPT: &str = "You are the WhatsApp assistant of a real estate agency. \
Answer questions about renting, buying, and selling property, viewings, and the agency's \
services. Keep replies short and friendly, suitable for a chat message. If you do not know a \
specific listing, price, or policy, say so and offer to connect the customer with an agent \
instead of inventing details.";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerativeReply {
	pub text: String,
	pub confidence: f32,
}

pub async fn generate(
	cfg: &GenerativeProviderConfig,
	message: &str,
	language: Language,
	caller_id: Option<&str>,
) -> Result<GenerativeReply> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = build_request_body(cfg, message, language, caller_id);
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		return Err(Error::Status { status: status.as_u16() });
	}

	let json: Value = res.json().await?;
	let text = parse_reply_text(&json)?;

	Ok(GenerativeReply { text, confidence: cfg.default_confidence })
}

pub fn system_prompt(cfg: &GenerativeProviderConfig, language: Language) -> String {
	let persona = cfg.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
	let instruction = match language {
		Language::Arabic => "Reply in Arabic.",
		Language::English => "Reply in English.",
	};

	format!("{persona}\n\n{instruction}")
}

fn build_request_body(
	cfg: &GenerativeProviderConfig,
	message: &str,
	language: Language,
	caller_id: Option<&str>,
) -> Value {
	let mut body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": [
			{ "role": "system", "content": system_prompt(cfg, language) },
			{ "role": "user", "content": message },
		],
	});

	if let Some(caller_id) = caller_id.filter(|value| !value.trim().is_empty())
		&& let Some(object) = body.as_object_mut()
	{
		object.insert("user".to_string(), Value::String(caller_id.to_string()));
	}

	body
}

fn parse_reply_text(json: &Value) -> Result<String> {
	let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
	else {
		return Err(Error::InvalidResponse {
			message: "Generative response is missing choices[0].message.content.".to_string(),
		});
	};
	let Some(text) = content.as_str() else {
		return Err(Error::InvalidResponse {
			message: "Generative response content is not a string.".to_string(),
		});
	};
	let trimmed = text.trim();

	if trimmed.is_empty() {
		return Err(Error::EmptyReply);
	}

	Ok(trimmed.to_string())
}
