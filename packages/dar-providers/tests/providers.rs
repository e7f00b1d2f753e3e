use std::net::SocketAddr;

use axum::{Json, Router, http::StatusCode, routing::post};
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use tokio::net::TcpListener;

use dar_config::GenerativeProviderConfig;
use dar_domain::language::Language;
use dar_providers::{Error, generative};

fn provider_config(addr: SocketAddr, timeout_ms: u64) -> GenerativeProviderConfig {
	GenerativeProviderConfig {
		provider_id: "local".to_string(),
		api_base: format!("http://{addr}"),
		api_key: "secret".to_string(),
		path: "/v1/chat/completions".to_string(),
		model: "local-model".to_string(),
		temperature: 0.2,
		max_tokens: 128,
		timeout_ms,
		default_headers: Map::new(),
		system_prompt: None,
		default_confidence: 0.75,
	}
}

async fn serve(app: Router) -> SocketAddr {
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind listener.");
	let addr = listener.local_addr().expect("Missing local address.");

	tokio::spawn(async move {
		axum::serve(listener, app).await.expect("Test server failed.");
	});

	addr
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		dar_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_header() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), Value::from(3));

	let err = dar_providers::auth_headers("secret", &defaults).expect_err("Header must fail.");

	assert!(matches!(err, Error::NonStringHeader { key } if key == "x-retries"));
}

#[tokio::test]
async fn generates_reply_from_chat_completion() {
	let app = Router::new().route(
		"/v1/chat/completions",
		post(|Json(body): Json<Value>| async move {
			let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();

			Json(serde_json::json!({
				"choices": [{ "message": { "role": "assistant", "content": format!("echo: {user}") } }]
			}))
		}),
	);
	let addr = serve(app).await;
	let reply = generative::generate(
		&provider_config(addr, 2_000),
		"Any villas in Hittin?",
		Language::English,
		None,
	)
	.await
	.expect("Generation failed.");

	assert_eq!(reply.text, "echo: Any villas in Hittin?");
	assert!((reply.confidence - 0.75).abs() < f32::EPSILON);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
	let app = Router::new()
		.route("/v1/chat/completions", post(|| async { StatusCode::TOO_MANY_REQUESTS }));
	let addr = serve(app).await;
	let err = generative::generate(&provider_config(addr, 2_000), "hi", Language::English, None)
		.await
		.expect_err("Generation must fail.");

	assert!(matches!(err, Error::Status { status: 429 }));
}

#[tokio::test]
async fn empty_completion_is_an_error() {
	let app = Router::new().route(
		"/v1/chat/completions",
		post(|| async { Json(serde_json::json!({ "choices": [{ "message": { "content": "" } }] })) }),
	);
	let addr = serve(app).await;
	let err = generative::generate(&provider_config(addr, 2_000), "hi", Language::Arabic, None)
		.await
		.expect_err("Generation must fail.");

	assert!(matches!(err, Error::EmptyReply));
}
