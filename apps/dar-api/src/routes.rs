use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use dar_service::{Error, MatchReport, RoutingDecision};

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
	pub message: String,
	#[serde(default)]
	pub caller_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
	pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
	pub entries: usize,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			Error::ReloadUnsupported { .. } =>
				ApiError::new(StatusCode::CONFLICT, "reload_unsupported", err.to_string()),
			Error::Storage { message } => {
				tracing::error!(error = %message, "Knowledge base request failed.");

				ApiError::new(
					StatusCode::SERVICE_UNAVAILABLE,
					"storage_unavailable",
					"Knowledge base is unavailable.",
				)
			},
			err => {
				tracing::error!(error = %err, "Request failed.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal error.")
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/route", post(route_message))
		.route("/v1/knowledge/match", post(match_knowledge))
		.route("/v1/admin/knowledge/reload", post(reload_knowledge))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn route_message(
	State(state): State<AppState>,
	Json(payload): Json<RouteRequest>,
) -> Result<Json<RoutingDecision>, ApiError> {
	let caller_id = payload.caller_id.as_deref().filter(|caller| !caller.trim().is_empty());
	let decision = state.service.route(&payload.message, caller_id).await?;

	Ok(Json(decision))
}

async fn match_knowledge(
	State(state): State<AppState>,
	Json(payload): Json<MatchRequest>,
) -> Result<Json<MatchReport>, ApiError> {
	let report = state.service.explain(&payload.message).await?;

	Ok(Json(report))
}

async fn reload_knowledge(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
	let entries = state.service.reload_knowledge()?;

	Ok(Json(ReloadResponse { entries }))
}
