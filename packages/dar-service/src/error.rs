use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid knowledge entry {entry_id}: {message}")]
	InvalidEntry { entry_id: Uuid, message: String },
	#[error("Knowledge reload is not supported by the {backend} backend.")]
	ReloadUnsupported { backend: &'static str },
	#[error("Generative provider timed out after {timeout_ms} ms.")]
	GenerativeTimeout { timeout_ms: u64 },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<dar_storage::Error> for Error {
	fn from(err: dar_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<dar_providers::Error> for Error {
	fn from(err: dar_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
