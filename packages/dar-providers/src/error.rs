pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("Default header {key} must be a string.")]
	NonStringHeader { key: String },
	#[error("Generative provider responded with HTTP {status}.")]
	Status { status: u16 },
	#[error("Generative provider returned an empty reply.")]
	EmptyReply,
	#[error("{message}")]
	InvalidResponse { message: String },
}
