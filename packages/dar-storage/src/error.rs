#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Failed to read knowledge file at {path:?}.")]
	ReadFile { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse knowledge file at {path:?}: {message}")]
	ParseFile { path: std::path::PathBuf, message: String },
	#[error("Invalid knowledge entry: {0}")]
	InvalidEntry(String),
	#[error("Knowledge base has no backing file to reload from.")]
	NotReloadable,
}
