use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read config {path:?}: {source}")]
	ReadConfig { path: PathBuf, source: io::Error },
	#[error("Config {path:?} is not valid TOML: {source}")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("Invalid config: {message}")]
	Validation { message: String },
}
