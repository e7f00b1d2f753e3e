pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("DAR_PG_DSN is not a valid Postgres DSN: {0}")]
	InvalidDsn(sqlx::Error),
	#[error("No admin database (postgres, template1) accepted a connection: {0}")]
	AdminUnavailable(sqlx::Error),
	#[error("Cannot create knowledge test database {name}: {source}")]
	CreateDatabase { name: String, source: sqlx::Error },
	#[error("Cannot drop knowledge test database {name}: {source}")]
	DropDatabase { name: String, source: sqlx::Error },
}
