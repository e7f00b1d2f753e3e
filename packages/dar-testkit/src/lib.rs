//! Throwaway Postgres databases and fixture knowledge entries for the workspace's tests.
//!
//! Postgres-backed tests are `#[ignore]`d and read their server from `DAR_PG_DSN`.

mod error;

pub mod fixtures;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub const DSN_ENV: &str = "DAR_PG_DSN";

const ADMIN_DATABASES: [&str; 2] = ["postgres", "template1"];

/// A uniquely named database that holds one test's knowledge entries.
///
/// Call [`TestDatabase::cleanup`] at the end of a test. A handle dropped without cleanup (for
/// example by a failed assertion) still drops the database on a helper thread.
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(server_dsn: &str) -> Result<Self> {
		let server = PgConnectOptions::from_str(server_dsn).map_err(Error::InvalidDsn)?;
		let (admin, mut conn) = connect_admin(&server).await?;
		let name = format!("dar_kb_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|source| Error::CreateDatabase { name: name.clone(), source })?;

		let dsn = server.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.name, &self.admin).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let admin = self.admin.clone();
		// The owning test may still be inside a runtime; block_on needs a fresh one.
		let handle = thread::spawn(move || {
			let result = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| err.to_string())
				.and_then(|rt| {
					rt.block_on(drop_database(&name, &admin)).map_err(|err| err.to_string())
				});

			if let Err(err) = result {
				eprintln!("Leaked test database {name}: {err}");
			}
		});

		let _ = handle.join();
	}
}

/// The Postgres server used by ignored tests, if one is configured.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn connect_admin(server: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last = None;

	for database in ADMIN_DATABASES {
		let options = server.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => last = Some(err),
		}
	}

	Err(Error::AdminUnavailable(last.unwrap_or(sqlx::Error::PoolClosed)))
}

async fn drop_database(name: &str, admin: &PgConnectOptions) -> Result<()> {
	let drop_err = |source| Error::DropDatabase { name: name.to_string(), source };
	let mut conn = PgConnection::connect_with(admin).await.map_err(drop_err)?;

	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str())
		.await
		.map_err(drop_err)?;

	Ok(())
}
