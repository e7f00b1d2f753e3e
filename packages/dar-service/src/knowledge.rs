use crate::{BoxFuture, KnowledgeBase, Result};
use dar_domain::knowledge::KnowledgeEntry;
use dar_storage::{db::Db, models::KnowledgeEntryRow, queries};

/// Knowledge base backed by the `knowledge_entries` Postgres table.
pub struct PgKnowledgeBase {
	pub db: Db,
}
impl PgKnowledgeBase {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	pub async fn import(&self, entries: &[KnowledgeEntry]) -> Result<usize> {
		let mut tx = self.db.pool.begin().await.map_err(dar_storage::Error::from)?;

		for entry in entries {
			queries::upsert_entry(&mut *tx, entry).await?;
		}

		tx.commit().await.map_err(dar_storage::Error::from)?;

		Ok(entries.len())
	}
}
impl KnowledgeBase for PgKnowledgeBase {
	fn list_active_entries<'a>(&'a self) -> BoxFuture<'a, Result<Vec<KnowledgeEntry>>> {
		Box::pin(async move {
			let rows = queries::list_active_entries(&self.db.pool).await?;

			Ok(convert_rows(rows))
		})
	}

	fn find_exact_matches<'a>(
		&'a self,
		normalized_text: &'a str,
	) -> BoxFuture<'a, Result<Vec<KnowledgeEntry>>> {
		Box::pin(async move {
			let rows = queries::find_exact_matches(&self.db.pool, normalized_text).await?;

			Ok(convert_rows(rows))
		})
	}
}

/// Rows that fail to convert are logged and skipped.
fn convert_rows(rows: Vec<KnowledgeEntryRow>) -> Vec<KnowledgeEntry> {
	let mut out = Vec::with_capacity(rows.len());

	for row in rows {
		let entry_id = row.entry_id;

		match KnowledgeEntry::try_from(row) {
			Ok(entry) => out.push(entry),
			Err(err) => {
				tracing::warn!(error = %err, entry_id = %entry_id, "Skipping malformed knowledge entry.");
			},
		}
	}

	out
}
