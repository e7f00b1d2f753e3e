use sqlx::PgExecutor;

use crate::{Result, models::KnowledgeEntryRow};
use dar_domain::{knowledge::KnowledgeEntry, text};

const ENTRY_COLUMNS: &str = "\
entry_id,
	question,
	answer,
	category,
	language,
	tags,
	priority,
	active,
	created_at,
	updated_at";

pub async fn list_active_entries<'e, E>(executor: E) -> Result<Vec<KnowledgeEntryRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT
	{ENTRY_COLUMNS}
FROM knowledge_entries
WHERE active
ORDER BY priority DESC, created_at ASC"
	);
	let rows = sqlx::query_as::<_, KnowledgeEntryRow>(&sql).fetch_all(executor).await?;

	Ok(rows)
}

/// `normalized_question` must already be in lookup form, see [`text::normalize_for_lookup`].
pub async fn find_exact_matches<'e, E>(
	executor: E,
	normalized_question: &str,
) -> Result<Vec<KnowledgeEntryRow>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
SELECT
	{ENTRY_COLUMNS}
FROM knowledge_entries
WHERE active AND question_normalized = $1
ORDER BY priority DESC, created_at ASC"
	);
	let rows = sqlx::query_as::<_, KnowledgeEntryRow>(&sql)
		.bind(normalized_question)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

pub async fn upsert_entry<'e, E>(executor: E, entry: &KnowledgeEntry) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO knowledge_entries (
	entry_id,
	question,
	question_normalized,
	answer,
	category,
	language,
	tags,
	priority,
	active
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
ON CONFLICT (entry_id) DO UPDATE
SET
	question = EXCLUDED.question,
	question_normalized = EXCLUDED.question_normalized,
	answer = EXCLUDED.answer,
	category = EXCLUDED.category,
	language = EXCLUDED.language,
	tags = EXCLUDED.tags,
	priority = EXCLUDED.priority,
	active = EXCLUDED.active,
	updated_at = now()",
	)
	.bind(entry.entry_id)
	.bind(entry.question.as_str())
	.bind(text::normalize_for_lookup(&entry.question))
	.bind(entry.answer.as_str())
	.bind(entry.category.as_str())
	.bind(entry.language.as_str())
	.bind(entry.tags.as_slice())
	.bind(entry.priority)
	.bind(entry.active)
	.execute(executor)
	.await?;

	Ok(())
}
