use time::OffsetDateTime;
use uuid::Uuid;

use crate::Error;
use dar_domain::knowledge::{EntryLanguage, KnowledgeEntry};

#[derive(Debug, sqlx::FromRow)]
pub struct KnowledgeEntryRow {
	pub entry_id: Uuid,
	pub question: String,
	pub answer: String,
	pub category: String,
	pub language: String,
	pub tags: Vec<String>,
	pub priority: i32,
	pub active: bool,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl TryFrom<KnowledgeEntryRow> for KnowledgeEntry {
	type Error = Error;

	fn try_from(row: KnowledgeEntryRow) -> Result<Self, Self::Error> {
		let Some(language) = EntryLanguage::parse(&row.language) else {
			return Err(Error::InvalidEntry(format!(
				"entry {} has unknown language {:?}.",
				row.entry_id, row.language
			)));
		};

		Ok(Self {
			entry_id: row.entry_id,
			question: row.question,
			answer: row.answer,
			category: row.category,
			language,
			tags: row.tags,
			priority: row.priority,
			active: row.active,
		})
	}
}

#[cfg(test)]
mod tests {
	use time::OffsetDateTime;
	use uuid::Uuid;

	use super::KnowledgeEntryRow;
	use dar_domain::knowledge::{EntryLanguage, KnowledgeEntry};

	fn row(language: &str) -> KnowledgeEntryRow {
		KnowledgeEntryRow {
			entry_id: Uuid::nil(),
			question: "Do you manage properties?".to_string(),
			answer: "Yes, we offer full property management.".to_string(),
			category: "services".to_string(),
			language: language.to_string(),
			tags: vec!["management".to_string()],
			priority: 3,
			active: true,
			created_at: OffsetDateTime::UNIX_EPOCH,
			updated_at: OffsetDateTime::UNIX_EPOCH,
		}
	}

	#[test]
	fn converts_valid_rows() {
		let entry = KnowledgeEntry::try_from(row("AR")).expect("Row must convert.");

		assert_eq!(entry.language, EntryLanguage::Ar);
		assert_eq!(entry.priority, 3);
	}

	#[test]
	fn rejects_unknown_language() {
		assert!(KnowledgeEntry::try_from(row("fr")).is_err());
	}
}
