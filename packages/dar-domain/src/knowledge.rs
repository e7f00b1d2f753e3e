use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{language::Language, text};

const ENTRY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_3c2e_9b7d_4e51_8f0a_2d6c_b4e8_1357);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryLanguage {
	En,
	Ar,
	Both,
}
impl EntryLanguage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::En => "en",
			Self::Ar => "ar",
			Self::Both => "both",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"en" => Some(Self::En),
			"ar" => Some(Self::Ar),
			"both" => Some(Self::Both),
			_ => None,
		}
	}

	pub fn serves(self, language: Language) -> bool {
		match self {
			Self::Both => true,
			Self::En => language == Language::English,
			Self::Ar => language == Language::Arabic,
		}
	}
}

/// One curated question/answer pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
	pub entry_id: Uuid,
	pub question: String,
	pub answer: String,
	pub category: String,
	pub language: EntryLanguage,
	pub tags: Vec<String>,
	pub priority: i32,
	pub active: bool,
}
impl KnowledgeEntry {
	/// Stable id derived from the question, for seed files that omit one.
	pub fn derived_id(question: &str) -> Uuid {
		Uuid::new_v5(&ENTRY_ID_NAMESPACE, text::normalize_for_lookup(question).as_bytes())
	}

	pub fn lookup_key(&self) -> String {
		text::normalize_for_lookup(&self.question)
	}

	pub fn matches_exactly(&self, normalized_message: &str) -> bool {
		self.active && self.lookup_key() == normalized_message
	}
}

#[cfg(test)]
mod tests {
	use super::{EntryLanguage, KnowledgeEntry};
	use crate::language::Language;

	fn entry(question: &str, active: bool) -> KnowledgeEntry {
		KnowledgeEntry {
			entry_id: KnowledgeEntry::derived_id(question),
			question: question.to_string(),
			answer: "answer".to_string(),
			category: "general".to_string(),
			language: EntryLanguage::En,
			tags: Vec::new(),
			priority: 0,
			active,
		}
	}

	#[test]
	fn derived_ids_ignore_case_and_spacing() {
		assert_eq!(
			KnowledgeEntry::derived_id("Do you rent villas?"),
			KnowledgeEntry::derived_id("  do YOU  rent villas? ")
		);
		assert_ne!(
			KnowledgeEntry::derived_id("Do you rent villas?"),
			KnowledgeEntry::derived_id("Do you sell villas?")
		);
	}

	#[test]
	fn inactive_entries_never_match_exactly() {
		assert!(entry("Where is your office?", true).matches_exactly("where is your office?"));
		assert!(!entry("Where is your office?", false).matches_exactly("where is your office?"));
	}

	#[test]
	fn both_serves_every_language() {
		assert!(EntryLanguage::Both.serves(Language::Arabic));
		assert!(EntryLanguage::Both.serves(Language::English));
		assert!(EntryLanguage::Ar.serves(Language::Arabic));
		assert!(!EntryLanguage::Ar.serves(Language::English));
	}

	#[test]
	fn parses_language_tags() {
		assert_eq!(EntryLanguage::parse(" AR "), Some(EntryLanguage::Ar));
		assert_eq!(EntryLanguage::parse("both"), Some(EntryLanguage::Both));
		assert_eq!(EntryLanguage::parse("fr"), None);
	}

	#[test]
	fn serializes_language_as_lowercase_tag() {
		let raw = serde_json::to_string(&EntryLanguage::Both).expect("serialize");

		assert_eq!(raw, "\"both\"");
	}
}
