use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
	sync::{Arc, RwLock},
};

use serde::Deserialize;
use uuid::Uuid;

use crate::{Error, Result};
use dar_domain::knowledge::{EntryLanguage, KnowledgeEntry};

#[derive(Debug, Deserialize)]
struct SeedFile {
	#[serde(default)]
	entries: Vec<SeedEntry>,
}

#[derive(Debug, Deserialize)]
struct SeedEntry {
	id: Option<Uuid>,
	question: String,
	answer: String,
	#[serde(default = "default_category")]
	category: String,
	#[serde(default = "default_language")]
	language: EntryLanguage,
	#[serde(default)]
	tags: Vec<String>,
	#[serde(default)]
	priority: i32,
	#[serde(default = "default_active")]
	active: bool,
}

/// Knowledge base held in memory and seeded from a TOML or JSON file.
///
/// Readers clone an `Arc` of the current snapshot, so a reload never changes the entries a
/// caller is already working with.
pub struct FileKnowledgeBase {
	path: Option<PathBuf>,
	snapshot: RwLock<Arc<Vec<KnowledgeEntry>>>,
}
impl FileKnowledgeBase {
	pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();
		let entries = read_entries(&path)?;

		Ok(Self { path: Some(path), snapshot: RwLock::new(Arc::new(entries)) })
	}

	pub fn from_entries(entries: Vec<KnowledgeEntry>) -> Self {
		Self { path: None, snapshot: RwLock::new(Arc::new(entries)) }
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	pub fn snapshot(&self) -> Arc<Vec<KnowledgeEntry>> {
		let guard = self.snapshot.read().unwrap_or_else(|err| err.into_inner());

		Arc::clone(&guard)
	}

	/// Re-reads the backing file and swaps in the new snapshot. Returns the entry count.
	///
	/// A file that fails to parse leaves the current snapshot in place.
	pub fn reload(&self) -> Result<usize> {
		let Some(path) = self.path.as_ref() else { return Err(Error::NotReloadable) };
		let entries = read_entries(path)?;
		let count = entries.len();
		let mut guard = self.snapshot.write().unwrap_or_else(|err| err.into_inner());

		*guard = Arc::new(entries);

		Ok(count)
	}

	pub fn replace(&self, entries: Vec<KnowledgeEntry>) {
		let mut guard = self.snapshot.write().unwrap_or_else(|err| err.into_inner());

		*guard = Arc::new(entries);
	}

	pub fn list_active_entries(&self) -> Vec<KnowledgeEntry> {
		self.snapshot().iter().filter(|entry| entry.active).cloned().collect()
	}

	/// `normalized_question` must already be in lookup form.
	pub fn find_exact_matches(&self, normalized_question: &str) -> Vec<KnowledgeEntry> {
		self.snapshot()
			.iter()
			.filter(|entry| entry.matches_exactly(normalized_question))
			.cloned()
			.collect()
	}
}

pub fn read_entries(path: &Path) -> Result<Vec<KnowledgeEntry>> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadFile { path: path.to_path_buf(), source: err })?;
	let is_json = path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext == "json");

	parse_entries(path, &raw, is_json)
}

pub(crate) fn parse_entries(path: &Path, raw: &str, is_json: bool) -> Result<Vec<KnowledgeEntry>> {
	let seed: SeedFile = if is_json {
		serde_json::from_str(raw).map_err(|err| Error::ParseFile {
			path: path.to_path_buf(),
			message: err.to_string(),
		})?
	} else {
		toml::from_str(raw).map_err(|err| Error::ParseFile {
			path: path.to_path_buf(),
			message: err.to_string(),
		})?
	};
	let mut seen = HashSet::new();
	let mut entries = Vec::with_capacity(seed.entries.len());

	for (idx, seed) in seed.entries.into_iter().enumerate() {
		if seed.question.trim().is_empty() {
			return Err(Error::InvalidEntry(format!("entries[{idx}].question must be non-empty.")));
		}
		if seed.answer.trim().is_empty() {
			return Err(Error::InvalidEntry(format!("entries[{idx}].answer must be non-empty.")));
		}

		let entry_id = seed.id.unwrap_or_else(|| KnowledgeEntry::derived_id(&seed.question));

		if !seen.insert(entry_id) {
			return Err(Error::InvalidEntry(format!(
				"entries[{idx}] duplicates entry id {entry_id}."
			)));
		}

		entries.push(KnowledgeEntry {
			entry_id,
			question: seed.question,
			answer: seed.answer,
			category: seed.category,
			language: seed.language,
			tags: seed.tags.into_iter().filter(|tag| !tag.trim().is_empty()).collect(),
			priority: seed.priority,
			active: seed.active,
		});
	}

	Ok(entries)
}

fn default_category() -> String {
	"general".to_string()
}

fn default_language() -> EntryLanguage {
	EntryLanguage::Both
}

fn default_active() -> bool {
	true
}
