use dar_domain::knowledge::{EntryLanguage, KnowledgeEntry};

pub fn entry(
	question: &str,
	answer: &str,
	category: &str,
	language: EntryLanguage,
	tags: &[&str],
	priority: i32,
) -> KnowledgeEntry {
	KnowledgeEntry {
		entry_id: KnowledgeEntry::derived_id(question),
		question: question.to_string(),
		answer: answer.to_string(),
		category: category.to_string(),
		language,
		tags: tags.iter().map(|tag| tag.to_string()).collect(),
		priority,
		active: true,
	}
}

/// A small bilingual real-estate knowledge base.
pub fn real_estate_entries() -> Vec<KnowledgeEntry> {
	vec![
		entry(
			"How do I schedule an appointment?",
			"Send us your preferred day and time and an agent will confirm the viewing within the hour.",
			"appointments",
			EntryLanguage::En,
			&["appointment", "viewing", "schedule"],
			10,
		),
		entry(
			"How do I add a new client?",
			"Open the Clients tab in the dashboard and press New Client.",
			"crm",
			EntryLanguage::En,
			&["client", "add"],
			5,
		),
		entry(
			"Do you have villas for rent?",
			"Yes. We list villas for rent in most districts. Tell us your budget and preferred area.",
			"listings",
			EntryLanguage::En,
			&["villa", "rent"],
			3,
		),
		entry(
			"What documents do I need to buy an apartment?",
			"You need a national ID or iqama, proof of income, and a bank pre-approval letter.",
			"buying",
			EntryLanguage::En,
			&["documents", "buy", "apartment"],
			2,
		),
		entry(
			"Where is your office located?",
			"Our office is on Olaya Street, open Sunday to Thursday from 9am to 6pm.",
			"company",
			EntryLanguage::Both,
			&["office", "location"],
			1,
		),
		entry(
			"هل لديكم شقق للإيجار؟",
			"نعم، لدينا شقق للإيجار في معظم الأحياء. أخبرنا بميزانيتك والحي المفضل.",
			"listings",
			EntryLanguage::Ar,
			&["شقق", "إيجار"],
			3,
		),
	]
}
