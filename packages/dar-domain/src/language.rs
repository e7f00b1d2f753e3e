use serde::{Deserialize, Serialize};
use unicode_script::{Script, UnicodeScript};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
	#[serde(rename = "en")]
	English,
	#[serde(rename = "ar")]
	Arabic,
}
impl Language {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::English => "en",
			Self::Arabic => "ar",
		}
	}
}

#[derive(Debug, Default)]
struct ScriptCounts {
	arabic: usize,
	latin: usize,
}

/// Detects whether a message is Arabic or English.
///
/// Single-script text is decided by script alone. Code-switched text defers to `whatlang`, and
/// falls back to the dominant letter script when the detector has no answer. Text without letters
/// is English.
pub fn detect_language(input: &str) -> Language {
	let counts = count_scripts(input);

	match (counts.arabic, counts.latin) {
		(0, _) => Language::English,
		(_, 0) => Language::Arabic,
		(arabic, latin) => match whatlang::detect(input) {
			Some(info) if info.lang() == whatlang::Lang::Ara => Language::Arabic,
			Some(info) if info.script() == whatlang::Script::Arabic => Language::Arabic,
			Some(info) if info.script() == whatlang::Script::Latin => Language::English,
			_ if arabic >= latin => Language::Arabic,
			_ => Language::English,
		},
	}
}

fn count_scripts(input: &str) -> ScriptCounts {
	let mut counts = ScriptCounts::default();

	for ch in input.chars() {
		if !ch.is_alphabetic() {
			continue;
		}

		match ch.script() {
			Script::Arabic => counts.arabic += 1,
			Script::Latin => counts.latin += 1,
			_ => {},
		}
	}

	counts
}
