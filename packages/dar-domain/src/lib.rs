pub mod knowledge;
pub mod language;
pub mod similarity;
pub mod text;
