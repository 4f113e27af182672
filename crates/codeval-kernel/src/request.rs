//! ValidationRequest — one submitted (path, language) pair.

use crate::language::LanguageSelection;

/// A request as submitted by the front end. Owned by the job that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    file_path: String,
    language: LanguageSelection,
}

impl ValidationRequest {
    pub fn new(file_path: impl Into<String>, language: impl Into<LanguageSelection>) -> Self {
        Self {
            file_path: file_path.into(),
            language: language.into(),
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn language(&self) -> &LanguageSelection {
        &self.language
    }
}
