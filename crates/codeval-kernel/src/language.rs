//! Supported languages and the user's language selection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Tag that asks the selector to infer the language from the file extension.
pub const AUTO_TAG: &str = "auto";

/// Picker label for automatic detection, accepted as an alias of `auto`.
pub const AUTO_DETECT_LABEL: &str = "Auto-detect";

/// The closed set of languages codeval knows how to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Java,
    Python,
    Php,
    JavaScript,
}

impl Language {
    /// Every supported language, in picker order.
    pub const ALL: [Language; 4] = [
        Language::Java,
        Language::Python,
        Language::Php,
        Language::JavaScript,
    ];

    /// The tag a user types to select this language.
    pub fn tag(self) -> &'static str {
        match self {
            Language::Java => "Java",
            Language::Python => "Python",
            Language::Php => "PHP",
            Language::JavaScript => "JavaScript",
        }
    }

    /// File extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Java => ".java",
            Language::Python => ".py",
            Language::Php => ".php",
            Language::JavaScript => ".js",
        }
    }

    /// Look up a language by its exact tag.
    pub fn from_tag(tag: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|l| l.tag() == tag)
    }

    /// Look up a language by extension (with leading dot, case-sensitive).
    pub fn from_extension(ext: &str) -> Option<Language> {
        Language::ALL.into_iter().find(|l| l.extension() == ext)
    }

    /// Infer the language of a path from its extension.
    pub fn detect(path: &str) -> Option<Language> {
        dotted_extension(path).and_then(|ext| Language::from_extension(&ext))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_tag(s).ok_or_else(|| format!("unknown language: {s}"))
    }
}

/// What the user picked in the language selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LanguageSelection {
    /// Infer from the file extension.
    #[default]
    Auto,
    /// Use this language regardless of the extension.
    Language(Language),
    /// A tag that names no supported language.
    Unrecognized(String),
}

impl LanguageSelection {
    /// Parse a selector tag. Never fails; unknown tags are kept for reporting.
    pub fn parse(tag: &str) -> Self {
        if tag == AUTO_TAG || tag == AUTO_DETECT_LABEL {
            return LanguageSelection::Auto;
        }
        match Language::from_tag(tag) {
            Some(lang) => LanguageSelection::Language(lang),
            None => LanguageSelection::Unrecognized(tag.to_string()),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, LanguageSelection::Auto)
    }
}

impl From<&str> for LanguageSelection {
    fn from(tag: &str) -> Self {
        LanguageSelection::parse(tag)
    }
}

impl fmt::Display for LanguageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageSelection::Auto => f.write_str(AUTO_TAG),
            LanguageSelection::Language(lang) => write!(f, "{lang}"),
            LanguageSelection::Unrecognized(tag) => f.write_str(tag),
        }
    }
}

/// The path's extension with its leading dot, e.g. `".py"`.
///
/// Follows `Path::extension`: dotfiles like `.bashrc` have no extension.
pub fn dotted_extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// Open-dialog style filter covering every supported extension,
/// e.g. `*.java;*.py;*.php;*.js`.
pub fn supported_file_filter() -> String {
    Language::ALL
        .iter()
        .map(|l| format!("*{}", l.extension()))
        .collect::<Vec<_>>()
        .join(";")
}
