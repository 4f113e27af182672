//! Validator selection from a language tag or a file extension.

use super::LanguageValidator;
use crate::language::{Language, LanguageSelection};

/// Pick the validator for a request.
///
/// `Auto` looks only at the extension; an explicit language wins over the
/// extension, so callers must still check `is_compatible` to catch e.g.
/// Java selected for a `.py` file.
pub fn select(selection: &LanguageSelection, path: &str) -> Option<LanguageValidator> {
    let language = match selection {
        LanguageSelection::Auto => Language::detect(path)?,
        LanguageSelection::Language(language) => *language,
        LanguageSelection::Unrecognized(_) => return None,
    };
    Some(LanguageValidator::new(language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("auto", "x.py", Some(Language::Python))]
    #[case("auto", "x.java", Some(Language::Java))]
    #[case("auto", "x.php", Some(Language::Php))]
    #[case("auto", "x.js", Some(Language::JavaScript))]
    #[case("auto", "x.xyz", None)]
    #[case("auto", "README", None)]
    #[case("Auto-detect", "x.js", Some(Language::JavaScript))]
    #[case("Java", "x.py", Some(Language::Java))]
    #[case("JavaScript", "x.txt", Some(Language::JavaScript))]
    #[case("Cobol", "x.py", None)]
    fn selects(#[case] tag: &str, #[case] path: &str, #[case] expected: Option<Language>) {
        let selected = select(&LanguageSelection::parse(tag), path);
        assert_eq!(selected.map(|v| v.language()), expected);
    }

    #[test]
    fn explicit_tag_can_mismatch_extension() {
        let validator = select(&LanguageSelection::parse("Java"), "x.py").expect("java");
        assert!(!validator.is_compatible("x.py"));
    }

    #[test]
    fn selection_is_idempotent() {
        let selection = LanguageSelection::parse("auto");
        let first = select(&selection, "lib/tool.php").expect("php");
        let second = select(&selection, "lib/tool.php").expect("php");

        assert_eq!(first, second);
        assert_eq!(first.is_compatible("a.php"), second.is_compatible("a.php"));
        assert_eq!(
            first.check_command("lib/tool.php"),
            second.check_command("lib/tool.php")
        );
        assert_eq!(
            first.run_command("lib/tool.php"),
            second.run_command("lib/tool.php")
        );
    }
}
