//! Language validators: check the file with its toolchain, then run it.
//!
//! Each validator walks two states:
//!
//! ```text
//! Checking ──clean──▶ Running ──▶ RuntimeOutput
//!    │
//!    └──errors──▶ CompileError (terminal)
//! ```
//!
//! The variant set is closed. A validator is a small value pointing into the
//! toolchain table, built fresh for every request.

mod select;
mod toolchain;

use std::fmt;

pub use select::select;
pub use toolchain::CheckRule;

use crate::language::{Language, dotted_extension};
use crate::outcome::ValidationOutcome;
use crate::runner::{CommandRunner, CommandSpec, RunError};
use toolchain::{Toolchain, toolchain_for};

/// The check-then-run strategy for one language.
#[derive(Clone, Copy)]
pub struct LanguageValidator {
    toolchain: &'static Toolchain,
}

impl LanguageValidator {
    pub fn new(language: Language) -> Self {
        Self {
            toolchain: toolchain_for(language),
        }
    }

    pub fn language(&self) -> Language {
        self.toolchain.language
    }

    /// Whether `path` carries this language's extension (case-sensitive).
    pub fn is_compatible(&self, path: &str) -> bool {
        dotted_extension(path).as_deref() == Some(self.language().extension())
    }

    /// The syntax/compile-only invocation.
    pub fn check_command(&self, path: &str) -> CommandSpec {
        (self.toolchain.check)(path)
    }

    /// The invocation that executes the file.
    pub fn run_command(&self, path: &str) -> CommandSpec {
        (self.toolchain.run)(path)
    }

    pub fn check_rule(&self) -> CheckRule {
        self.toolchain.check_rule
    }

    /// Check `path`, and run it if the check is clean.
    ///
    /// Tool diagnostics and program output are returned as outcome text.
    /// Only a tool that cannot be started, read, or finished in time is an
    /// error.
    pub async fn validate(
        &self,
        path: &str,
        runner: &CommandRunner,
    ) -> Result<ValidationOutcome, RunError> {
        let language = self.language();

        tracing::debug!(%language, path, "checking");
        let checked = runner.run(&self.check_command(path)).await?;
        if self.check_rule().is_failure(&checked.text) {
            tracing::debug!(%language, path, "check reported errors");
            return Ok(ValidationOutcome::compile_error(
                self.toolchain.failure_heading,
                &checked.text,
            ));
        }

        tracing::debug!(%language, path, "running");
        let ran = runner.run(&self.run_command(path)).await?;
        Ok(ValidationOutcome::runtime_output(&ran.text))
    }
}

impl PartialEq for LanguageValidator {
    fn eq(&self, other: &Self) -> bool {
        self.language() == other.language()
    }
}

impl Eq for LanguageValidator {}

impl fmt::Debug for LanguageValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageValidator")
            .field("language", &self.language())
            .field("check_rule", &self.check_rule())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Language::Java, "src/Hello.java", true)]
    #[case(Language::Java, "Hello.JAVA", false)]
    #[case(Language::Java, "hello.py", false)]
    #[case(Language::Python, "hello.py", true)]
    #[case(Language::Python, "hello.pyc", false)]
    #[case(Language::Php, "index.php", true)]
    #[case(Language::JavaScript, "app.js", true)]
    #[case(Language::JavaScript, "app.mjs", false)]
    #[case(Language::JavaScript, "js", false)]
    fn compatibility(#[case] lang: Language, #[case] path: &str, #[case] expected: bool) {
        assert_eq!(LanguageValidator::new(lang).is_compatible(path), expected);
    }

    #[test]
    fn validators_compare_by_language() {
        assert_eq!(
            LanguageValidator::new(Language::Php),
            LanguageValidator::new(Language::Php)
        );
        assert_ne!(
            LanguageValidator::new(Language::Php),
            LanguageValidator::new(Language::Python)
        );
    }
}
