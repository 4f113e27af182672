//! Per-language toolchain table: check command, run command, check verdict.
//!
//! Program names and flags are fixed contracts with the installed tools.

use std::path::Path;

use crate::language::Language;
use crate::runner::CommandSpec;

/// How to read the check phase's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckRule {
    /// Any output at all means the check failed.
    AnyOutput,
    /// Output containing this marker means the check failed. Other output
    /// is not fatal.
    Contains(&'static str),
    /// Output lacking this marker means the check failed.
    Lacks(&'static str),
}

impl CheckRule {
    /// True when `output` should stop the job before the run phase.
    pub fn is_failure(self, output: &str) -> bool {
        match self {
            CheckRule::AnyOutput => !output.is_empty(),
            CheckRule::Contains(marker) => output.contains(marker),
            CheckRule::Lacks(marker) => !output.contains(marker),
        }
    }
}

/// Static description of one language's tools.
pub(crate) struct Toolchain {
    pub language: Language,
    pub check: fn(&str) -> CommandSpec,
    pub run: fn(&str) -> CommandSpec,
    pub check_rule: CheckRule,
    /// First line of a check-failure message.
    pub failure_heading: &'static str,
}

pub(crate) static TOOLCHAINS: [Toolchain; 4] = [
    Toolchain {
        language: Language::Java,
        check: java_check,
        run: java_run,
        check_rule: CheckRule::AnyOutput,
        failure_heading: "Compilation errors",
    },
    Toolchain {
        language: Language::Python,
        check: python_check,
        run: python_run,
        check_rule: CheckRule::Contains("SyntaxError"),
        failure_heading: "Syntax errors",
    },
    Toolchain {
        language: Language::Php,
        check: php_check,
        run: php_run,
        check_rule: CheckRule::Lacks("No syntax errors"),
        failure_heading: "Syntax errors",
    },
    Toolchain {
        language: Language::JavaScript,
        check: node_check,
        run: node_run,
        check_rule: CheckRule::AnyOutput,
        failure_heading: "Syntax errors",
    },
];

pub(crate) fn toolchain_for(language: Language) -> &'static Toolchain {
    match language {
        Language::Java => &TOOLCHAINS[0],
        Language::Python => &TOOLCHAINS[1],
        Language::Php => &TOOLCHAINS[2],
        Language::JavaScript => &TOOLCHAINS[3],
    }
}

fn java_check(path: &str) -> CommandSpec {
    CommandSpec::new("javac").path_arg(path)
}

/// `java` runs by class name from the source file's directory.
fn java_run(path: &str) -> CommandSpec {
    let path = Path::new(path);
    let class_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    CommandSpec::new("java").arg(class_name).current_dir(dir)
}

fn python_check(path: &str) -> CommandSpec {
    CommandSpec::new("python")
        .arg("-m")
        .arg("py_compile")
        .path_arg(path)
}

fn python_run(path: &str) -> CommandSpec {
    CommandSpec::new("python").path_arg(path)
}

fn php_check(path: &str) -> CommandSpec {
    CommandSpec::new("php").arg("-l").path_arg(path)
}

fn php_run(path: &str) -> CommandSpec {
    CommandSpec::new("php").path_arg(path)
}

fn node_check(path: &str) -> CommandSpec {
    CommandSpec::new("node").arg("--check").path_arg(path)
}

fn node_run(path: &str) -> CommandSpec {
    CommandSpec::new("node").path_arg(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn table_is_indexed_by_language() {
        for lang in Language::ALL {
            assert_eq!(toolchain_for(lang).language, lang);
        }
    }

    #[rstest]
    #[case(CheckRule::AnyOutput, "", false)]
    #[case(CheckRule::AnyOutput, "Hello.java:1: error", true)]
    #[case(CheckRule::Contains("SyntaxError"), "", false)]
    #[case(CheckRule::Contains("SyntaxError"), "DeprecationWarning: x", false)]
    #[case(CheckRule::Contains("SyntaxError"), "SyntaxError: invalid syntax", true)]
    #[case(CheckRule::Lacks("No syntax errors"), "No syntax errors detected in a.php\n", false)]
    #[case(CheckRule::Lacks("No syntax errors"), "PHP Parse error: unexpected", true)]
    #[case(CheckRule::Lacks("No syntax errors"), "", true)]
    fn check_rules(#[case] rule: CheckRule, #[case] output: &str, #[case] fails: bool) {
        assert_eq!(rule.is_failure(output), fails);
    }

    #[test]
    fn java_runs_class_from_parent_dir() {
        let spec = java_run("/work/src/Hello.java");
        assert_eq!(spec.program(), "java");
        assert_eq!(spec.argv(), vec!["Hello"]);
        assert_eq!(spec.working_dir(), Some(Path::new("/work/src")));
    }

    #[test]
    fn java_bare_file_runs_from_current_dir() {
        let spec = java_run("Hello.java");
        assert_eq!(spec.working_dir(), Some(Path::new(".")));
        assert_eq!(spec.display(), r#"cd "." && java Hello"#);
    }

    #[rstest]
    #[case(Language::Java, "javac \"a.java\"")]
    #[case(Language::Python, "python -m py_compile \"a.java\"")]
    #[case(Language::Php, "php -l \"a.java\"")]
    #[case(Language::JavaScript, "node --check \"a.java\"")]
    fn check_commands(#[case] lang: Language, #[case] expected: &str) {
        assert_eq!((toolchain_for(lang).check)("a.java").display(), expected);
    }

    #[rstest]
    #[case(Language::Python, "python \"s.py\"")]
    #[case(Language::Php, "php \"s.py\"")]
    #[case(Language::JavaScript, "node \"s.py\"")]
    fn run_commands(#[case] lang: Language, #[case] expected: &str) {
        assert_eq!((toolchain_for(lang).run)("s.py").display(), expected);
    }
}
