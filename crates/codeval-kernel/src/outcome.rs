//! ValidationOutcome — the single terminal result of a validation job.
//!
//! Every accepted submission produces exactly one outcome. The message is
//! raw text meant for a human: tool diagnostics and program output are
//! embedded verbatim.

use std::fmt;

/// Message shown when no file path was given.
pub const MSG_NO_FILE: &str = "Please select a file to validate.";

/// Message shown when neither the tag nor the extension picks a validator.
pub const MSG_UNSUPPORTED: &str = "Unsupported file type or language selection.";

/// Message shown when an explicit language disagrees with the file extension.
pub const MSG_MISMATCH: &str = "Selected language doesn't match the file extension.";

/// Message shown when the work task died without producing a result.
pub const MSG_UNKNOWN_FAILURE: &str = "Unknown error occurred during validation.";

/// Banner that starts every successful check-and-run message.
pub const SUCCESS_BANNER: &str = "Compilation successful.\nExecution output:\n";

/// How a validation job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    /// Reserved: finished with nothing to report beyond success.
    Success,
    /// The check phase reported errors; nothing was run.
    CompileError,
    /// The check passed and the program ran; its output is in the message.
    RuntimeOutput,
    /// No validator fits the language tag and file.
    SelectionError,
    /// Bad input, a tool that could not be started, or an internal failure.
    SystemError,
}

impl OutcomeStatus {
    /// True for statuses that mean the file checked out.
    pub fn is_success(self) -> bool {
        matches!(self, OutcomeStatus::Success | OutcomeStatus::RuntimeOutput)
    }

    /// Short lowercase label for status lines.
    pub fn label(self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::CompileError => "compile-error",
            OutcomeStatus::RuntimeOutput => "runtime-output",
            OutcomeStatus::SelectionError => "selection-error",
            OutcomeStatus::SystemError => "system-error",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The result delivered to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub status: OutcomeStatus,
    pub message: String,
}

impl ValidationOutcome {
    pub fn new(status: OutcomeStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Check phase failed. `heading` is e.g. "Compilation errors" or "Syntax errors".
    pub fn compile_error(heading: &str, tool_output: &str) -> Self {
        Self::new(
            OutcomeStatus::CompileError,
            format!("{heading}:\n{tool_output}"),
        )
    }

    /// Check passed and the program ran.
    pub fn runtime_output(program_output: &str) -> Self {
        Self::new(
            OutcomeStatus::RuntimeOutput,
            format!("{SUCCESS_BANNER}{program_output}"),
        )
    }

    pub fn selection_error(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::SelectionError, message)
    }

    pub fn system_error(message: impl Into<String>) -> Self {
        Self::new(OutcomeStatus::SystemError, message)
    }

    pub fn no_file() -> Self {
        Self::system_error(MSG_NO_FILE)
    }

    pub fn file_missing(path: &str) -> Self {
        Self::system_error(format!("File does not exist: {path}"))
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
