//! codeval REPL — interactive front end for the validation kernel.
//!
//! The REPL plays the part of a small form: a file field, a language
//! picker, a validate button, and a result area. Validation runs on the
//! kernel's background job; finished outcomes are printed before the next
//! prompt, or right away with `/wait`.
//!
//! - `/file <path>` picks a file (and its language, when recognized)
//! - `/lang <tag>` picks a language, `/languages` lists them
//! - `/validate` submits, `/wait` blocks for the result
//! - `/status`, `/help`, `/quit`

pub mod cli;

use std::io::IsTerminal;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::Handle;

use codeval_kernel::language::{AUTO_DETECT_LABEL, AUTO_TAG, supported_file_filter};
use codeval_kernel::{
    Language, LanguageSelection, OutcomeReceiver, OutcomeStatus, ValidationJob, ValidationOutcome,
    ValidatorConfig,
};

/// Shown while a submitted job is running.
pub const MSG_VALIDATING: &str = "Validating...";

/// Shown when a submission is rejected by the single-flight rule.
pub const MSG_BUSY: &str = "Validation already in progress. Please wait.";

/// REPL state: the form fields plus the kernel job.
pub struct Repl {
    job: ValidationJob,
    outcomes: OutcomeReceiver,
    file: String,
    language: LanguageSelection,
    color: bool,
    quit: bool,
}

impl Repl {
    /// Create a REPL whose jobs run on `handle`.
    pub fn new(handle: Handle, config: &ValidatorConfig) -> Self {
        let (job, outcomes) = ValidationJob::with_handle(handle, config);
        Self {
            job,
            outcomes,
            file: String::new(),
            language: LanguageSelection::Auto,
            color: false,
            quit: false,
        }
    }

    /// Enable or disable colored status lines.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn language(&self) -> &LanguageSelection {
        &self.language
    }

    /// True once `/quit` has been entered.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Process a single line of input.
    ///
    /// A line that is not a meta-command is taken as a file path: it is
    /// selected and validated in one step.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Ok(None);
        }

        if trimmed.starts_with('/') {
            return self.handle_meta_command(trimmed);
        }

        let mut output = self.select_file(trimmed);
        output.push('\n');
        output.push_str(&self.validate());
        Ok(Some(output))
    }

    /// Format every outcome delivered since the last call.
    pub fn drain_outcomes(&mut self) -> Vec<String> {
        let mut ready = Vec::new();
        while let Some(outcome) = self.outcomes.try_recv() {
            ready.push(format_outcome(&outcome, self.color));
        }
        ready
    }

    /// Block until the running job delivers, if one is running.
    ///
    /// Must be called from outside the tokio runtime.
    pub fn wait(&mut self) -> Option<String> {
        // Delivery precedes the busy flag clearing, so a job that is not busy
        // has already put its outcome in the channel.
        let outcome = if self.job.is_busy() {
            self.outcomes.blocking_recv()
        } else {
            self.outcomes.try_recv()
        };
        outcome.map(|o| format_outcome(&o, self.color))
    }

    fn handle_meta_command(&mut self, cmd: &str) -> Result<Option<String>> {
        let (command, rest) = match cmd.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (cmd, ""),
        };

        match command {
            "/quit" | "/q" | "/exit" => {
                self.quit = true;
                Ok(None)
            }
            "/help" | "/h" | "/?" => Ok(Some(HELP_TEXT.to_string())),
            "/file" | "/f" => {
                if rest.is_empty() {
                    return Ok(Some(format!("File: {}", display_file(&self.file))));
                }
                Ok(Some(self.select_file(rest)))
            }
            "/lang" | "/l" => {
                if rest.is_empty() {
                    return Ok(Some(format!("Language: {}", self.language)));
                }
                Ok(Some(self.select_language(rest)))
            }
            "/languages" => Ok(Some(languages_text())),
            "/validate" | "/v" => Ok(Some(self.validate())),
            "/wait" | "/w" => Ok(Some(
                self.wait()
                    .unwrap_or_else(|| "No validation in progress.".to_string()),
            )),
            "/status" => Ok(Some(self.status_text())),
            _ => Ok(Some(format!(
                "Unknown command: {}\nType /help for available commands.",
                command
            ))),
        }
    }

    /// Pick a file; a recognized extension also picks its language.
    fn select_file(&mut self, path: &str) -> String {
        self.file = path.to_string();
        if let Some(language) = Language::detect(path) {
            self.language = LanguageSelection::Language(language);
        }
        format!("File: {}\nLanguage: {}", self.file, self.language)
    }

    fn select_language(&mut self, tag: &str) -> String {
        match LanguageSelection::parse(tag) {
            LanguageSelection::Unrecognized(tag) => {
                format!("Unknown language: {tag}\nType /languages to list them.")
            }
            selection => {
                self.language = selection;
                format!("Language: {}", self.language)
            }
        }
    }

    fn validate(&mut self) -> String {
        let tag = self.language.to_string();
        if self.job.submit(&self.file, &tag) {
            MSG_VALIDATING.to_string()
        } else {
            MSG_BUSY.to_string()
        }
    }

    fn status_text(&self) -> String {
        format!(
            "File: {}\nLanguage: {}\nJob: {}",
            display_file(&self.file),
            self.language,
            if self.job.is_busy() { "running" } else { "idle" }
        )
    }
}

fn display_file(file: &str) -> &str {
    if file.is_empty() { "(none)" } else { file }
}

fn languages_text() -> String {
    let mut text = format!("  {AUTO_TAG:<12}detect from extension (alias: {AUTO_DETECT_LABEL})\n");
    for language in Language::ALL {
        text.push_str(&format!("  {:<12}{}\n", language.tag(), language.extension()));
    }
    text.push_str(&format!("Code files: {}", supported_file_filter()));
    text
}

/// Format an outcome for the result area: a status line, then the text.
pub fn format_outcome(outcome: &ValidationOutcome, color: bool) -> String {
    let mark = if outcome.status.is_success() { "✓" } else { "✗" };
    let header = format!("{} {}", mark, outcome.status);
    let header = if !color {
        header
    } else {
        match outcome.status {
            OutcomeStatus::Success | OutcomeStatus::RuntimeOutput => header.green().to_string(),
            OutcomeStatus::CompileError => header.red().to_string(),
            OutcomeStatus::SelectionError | OutcomeStatus::SystemError => {
                header.yellow().to_string()
            }
        }
    };
    format!("{}\n{}", header, outcome.message.trim_end())
}

const HELP_TEXT: &str = r#"codeval — check a source file, then run it

Commands:
  /file <path>, /f   Pick the file to validate (auto-picks its language)
  /lang <tag>, /l    Pick the language: auto, Java, Python, PHP, JavaScript
  /languages         List languages and extensions
  /validate, /v      Validate the picked file in the background
  /wait, /w          Wait for the running validation and show its result
  /status            Show the picked file, language, and job state
  /help, /h, /?      Show this help
  /quit, /q, /exit   Exit

Any other line is taken as a file path and validated right away.
Results of background validations are shown before the next prompt.
"#;

/// Run the interactive REPL. Jobs run on `handle`; this thread reads input.
pub fn run(handle: Handle, config: &ValidatorConfig) -> Result<()> {
    println!("codeval v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.\n");

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let mut repl = Repl::new(handle, config);
    repl.set_color(std::io::stdout().is_terminal());

    loop {
        for ready in repl.drain_outcomes() {
            println!("{}", ready);
        }

        match rl.readline("codeval> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match repl.process_line(&line) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {}", e),
                }
                if repl.should_quit() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    Ok(())
}
