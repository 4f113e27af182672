//! codeval-kernel: the core of codeval.
//!
//! This crate provides:
//!
//! - **Runner**: spawns a toolchain program and captures merged stdout/stderr
//! - **Validators**: the per-language "check, then run" protocols
//! - **Selector**: picks a validator from a language tag or file extension
//! - **Job**: single-flight background execution with one delivered outcome
//!
//! ```text
//! front end ──submit(path, tag)──▶ ValidationJob ──select──▶ LanguageValidator
//!     ▲                                 │                          │
//!     └──── OutcomeReceiver ◀───────────┘◀──── CommandRunner ◀─────┘
//! ```

pub mod config;
pub mod escape;
pub mod job;
pub mod language;
pub mod outcome;
pub mod paths;
pub mod request;
pub mod runner;
pub mod validator;

pub use config::{ConfigError, ValidatorConfig};
pub use escape::quote_path;
pub use job::{JobError, OutcomeReceiver, ValidationJob};
pub use language::{Language, LanguageSelection};
pub use outcome::{OutcomeStatus, ValidationOutcome};
pub use request::ValidationRequest;
pub use runner::{CapturedOutput, CommandRunner, CommandSpec, RunError};
pub use validator::{LanguageValidator, select};
