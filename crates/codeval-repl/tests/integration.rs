//! Integration tests for the codeval REPL.
//!
//! These tests drive the REPL line by line and wait on its background job.

use codeval_kernel::{Language, LanguageSelection, ValidatorConfig};
use codeval_repl::{MSG_BUSY, MSG_VALIDATING, Repl};
use tokio::runtime::Runtime;

fn setup() -> (Runtime, Repl) {
    let runtime = Runtime::new().expect("runtime");
    let repl = Repl::new(runtime.handle().clone(), &ValidatorConfig::default());
    (runtime, repl)
}

/// Run lines through the REPL and collect outputs.
fn run_script(repl: &mut Repl, script: &str) -> Vec<String> {
    let mut outputs = Vec::new();
    for line in script.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match repl.process_line(trimmed) {
            Ok(Some(output)) => outputs.push(output),
            Ok(None) => {}
            Err(e) => outputs.push(format!("ERROR: {}", e)),
        }
    }
    outputs
}

fn python_available() -> bool {
    std::process::Command::new("python")
        .arg("--version")
        .output()
        .is_ok()
}

// ============================================================================
// Form fields
// ============================================================================

#[test]
fn picking_a_file_picks_its_language() {
    let (_rt, mut repl) = setup();
    let outputs = run_script(&mut repl, "/file src/Main.java");

    assert_eq!(repl.file(), "src/Main.java");
    assert_eq!(repl.language(), &LanguageSelection::Language(Language::Java));
    assert_eq!(outputs, vec!["File: src/Main.java\nLanguage: Java"]);
}

#[test]
fn unknown_extension_keeps_current_language() {
    let (_rt, mut repl) = setup();
    run_script(&mut repl, "/lang PHP\n/file notes.txt");

    assert_eq!(repl.file(), "notes.txt");
    assert_eq!(repl.language(), &LanguageSelection::Language(Language::Php));
}

#[test]
fn unknown_language_is_refused() {
    let (_rt, mut repl) = setup();
    let outputs = run_script(&mut repl, "/lang Ruby");

    assert!(outputs[0].starts_with("Unknown language: Ruby"));
    assert!(repl.language().is_auto());
}

#[test]
fn auto_detect_label_is_accepted() {
    let (_rt, mut repl) = setup();
    run_script(&mut repl, "/lang Java\n/lang Auto-detect");
    assert!(repl.language().is_auto());
}

#[test]
fn languages_lists_filter() {
    let (_rt, mut repl) = setup();
    let outputs = run_script(&mut repl, "/languages");
    assert!(outputs[0].contains("JavaScript"));
    assert!(outputs[0].contains("*.java;*.py;*.php;*.js"));
}

#[test]
fn status_reports_idle_job() {
    let (_rt, mut repl) = setup();
    let outputs = run_script(&mut repl, "/status");
    assert_eq!(outputs[0], "File: (none)\nLanguage: auto\nJob: idle");
}

#[test]
fn unknown_command_points_at_help() {
    let (_rt, mut repl) = setup();
    let outputs = run_script(&mut repl, "/frobnicate");
    assert!(outputs[0].contains("Unknown command: /frobnicate"));
}

#[test]
fn quit_sets_flag() {
    let (_rt, mut repl) = setup();
    assert!(!repl.should_quit());
    run_script(&mut repl, "/quit");
    assert!(repl.should_quit());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn validate_without_file_asks_for_one() {
    let (_rt, mut repl) = setup();
    let outputs = run_script(&mut repl, "/validate");
    assert_eq!(outputs, vec![MSG_VALIDATING]);

    let result = repl.wait().expect("outcome");
    assert!(result.starts_with("✗ system-error"));
    assert!(result.ends_with("Please select a file to validate."));
}

#[test]
fn bare_path_is_picked_and_validated() {
    let (_rt, mut repl) = setup();
    let outputs = run_script(&mut repl, "missing.py");
    assert_eq!(outputs, vec!["File: missing.py\nLanguage: Python\nValidating..."]);

    let result = repl.wait().expect("outcome");
    assert!(result.ends_with("File does not exist: missing.py"));
}

#[test]
fn mismatched_language_is_reported() {
    let (_rt, mut repl) = setup();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("hello.py");
    std::fs::write(&path, "print('hi')\n").expect("write");

    run_script(&mut repl, &format!("/file {}\n/lang Java\n/validate", path.display()));
    let result = repl.wait().expect("outcome");
    assert!(result.starts_with("✗ selection-error"));
    assert!(result.ends_with("Selected language doesn't match the file extension."));
}

#[test]
fn wait_with_nothing_running() {
    let (_rt, mut repl) = setup();
    let outputs = run_script(&mut repl, "/wait");
    assert_eq!(outputs, vec!["No validation in progress."]);
}

#[test]
fn finished_outcomes_are_drained_once() {
    let (_rt, mut repl) = setup();
    run_script(&mut repl, "/validate");

    // Wait for delivery without consuming it.
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    let mut drained = Vec::new();
    while drained.is_empty() && std::time::Instant::now() < deadline {
        drained = repl.drain_outcomes();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(drained.len(), 1);
    assert!(repl.drain_outcomes().is_empty());
}

#[test]
fn second_validate_while_running_is_refused() {
    if !python_available() {
        eprintln!("skipping: python not on PATH");
        return;
    }
    let (_rt, mut repl) = setup();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("slow.py");
    std::fs::write(&path, "import time\ntime.sleep(1)\nprint('slow done')\n").expect("write");

    let outputs = run_script(&mut repl, &format!("/file {}\n/validate\n/validate", path.display()));
    assert_eq!(outputs[1], MSG_VALIDATING);
    assert_eq!(outputs[2], MSG_BUSY);

    let result = repl.wait().expect("outcome");
    assert!(result.starts_with("✓ runtime-output"), "{result}");
    assert!(result.contains("slow done"));
}
