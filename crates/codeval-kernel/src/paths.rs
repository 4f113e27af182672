//! XDG Base Directory paths for codeval.
//!
//! | Purpose | XDG Variable | Default | codeval Path |
//! |---------|--------------|---------|--------------|
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` | `$XDG_CONFIG_HOME/codeval/config.toml` |
//!
//! codeval keeps no state between runs, so config is the only location.

use std::path::PathBuf;

use directories::BaseDirs;

/// Get the config directory.
///
/// Uses `$XDG_CONFIG_HOME/codeval` or falls back to `~/.config/codeval`.
pub fn config_dir() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_fallback().join(".config"))
        .join("codeval")
}

/// Path of the user config file.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Fallback home directory when BaseDirs fails.
fn home_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_is_under_codeval() {
        let file = config_file();
        assert!(file.starts_with(config_dir()));
        assert!(file.ends_with("codeval/config.toml"));
    }
}
