//! Runtime configuration for the harness.
//!
//! Holds the feature and results roots together with the strict formatter
//! policy. The policy decides whether a failing report sink degrades the run
//! (logged, execution continues) or fails the affected feature outright.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable controlling the default strict formatter policy.
pub const STRICT_FORMATTERS_ENV: &str = "BDD_HARNESS_STRICT_FORMATTERS";

const NO_OVERRIDE: u8 = 0;
const FORCE_LAX: u8 = 1;
const FORCE_STRICT: u8 = 2;

static STRICT_FORMATTERS_OVERRIDE: AtomicU8 = AtomicU8::new(NO_OVERRIDE);

fn parse_env_bool(value: &str) -> Option<bool> {
    let folded = value.trim().to_ascii_lowercase();
    match folded.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_strict_formatters() -> Option<bool> {
    std::env::var(STRICT_FORMATTERS_ENV)
        .ok()
        .as_deref()
        .and_then(parse_env_bool)
}

/// Determine whether report sink failures should fail the feature run.
///
/// A process-wide override set through [`set_strict_formatters`] wins;
/// otherwise the environment decides, defaulting to the lax policy.
#[must_use]
pub fn strict_formatters() -> bool {
    match STRICT_FORMATTERS_OVERRIDE.load(Ordering::Relaxed) {
        FORCE_LAX => false,
        FORCE_STRICT => true,
        _ => env_strict_formatters().unwrap_or(false),
    }
}

/// Override the strict formatter policy for the current process.
///
/// Tests may call [`clear_strict_formatters_override`] to restore
/// environment-driven behaviour after toggling the override.
pub fn set_strict_formatters(enabled: bool) {
    let state = if enabled { FORCE_STRICT } else { FORCE_LAX };
    STRICT_FORMATTERS_OVERRIDE.store(state, Ordering::Relaxed);
}

/// Remove any in-process override for the strict formatter policy.
pub fn clear_strict_formatters_override() {
    STRICT_FORMATTERS_OVERRIDE.store(NO_OVERRIDE, Ordering::Relaxed);
}

/// Harness configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory walked recursively for `.feature` documents.
    pub features_root: PathBuf,
    /// Directory receiving HTML and JUnit report files.
    pub results_root: PathBuf,
    /// Whether report sink failures fail the affected feature run.
    pub strict_formatters: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            features_root: PathBuf::from("features"),
            results_root: PathBuf::from("test-result/bdd"),
            strict_formatters: strict_formatters(),
        }
    }
}

impl Config {
    /// Configuration rooted at the given feature and results directories.
    #[must_use]
    pub fn new(features_root: impl Into<PathBuf>, results_root: impl Into<PathBuf>) -> Self {
        Self {
            features_root: features_root.into(),
            results_root: results_root.into(),
            strict_formatters: strict_formatters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn reset_override() {
        clear_strict_formatters_override();
    }

    #[test]
    #[serial]
    fn default_is_false() {
        reset_override();
        assert!(!strict_formatters());
    }

    #[test]
    #[serial]
    fn override_sets_flag() {
        reset_override();
        set_strict_formatters(true);
        assert!(strict_formatters());
        set_strict_formatters(false);
        assert!(!strict_formatters());
        reset_override();
    }

    #[test]
    fn parse_env_bool_understands_common_values() {
        for truthy in ["1", "true", "Yes", "ON"] {
            assert_eq!(parse_env_bool(truthy), Some(true), "expected {truthy} truthy");
        }
        for falsy in ["0", "false", "No", "OFF"] {
            assert_eq!(parse_env_bool(falsy), Some(false), "expected {falsy} falsy");
        }
        // Casing is folded, not enumerated.
        assert_eq!(parse_env_bool(" TrUe "), Some(true));
        assert_eq!(parse_env_bool("maybe"), None);
    }
}
