//! Step pattern handling and compilation.
//!
//! A [`StepPattern`] wraps a pattern literal and compiles lazily to an
//! anchored regular expression. Literal text matches verbatim; `{name}`
//! placeholders match any non-empty run of characters. Patterns with more
//! literal text rank as more specific when several match the same step.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Pattern text used to match a step at runtime.
#[derive(Debug)]
pub struct StepPattern {
    text: &'static str,
    regex: OnceLock<Regex>,
}

/// Error raised when a step pattern fails to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// Human-readable reason for the failure.
    pub message: String,
    /// Zero-based byte offset in the pattern where parsing failed.
    pub position: usize,
}

impl PatternError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.position)
    }
}

impl std::error::Error for PatternError {}

fn is_placeholder_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn build_regex_source(text: &str) -> Result<String, PatternError> {
    let mut source = String::from("^");
    let mut literal = String::new();
    let mut chars = text.char_indices();
    while let Some((position, ch)) = chars.next() {
        match ch {
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    name.push(inner);
                }
                if !closed {
                    return Err(PatternError::new("unterminated placeholder", position));
                }
                if name.is_empty() || !name.chars().all(is_placeholder_char) {
                    return Err(PatternError::new(
                        format!("invalid placeholder name '{name}'"),
                        position,
                    ));
                }
                source.push_str(&regex::escape(&literal));
                literal.clear();
                source.push_str("(.+)");
            }
            '}' => {
                return Err(PatternError::new("unmatched closing brace", position));
            }
            other => literal.push(other),
        }
    }
    source.push_str(&regex::escape(&literal));
    source.push('$');
    Ok(source)
}

impl StepPattern {
    /// Create a new pattern wrapper from a string literal.
    #[must_use]
    pub const fn new(value: &'static str) -> Self {
        Self {
            text: value,
            regex: OnceLock::new(),
        }
    }

    /// Access the underlying pattern string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.text
    }

    /// Compile the pattern into a regular expression, caching the result.
    ///
    /// This operation is idempotent; subsequent calls after a successful
    /// compilation are no-ops.
    ///
    /// # Errors
    /// Returns an error if the pattern contains invalid placeholder syntax or
    /// the generated regex fails to compile.
    pub fn compile(&self) -> Result<(), PatternError> {
        if self.regex.get().is_some() {
            return Ok(());
        }
        let source = build_regex_source(self.text)?;
        let regex =
            Regex::new(&source).map_err(|err| PatternError::new(err.to_string(), 0))?;
        let _ = self.regex.set(regex);
        Ok(())
    }

    /// Whether the supplied step text matches this pattern.
    ///
    /// Returns `false` when the pattern has not been compiled; the registry
    /// compiles every pattern before matching.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.get().is_some_and(|regex| regex.is_match(text))
    }

    /// Count of literal (non-placeholder) characters in the pattern.
    ///
    /// Used to rank patterns when several match the same step text: more
    /// literal text means a more specific pattern.
    #[must_use]
    pub fn specificity(&self) -> usize {
        let mut count = 0usize;
        let mut in_placeholder = false;
        for ch in self.text.chars() {
            match ch {
                '{' => in_placeholder = true,
                '}' => in_placeholder = false,
                _ if !in_placeholder => count += 1,
                _ => {}
            }
        }
        count
    }
}

impl From<&'static str> for StepPattern {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}
