//! Registry of application sources known to the correlator.
//!
//! The correlator maps trace frames back onto source text through this
//! registry. Hosts supply an implementation keyed by module path; the
//! in-memory variant covers embedded sources and tests.

use std::collections::HashMap;

/// Borrowed view of one registered source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRef<'a> {
    path: &'a str,
    text: &'a str,
}

impl<'a> SourceRef<'a> {
    /// View over a source's relative path and full text.
    #[must_use]
    pub fn new(path: &'a str, text: &'a str) -> Self {
        Self { path, text }
    }

    /// Relative path of the source file.
    #[must_use]
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Full source text.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }
}

/// Sources queryable by module path.
pub trait SourceRegistry {
    /// Look up the source registered for a module path, if any.
    fn lookup(&self, module_path: &str) -> Option<SourceRef<'_>>;
}

/// Source registry backed by an owned map.
#[derive(Debug, Default)]
pub struct InMemorySources {
    entries: HashMap<String, (String, String)>,
}

impl InMemorySources {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source under a module path, replacing any previous entry.
    pub fn insert(
        &mut self,
        module_path: impl Into<String>,
        path: impl Into<String>,
        text: impl Into<String>,
    ) {
        self.entries
            .insert(module_path.into(), (path.into(), text.into()));
    }

    /// Register a source, returning the registry for chaining.
    #[must_use]
    pub fn with_source(
        mut self,
        module_path: impl Into<String>,
        path: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(module_path, path, text);
        self
    }
}

impl SourceRegistry for InMemorySources {
    fn lookup(&self, module_path: &str) -> Option<SourceRef<'_>> {
        self.entries
            .get(module_path)
            .map(|(path, text)| SourceRef::new(path, text))
    }
}
