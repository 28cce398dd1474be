//! Feature file discovery and loading.
//!
//! The loader walks a root directory recursively, parses every `.feature`
//! document with the Gherkin parser, and returns features addressable by a
//! stable `/`-separated URI relative to the root. Nothing is cached: every
//! call re-reads the filesystem so results always reflect the current tree.

use std::path::{Path, PathBuf};

use gherkin::GherkinEnv;
use walkdir::{DirEntry, WalkDir};

use crate::error::HarnessError;

/// A parsed feature document addressed by a stable URI.
#[derive(Debug, Clone)]
pub struct Feature {
    uri: String,
    document: gherkin::Feature,
}

impl Feature {
    pub(crate) fn new(uri: String, document: gherkin::Feature) -> Self {
        Self { uri, document }
    }

    /// Stable `/`-separated path of the feature relative to the loader root.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The parsed Gherkin document.
    #[must_use]
    pub fn document(&self) -> &gherkin::Feature {
        &self.document
    }

    /// Feature name as written in the document header.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.document.name
    }
}

fn is_feature_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("feature"))
}

fn process_dir_entry(entry: DirEntry) -> Option<PathBuf> {
    if entry.file_type().is_dir() {
        return None;
    }
    let path = entry.into_path();
    is_feature_file(&path).then_some(path)
}

fn collect_feature_files(root: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let mut files = Vec::new();
    for next in WalkDir::new(root).follow_links(false) {
        match next {
            Ok(entry) => files.extend(process_dir_entry(entry)),
            Err(err) => {
                let err_str = err.to_string();
                return Err(HarnessError::Discovery {
                    path: root.to_path_buf(),
                    source: err
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other(err_str)),
                });
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Discovers and parses feature documents under a fixed root directory.
#[derive(Debug, Clone)]
pub struct FeatureLoader {
    root: PathBuf,
}

impl FeatureLoader {
    /// Loader rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover and parse every feature document under the root, in
    /// deterministic ascending path order.
    ///
    /// # Errors
    /// Surfaces walk failures (including an absent or unreadable root) and
    /// the parser's own errors; neither is recovered here.
    pub fn load_features(&self) -> Result<Vec<Feature>, HarnessError> {
        collect_feature_files(&self.root)?
            .into_iter()
            .map(|path| {
                let document = gherkin::Feature::parse_path(&path, GherkinEnv::default())?;
                Ok(Feature::new(self.uri_for(&path), document))
            })
            .collect()
    }

    /// Linear scan over a fresh load, matching by exact URI equality.
    ///
    /// # Errors
    /// Propagates the same failures as [`load_features`](Self::load_features).
    pub fn find_feature_by_uri(&self, uri: &str) -> Result<Option<Feature>, HarnessError> {
        Ok(self
            .load_features()?
            .into_iter()
            .find(|feature| feature.uri() == uri))
    }

    fn uri_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let segments: Vec<_> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        segments.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_extension_matches_case_insensitively() {
        assert!(is_feature_file(Path::new("a.feature")));
        assert!(is_feature_file(Path::new("a.FEATURE")));
        assert!(!is_feature_file(Path::new("a.feat")));
        assert!(!is_feature_file(Path::new("feature")));
    }

    #[test]
    fn uri_uses_forward_slashes() {
        let loader = FeatureLoader::new("features");
        let uri = loader.uri_for(Path::new("features").join("nested").join("b.feature").as_path());
        assert_eq!(uri, "nested/b.feature");
    }
}
