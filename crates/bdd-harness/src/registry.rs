//! Step registration and lookup.
//!
//! Step definitions are submitted to a link-time inventory through the
//! [`step_def!`] macro and gathered into a [`StepRegistry`] at execution
//! time. The registry is rebuilt for every run so the lookup table always
//! reflects the currently linked set of definitions.
//!
//! [`step_def!`]: crate::step_def

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use inventory::iter;

use crate::context::StepContext;
use crate::failure::StepFailure;
use crate::keyword::StepKeyword;
use crate::pattern::{PatternError, StepPattern};

/// Type alias for the stored step function pointer.
///
/// The handler receives the execution context and the full matched step text.
pub type StepFn = fn(&mut StepContext<'_>, &str) -> Result<(), StepFailure>;

/// Represents a single step definition registered with the harness.
///
/// Each definition records its keyword, the pattern text used for matching,
/// the handler function pointer, and the source location where it was
/// defined.
#[derive(Debug)]
pub struct StepDef {
    /// The step keyword, e.g. `Given` or `When`.
    pub keyword: StepKeyword,
    /// Pattern text used to match a Gherkin step.
    pub pattern: &'static StepPattern,
    /// Function pointer executed when the step is invoked.
    pub run: StepFn,
    /// Source file where the step is defined.
    pub file: &'static str,
    /// Line number within the source file.
    pub line: u32,
}

inventory::collect!(StepDef);

/// Register a step definition with the global inventory.
///
/// The macro hides the underlying `inventory` call and captures the source
/// location automatically.
///
/// # Examples
///
/// ```
/// use bdd_harness::{step_def, StepContext, StepFailure, StepKeyword};
///
/// fn my_step(_ctx: &mut StepContext<'_>, _text: &str) -> Result<(), StepFailure> {
///     Ok(())
/// }
///
/// step_def!(StepKeyword::Given, "a registered step", my_step);
/// ```
#[macro_export]
macro_rules! step_def {
    ($keyword:expr, $pattern:expr, $handler:path $(,)?) => {
        const _: () = {
            static PATTERN: $crate::StepPattern = $crate::StepPattern::new($pattern);
            $crate::submit! {
                $crate::StepDef {
                    keyword: $keyword,
                    pattern: &PATTERN,
                    run: $handler,
                    file: file!(),
                    line: line!(),
                }
            }
        };
    };
}

/// Error raised when the registry cannot be built from the linked
/// definitions.
#[derive(Debug, thiserror::Error)]
#[error("invalid step pattern '{pattern}' at {file}:{line}: {source}")]
pub struct RegistryError {
    /// Pattern text that failed to compile.
    pub pattern: &'static str,
    /// Source file of the offending definition.
    pub file: &'static str,
    /// Line number of the offending definition.
    pub line: u32,
    /// Underlying compilation failure.
    #[source]
    pub source: PatternError,
}

/// Lookup table over the linked step definitions.
///
/// Built fresh for every execution; duplicate `(keyword, pattern)`
/// registrations collapse to a single entry.
pub struct StepRegistry {
    exact: HashMap<StepKeyword, HashMap<&'static str, &'static StepDef>>,
    defs: Vec<&'static StepDef>,
}

impl StepRegistry {
    /// Gather the linked step definitions into a fresh registry.
    ///
    /// # Errors
    /// Returns a [`RegistryError`] naming the offending definition when a
    /// pattern fails to compile.
    pub fn collect() -> Result<Self, RegistryError> {
        let mut exact: HashMap<StepKeyword, HashMap<&'static str, &'static StepDef>> =
            HashMap::new();
        let mut defs = Vec::new();
        for def in iter::<StepDef> {
            def.pattern.compile().map_err(|source| RegistryError {
                pattern: def.pattern.as_str(),
                file: def.file,
                line: def.line,
                source,
            })?;
            match exact
                .entry(def.keyword)
                .or_default()
                .entry(def.pattern.as_str())
            {
                Entry::Vacant(slot) => {
                    slot.insert(def);
                    defs.push(def);
                }
                Entry::Occupied(_) => {
                    log::debug!(
                        "ignoring duplicate step definition {} '{}' at {}:{}",
                        def.keyword,
                        def.pattern.as_str(),
                        def.file,
                        def.line
                    );
                }
            }
        }
        Ok(Self { exact, defs })
    }

    /// Find a definition whose pattern matches the provided step text.
    ///
    /// Exact pattern text wins outright; otherwise the matching placeholder
    /// pattern with the most literal text is chosen.
    #[must_use]
    pub fn find(&self, keyword: StepKeyword, text: &str) -> Option<&'static StepDef> {
        if let Some(def) = self
            .exact
            .get(&keyword)
            .and_then(|by_text| by_text.get(text).copied())
        {
            return Some(def);
        }
        self.defs
            .iter()
            .filter(|def| def.keyword == keyword && def.pattern.matches(text))
            .max_by_key(|def| def.pattern.specificity())
            .copied()
    }

    /// Number of distinct definitions in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the registry holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
