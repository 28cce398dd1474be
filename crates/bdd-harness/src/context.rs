//! Step execution context and fixture access.
//!
//! [`StepContext`] stores named references to host-provided fixtures. It is
//! the constructor contract between the host application and registered step
//! definitions: a definition that needs host state retrieves it by name and
//! type rather than the engine reflecting over the host.

use std::any::Any;
use std::collections::HashMap;

/// Context passed to step functions containing references to requested
/// fixtures.
///
/// # Examples
///
/// ```
/// use bdd_harness::StepContext;
///
/// let mut ctx = StepContext::default();
/// let value = 42;
/// ctx.insert("my_fixture", &value);
///
/// let retrieved: Option<&i32> = ctx.get("my_fixture");
/// assert_eq!(retrieved, Some(&42));
/// ```
#[derive(Default)]
pub struct StepContext<'a> {
    fixtures: HashMap<&'static str, &'a dyn Any>,
}

impl<'a> StepContext<'a> {
    /// Insert a fixture reference by name.
    pub fn insert<T: Any>(&mut self, name: &'static str, value: &'a T) {
        self.fixtures.insert(name, value);
    }

    /// Insert an already type-erased fixture reference by name.
    pub fn insert_any(&mut self, name: &'static str, value: &'a dyn Any) {
        self.fixtures.insert(name, value);
    }

    /// Retrieve a fixture reference by name and type.
    #[must_use]
    pub fn get<T: Any>(&self, name: &str) -> Option<&'a T> {
        self.fixtures.get(name)?.downcast_ref::<T>()
    }

    /// Names of the fixtures currently available.
    pub fn available_fixtures(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fixtures.keys().copied()
    }
}
