//! Step failure values and panic payload formatting.
//!
//! A [`StepFailure`] carries the message a failing step reported together
//! with the trace frames it recorded. Frames name a module path and line so
//! the correlator can map a failure back onto known application sources.

use std::any::Any;

/// One frame of the trace recorded by a failing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    /// Module path of the code that recorded the frame.
    pub module_path: String,
    /// 1-based line number within the module's source file.
    pub line: u32,
}

/// A failure raised by a step handler.
///
/// Handlers usually construct one through the [`step_failure!`] macro, which
/// records the call site as the first trace frame.
///
/// [`step_failure!`]: crate::step_failure
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct StepFailure {
    message: String,
    frames: Vec<TraceFrame>,
}

impl StepFailure {
    /// Construct a failure with no trace frames.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frames: Vec::new(),
        }
    }

    /// Append a trace frame, returning the failure for chaining.
    #[must_use]
    pub fn with_frame(mut self, module_path: impl Into<String>, line: u32) -> Self {
        self.frames.push(TraceFrame {
            module_path: module_path.into(),
            line,
        });
        self
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Recorded trace frames, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }
}

/// Construct a [`StepFailure`] from a format string, recording the call site
/// as the first trace frame.
///
/// # Examples
///
/// ```
/// use bdd_harness::step_failure;
///
/// let failure = step_failure!("expected {} items", 3);
/// assert_eq!(failure.message(), "expected 3 items");
/// assert_eq!(failure.frames().len(), 1);
/// ```
#[macro_export]
macro_rules! step_failure {
    ($($arg:tt)*) => {
        $crate::StepFailure::new(format!($($arg)*))
            .with_frame(module_path!(), line!())
    };
}

/// Formats a panic payload into a readable message.
///
/// String payloads are extracted directly; all other types are rendered with
/// their [`Debug`](core::fmt::Debug) implementation.
///
/// # Examples
///
/// ```
/// use bdd_harness::panic_message;
/// use std::any::Any;
///
/// let payload: Box<dyn Any + Send> = Box::new("boom");
/// assert_eq!(panic_message(payload.as_ref()), "boom");
/// ```
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| format!("{payload:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_records_call_site_frame() {
        let failure = step_failure!("boom");
        assert_eq!(failure.message(), "boom");
        let frames = failure.frames();
        assert_eq!(frames.len(), 1);
        assert!(frames.iter().all(|f| f.module_path.contains("failure")));
    }

    #[test]
    fn frames_preserve_insertion_order() {
        let failure = StepFailure::new("x")
            .with_frame("app::outer", 10)
            .with_frame("app::inner", 20);
        let paths: Vec<_> = failure.frames().iter().map(|f| f.module_path.as_str()).collect();
        assert_eq!(paths, ["app::outer", "app::inner"]);
    }

    #[test]
    fn panic_message_prefers_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(payload.as_ref()), "kaboom");
    }

    #[test]
    fn panic_message_falls_back_to_debug() {
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert!(!panic_message(payload.as_ref()).is_empty());
    }
}
