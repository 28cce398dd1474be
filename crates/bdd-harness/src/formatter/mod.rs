//! Report sinks consuming the execution event stream.
//!
//! Every sink observes the same sequence of events in series: feature
//! started, scenario started, step finished (one per step), feature
//! finished. Sinks are purely observational; they never influence pass/fail
//! and a sink error is handled by the engine according to the configured
//! formatter policy.

use std::io;

use crate::keyword::StepKeyword;
use crate::loader::Feature;

/// Console progress writer.
pub mod console;
/// In-memory JSON trace collector.
pub mod json;
/// Per-feature JUnit XML file writer.
pub mod junit;

/// Outcome of a single executed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The handler ran and returned success.
    Passed,
    /// The handler returned an error or panicked; carries the message.
    Failed(String),
    /// No registered definition matched the step text.
    Undefined,
    /// Skipped because an earlier step in the scenario did not pass.
    Skipped,
}

impl StepStatus {
    /// Lowercase label for the status, stable for machine consumption.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed(_) => "failed",
            Self::Undefined => "undefined",
            Self::Skipped => "skipped",
        }
    }
}

/// Report of one executed (or skipped) step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Resolved keyword of the step.
    pub keyword: StepKeyword,
    /// Step text after outline placeholder substitution.
    pub text: String,
    /// Outcome of the step.
    pub status: StepStatus,
}

/// Aggregate counts emitted when a feature finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSummary {
    /// Number of scenarios executed (after outline expansion).
    pub scenarios: usize,
    /// Number of steps observed, including skipped ones.
    pub steps: usize,
    /// Number of failed steps.
    pub failures: usize,
    /// Number of undefined steps.
    pub undefined: usize,
}

/// Observer of the execution event stream.
///
/// All methods default to no-ops so sinks implement only what they need.
pub trait EventSink {
    /// A feature run is starting.
    ///
    /// # Errors
    /// Returns the sink's underlying I/O failure, if any.
    fn feature_started(&mut self, feature: &Feature) -> io::Result<()> {
        let _ = feature;
        Ok(())
    }

    /// A scenario is starting.
    ///
    /// # Errors
    /// Returns the sink's underlying I/O failure, if any.
    fn scenario_started(&mut self, name: &str) -> io::Result<()> {
        let _ = name;
        Ok(())
    }

    /// A step finished with the given outcome.
    ///
    /// # Errors
    /// Returns the sink's underlying I/O failure, if any.
    fn step_finished(&mut self, report: &StepReport) -> io::Result<()> {
        let _ = report;
        Ok(())
    }

    /// The feature run finished.
    ///
    /// # Errors
    /// Returns the sink's underlying I/O failure, if any.
    fn feature_finished(&mut self, summary: &FeatureSummary) -> io::Result<()> {
        let _ = summary;
        Ok(())
    }
}
