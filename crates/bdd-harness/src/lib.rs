//! Core library for `bdd-harness`.
//! Discovers Gherkin feature documents, executes them against an explicit
//! step registry, fans the execution stream out to console, JSON, and JUnit
//! sinks, correlates failures back to known application sources, and renders
//! one HTML report per feature.

pub use inventory::{iter, submit};

pub mod config;
pub mod context;
pub mod correlate;
pub mod error;
pub mod executor;
pub mod failure;
pub mod formatter;
pub mod keyword;
pub mod loader;
pub mod pattern;
pub mod registry;
pub mod runner;
pub mod sources;
pub mod template;

pub use config::Config;
pub use context::StepContext;
pub use correlate::{ErrorDetail, SourceLine};
pub use error::HarnessError;
pub use executor::{EngineOutcome, ExecutionEngine};
pub use failure::{StepFailure, TraceFrame, panic_message};
pub use formatter::{EventSink, FeatureSummary, StepReport, StepStatus};
pub use keyword::StepKeyword;
pub use loader::{Feature, FeatureLoader};
pub use pattern::StepPattern;
pub use registry::{StepDef, StepFn, StepRegistry};
pub use runner::{Harness, RunResult};
pub use sources::{InMemorySources, SourceRef, SourceRegistry};
pub use template::{DefaultTemplate, ReportTemplate, TemplateArgs, TemplateError};
