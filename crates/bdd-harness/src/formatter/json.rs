//! In-memory JSON trace of a feature run.
//!
//! The collector buffers a machine-readable trace of the execution stream
//! and serialises it to a string on demand. The trace is embedded in the
//! HTML report; it is never written to disk on its own. Status labels stay
//! lowercase so downstream tools can rely on consistent casing.

use std::io;

use serde::Serialize;

use super::{EventSink, FeatureSummary, StepReport, StepStatus};
use crate::loader::Feature;

#[derive(Serialize, Default)]
struct FeatureTrace {
    uri: String,
    name: String,
    scenarios: Vec<ScenarioTrace>,
    summary: SummaryTrace,
}

#[derive(Serialize, Default)]
struct ScenarioTrace {
    name: String,
    steps: Vec<StepTrace>,
}

#[derive(Serialize)]
struct StepTrace {
    keyword: &'static str,
    text: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize, Default)]
struct SummaryTrace {
    scenarios: usize,
    steps: usize,
    failures: usize,
    undefined: usize,
}

/// Collector buffering the run trace in memory.
#[derive(Default)]
pub struct JsonSink {
    trace: FeatureTrace,
}

impl JsonSink {
    /// Empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialise the buffered trace to a JSON string.
    ///
    /// # Errors
    /// Returns an error when serialisation fails.
    pub fn into_string(self) -> serde_json::Result<String> {
        serde_json::to_string(&self.trace)
    }
}

impl EventSink for JsonSink {
    fn feature_started(&mut self, feature: &Feature) -> io::Result<()> {
        self.trace.uri = feature.uri().to_owned();
        self.trace.name = feature.name().to_owned();
        Ok(())
    }

    fn scenario_started(&mut self, name: &str) -> io::Result<()> {
        self.trace.scenarios.push(ScenarioTrace {
            name: name.to_owned(),
            steps: Vec::new(),
        });
        Ok(())
    }

    fn step_finished(&mut self, report: &StepReport) -> io::Result<()> {
        let error = match &report.status {
            StepStatus::Failed(message) => Some(message.clone()),
            _ => None,
        };
        let step = StepTrace {
            keyword: report.keyword.as_str(),
            text: report.text.clone(),
            status: report.status.label(),
            error,
        };
        if let Some(scenario) = self.trace.scenarios.last_mut() {
            scenario.steps.push(step);
        }
        Ok(())
    }

    fn feature_finished(&mut self, summary: &FeatureSummary) -> io::Result<()> {
        self.trace.summary = SummaryTrace {
            scenarios: summary.scenarios,
            steps: summary.steps,
            failures: summary.failures,
            undefined: summary.undefined,
        };
        Ok(())
    }
}
