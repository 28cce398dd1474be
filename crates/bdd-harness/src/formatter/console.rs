//! Human-readable console progress formatter.
//!
//! Writes one line per feature, scenario, and step to the supplied stream.
//! Purely observational: it never affects pass/fail.

use std::io::{self, Write};

use super::{EventSink, FeatureSummary, StepReport, StepStatus};
use crate::loader::Feature;

/// Progress formatter writing to any [`io::Write`] implementation.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    /// Formatter writing to the given stream.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the formatter, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn marker(status: &StepStatus) -> &'static str {
        match status {
            StepStatus::Passed => "   ok",
            StepStatus::Failed(_) => " FAIL",
            StepStatus::Undefined => "UNDEF",
            StepStatus::Skipped => " skip",
        }
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn feature_started(&mut self, feature: &Feature) -> io::Result<()> {
        writeln!(self.out, "Feature: {} ({})", feature.name(), feature.uri())
    }

    fn scenario_started(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "  Scenario: {name}")
    }

    fn step_finished(&mut self, report: &StepReport) -> io::Result<()> {
        writeln!(
            self.out,
            "    [{}] {} {}",
            Self::marker(&report.status),
            report.keyword,
            report.text
        )?;
        if let StepStatus::Failed(message) = &report.status {
            writeln!(self.out, "            {message}")?;
        }
        Ok(())
    }

    fn feature_finished(&mut self, summary: &FeatureSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "  {} scenario(s), {} step(s), {} failed, {} undefined",
            summary.scenarios, summary.steps, summary.failures, summary.undefined
        )
    }
}
