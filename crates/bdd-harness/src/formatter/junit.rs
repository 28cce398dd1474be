//! Per-feature JUnit XML report writer.
//!
//! One XML file per feature, written under the results root when the feature
//! finishes. The filename derives from the feature URI with path separators
//! replaced by underscores, suffixed `-junit-report.xml`. Failed scenarios
//! gain a `<failure>` child; scenarios with undefined steps a `<skipped>`
//! child.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{EventSink, FeatureSummary, StepReport, StepStatus};
use crate::loader::Feature;

/// Replace path separator and backslash characters with underscores.
///
/// # Examples
///
/// ```
/// use bdd_harness::formatter::junit::sanitise_uri;
///
/// assert_eq!(sanitise_uri("nested/b.feature"), "nested_b.feature");
/// ```
#[must_use]
pub fn sanitise_uri(uri: &str) -> String {
    uri.replace(['/', '\\'], "_")
}

#[derive(Debug, Default)]
struct TestCase {
    name: String,
    failure: Option<String>,
    skipped: bool,
}

/// Sink writing one JUnit XML document per feature run.
pub struct JunitSink {
    path: PathBuf,
    suite_name: String,
    cases: Vec<TestCase>,
    current: Option<TestCase>,
}

impl JunitSink {
    /// Create a sink writing under the results root, creating the directory
    /// if absent.
    ///
    /// # Errors
    /// Returns an error when the results directory cannot be created.
    pub fn create(results_root: &Path, uri: &str) -> io::Result<Self> {
        fs::create_dir_all(results_root)?;
        let path = results_root.join(format!("{}-junit-report.xml", sanitise_uri(uri)));
        Ok(Self {
            path,
            suite_name: uri.to_owned(),
            cases: Vec::new(),
            current: None,
        })
    }

    /// Path of the XML file this sink writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush_case(&mut self) {
        if let Some(case) = self.current.take() {
            self.cases.push(case);
        }
    }

    fn render(&self) -> String {
        let tests = self.cases.len();
        let failures = self.cases.iter().filter(|c| c.failure.is_some()).count();
        let skipped = self
            .cases
            .iter()
            .filter(|c| c.skipped && c.failure.is_none())
            .count();
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            out,
            "<testsuite name=\"{}\" tests=\"{tests}\" failures=\"{failures}\" skipped=\"{skipped}\">",
            escape(&self.suite_name),
        );
        for case in &self.cases {
            let _ = write!(
                out,
                "  <testcase name=\"{}\" classname=\"{}\"",
                escape(&case.name),
                escape(&self.suite_name),
            );
            match (&case.failure, case.skipped) {
                (None, false) => out.push_str(" />\n"),
                (Some(message), _) => {
                    let _ = write!(
                        out,
                        ">\n    <failure message=\"{}\" />\n  </testcase>\n",
                        escape(message),
                    );
                }
                (None, true) => {
                    out.push_str(">\n    <skipped />\n  </testcase>\n");
                }
            }
        }
        out.push_str("</testsuite>\n");
        out
    }
}

impl EventSink for JunitSink {
    fn feature_started(&mut self, feature: &Feature) -> io::Result<()> {
        self.suite_name = feature.uri().to_owned();
        Ok(())
    }

    fn scenario_started(&mut self, name: &str) -> io::Result<()> {
        self.flush_case();
        self.current = Some(TestCase {
            name: name.to_owned(),
            ..TestCase::default()
        });
        Ok(())
    }

    fn step_finished(&mut self, report: &StepReport) -> io::Result<()> {
        let Some(case) = self.current.as_mut() else {
            return Ok(());
        };
        match &report.status {
            StepStatus::Failed(message) => {
                if case.failure.is_none() {
                    case.failure = Some(message.clone());
                }
            }
            StepStatus::Undefined => case.skipped = true,
            StepStatus::Passed | StepStatus::Skipped => {}
        }
        Ok(())
    }

    fn feature_finished(&mut self, _summary: &FeatureSummary) -> io::Result<()> {
        self.flush_case();
        fs::write(&self.path, self.render())
    }
}

fn is_valid_xml_character(character: char) -> bool {
    matches!(
        u32::from(character),
        0x09 | 0x0A | 0x0D
            | 0x20..=0xD7FF
            | 0xE000..=0xFFFD
            | 0x1_0000..=0x10_FFFF
    )
}

fn escape(value: &str) -> String {
    const INVALID_REPLACEMENT: &str = "&#xFFFD;";
    let mut out = String::with_capacity(value.len());
    for character in value.chars() {
        if !is_valid_xml_character(character) {
            out.push_str(INVALID_REPLACEMENT);
            continue;
        }
        match character {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
