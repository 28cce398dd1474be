//! Run orchestration: load, execute, correlate, render, persist.
//!
//! The harness drives the full pipeline for one feature or for every
//! discovered feature in batch. Each feature executes independently; a
//! failing feature never stops its siblings, and each feature's HTML and
//! JUnit artefacts are written under the results root keyed by URI.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};

use crate::config::Config;
use crate::correlate::{ErrorDetail, build_errors};
use crate::error::HarnessError;
use crate::executor::ExecutionEngine;
use crate::formatter::EventSink;
use crate::formatter::console::ConsoleSink;
use crate::formatter::json::JsonSink;
use crate::formatter::junit::JunitSink;
use crate::loader::{Feature, FeatureLoader};
use crate::registry::StepRegistry;
use crate::template::{
    FEATURE_REPORT, ReportTemplate, TemplateArgs, error_details_html, snippets_html,
};

/// Aggregate outcome of executing one feature.
#[derive(Debug)]
pub struct RunResult {
    feature: Feature,
    passed: bool,
    error_details: Vec<ErrorDetail>,
    snippets: HashSet<String>,
}

impl RunResult {
    fn new(feature: Feature, error_details: Vec<ErrorDetail>, snippets: HashSet<String>) -> Self {
        let passed = error_details.is_empty() && snippets.is_empty();
        Self {
            feature,
            passed,
            error_details,
            snippets,
        }
    }

    /// The feature this result describes.
    #[must_use]
    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Whether the feature passed: no errors and no pending-step snippets.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Correlated failures in execution order.
    #[must_use]
    pub fn error_details(&self) -> &[ErrorDetail] {
        &self.error_details
    }

    /// Deduplicated registration snippets for undefined steps.
    #[must_use]
    pub fn snippets(&self) -> &HashSet<String> {
        &self.snippets
    }

    /// Console status label. Pending steps take precedence: any feature with
    /// undefined steps is skipped, not failed, even when other scenarios
    /// raised real errors.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        if !self.snippets.is_empty() {
            "SKIPPED !"
        } else if !self.error_details.is_empty() {
            "FAILED !"
        } else {
            "PASSED"
        }
    }
}

/// Drives feature discovery, execution, and report generation.
pub struct Harness<'a> {
    config: Config,
    sources: &'a dyn crate::sources::SourceRegistry,
    template: &'a dyn ReportTemplate,
}

impl<'a> Harness<'a> {
    /// Harness over the given configuration, source registry, and template
    /// renderer.
    #[must_use]
    pub fn new(
        config: Config,
        sources: &'a dyn crate::sources::SourceRegistry,
        template: &'a dyn ReportTemplate,
    ) -> Self {
        Self {
            config,
            sources,
            template,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover and parse every feature under the configured root.
    ///
    /// # Errors
    /// Surfaces discovery and parse failures.
    pub fn load_features(&self) -> Result<Vec<Feature>, HarnessError> {
        FeatureLoader::new(&self.config.features_root).load_features()
    }

    /// Execute every discovered feature in order, writing progress to `out`.
    ///
    /// Features always all run; a feature whose execution or report
    /// rendering fails is logged and reported as `ERROR` on the console
    /// without blocking its siblings.
    ///
    /// # Errors
    /// Surfaces discovery and parse failures, and failures writing to `out`.
    pub fn run_all_features(
        &self,
        out: &mut dyn Write,
    ) -> Result<Vec<RunResult>, HarnessError> {
        let features = self.load_features()?;
        let banner = "~".repeat(60);
        writeln!(out, "{banner}").map_err(HarnessError::Sink)?;
        writeln!(out, "Running {} feature(s)", features.len()).map_err(HarnessError::Sink)?;
        writeln!(out, "{banner}").map_err(HarnessError::Sink)?;
        let width = features
            .iter()
            .map(|feature| feature.uri().len())
            .max()
            .unwrap_or(0);
        let mut results = Vec::with_capacity(features.len());
        for feature in features {
            let label = match self.execute_feature(&feature, &mut io::sink()) {
                Ok(result) => {
                    let label = result.status_label();
                    results.push(result);
                    label
                }
                Err(err) => {
                    log::error!("feature {} did not complete: {err}", feature.uri());
                    "ERROR !"
                }
            };
            writeln!(out, "{:<width$} : {label}", feature.uri()).map_err(HarnessError::Sink)?;
        }
        Ok(results)
    }

    /// Execute the feature with the given URI, without console progress.
    ///
    /// # Errors
    /// Returns [`HarnessError::FeatureNotFound`] when no discovered feature
    /// carries the URI, and surfaces execution and report failures.
    pub fn run_feature(&self, uri: &str) -> Result<RunResult, HarnessError> {
        self.run_feature_with(uri, &mut io::sink())
    }

    /// Execute the feature with the given URI, writing step progress to
    /// `out`.
    ///
    /// # Errors
    /// Same conditions as [`run_feature`](Self::run_feature).
    pub fn run_feature_with(
        &self,
        uri: &str,
        out: &mut dyn Write,
    ) -> Result<RunResult, HarnessError> {
        let feature = FeatureLoader::new(&self.config.features_root)
            .find_feature_by_uri(uri)?
            .ok_or_else(|| HarnessError::FeatureNotFound(uri.to_owned()))?;
        self.execute_feature(&feature, out)
    }

    fn execute_feature(
        &self,
        feature: &Feature,
        console: &mut dyn Write,
    ) -> Result<RunResult, HarnessError> {
        let registry = StepRegistry::collect()?;
        let engine = ExecutionEngine::new(&registry)
            .with_strict_sinks(self.config.strict_formatters);
        let mut console_sink = ConsoleSink::new(console);
        let mut json_sink = JsonSink::new();
        let mut junit_sink = self.junit_sink_for(feature)?;
        let outcome = {
            let mut sinks: Vec<&mut dyn EventSink> = vec![&mut console_sink, &mut json_sink];
            if let Some(junit) = junit_sink.as_mut() {
                sinks.push(junit);
            }
            engine.run_feature(feature, &mut sinks)?
        };
        let trace = json_sink.into_string()?;
        let errors = build_errors(outcome.failures, self.sources);
        let result = RunResult::new(feature.clone(), errors, outcome.snippets);
        self.render_report(&result, &trace)?;
        Ok(result)
    }

    /// Attach the per-feature JUnit sink, degrading per the formatter
    /// policy when its file cannot be set up.
    fn junit_sink_for(&self, feature: &Feature) -> Result<Option<JunitSink>, HarnessError> {
        match JunitSink::create(&self.config.results_root, feature.uri()) {
            Ok(sink) => Ok(Some(sink)),
            Err(source) if self.config.strict_formatters => Err(HarnessError::Sink(source)),
            Err(source) => {
                log::warn!(
                    "JUnit report unavailable for {}, continuing: {source}",
                    feature.uri()
                );
                Ok(None)
            }
        }
    }

    fn render_report(&self, result: &RunResult, trace: &str) -> Result<(), HarnessError> {
        let args = TemplateArgs::new()
            .with("uri", result.feature().uri())
            .with("name", result.feature().name())
            .with("status", result.status_label())
            .with("trace", trace)
            .with("errors", error_details_html(result.error_details()))
            .with(
                "snippets",
                snippets_html(result.snippets().iter().map(String::as_str)),
            );
        let html = self.template.render(FEATURE_REPORT, &args)?;
        let path = self
            .config
            .results_root
            .join(format!("{}.html", result.feature().uri()));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| HarnessError::Report {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(&path, html).map_err(|source| HarnessError::Report { path, source })
    }
}
