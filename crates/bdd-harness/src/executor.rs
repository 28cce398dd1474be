//! Scenario execution against the step registry.
//!
//! The engine walks a feature's scenarios in document order, expands
//! scenario outlines against their first examples table, resolves each step
//! through the registry, and streams events to the attached sinks. A step
//! that fails or has no definition halts its scenario; the remaining steps
//! are reported as skipped and sibling scenarios still run.

use std::any::Any;
use std::collections::HashSet;
use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::config;
use crate::context::StepContext;
use crate::error::HarnessError;
use crate::failure::{StepFailure, panic_message};
use crate::formatter::{EventSink, FeatureSummary, StepReport, StepStatus};
use crate::keyword::StepKeyword;
use crate::loader::Feature;
use crate::registry::StepRegistry;

/// Raw outcome of executing one feature.
#[derive(Debug, Default)]
pub struct EngineOutcome {
    /// Failures raised by step handlers, in execution order.
    pub failures: Vec<StepFailure>,
    /// Deduplicated registration snippets for undefined steps.
    pub snippets: HashSet<String>,
    /// Aggregate counts for the feature.
    pub summary: FeatureSummary,
}

/// Drives scenario execution for one feature at a time.
pub struct ExecutionEngine<'a> {
    registry: &'a StepRegistry,
    fixtures: Vec<(&'static str, &'a dyn Any)>,
    strict_sinks: bool,
}

impl<'a> ExecutionEngine<'a> {
    /// Engine resolving steps through the given registry.
    ///
    /// The sink failure policy defaults to the process-wide setting.
    #[must_use]
    pub fn new(registry: &'a StepRegistry) -> Self {
        Self {
            registry,
            fixtures: Vec::new(),
            strict_sinks: config::strict_formatters(),
        }
    }

    /// Make the named fixture available to every executed step.
    #[must_use]
    pub fn with_fixture<T: Any>(mut self, name: &'static str, value: &'a T) -> Self {
        self.fixtures.push((name, value));
        self
    }

    /// Override the sink failure policy for this engine.
    #[must_use]
    pub fn with_strict_sinks(mut self, strict: bool) -> Self {
        self.strict_sinks = strict;
        self
    }

    /// Execute every scenario of the feature, streaming events to the sinks.
    ///
    /// A feature with zero scenarios produces an empty outcome. Step
    /// failures and undefined steps are captured in the outcome, never
    /// raised.
    ///
    /// # Errors
    /// Returns [`HarnessError::Sink`] when a sink fails and the strict
    /// policy is active; sink failures are otherwise logged and ignored.
    pub fn run_feature(
        &self,
        feature: &Feature,
        sinks: &mut [&mut dyn EventSink],
    ) -> Result<EngineOutcome, HarnessError> {
        let mut outcome = EngineOutcome::default();
        self.dispatch(sinks, |sink| sink.feature_started(feature))?;
        for scenario in &feature.document().scenarios {
            for instance in expand_scenario(scenario) {
                self.run_scenario(feature, &instance, sinks, &mut outcome)?;
            }
        }
        self.dispatch(sinks, |sink| sink.feature_finished(&outcome.summary))?;
        Ok(outcome)
    }

    fn run_scenario(
        &self,
        feature: &Feature,
        instance: &ScenarioInstance,
        sinks: &mut [&mut dyn EventSink],
        outcome: &mut EngineOutcome,
    ) -> Result<(), HarnessError> {
        outcome.summary.scenarios += 1;
        self.dispatch(sinks, |sink| sink.scenario_started(&instance.name))?;
        let mut ctx = StepContext::default();
        for &(name, value) in &self.fixtures {
            ctx.insert_any(name, value);
        }
        let mut halted = false;
        let background = feature
            .document()
            .background
            .iter()
            .flat_map(|b| b.steps.iter())
            .map(|step| (StepKeyword::from(step.ty), step.value.clone()));
        let steps = background.chain(instance.steps.iter().cloned());
        for (keyword, text) in steps {
            outcome.summary.steps += 1;
            let status = if halted {
                StepStatus::Skipped
            } else {
                self.run_step(&mut ctx, keyword, &text, outcome)
            };
            if !matches!(status, StepStatus::Passed | StepStatus::Skipped) {
                halted = true;
            }
            let report = StepReport {
                keyword,
                text,
                status,
            };
            self.dispatch(sinks, |sink| sink.step_finished(&report))?;
        }
        Ok(())
    }

    fn run_step(
        &self,
        ctx: &mut StepContext<'_>,
        keyword: StepKeyword,
        text: &str,
        outcome: &mut EngineOutcome,
    ) -> StepStatus {
        let Some(def) = self.registry.find(keyword, text) else {
            outcome.summary.undefined += 1;
            outcome.snippets.insert(registration_snippet(keyword, text));
            return StepStatus::Undefined;
        };
        match catch_unwind(AssertUnwindSafe(|| (def.run)(ctx, text))) {
            Ok(Ok(())) => StepStatus::Passed,
            Ok(Err(failure)) => {
                outcome.summary.failures += 1;
                let message = failure.message().to_owned();
                outcome.failures.push(failure);
                StepStatus::Failed(message)
            }
            Err(payload) => {
                outcome.summary.failures += 1;
                let message = panic_message(payload.as_ref());
                outcome.failures.push(StepFailure::new(message.clone()));
                StepStatus::Failed(message)
            }
        }
    }

    fn dispatch<F>(
        &self,
        sinks: &mut [&mut dyn EventSink],
        mut emit: F,
    ) -> Result<(), HarnessError>
    where
        F: FnMut(&mut dyn EventSink) -> io::Result<()>,
    {
        for sink in sinks.iter_mut() {
            if let Err(source) = emit(&mut **sink) {
                if self.strict_sinks {
                    return Err(HarnessError::Sink(source));
                }
                log::warn!("report sink failed, continuing: {source}");
            }
        }
        Ok(())
    }
}

struct ScenarioInstance {
    name: String,
    steps: Vec<(StepKeyword, String)>,
}

fn literal_steps(scenario: &gherkin::Scenario) -> Vec<(StepKeyword, String)> {
    scenario
        .steps
        .iter()
        .map(|step| (StepKeyword::from(step.ty), step.value.clone()))
        .collect()
}

/// Expand a scenario outline against its first examples table; plain
/// scenarios pass through as a single instance.
fn expand_scenario(scenario: &gherkin::Scenario) -> Vec<ScenarioInstance> {
    let Some(table) = scenario
        .examples
        .iter()
        .find_map(|examples| examples.table.as_ref())
    else {
        return vec![ScenarioInstance {
            name: scenario.name.clone(),
            steps: literal_steps(scenario),
        }];
    };
    let Some((header, rows)) = table.rows.split_first() else {
        return Vec::new();
    };
    rows.iter()
        .enumerate()
        .map(|(index, row)| ScenarioInstance {
            name: format!("{} [{}]", scenario.name, index + 1),
            steps: scenario
                .steps
                .iter()
                .map(|step| {
                    (
                        StepKeyword::from(step.ty),
                        substitute_placeholders(&step.value, header, row),
                    )
                })
                .collect(),
        })
        .collect()
}

fn substitute_placeholders(text: &str, header: &[String], row: &[String]) -> String {
    header
        .iter()
        .zip(row)
        .fold(text.to_owned(), |acc, (column, value)| {
            acc.replace(&format!("<{column}>"), value)
        })
}

fn registration_snippet(keyword: StepKeyword, text: &str) -> String {
    format!(
        "step_def!(StepKeyword::{keyword}, \"{}\", pending_step);\n\
         fn pending_step(_ctx: &mut StepContext<'_>, _text: &str) -> Result<(), StepFailure> {{\n\
         \x20   Err(step_failure!(\"pending\"))\n\
         }}",
        text.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use std::cell::Cell;

    use gherkin::GherkinEnv;

    use super::*;
    use crate::step_def;
    use crate::step_failure;

    fn feature(source: &str) -> Feature {
        let document = gherkin::Feature::parse(source, GherkinEnv::default()).unwrap();
        Feature::new("test.feature".into(), document)
    }

    fn engine_counter_add(ctx: &mut StepContext<'_>, _text: &str) -> Result<(), StepFailure> {
        if let Some(counter) = ctx.get::<Cell<u32>>("counter") {
            counter.set(counter.get() + 1);
        }
        Ok(())
    }

    fn engine_always_fails(_ctx: &mut StepContext<'_>, _text: &str) -> Result<(), StepFailure> {
        Err(step_failure!("engine test failure"))
    }

    fn engine_panics(_ctx: &mut StepContext<'_>, _text: &str) -> Result<(), StepFailure> {
        panic!("engine test panic");
    }

    step_def!(StepKeyword::Given, "the engine counter ticks", engine_counter_add);
    step_def!(StepKeyword::When, "the engine step fails", engine_always_fails);
    step_def!(StepKeyword::When, "the engine step panics", engine_panics);
    step_def!(StepKeyword::Given, "the engine sees {value}", engine_counter_add);

    #[test]
    fn passing_feature_produces_clean_outcome() {
        let registry = StepRegistry::collect().unwrap();
        let counter = Cell::new(0u32);
        let engine = ExecutionEngine::new(&registry).with_fixture("counter", &counter);
        let feature = feature(
            "Feature: ticking\n\
             Scenario: ticks twice\n\
             Given the engine counter ticks\n\
             And the engine counter ticks\n",
        );
        let outcome = engine.run_feature(&feature, &mut []).unwrap();
        assert!(outcome.failures.is_empty());
        assert!(outcome.snippets.is_empty());
        assert_eq!(outcome.summary.scenarios, 1);
        assert_eq!(outcome.summary.steps, 2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn undefined_step_yields_snippet_and_skips_the_rest() {
        let registry = StepRegistry::collect().unwrap();
        let engine = ExecutionEngine::new(&registry);
        let feature = feature(
            "Feature: pending\n\
             Scenario: nothing matches\n\
             Given an unregistered engine step\n\
             And the engine counter ticks\n\
             Scenario: still nothing\n\
             Given an unregistered engine step\n",
        );
        let outcome = engine.run_feature(&feature, &mut []).unwrap();
        assert!(outcome.failures.is_empty());
        // The same undefined text in both scenarios collapses to one snippet.
        assert_eq!(outcome.snippets.len(), 1);
        assert_eq!(outcome.summary.undefined, 2);
        let snippet = outcome.snippets.iter().next().unwrap();
        assert!(snippet.contains("an unregistered engine step"));
    }

    #[test]
    fn failing_step_halts_its_scenario_only() {
        let registry = StepRegistry::collect().unwrap();
        let counter = Cell::new(0u32);
        let engine = ExecutionEngine::new(&registry).with_fixture("counter", &counter);
        let feature = feature(
            "Feature: failing\n\
             Scenario: fails mid-way\n\
             When the engine step fails\n\
             Given the engine counter ticks\n\
             Scenario: unaffected sibling\n\
             Given the engine counter ticks\n",
        );
        let outcome = engine.run_feature(&feature, &mut []).unwrap();
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(
            outcome.failures.first().map(StepFailure::message),
            Some("engine test failure")
        );
        // Only the sibling scenario's step ran.
        assert_eq!(counter.get(), 1);
        assert_eq!(outcome.summary.scenarios, 2);
    }

    #[test]
    fn panicking_step_is_captured_as_a_failure() {
        let registry = StepRegistry::collect().unwrap();
        let engine = ExecutionEngine::new(&registry);
        let feature = feature(
            "Feature: panicking\n\
             Scenario: blows up\n\
             When the engine step panics\n",
        );
        let outcome = engine.run_feature(&feature, &mut []).unwrap();
        assert_eq!(outcome.failures.len(), 1);
        assert!(
            outcome
                .failures
                .first()
                .is_some_and(|f| f.message().contains("engine test panic"))
        );
    }

    #[test]
    fn outline_expands_one_instance_per_row() {
        let registry = StepRegistry::collect().unwrap();
        let counter = Cell::new(0u32);
        let engine = ExecutionEngine::new(&registry).with_fixture("counter", &counter);
        let feature = feature(
            "Feature: outlined\n\
             Scenario Outline: sees values\n\
             Given the engine sees <value>\n\
             Examples:\n\
             | value |\n\
             | one   |\n\
             | two   |\n",
        );
        let mut names = RecordingSink::default();
        let outcome = engine.run_feature(&feature, &mut [&mut names]).unwrap();
        assert_eq!(outcome.summary.scenarios, 2);
        assert_eq!(counter.get(), 2);
        assert_eq!(names.scenarios, ["sees values [1]", "sees values [2]"]);
    }

    #[test]
    fn background_steps_run_before_each_scenario() {
        let registry = StepRegistry::collect().unwrap();
        let counter = Cell::new(0u32);
        let engine = ExecutionEngine::new(&registry).with_fixture("counter", &counter);
        let feature = feature(
            "Feature: shared setup\n\
             Background:\n\
             Given the engine counter ticks\n\
             Scenario: first\n\
             Given the engine counter ticks\n\
             Scenario: second\n\
             Given the engine counter ticks\n",
        );
        let outcome = engine.run_feature(&feature, &mut []).unwrap();
        // One background step plus one scenario step, per scenario.
        assert_eq!(outcome.summary.steps, 4);
        assert_eq!(counter.get(), 4);
    }

    #[test]
    fn zero_scenario_feature_produces_empty_outcome() {
        let registry = StepRegistry::collect().unwrap();
        let engine = ExecutionEngine::new(&registry);
        let feature = feature("Feature: empty\n");
        let outcome = engine.run_feature(&feature, &mut []).unwrap();
        assert!(outcome.failures.is_empty());
        assert!(outcome.snippets.is_empty());
        assert_eq!(outcome.summary, FeatureSummary::default());
    }

    #[test]
    fn strict_policy_surfaces_sink_failures() {
        let registry = StepRegistry::collect().unwrap();
        let engine = ExecutionEngine::new(&registry).with_strict_sinks(true);
        let feature = feature("Feature: empty\n");
        let mut sink = FailingSink;
        let err = engine.run_feature(&feature, &mut [&mut sink]).unwrap_err();
        assert!(matches!(err, HarnessError::Sink(_)));
    }

    #[test]
    fn lax_policy_ignores_sink_failures() {
        let registry = StepRegistry::collect().unwrap();
        let engine = ExecutionEngine::new(&registry).with_strict_sinks(false);
        let feature = feature("Feature: empty\n");
        let mut sink = FailingSink;
        assert!(engine.run_feature(&feature, &mut [&mut sink]).is_ok());
    }

    #[derive(Default)]
    struct RecordingSink {
        scenarios: Vec<String>,
    }

    impl EventSink for RecordingSink {
        fn scenario_started(&mut self, name: &str) -> io::Result<()> {
            self.scenarios.push(name.to_owned());
            Ok(())
        }
    }

    struct FailingSink;

    impl EventSink for FailingSink {
        fn feature_started(&mut self, _feature: &Feature) -> io::Result<()> {
            Err(io::Error::other("sink down"))
        }
    }
}
