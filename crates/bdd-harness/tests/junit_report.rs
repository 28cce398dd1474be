//! JUnit report naming and content.
#![expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use std::fs;

use bdd_harness::{
    Config, DefaultTemplate, Harness, InMemorySources, StepContext, StepFailure, StepKeyword,
    step_def, step_failure,
};
use tempfile::TempDir;

fn report_passes(_ctx: &mut StepContext<'_>, _text: &str) -> Result<(), StepFailure> {
    Ok(())
}

fn report_fails(_ctx: &mut StepContext<'_>, _text: &str) -> Result<(), StepFailure> {
    Err(step_failure!("assertion <failed> & exploded"))
}

step_def!(StepKeyword::Given, "the junit fixture is ready", report_passes);
step_def!(StepKeyword::Then, "the junit assertion holds", report_fails);

fn workspace() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let features = dir.path().join("features");
    fs::create_dir_all(features.join("nested")).unwrap();
    let config = Config::new(features, dir.path().join("results"));
    (dir, config)
}

#[test]
fn nested_uri_is_sanitised_into_a_flat_filename() {
    let (dir, config) = workspace();
    fs::write(
        config.features_root.join("nested").join("deep.feature"),
        "Feature: deep\nScenario: quiet\nGiven the junit fixture is ready\n",
    )
    .unwrap();
    let sources = InMemorySources::new();
    let harness = Harness::new(config, &sources, &DefaultTemplate);
    harness.run_feature("nested/deep.feature").unwrap();
    let report = dir
        .path()
        .join("results")
        .join("nested_deep.feature-junit-report.xml");
    assert!(report.is_file());
    let xml = fs::read_to_string(report).unwrap();
    assert!(xml.contains("name=\"nested/deep.feature\""));
    assert!(xml.contains("tests=\"1\" failures=\"0\" skipped=\"0\""));
}

#[test]
fn failures_and_undefined_steps_are_counted_and_escaped() {
    let (dir, config) = workspace();
    fs::write(
        config.features_root.join("mixed.feature"),
        "Feature: mixed\n\
         Scenario: fails\n\
         Given the junit fixture is ready\n\
         Then the junit assertion holds\n\
         Scenario: pending\n\
         Given a junit step nobody wrote\n",
    )
    .unwrap();
    let sources = InMemorySources::new();
    let harness = Harness::new(config, &sources, &DefaultTemplate);
    let result = harness.run_feature("mixed.feature").unwrap();
    assert_eq!(result.status_label(), "SKIPPED !");
    let xml = fs::read_to_string(
        dir.path()
            .join("results")
            .join("mixed.feature-junit-report.xml"),
    )
    .unwrap();
    assert!(xml.contains("tests=\"2\" failures=\"1\" skipped=\"1\""));
    assert!(xml.contains("assertion &lt;failed&gt; &amp; exploded"));
    assert!(xml.contains("<skipped />"));
    assert!(xml.contains("classname=\"mixed.feature\""));
}
