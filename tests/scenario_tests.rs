mod common;

use menu_panel::cli::commands::load_scenarios;
use menu_panel::scenario::context::ScenarioContext;
use menu_panel::scenario::runner::{RunOptions, ScenarioRunner};
use menu_panel::scenario::scenario_model::{
    Assertion, AssertionResult, Scenario, ScenarioStep,
};
use menu_panel::transport::mock::ScriptedReply;

use crate::common::utils::fixture_path;

const INLINE: &str = r##"
name: inline formset
html: |
  <input type="hidden" id="id_options-TOTAL_FORMS" value="0">
  <div id="options-form-container"></div>
  <button id="add-form-row">Add</button>
  <template id="empty-form-template"><div class="option-form-row"><input name="options-__prefix__-name"><button class="remove-form-row">x</button></div></template>
steps:
  - action: click
    selector: "#add-form-row"
  - action: assert
    assertions:
      - type: form_count
        formset: options
        expected: 1
"##;

// =========================================================================
// YAML model
// =========================================================================

#[test]
fn scenario_yaml_parses_steps_and_defaults() {
    let yaml = r##"
name: everything
html: "<p></p>"
csrf_token: abc
replies:
  - success: true
    available: false
  - fail: timeout
steps:
  - action: change
    selector: "#x"
  - action: preview
    files:
      - name: a.png
        mime: image/png
  - action: remove_row
    formset: items
    row: 3
  - action: assert
    assertions:
      - type: no_alerts
      - type: element_count
        selector: li
        expected: 2
"##;
    let scenario = Scenario::from_yaml(yaml, ".").unwrap();

    assert_eq!(scenario.csrf_token.as_deref(), Some("abc"));
    assert!(scenario.confirm);
    assert_eq!(scenario.replies.len(), 2);
    assert!(matches!(&scenario.replies[1], ScriptedReply::Fail { fail } if fail == "timeout"));
    assert_eq!(
        scenario.steps[0],
        ScenarioStep::Change {
            selector: "#x".into(),
            value: None,
            checked: None,
        }
    );
    match &scenario.steps[1] {
        ScenarioStep::Preview { selector, files } => {
            assert_eq!(selector, "#image-upload-input");
            assert_eq!(files[0].data_url, None);
        }
        other => panic!("expected preview, got {:?}", other),
    }
    assert_eq!(
        scenario.steps[3],
        ScenarioStep::Assert {
            assertions: vec![
                Assertion::NoAlerts,
                Assertion::ElementCount {
                    selector: "li".into(),
                    expected: 2,
                },
            ],
        }
    );
}

#[test]
fn unknown_action_is_a_yaml_error() {
    let yaml = "name: bad\nhtml: x\nsteps:\n  - action: hover\n    selector: a\n";
    let err = Scenario::from_yaml(yaml, ".").unwrap_err();
    assert!(err.to_string().contains("YAML"));
}

#[test]
fn context_counts_failures() {
    let mut ctx = ScenarioContext::new();
    ctx.record(vec![
        AssertionResult {
            step_index: 0,
            assertion: Assertion::NoAlerts,
            passed: true,
            actual: None,
            message: None,
        },
        AssertionResult {
            step_index: 1,
            assertion: Assertion::RequestsSent { expected: 1 },
            passed: false,
            actual: Some("0".into()),
            message: Some("0 request(s) sent, expected 1".into()),
        },
    ]);
    assert!(!ctx.all_passed());
    assert_eq!(ctx.fail_count(), 1);
}

// =========================================================================
// Runner
// =========================================================================

#[test]
fn inline_scenario_passes() {
    let scenario = Scenario::from_yaml(INLINE, ".").unwrap();
    let result = ScenarioRunner::run(&scenario, &RunOptions::default());

    assert!(result.passed, "{:?}", result);
    assert_eq!(result.steps_run, 2);
    assert_eq!(result.assertion_results.len(), 1);
    assert!(result.error.is_none());
}

#[test]
fn failed_assertions_are_collected_without_stopping() {
    let yaml = INLINE.replace("expected: 1", "expected: 5")
        + "  - action: click\n    selector: \"#add-form-row\"\n  - action: assert\n    assertions:\n      - type: indices_contiguous\n        formset: options\n";
    let scenario = Scenario::from_yaml(&yaml, ".").unwrap();
    let result = ScenarioRunner::run(&scenario, &RunOptions::default());

    assert!(!result.passed);
    assert!(result.error.is_none());
    assert_eq!(result.steps_run, 4);
    assert_eq!(result.assertion_results.len(), 2);
    assert!(!result.assertion_results[0].passed);
    assert_eq!(result.assertion_results[0].actual.as_deref(), Some("1"));
    assert!(result.assertion_results[1].passed);
}

#[test]
fn missing_element_stops_the_scenario() {
    let yaml = INLINE.replace("selector: \"#add-form-row\"", "selector: \"#nope\"");
    let scenario = Scenario::from_yaml(&yaml, ".").unwrap();
    let result = ScenarioRunner::run(&scenario, &RunOptions::default());

    assert!(!result.passed);
    assert_eq!(result.steps_run, 1);
    let error = result.error.unwrap();
    assert!(error.starts_with("Step 0 failed"), "{}", error);
    assert!(error.contains("#nope"));
}

#[test]
fn assertion_on_unknown_formset_fails_with_message() {
    let yaml = INLINE.replace("formset: options", "formset: sizes");
    let scenario = Scenario::from_yaml(&yaml, ".").unwrap();
    let result = ScenarioRunner::run(&scenario, &RunOptions::default());

    assert!(!result.passed);
    let message = result.assertion_results[0].message.clone().unwrap();
    assert!(message.contains("sizes"), "{}", message);
}

#[test]
fn scenario_without_page_reports_load_error() {
    let scenario = Scenario::from_yaml("name: empty\nsteps: []\n", ".").unwrap();
    let result = ScenarioRunner::run(&scenario, &RunOptions::default());

    assert!(!result.passed);
    assert_eq!(result.steps_run, 0);
    assert!(result.error.unwrap().contains("neither page nor html"));
}

#[test]
fn without_replies_or_server_requests_fail_and_revert() {
    let yaml = r##"
name: offline toggle
html: |
  <label class="toggle-switch"><input type="checkbox" data-product-id="3" checked></label>
steps:
  - action: change
    selector: input
    checked: false
  - action: assert
    assertions:
      - type: checked
        selector: input
      - type: requests_sent
        expected: 1
      - type: alert_contains
        expected: availability
"##;
    let scenario = Scenario::from_yaml(yaml, ".").unwrap();
    let options = RunOptions {
        csrf_token: Some("cfg".into()),
        ..RunOptions::default()
    };
    let result = ScenarioRunner::run(&scenario, &options);
    assert!(result.passed, "{:?}", result.assertion_results);
}

#[test]
fn trace_file_gets_one_line_per_component_and_event() {
    let dir = tempfile::tempdir().unwrap();
    let trace = dir.path().join("trace.jsonl");
    let scenario = Scenario::from_yaml(INLINE, ".").unwrap();
    let options = RunOptions {
        trace_path: Some(trace.display().to_string()),
        ..RunOptions::default()
    };

    let result = ScenarioRunner::run(&scenario, &options);
    assert!(result.passed);

    let content = std::fs::read_to_string(&trace).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(!lines.is_empty());
    assert!(lines.iter().any(|l| l["component"] == "formset:options"));
    assert!(lines.iter().all(|l| l["event"] == "click"));
}

// =========================================================================
// Fixture scenarios
// =========================================================================

#[test]
fn fixture_scenarios_all_pass() {
    let dir = fixture_path("scenarios");
    let scenarios = load_scenarios(dir.to_str().unwrap()).unwrap();
    assert_eq!(scenarios.len(), 6);

    let names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    for scenario in &scenarios {
        let result = ScenarioRunner::run(scenario, &RunOptions::default());
        let failures: Vec<_> = result
            .assertion_results
            .iter()
            .filter(|a| !a.passed)
            .collect();
        assert!(
            result.passed,
            "{}: error {:?}, failures {:?}",
            scenario.name, result.error, failures
        );
    }
}

#[test]
fn page_paths_resolve_from_scenario_file() {
    let scenario = Scenario::load(&fixture_path("scenarios/gallery.yaml")).unwrap();
    assert!(scenario.base_dir.ends_with("scenarios"));
    assert!(scenario.markup().unwrap().contains("gallery-grid"));
}
