mod common;

use clap::Parser;
use menu_panel::cli::commands::{cmd_inspect, cmd_render, cmd_run, load_scenarios};
use menu_panel::cli::config::{
    AppConfig, Cli, Commands, DEFAULT_TRACE_PATH, build_run_options, load_config, log_filter,
};

use crate::common::utils::fixture_path;

fn fixture_str(name: &str) -> String {
    fixture_path(name).display().to_string()
}

// =========================================================================
// Argument parsing
// =========================================================================

#[test]
fn cli_parse_run_minimal() {
    let cli = Cli::parse_from(["menu-panel", "run", "--scenario", "scenarios/"]);
    assert_eq!(cli.verbose, 0);
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Run {
            scenario,
            format,
            output,
        } => {
            assert_eq!(scenario, "scenarios/");
            assert!(format.is_none());
            assert!(output.is_none());
        }
        other => panic!("Expected Run command, got {:?}", other),
    }
}

#[test]
fn cli_parse_run_all_args() {
    let cli = Cli::parse_from([
        "menu-panel",
        "-vv",
        "--config",
        "ci.yaml",
        "run",
        "--scenario",
        "s.yaml",
        "--format",
        "junit",
        "-o",
        "report.xml",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config.as_deref(), Some("ci.yaml"));
    match cli.command {
        Commands::Run { format, output, .. } => {
            assert_eq!(format.as_deref(), Some("junit"));
            assert_eq!(output.as_deref(), Some("report.xml"));
        }
        other => panic!("Expected Run command, got {:?}", other),
    }
}

#[test]
fn cli_parse_render_with_repeated_remove() {
    let cli = Cli::parse_from([
        "menu-panel", "render", "--page", "p.html", "--formset", "items", "--add", "2",
        "--remove", "0", "--remove", "2",
    ]);
    match cli.command {
        Commands::Render {
            page,
            formset,
            add,
            remove,
        } => {
            assert_eq!(page, "p.html");
            assert_eq!(formset, "items");
            assert_eq!(add, 2);
            assert_eq!(remove, vec![0, 2]);
        }
        other => panic!("Expected Render command, got {:?}", other),
    }
}

#[test]
fn cli_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["menu-panel"]).is_err());
    assert!(Cli::try_parse_from(["menu-panel", "inspect"]).is_err());
}

#[test]
fn verbosity_maps_to_filters() {
    assert_eq!(log_filter(0), "warn");
    assert_eq!(log_filter(1), "info");
    assert_eq!(log_filter(2), "debug");
    assert_eq!(log_filter(7), "trace");
}

// =========================================================================
// Config file
// =========================================================================

#[test]
fn missing_config_gives_defaults() {
    let config = load_config(Some("/definitely/not/here.yaml"));
    assert_eq!(config.http.timeout_ms, 5000);
    assert!(config.http.base_url.is_none());
    assert_eq!(config.run.format, "console");
    assert!(!config.trace.enabled);
    assert_eq!(config.trace.path, DEFAULT_TRACE_PATH);
    assert!(config.formsets.is_empty());
}

#[test]
fn malformed_config_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu-panel.yaml");
    std::fs::write(&path, "http: [this is: not a map").unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.http.timeout_ms, 5000);
}

#[test]
fn config_file_values_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu-panel.yaml");
    std::fs::write(
        &path,
        r#"
http:
  base_url: http://localhost:8000
  timeout_ms: 250
  csrf_token: from-config
run:
  format: junit
trace:
  enabled: true
  path: /tmp/panel.jsonl
formsets:
  - prefix: sides
    container_id: sides-container
    add_button_id: add-side
    template_id: empty-side-template
    row_class: side-row
    remove_class: remove-side
"#,
    )
    .unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.http.base_url.as_deref(), Some("http://localhost:8000"));
    assert_eq!(config.run.format, "junit");
    assert_eq!(config.formsets[0].placeholder, "__prefix__");
    assert!(!config.formsets[0].track_positions);

    let options = build_run_options(&config);
    assert_eq!(options.timeout_ms, 250);
    assert_eq!(options.csrf_token.as_deref(), Some("from-config"));
    assert_eq!(options.trace_path.as_deref(), Some("/tmp/panel.jsonl"));
    let prefixes: Vec<&str> = options.formsets.iter().map(|f| f.prefix.as_str()).collect();
    assert_eq!(prefixes, vec!["options", "items", "sides"]);
}

#[test]
fn disabled_trace_means_no_trace_path() {
    let options = build_run_options(&AppConfig::default());
    assert!(options.trace_path.is_none());
    assert_eq!(options.formsets.len(), 2);
}

// =========================================================================
// Subcommands
// =========================================================================

#[test]
fn load_scenarios_accepts_file_or_directory() {
    let one = load_scenarios(&fixture_str("scenarios/gallery.yaml")).unwrap();
    assert_eq!(one.len(), 1);

    let all = load_scenarios(&fixture_str("scenarios")).unwrap();
    assert!(all.len() > 1);
    assert!(load_scenarios("/no/such/dir").is_err());
}

#[test]
fn run_writes_junit_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("report.xml");

    let passed = cmd_run(
        &fixture_str("scenarios"),
        "junit",
        out.to_str(),
        &AppConfig::default(),
    )
    .unwrap();

    assert!(passed);
    let xml = std::fs::read_to_string(&out).unwrap();
    assert!(xml.contains("failures=\"0\""));
    assert!(xml.contains("classname=\"menu-panel\""));
}

#[test]
fn run_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("fail.yaml");
    std::fs::write(
        &scenario,
        "name: failing\nhtml: \"<ul><li>a</li></ul>\"\nsteps:\n  - action: assert\n    assertions:\n      - type: element_count\n        selector: li\n        expected: 2\n",
    )
    .unwrap();
    let out = dir.path().join("report.txt");

    let passed = cmd_run(
        scenario.to_str().unwrap(),
        "console",
        out.to_str(),
        &AppConfig::default(),
    )
    .unwrap();

    assert!(!passed);
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("\u{2717} FAIL  failing"));
}

#[test]
fn inspect_lists_components_and_rows() {
    let out = cmd_inspect(&fixture_str("options_page.html"), &AppConfig::default()).unwrap();

    assert!(out.contains("  - formset:options\n"));
    assert!(out.contains("  - selection_rules\n"));
    assert!(out.contains("Formset 'options': 2 rows, TOTAL_FORMS=2, indices [0, 1]\n"));
}

#[test]
fn render_applies_adds_then_removes() {
    let html = cmd_render(
        &fixture_str("meal_page.html"),
        "items",
        2,
        &[1],
        &AppConfig::default(),
    )
    .unwrap();

    assert!(html.contains(r#"name="items-TOTAL_FORMS" value="2""#));
    assert!(html.contains(r#"id="id_items-1-quantity""#));
    assert!(!html.contains("id_items-2-quantity"));
}

#[test]
fn render_unknown_formset_fails() {
    let result = cmd_render(
        &fixture_str("meal_page.html"),
        "options",
        1,
        &[],
        &AppConfig::default(),
    );
    assert!(result.is_err());
}
