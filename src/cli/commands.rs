use std::path::Path;

use tracing::info;

use crate::cli::config::{AppConfig, build_run_options};
use crate::events::page::Page;
use crate::formset::formset_config::merge_formsets;
use crate::report::console::format_console_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::SuiteReport;
use crate::scenario::runner::ScenarioRunner;
use crate::scenario::scenario_model::Scenario;

// ============================================================================
// run subcommand
// ============================================================================

/// Run every scenario at `scenario_path`; returns whether all passed.
pub fn cmd_run(
    scenario_path: &str,
    format: &str,
    output: Option<&str>,
    config: &AppConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let scenarios = load_scenarios(scenario_path)?;

    if scenarios.is_empty() {
        eprintln!("No scenarios found at: {}", scenario_path);
        return Ok(true);
    }
    info!(count = scenarios.len(), "running scenarios");

    let options = build_run_options(config);
    let start = std::time::Instant::now();

    let mut results = Vec::new();
    for scenario in &scenarios {
        info!(scenario = %scenario.name, "running");
        results.push(ScenarioRunner::run(scenario, &options));
    }

    let report = SuiteReport::from_results(scenario_path, results)
        .with_duration(start.elapsed().as_millis());
    let all_passed = report.all_passed();

    let output_content = match format {
        "junit" => generate_junit_xml(&report),
        _ => format_console_report(&report),
    };

    match output {
        Some(path) => std::fs::write(path, &output_content)?,
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

/// Load one scenario file, or every `.yaml`/`.yml` file in a directory
/// sorted by scenario name.
pub fn load_scenarios(path: &str) -> Result<Vec<Scenario>, Box<dyn std::error::Error>> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_dir() {
        return Ok(vec![Scenario::load(Path::new(path))?]);
    }

    let mut scenarios = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let p = entry?.path();
        if p.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            scenarios.push(Scenario::load(&p)?);
        }
    }
    scenarios.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(scenarios)
}

// ============================================================================
// inspect subcommand
// ============================================================================

pub fn cmd_inspect(page_path: &str, config: &AppConfig) -> Result<String, Box<dyn std::error::Error>> {
    let page = load_page(page_path, config)?;
    let doc = page.doc();
    let mut out = String::new();

    out.push_str(&format!("Page: {}\n", page_path));
    out.push_str("Components:\n");
    for name in page.component_names() {
        out.push_str(&format!("  - {}\n", name));
    }

    for formset in page.formsets() {
        let indices: Vec<String> = formset
            .indices(doc)
            .iter()
            .map(|i| i.map_or_else(|| "?".to_string(), |i| i.to_string()))
            .collect();
        out.push_str(&format!(
            "Formset '{}': {} rows, TOTAL_FORMS={}, indices [{}]{}\n",
            formset.prefix(),
            formset.rows(doc).len(),
            formset.form_count(doc),
            indices.join(", "),
            if formset.is_consistent(doc) { "" } else { " (inconsistent)" }
        ));
    }
    Ok(out)
}

// ============================================================================
// render subcommand
// ============================================================================

pub fn cmd_render(
    page_path: &str,
    prefix: &str,
    add: usize,
    remove: &[usize],
    config: &AppConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut page = load_page(page_path, config)?;
    for _ in 0..add {
        page.add_row(prefix)?;
    }
    for row in remove {
        page.remove_row(prefix, *row)?;
    }
    Ok(page.html())
}

fn load_page(path: &str, config: &AppConfig) -> Result<Page, Box<dyn std::error::Error>> {
    let markup = std::fs::read_to_string(path)?;
    let mut page = Page::parse(&markup)?;
    page.attach_all(&merge_formsets(&config.formsets));
    Ok(page)
}
