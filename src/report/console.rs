use crate::report::report_model::SuiteReport;
use crate::scenario::scenario_model::Assertion;

/// Format a suite report for terminal output.
///
/// ```text
/// === Scenarios: menu panel ===
///
/// ✓ PASS  add option rows (4 steps, 3 assertions)
/// ✗ FAIL  delete image (3 steps, 2 assertions)
///     [FAIL] Step 2: ElementCount: Element '.gallery-item' count is 2 but expected 1
///
/// === Results: 1 passed, 1 failed (2 total) ===
/// ```
pub fn format_console_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Scenarios: {} ===\n\n", report.suite_name));

    for result in &report.results {
        let marker = if result.passed {
            "\u{2713} PASS"
        } else {
            "\u{2717} FAIL"
        };
        out.push_str(&format!(
            "{}  {} ({} steps, {} assertions)\n",
            marker,
            result.scenario_name,
            result.steps_run,
            result.assertion_results.len()
        ));

        if let Some(error) = &result.error {
            out.push_str(&format!("    [ERROR] {}\n", error));
        }

        for ar in result.assertion_results.iter().filter(|a| !a.passed) {
            let detail = ar.message.as_deref().unwrap_or("assertion failed");
            out.push_str(&format!(
                "    [FAIL] Step {}: {}: {}\n",
                ar.step_index,
                assertion_name(&ar.assertion),
                detail
            ));
        }
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));
    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }
    out.push_str(" ===\n");

    out
}

fn assertion_name(assertion: &Assertion) -> &'static str {
    match assertion {
        Assertion::ElementCount { .. } => "ElementCount",
        Assertion::AttributeEquals { .. } => "AttributeEquals",
        Assertion::HasClass { .. } => "HasClass",
        Assertion::LacksClass { .. } => "LacksClass",
        Assertion::Hidden { .. } => "Hidden",
        Assertion::Visible { .. } => "Visible",
        Assertion::Checked { .. } => "Checked",
        Assertion::Unchecked { .. } => "Unchecked",
        Assertion::ValueEquals { .. } => "ValueEquals",
        Assertion::FormCount { .. } => "FormCount",
        Assertion::IndicesContiguous { .. } => "IndicesContiguous",
        Assertion::AlertContains { .. } => "AlertContains",
        Assertion::NoAlerts => "NoAlerts",
        Assertion::FirstChild { .. } => "FirstChild",
        Assertion::RequestsSent { .. } => "RequestsSent",
        Assertion::DefaultPrevented { .. } => "DefaultPrevented",
        Assertion::StorageEquals { .. } => "StorageEquals",
    }
}
