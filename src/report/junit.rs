use crate::report::report_model::SuiteReport;

const CLASSNAME: &str = "menu-panel";

/// Generate a JUnit XML report for CI systems.
///
/// ```xml
/// <?xml version="1.0" encoding="UTF-8"?>
/// <testsuite name="..." tests="2" failures="1" time="0.012">
///   <testcase name="add option rows" classname="menu-panel" />
///   <testcase name="delete image" classname="menu-panel">
///     <failure message="1 assertion(s) failed" type="AssertionFailure">Step 2: ...</failure>
///   </testcase>
/// </testsuite>
/// ```
pub fn generate_junit_xml(report: &SuiteReport) -> String {
    let time_attr = report
        .duration_ms
        .map(|ms| format!(" time=\"{:.3}\"", ms as f64 / 1000.0))
        .unwrap_or_default();

    let mut cases = String::new();
    for result in &report.results {
        let name = escape_xml(&result.scenario_name);
        if result.passed {
            cases.push_str(&format!(
                "  <testcase name=\"{}\" classname=\"{}\" />\n",
                name, CLASSNAME
            ));
            continue;
        }

        let mut body: Vec<String> = result
            .assertion_results
            .iter()
            .filter(|ar| !ar.passed)
            .map(|ar| {
                let msg = ar.message.as_deref().unwrap_or("assertion failed");
                format!("Step {}: {}", ar.step_index, msg)
            })
            .collect();
        let failure_count = body.len();
        if let Some(error) = &result.error {
            body.push(format!("Error: {}", error));
        }

        let message = if failure_count > 0 {
            format!("{} assertion(s) failed", failure_count)
        } else {
            "execution error".to_string()
        };

        cases.push_str(&format!(
            "  <testcase name=\"{name}\" classname=\"{class}\">\n    <failure message=\"{message}\" type=\"AssertionFailure\">{body}</failure>\n  </testcase>\n",
            name = name,
            class = CLASSNAME,
            message = escape_xml(&message),
            body = escape_xml(&body.join("\n")),
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuite name=\"{name}\" tests=\"{tests}\" failures=\"{failures}\"{time}>\n{cases}</testsuite>\n",
        name = escape_xml(&report.suite_name),
        tests = report.total,
        failures = report.failed,
        time = time_attr,
        cases = cases,
    )
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
