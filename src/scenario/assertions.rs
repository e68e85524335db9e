use crate::dom::document::NodeId;
use crate::error::PanelError;
use crate::events::page::Page;
use crate::scenario::scenario_model::{Assertion, AssertionResult};

/// Evaluate a list of assertions against the current page state.
pub fn evaluate_assertions(
    assertions: &[Assertion],
    step_index: usize,
    page: &Page,
) -> Vec<AssertionResult> {
    assertions
        .iter()
        .map(|assertion| evaluate_one(assertion, step_index, page))
        .collect()
}

/// Evaluate a single assertion. Lookup failures (a bad selector, a missing
/// element or formset) fail the assertion instead of aborting the run.
pub fn evaluate_one(assertion: &Assertion, step_index: usize, page: &Page) -> AssertionResult {
    let (passed, actual, message) = match check(assertion, page) {
        Ok(Check {
            passed,
            actual,
            failure,
        }) => (passed, actual, if passed { None } else { Some(failure) }),
        Err(e) => (false, None, Some(e.to_string())),
    };
    AssertionResult {
        step_index,
        assertion: assertion.clone(),
        passed,
        actual,
        message,
    }
}

struct Check {
    passed: bool,
    actual: Option<String>,
    failure: String,
}

impl Check {
    fn new(passed: bool, actual: impl ToString, failure: String) -> Self {
        Self {
            passed,
            actual: Some(actual.to_string()),
            failure,
        }
    }
}

fn check(assertion: &Assertion, page: &Page) -> Result<Check, PanelError> {
    let doc = page.doc();

    let check = match assertion {
        Assertion::ElementCount { selector, expected } => {
            let count = doc.select(doc.root(), selector)?.len();
            Check::new(
                count == *expected,
                count,
                format!(
                    "Element '{}' count is {} but expected {}",
                    selector, count, expected
                ),
            )
        }

        Assertion::AttributeEquals {
            selector,
            attribute,
            expected,
        } => {
            let node = page.find(selector)?;
            let actual = doc.attr(node, attribute);
            Check::new(
                actual == Some(expected.as_str()),
                actual.unwrap_or("(absent)"),
                format!(
                    "Attribute '{}' of '{}' does not equal '{}'",
                    attribute, selector, expected
                ),
            )
        }

        Assertion::HasClass { selector, class } => {
            let node = page.find(selector)?;
            Check::new(
                doc.has_class(node, class),
                class_list(page, node),
                format!("Element '{}' lacks class '{}'", selector, class),
            )
        }

        Assertion::LacksClass { selector, class } => {
            let node = page.find(selector)?;
            Check::new(
                !doc.has_class(node, class),
                class_list(page, node),
                format!("Element '{}' has class '{}'", selector, class),
            )
        }

        Assertion::Hidden { selector } => {
            let hidden = doc.is_hidden(page.find(selector)?);
            Check::new(
                hidden,
                hidden,
                format!("Element '{}' is visible", selector),
            )
        }

        Assertion::Visible { selector } => {
            let hidden = doc.is_hidden(page.find(selector)?);
            Check::new(
                !hidden,
                !hidden,
                format!("Element '{}' is hidden", selector),
            )
        }

        Assertion::Checked { selector } => {
            let checked = doc.is_checked(page.find(selector)?);
            Check::new(
                checked,
                checked,
                format!("Element '{}' is not checked", selector),
            )
        }

        Assertion::Unchecked { selector } => {
            let checked = doc.is_checked(page.find(selector)?);
            Check::new(
                !checked,
                checked,
                format!("Element '{}' is checked", selector),
            )
        }

        Assertion::ValueEquals { selector, expected } => {
            let value = doc.value(page.find(selector)?);
            Check::new(
                value == *expected,
                &value,
                format!("Value of '{}' is '{}', expected '{}'", selector, value, expected),
            )
        }

        Assertion::FormCount { formset, expected } => {
            let count = formset_of(page, formset)?.form_count(doc);
            Check::new(
                count == *expected,
                count,
                format!(
                    "Formset '{}' TOTAL_FORMS is {} but expected {}",
                    formset, count, expected
                ),
            )
        }

        Assertion::IndicesContiguous { formset } => {
            let manager = formset_of(page, formset)?;
            let indices = manager.indices(doc);
            Check::new(
                manager.is_consistent(doc),
                format!("{:?} (count {})", indices, manager.form_count(doc)),
                format!("Formset '{}' row indices are not 0..count", formset),
            )
        }

        Assertion::AlertContains { expected } => {
            let found = page.alerts().iter().any(|a| a.contains(expected.as_str()));
            Check::new(
                found,
                page.alerts().join(" | "),
                format!("No alert contains '{}'", expected),
            )
        }

        Assertion::NoAlerts => Check::new(
            page.alerts().is_empty(),
            page.alerts().len(),
            format!("{} alert(s) were shown", page.alerts().len()),
        ),

        Assertion::FirstChild { parent, selector } => {
            let parent_node = page.find(parent)?;
            let first = doc.first_element_child(parent_node);
            let matched = match first {
                Some(child) => doc.select(parent_node, selector)?.contains(&child),
                None => false,
            };
            let actual = first
                .map(|child| doc.outer_html(child))
                .unwrap_or_else(|| "(no children)".to_string());
            Check::new(
                matched,
                truncate(&actual, 80),
                format!("First child of '{}' does not match '{}'", parent, selector),
            )
        }

        Assertion::RequestsSent { expected } => {
            let sent = page.requests().len();
            Check::new(
                sent == *expected,
                sent,
                format!("{} request(s) sent, expected {}", sent, expected),
            )
        }

        Assertion::DefaultPrevented { expected } => {
            let prevented = page.last_dispatch().default_prevented;
            Check::new(
                prevented == *expected,
                prevented,
                format!(
                    "Last event default_prevented was {}, expected {}",
                    prevented, expected
                ),
            )
        }

        Assertion::StorageEquals { key, expected } => {
            let stored = page.storage().get(key);
            Check::new(
                stored == Some(expected.as_str()),
                stored.unwrap_or("(unset)"),
                format!("Stored '{}' is not '{}'", key, expected),
            )
        }
    };
    Ok(check)
}

fn formset_of<'p>(
    page: &'p Page,
    prefix: &str,
) -> Result<&'p crate::formset::manager::FormsetRowManager, PanelError> {
    page.formset(prefix).ok_or_else(|| PanelError::NodeNotFound {
        selector: format!("formset '{}'", prefix),
    })
}

fn class_list(page: &Page, node: NodeId) -> String {
    page.doc().attr(node, "class").unwrap_or("").to_string()
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}
