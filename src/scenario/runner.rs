use std::time::Duration;

use tracing::{debug, info};

use crate::dom::selector::Selector;
use crate::error::PanelError;
use crate::events::page::Page;
use crate::formset::formset_config::FormsetConfig;
use crate::scenario::assertions::evaluate_assertions;
use crate::scenario::context::ScenarioContext;
use crate::scenario::scenario_model::{Scenario, ScenarioResult, ScenarioStep};
use crate::trace::logger::TraceLogger;
use crate::transport::http::HttpTransport;
use crate::transport::mock::MockTransport;
use crate::transport::transport_model::Transport;

/// Settings shared by every scenario in a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub formsets: Vec<FormsetConfig>,

    /// Live endpoint for scenarios without scripted replies
    pub base_url: Option<String>,

    pub timeout_ms: u64,

    /// Used when neither the page nor the scenario supplies a token
    pub csrf_token: Option<String>,

    pub trace_path: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            formsets: FormsetConfig::presets(),
            base_url: None,
            timeout_ms: 5000,
            csrf_token: None,
            trace_path: None,
        }
    }
}

/// Executes a Scenario step-by-step against a freshly loaded Page.
pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Run a complete scenario.
    ///
    /// Page loading problems and steps that cannot run end the scenario
    /// with `error` set; assertion failures are collected and do not stop it.
    pub fn run(scenario: &Scenario, options: &RunOptions) -> ScenarioResult {
        let mut ctx = ScenarioContext::new();

        let mut page = match Self::load_page(scenario, options) {
            Ok(page) => page,
            Err(e) => {
                return ScenarioResult {
                    scenario_name: scenario.name.clone(),
                    passed: false,
                    steps_run: 0,
                    assertion_results: ctx.assertion_results,
                    error: Some(format!("Failed to load page: {}", e)),
                };
            }
        };
        info!(scenario = %scenario.name, components = ?page.component_names(), "page loaded");

        for (i, step) in scenario.steps.iter().enumerate() {
            ctx.current_step = i;

            if let Err(e) = Self::execute_step(step, i, &mut page, &mut ctx) {
                return ScenarioResult {
                    scenario_name: scenario.name.clone(),
                    passed: false,
                    steps_run: i + 1,
                    assertion_results: ctx.assertion_results,
                    error: Some(format!("Step {} failed: {}", i, e)),
                };
            }
        }

        if ctx.fail_count() > 0 {
            debug!(scenario = %scenario.name, failed = ctx.fail_count(), "assertions failed");
        }
        ScenarioResult {
            scenario_name: scenario.name.clone(),
            passed: ctx.all_passed(),
            steps_run: scenario.steps.len(),
            assertion_results: ctx.assertion_results,
            error: None,
        }
    }

    /// Parse the scenario's page and attach every component it carries.
    pub fn load_page(scenario: &Scenario, options: &RunOptions) -> Result<Page, PanelError> {
        let markup = scenario.markup()?;
        let tracer = match &options.trace_path {
            Some(path) => TraceLogger::new(path),
            None => TraceLogger::disabled(),
        };

        let mut page = Page::parse(&markup)?
            .with_transport(Self::transport_for(scenario, options)?)
            .with_tracer(tracer)
            .with_csrf_token(
                scenario
                    .csrf_token
                    .clone()
                    .or_else(|| options.csrf_token.clone()),
            )
            .with_storage(scenario.storage.clone())
            .with_confirm_answer(scenario.confirm);
        page.attach_all(&options.formsets);
        Ok(page)
    }

    /// Scripted replies win; otherwise the live server if one is
    /// configured; otherwise a transport that fails every request.
    fn transport_for(
        scenario: &Scenario,
        options: &RunOptions,
    ) -> Result<Box<dyn Transport>, PanelError> {
        if !scenario.replies.is_empty() {
            return Ok(Box::new(MockTransport::with_replies(
                scenario.replies.iter().cloned(),
            )));
        }
        match &options.base_url {
            Some(base_url) => Ok(Box::new(HttpTransport::new(
                base_url,
                Duration::from_millis(options.timeout_ms),
            )?)),
            None => Ok(Box::new(MockTransport::new())),
        }
    }

    fn execute_step(
        step: &ScenarioStep,
        step_index: usize,
        page: &mut Page,
        ctx: &mut ScenarioContext,
    ) -> Result<(), PanelError> {
        match step {
            ScenarioStep::Click { selector } => {
                page.click_selector(selector)?;
            }

            ScenarioStep::Change {
                selector,
                value,
                checked,
            } => {
                let node = page.find(selector)?;
                let doc = page.doc_mut();
                if let Some(value) = value {
                    doc.set_value(node, value);
                }
                match checked {
                    Some(checked) => doc.set_checked(node, *checked),
                    None if value.is_none() => {
                        let flipped = !doc.is_checked(node);
                        doc.set_checked(node, flipped);
                    }
                    None => {}
                }
                page.change(node);
            }

            ScenarioStep::Submit { selector } => {
                let node = page.find(selector)?;
                let form = page
                    .doc()
                    .closest(node, &Selector::parse("form")?)
                    .ok_or_else(|| PanelError::NodeNotFound {
                        selector: format!("form enclosing '{}'", selector),
                    })?;
                page.submit(form);
            }

            ScenarioStep::AddRow { formset } => {
                page.add_row(formset)?;
            }

            ScenarioStep::RemoveRow { formset, row } => {
                page.remove_row(formset, *row)?;
            }

            ScenarioStep::Preview { selector, files } => {
                let node = page.find(selector)?;
                page.select_files(node, files.clone());
            }

            ScenarioStep::Assert { assertions } => {
                ctx.record(evaluate_assertions(assertions, step_index, page));
            }
        }
        Ok(())
    }
}
