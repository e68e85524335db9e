use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PanelError;
use crate::events::event::UploadFile;
use crate::events::storage::LocalStorage;
use crate::transport::mock::ScriptedReply;

/// A scripted session against one page, usually loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Human-readable name for this scenario
    pub name: String,

    /// HTML file to load, relative to the scenario file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    /// Inline page markup, used when `page` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,

    /// Answers for requests, in order; when empty the live transport (if
    /// configured) is used instead
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<ScriptedReply>,

    /// Storage left behind by earlier visits
    #[serde(default, skip_serializing_if = "LocalStorage::is_empty")]
    pub storage: LocalStorage,

    /// Answer given to confirm dialogs
    #[serde(default = "default_confirm")]
    pub confirm: bool,

    pub steps: Vec<ScenarioStep>,

    /// Directory the scenario was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_confirm() -> bool {
    true
}

fn default_upload_input() -> String {
    "#image-upload-input".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Click the first element matching `selector`
    Click { selector: String },

    /// Edit a control, then fire `change`. With neither `value` nor
    /// `checked` a checkbox is flipped.
    Change {
        selector: String,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        checked: Option<bool>,
    },

    /// Submit the form matching (or enclosing) `selector`
    Submit { selector: String },

    /// Add a row to a formset directly
    AddRow { formset: String },

    /// Remove the `row`-th row of a formset directly
    RemoveRow { formset: String, row: usize },

    /// Pick files on an upload input
    Preview {
        #[serde(default = "default_upload_input")]
        selector: String,
        files: Vec<UploadFile>,
    },

    /// Check the page state
    Assert { assertions: Vec<Assertion> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assertion {
    ElementCount { selector: String, expected: usize },

    AttributeEquals {
        selector: String,
        attribute: String,
        expected: String,
    },

    HasClass { selector: String, class: String },

    LacksClass { selector: String, class: String },

    Hidden { selector: String },

    Visible { selector: String },

    Checked { selector: String },

    Unchecked { selector: String },

    ValueEquals { selector: String, expected: String },

    /// The formset's TOTAL_FORMS value
    FormCount { formset: String, expected: usize },

    /// Rows carry indices 0..count with count equal to the row total
    IndicesContiguous { formset: String },

    AlertContains { expected: String },

    NoAlerts,

    /// The first element child of `parent` matches `selector`
    FirstChild { parent: String, selector: String },

    RequestsSent { expected: usize },

    /// Whether the last dispatched event had its default prevented
    DefaultPrevented { expected: bool },

    /// A stored key holds `expected`
    StorageEquals { key: String, expected: String },
}

/// Result of evaluating a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// Which step this assertion belongs to (0-indexed)
    pub step_index: usize,

    pub assertion: Assertion,

    pub passed: bool,

    /// Actual value found (for debugging failed assertions)
    pub actual: Option<String>,

    /// Human-readable failure message
    pub message: Option<String>,
}

/// Result of running a complete scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,

    /// Whether all steps ran and all assertions passed
    pub passed: bool,

    pub steps_run: usize,

    pub assertion_results: Vec<AssertionResult>,

    /// Set when a step could not run (as opposed to an assertion failing)
    pub error: Option<String>,
}

impl Scenario {
    /// Parse a scenario from YAML; `page` paths resolve against `base_dir`.
    pub fn from_yaml(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, PanelError> {
        Self::parse(content, "scenario", base_dir.into())
    }

    pub fn load(path: &Path) -> Result<Self, PanelError> {
        let content = std::fs::read_to_string(path).map_err(|source| PanelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&content, &path.display().to_string(), base_dir)
    }

    fn parse(content: &str, context: &str, base_dir: PathBuf) -> Result<Self, PanelError> {
        let mut scenario: Scenario =
            serde_yaml::from_str(content).map_err(|source| PanelError::YamlParse {
                context: context.to_string(),
                source,
            })?;
        scenario.base_dir = base_dir;
        Ok(scenario)
    }

    /// The page markup, read from `page` or taken from `html`.
    pub fn markup(&self) -> Result<String, PanelError> {
        if let Some(page) = &self.page {
            let path = self.base_dir.join(page);
            return std::fs::read_to_string(&path).map_err(|source| PanelError::Io {
                path: path.display().to_string(),
                source,
            });
        }
        self.html.clone().ok_or_else(|| {
            PanelError::Scenario(format!("scenario '{}' has neither page nor html", self.name))
        })
    }
}
