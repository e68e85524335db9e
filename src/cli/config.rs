use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::formset::formset_config::{FormsetConfig, merge_formsets};
use crate::scenario::runner::RunOptions;

pub const DEFAULT_CONFIG_PATH: &str = "menu-panel.yaml";
pub const DEFAULT_TRACE_PATH: &str = "panel_trace.jsonl";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "menu-panel",
    version,
    about = "Replay and inspect the menu admin panel's formset and widget behaviour"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: menu-panel.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenario YAML files against their pages
    Run {
        /// Scenario file or directory of scenario files
        #[arg(long)]
        scenario: String,

        /// Output format: console, junit (default from config, else console)
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the components a page attaches and each formset's rows
    Inspect {
        #[arg(long)]
        page: String,
    },

    /// Apply formset operations to a page and print the resulting HTML
    Render {
        #[arg(long)]
        page: String,

        /// Formset prefix to operate on
        #[arg(long)]
        formset: String,

        /// Rows to add
        #[arg(long, default_value_t = 0)]
        add: usize,

        /// Row positions to remove, applied in order after adding
        #[arg(long)]
        remove: Vec<usize>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `menu-panel.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    /// Formsets beyond the built-in presets; same prefix replaces a preset
    #[serde(default)]
    pub formsets: Vec<FormsetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Panel origin for live requests; unset means scripted replies only
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    pub csrf_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            csrf_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_trace_path")]
    pub path: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_trace_path(),
        }
    }
}

fn default_timeout_ms() -> u64 { 5000 }
fn default_console() -> String { "console".to_string() }
fn default_trace_path() -> String { DEFAULT_TRACE_PATH.to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders
// ============================================================================

pub fn build_run_options(config: &AppConfig) -> RunOptions {
    RunOptions {
        formsets: merge_formsets(&config.formsets),
        base_url: config.http.base_url.clone(),
        timeout_ms: config.http.timeout_ms,
        csrf_token: config.http.csrf_token.clone(),
        trace_path: config
            .trace
            .enabled
            .then(|| config.trace.path.clone()),
    }
}

/// `-v` count to a default log filter; `RUST_LOG` overrides it.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
