use std::fmt;

#[derive(Debug)]
pub enum PanelError {
    /// Reading a page, scenario, or report file failed
    Io { path: String, source: std::io::Error },

    /// HTML fragment could not be parsed
    Markup { offset: usize, message: String },

    /// CSS selector could not be parsed
    Selector { selector: String, message: String },

    /// Field-name pattern could not be compiled
    Pattern(regex::Error),

    /// Request never produced a response (connection, timeout, scripted failure)
    Transport { path: String, message: String },

    /// Endpoint answered with a non-success HTTP status
    HttpStatus { path: String, status: u16 },

    /// Response body or trace event was not valid JSON
    JsonParse { context: String, source: serde_json::Error },

    /// Scenario or config file was not valid YAML
    YamlParse { context: String, source: serde_yaml::Error },

    /// A selector or formset lookup matched nothing
    NodeNotFound { selector: String },

    /// Scenario is structurally unusable (no page, unknown formset, ...)
    Scenario(String),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::Io { path, source } => write!(f, "I/O error on '{}': {}", path, source),
            PanelError::Markup { offset, message } => {
                write!(f, "Markup error at byte {}: {}", offset, message)
            }
            PanelError::Selector { selector, message } => {
                write!(f, "Invalid selector '{}': {}", selector, message)
            }
            PanelError::Pattern(source) => write!(f, "Invalid field pattern: {}", source),
            PanelError::Transport { path, message } => {
                write!(f, "Request to {} failed: {}", path, message)
            }
            PanelError::HttpStatus { path, status } => {
                write!(f, "Request to {} returned HTTP {}", path, status)
            }
            PanelError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            PanelError::YamlParse { context, source } => {
                write!(f, "YAML parse error ({}): {}", context, source)
            }
            PanelError::NodeNotFound { selector } => write!(f, "Nothing matches '{}'", selector),
            PanelError::Scenario(msg) => write!(f, "Scenario error: {}", msg),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PanelError::Io { source, .. } => Some(source),
            PanelError::Pattern(source) => Some(source),
            PanelError::JsonParse { source, .. } => Some(source),
            PanelError::YamlParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<regex::Error> for PanelError {
    fn from(source: regex::Error) -> Self {
        PanelError::Pattern(source)
    }
}
