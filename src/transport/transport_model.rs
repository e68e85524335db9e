use serde::{Deserialize, Serialize};

use crate::error::PanelError;

/// A POST issued by a widget: path relative to the panel origin, extra
/// headers, and urlencoded form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl ActionRequest {
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.form.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// JSON body returned by the toggle and gallery endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReply {
    pub success: bool,

    /// Authoritative availability, sent back by the toggle endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl ActionReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            available: None,
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            available: None,
        }
    }
}

/// Sends widget requests. Implementations complete synchronously; the
/// caller's handler does not return until a reply or error is known.
pub trait Transport {
    fn post(&mut self, request: &ActionRequest) -> Result<ActionReply, PanelError>;
}
