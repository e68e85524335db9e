use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::PanelError;
use crate::transport::transport_model::{ActionReply, ActionRequest, Transport};

/// Live transport against a running panel.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PanelError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PanelError::Transport {
                path: base_url.to_string(),
                message: format!("could not build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Transport for HttpTransport {
    fn post(&mut self, request: &ActionRequest) -> Result<ActionReply, PanelError> {
        let url = self.url_for(&request.path);
        debug!(%url, "POST");

        let mut builder = self.client.post(&url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder.send().map_err(|e| PanelError::Transport {
            path: request.path.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PanelError::HttpStatus {
                path: request.path.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| PanelError::Transport {
            path: request.path.clone(),
            message: format!("could not read body: {}", e),
        })?;

        serde_json::from_str(&body).map_err(|source| PanelError::JsonParse {
            context: format!("reply from {}", request.path),
            source,
        })
    }
}
