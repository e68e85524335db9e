use serde::{Deserialize, Serialize};

use crate::dom::document::NodeId;

/// A file handed to an upload input. `data_url` stands in for what a
/// browser `FileReader` would produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    #[serde(default)]
    pub data_url: Option<String>,
}

impl UploadFile {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn data_url(&self) -> String {
        self.data_url
            .clone()
            .unwrap_or_else(|| format!("data:{};base64,", self.mime))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click { target: NodeId },
    Change { target: NodeId },
    Submit { form: NodeId },
    FilesSelected { target: NodeId, files: Vec<UploadFile> },
}

impl UiEvent {
    pub fn target(&self) -> NodeId {
        match self {
            UiEvent::Click { target }
            | UiEvent::Change { target }
            | UiEvent::FilesSelected { target, .. } => *target,
            UiEvent::Submit { form } => *form,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UiEvent::Click { .. } => "click",
            UiEvent::Change { .. } => "change",
            UiEvent::Submit { .. } => "submit",
            UiEvent::FilesSelected { .. } => "files_selected",
        }
    }
}

/// What a component did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reaction {
    #[default]
    Ignored,
    Handled,
    /// Handled, and the browser default (form submission) must not run
    DefaultPrevented,
}

/// Summary of one dispatch across every attached component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub handled_by: Vec<String>,
    pub default_prevented: bool,
}

impl Dispatch {
    pub fn was_handled(&self) -> bool {
        !self.handled_by.is_empty()
    }
}
