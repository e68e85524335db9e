//! Headless model of the menu administration panel's browser glue.
//!
//! A page is parsed into an arena [`dom::Document`]; components bind to
//! the elements they need and react to [`events::UiEvent`]s dispatched
//! through [`events::Page`]. The formset row manager keeps Django formset
//! indices and `TOTAL_FORMS` consistent as rows are added and removed.

pub mod cli;
pub mod dom;
pub mod error;
pub mod events;
pub mod formset;
pub mod report;
pub mod scenario;
pub mod trace;
pub mod transport;
pub mod widgets;

pub use dom::{Document, NodeId};
pub use error::PanelError;
pub use events::{Page, UiEvent};
pub use formset::{FormsetConfig, FormsetRowManager, Removal};
