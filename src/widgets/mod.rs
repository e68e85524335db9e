pub mod gallery;
pub mod modal;
pub mod selection_rules;
pub mod sidebar;
pub mod tabs;
pub mod toggle;
pub mod validation;

pub use gallery::Gallery;
pub use modal::Modals;
pub use selection_rules::SelectionRules;
pub use sidebar::Sidebar;
pub use tabs::Tabs;
pub use toggle::AvailabilityToggle;
pub use validation::SubmitValidation;

use crate::dom::document::{Document, NodeId};

pub(crate) const ACTIVE: &str = "active";
pub(crate) const HIDDEN: &str = "d-none";

/// Make `button` and the panel named by its `data-target` the active pair
/// among `buttons` / `panels`. A missing panel still switches the buttons.
pub(crate) fn switch_tab(doc: &mut Document, buttons: &[NodeId], panels: &[NodeId], button: NodeId) {
    for b in buttons {
        doc.remove_class(*b, ACTIVE);
    }
    for p in panels {
        doc.remove_class(*p, ACTIVE);
    }
    doc.add_class(button, ACTIVE);

    let target = doc
        .attr(button, "data-target")
        .and_then(|id| doc.get_element_by_id(id));
    if let Some(panel) = target {
        doc.add_class(panel, ACTIVE);
    }
}
