use crate::dom::document::{Document, NodeId};
use crate::dom::selector::Selector;
use crate::events::component::{Component, Context};
use crate::events::event::{Reaction, UiEvent};
use crate::widgets::{ACTIVE, switch_tab};

/// Trigger button / modal overlay pairs known to the menu page.
pub const MODAL_PAIRS: &[(&str, &str)] = &[
    ("manageCategoriesBtn", "manageCategoriesModal"),
    ("addProductBtn", "productModal"),
    ("manageOptionsBtn", "manageOptionsModal"),
];

#[derive(Debug, Clone)]
struct ModalBinding {
    trigger: Option<NodeId>,
    modal: NodeId,
    close_button: Option<NodeId>,
    tab_buttons: Vec<NodeId>,
    tab_contents: Vec<NodeId>,
}

/// Opens modals from their trigger, closes them from `.close-btn` or a
/// click on the overlay itself, and switches `.modal-tab-btn` tabs inside.
pub struct Modals {
    bindings: Vec<ModalBinding>,
    tab_selector: Selector,
}

impl Modals {
    pub fn attach(doc: &Document) -> Option<Self> {
        let tab_selector = Selector::parse(".modal-tab-btn").ok()?;
        let close_selector = Selector::parse(".close-btn").ok()?;
        let content_selector = Selector::parse(".modal-tab-content").ok()?;

        let bind = |trigger: Option<NodeId>, modal: NodeId| ModalBinding {
            trigger,
            modal,
            close_button: doc.query_selector(modal, &close_selector),
            tab_buttons: doc.query_selector_all(modal, &tab_selector),
            tab_contents: doc.query_selector_all(modal, &content_selector),
        };

        let mut bindings = Vec::new();
        for (trigger_id, modal_id) in MODAL_PAIRS {
            if let (Some(trigger), Some(modal)) =
                (doc.get_element_by_id(trigger_id), doc.get_element_by_id(modal_id))
            {
                bindings.push(bind(Some(trigger), modal));
            }
        }

        // Overlays without a known trigger can still be closed.
        for overlay in doc.select(doc.root(), ".modal-overlay").ok()? {
            if !bindings.iter().any(|b| b.modal == overlay) {
                bindings.push(bind(None, overlay));
            }
        }

        if bindings.is_empty() {
            None
        } else {
            Some(Self {
                bindings,
                tab_selector,
            })
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Component for Modals {
    fn name(&self) -> &str {
        "modals"
    }

    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction {
        let UiEvent::Click { target } = event else {
            return Reaction::Ignored;
        };
        let target = *target;
        let tab_button = cx.doc.closest(target, &self.tab_selector);
        let mut reaction = Reaction::Ignored;

        for binding in &self.bindings {
            if binding.trigger.is_some_and(|t| cx.doc.contains(t, target)) {
                cx.doc.add_class(binding.modal, ACTIVE);
                reaction = Reaction::Handled;
            }
            if binding.close_button.is_some_and(|c| cx.doc.contains(c, target))
                || target == binding.modal
            {
                cx.doc.remove_class(binding.modal, ACTIVE);
                reaction = Reaction::Handled;
            }
            if let Some(button) = tab_button.filter(|b| binding.tab_buttons.contains(b)) {
                switch_tab(cx.doc, &binding.tab_buttons, &binding.tab_contents, button);
                reaction = Reaction::Handled;
            }
        }
        reaction
    }
}
