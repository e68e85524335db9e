use crate::dom::document::{Document, NodeId};
use crate::dom::selector::Selector;
use crate::events::component::{Component, Context};
use crate::events::event::{Reaction, UiEvent};
use crate::widgets::switch_tab;

/// Category tabs on the menu page: `.tab-btn[data-target]` buttons over
/// `.category-section` panels.
pub struct Tabs {
    buttons: Vec<NodeId>,
    sections: Vec<NodeId>,
    button_selector: Selector,
}

impl Tabs {
    pub fn attach(doc: &Document) -> Option<Self> {
        let button_selector = Selector::parse(".tab-btn").ok()?;
        let buttons = doc.query_selector_all(doc.root(), &button_selector);
        if buttons.is_empty() {
            return None;
        }
        let sections = doc.select(doc.root(), ".category-section").ok()?;
        Some(Self {
            buttons,
            sections,
            button_selector,
        })
    }

    pub fn buttons(&self) -> &[NodeId] {
        &self.buttons
    }

    pub fn activate(&self, doc: &mut Document, button: NodeId) {
        switch_tab(doc, &self.buttons, &self.sections, button);
    }
}

impl Component for Tabs {
    fn name(&self) -> &str {
        "tabs"
    }

    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction {
        let UiEvent::Click { target } = event else {
            return Reaction::Ignored;
        };
        match cx.doc.closest(*target, &self.button_selector) {
            Some(button) if self.buttons.contains(&button) => {
                self.activate(cx.doc, button);
                Reaction::Handled
            }
            _ => Reaction::Ignored,
        }
    }
}
