use crate::dom::document::{Document, NodeId};
use crate::events::component::{Component, Context};
use crate::events::event::{Reaction, UiEvent};
use crate::widgets::HIDDEN;

pub const MULTIPLE: &str = "MULTIPLE";

/// Shows the multi-select limits only while the option group's selection
/// type is `MULTIPLE`.
pub struct SelectionRules {
    select: NodeId,
    rules: NodeId,
}

impl SelectionRules {
    pub fn attach(doc: &Document) -> Option<Self> {
        Some(Self {
            select: doc.get_element_by_id("id_selection_type")?,
            rules: doc.get_element_by_id("multi-select-rules")?,
        })
    }
}

impl Component for SelectionRules {
    fn name(&self) -> &str {
        "selection_rules"
    }

    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction {
        match event {
            UiEvent::Change { target } if *target == self.select => {
                if cx.doc.value(self.select) == MULTIPLE {
                    cx.doc.remove_class(self.rules, HIDDEN);
                } else {
                    cx.doc.add_class(self.rules, HIDDEN);
                }
                Reaction::Handled
            }
            _ => Reaction::Ignored,
        }
    }
}
