use tracing::warn;

use crate::dom::document::NodeId;
use crate::dom::selector::Selector;
use crate::error::PanelError;
use crate::events::component::{Component, Context};
use crate::events::event::{Reaction, UiEvent};
use crate::transport::transport_model::ActionRequest;

pub const TOGGLE_FAILED: &str = "Could not update the product's availability";

/// Product availability switches. The checkbox flips immediately; the
/// server either confirms (possibly correcting the state) or the flip is
/// undone and the user told.
///
/// Listens page-wide, so switches rendered after load are covered too.
pub struct AvailabilityToggle {
    selector: Selector,
}

impl AvailabilityToggle {
    pub fn new() -> Result<Self, PanelError> {
        Ok(Self {
            selector: Selector::parse(".toggle-switch input[data-product-id]")?,
        })
    }

    pub fn endpoint(product_id: &str) -> String {
        format!("/menu/product/{}/toggle/", product_id)
    }

    fn revert(cx: &mut Context<'_>, toggle: NodeId, optimistic: bool) {
        cx.doc.set_checked(toggle, !optimistic);
        cx.dialogs.alert(TOGGLE_FAILED);
    }
}

impl Component for AvailabilityToggle {
    fn name(&self) -> &str {
        "availability_toggle"
    }

    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction {
        let UiEvent::Change { target } = event else {
            return Reaction::Ignored;
        };
        let toggle = *target;
        if !cx.doc.matches(toggle, &self.selector) {
            return Reaction::Ignored;
        }
        let Some(product_id) = cx.doc.attr(toggle, "data-product-id").map(str::to_string) else {
            return Reaction::Ignored;
        };
        if product_id.is_empty() {
            return Reaction::Ignored;
        }

        let optimistic = cx.doc.is_checked(toggle);
        let mut request = ActionRequest::post(Self::endpoint(&product_id))
            .header("X-Requested-With", "XMLHttpRequest");
        if let Some(token) = cx.csrf_token() {
            request = request.field("csrfmiddlewaretoken", &token);
        }

        match cx.post(request) {
            Ok(reply) if reply.success => {
                if let Some(available) = reply.available {
                    cx.doc.set_checked(toggle, available);
                }
            }
            Ok(_) => Self::revert(cx, toggle, optimistic),
            Err(e) => {
                warn!(product = %product_id, error = %e, "availability toggle failed");
                Self::revert(cx, toggle, optimistic);
            }
        }
        Reaction::Handled
    }
}
