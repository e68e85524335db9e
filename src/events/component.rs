use crate::dom::document::Document;
use crate::dom::selector::Selector;
use crate::error::PanelError;
use crate::events::dialogs::Dialogs;
use crate::events::event::{Reaction, UiEvent};
use crate::events::storage::LocalStorage;
use crate::transport::transport_model::{ActionReply, ActionRequest, Transport};

/// A piece of page behaviour bound to elements found at attach time.
///
/// Components subscribe once at page level and decide per event whether
/// the target concerns them, so rows and items created later need no
/// registration of their own.
pub trait Component {
    fn name(&self) -> &str;
    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction;
}

/// Everything a handler may touch while it runs.
pub struct Context<'a> {
    pub doc: &'a mut Document,
    pub dialogs: &'a mut dyn Dialogs,
    pub storage: &'a mut LocalStorage,
    transport: &'a mut dyn Transport,
    sent: &'a mut Vec<ActionRequest>,
    csrf_fallback: Option<&'a str>,
}

impl<'a> Context<'a> {
    pub fn new(
        doc: &'a mut Document,
        dialogs: &'a mut dyn Dialogs,
        storage: &'a mut LocalStorage,
        transport: &'a mut dyn Transport,
        sent: &'a mut Vec<ActionRequest>,
        csrf_fallback: Option<&'a str>,
    ) -> Self {
        Self {
            doc,
            dialogs,
            storage,
            transport,
            sent,
            csrf_fallback,
        }
    }

    /// Send a request, keeping a record of it on the page.
    pub fn post(&mut self, request: ActionRequest) -> Result<ActionReply, PanelError> {
        let result = self.transport.post(&request);
        self.sent.push(request);
        result
    }

    /// The page's `csrfmiddlewaretoken` field, else the configured token.
    pub fn csrf_token(&self) -> Option<String> {
        let from_page = Selector::parse("[name=csrfmiddlewaretoken]")
            .ok()
            .and_then(|sel| self.doc.query_selector(self.doc.root(), &sel))
            .map(|node| self.doc.value(node))
            .filter(|token| !token.is_empty());
        from_page.or_else(|| self.csrf_fallback.map(str::to_string))
    }
}
