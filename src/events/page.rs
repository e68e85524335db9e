use tracing::debug;

use crate::dom::document::{Document, NodeId};
use crate::error::PanelError;
use crate::events::component::{Component, Context};
use crate::events::dialogs::RecordedDialogs;
use crate::events::event::{Dispatch, Reaction, UiEvent, UploadFile};
use crate::events::storage::LocalStorage;
use crate::formset::formset_config::FormsetConfig;
use crate::formset::manager::{FormsetRowManager, Removal};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;
use crate::transport::mock::MockTransport;
use crate::transport::transport_model::{ActionRequest, Transport};
use crate::widgets::{
    AvailabilityToggle, Gallery, Modals, SelectionRules, Sidebar, SubmitValidation, Tabs,
};

/// A loaded page: the document plus every component that found its anchors.
///
/// Events run one at a time through [`Page::dispatch`]; each attached
/// component sees the event in attach order (formsets first).
pub struct Page {
    doc: Document,
    formsets: Vec<FormsetRowManager>,
    widgets: Vec<Box<dyn Component>>,
    dialogs: RecordedDialogs,
    storage: LocalStorage,
    transport: Box<dyn Transport>,
    sent: Vec<ActionRequest>,
    csrf_token: Option<String>,
    tracer: TraceLogger,
    step: u64,
    last_dispatch: Dispatch,
}

impl Page {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            formsets: Vec::new(),
            widgets: Vec::new(),
            dialogs: RecordedDialogs::default(),
            storage: LocalStorage::new(),
            transport: Box::new(MockTransport::new()),
            sent: Vec::new(),
            csrf_token: None,
            tracer: TraceLogger::disabled(),
            step: 0,
            last_dispatch: Dispatch::default(),
        }
    }

    pub fn parse(html: &str) -> Result<Self, PanelError> {
        Ok(Self::new(Document::parse(html)?))
    }

    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    /// Token used when the page carries no `csrfmiddlewaretoken` field.
    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }

    /// Storage carried over from earlier visits; read when widgets attach.
    pub fn with_storage(mut self, storage: LocalStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_confirm_answer(mut self, answer: bool) -> Self {
        self.dialogs.set_answer(answer);
        self
    }

    // ------------------------------------------------------------------------
    // Attaching components
    // ------------------------------------------------------------------------

    /// Attach every formset in `configs` present on the page; returns how many.
    pub fn attach_formsets(&mut self, configs: &[FormsetConfig]) -> usize {
        let mut attached = 0;
        for config in configs {
            if self.formsets.iter().any(|f| f.prefix() == config.prefix) {
                continue;
            }
            if let Some(manager) = FormsetRowManager::attach(&self.doc, config) {
                self.formsets.push(manager);
                attached += 1;
            }
        }
        attached
    }

    /// Attach the page widgets whose anchors exist; returns how many.
    pub fn attach_widgets(&mut self) -> usize {
        let before = self.widgets.len();

        let sidebar = Sidebar::attach(&self.doc);
        if let Some(sidebar) = &sidebar {
            sidebar.restore(&mut self.doc, &self.storage);
        }

        let doc = &self.doc;

        let found: Vec<Option<Box<dyn Component>>> = vec![
            Tabs::attach(doc).map(|w| Box::new(w) as Box<dyn Component>),
            Modals::attach(doc).map(|w| Box::new(w) as Box<dyn Component>),
            SelectionRules::attach(doc).map(|w| Box::new(w) as Box<dyn Component>),
            AvailabilityToggle::new()
                .ok()
                .map(|w| Box::new(w) as Box<dyn Component>),
            Gallery::attach(doc).map(|w| Box::new(w) as Box<dyn Component>),
            SubmitValidation::attach(doc).map(|w| Box::new(w) as Box<dyn Component>),
            sidebar.map(|w| Box::new(w) as Box<dyn Component>),
        ];
        self.widgets.extend(found.into_iter().flatten());

        let attached = self.widgets.len() - before;
        debug!(attached, "widgets attached");
        attached
    }

    pub fn attach_all(&mut self, configs: &[FormsetConfig]) -> usize {
        self.attach_formsets(configs) + self.attach_widgets()
    }

    pub fn add_widget(&mut self, widget: Box<dyn Component>) {
        self.widgets.push(widget);
    }

    pub fn component_names(&self) -> Vec<String> {
        self.formsets
            .iter()
            .map(|f| f.name().to_string())
            .chain(self.widgets.iter().map(|w| w.name().to_string()))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn formsets(&self) -> &[FormsetRowManager] {
        &self.formsets
    }

    pub fn formset(&self, prefix: &str) -> Option<&FormsetRowManager> {
        self.formsets.iter().find(|f| f.prefix() == prefix)
    }

    pub fn alerts(&self) -> &[String] {
        &self.dialogs.alerts
    }

    pub fn confirms(&self) -> &[String] {
        &self.dialogs.confirms
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn requests(&self) -> &[ActionRequest] {
        &self.sent
    }

    pub fn last_dispatch(&self) -> &Dispatch {
        &self.last_dispatch
    }

    pub fn html(&self) -> String {
        self.doc.inner_html(self.doc.root())
    }

    // ------------------------------------------------------------------------
    // Formset shortcuts
    // ------------------------------------------------------------------------

    fn formset_index(&self, prefix: &str) -> Result<usize, PanelError> {
        self.formsets
            .iter()
            .position(|f| f.prefix() == prefix)
            .ok_or_else(|| PanelError::NodeNotFound {
                selector: format!("formset '{}'", prefix),
            })
    }

    pub fn add_row(&mut self, prefix: &str) -> Result<NodeId, PanelError> {
        let index = self.formset_index(prefix)?;
        self.formsets[index].add_row(&mut self.doc)
    }

    /// Remove the `row`-th row (document order, soft-deleted rows included).
    pub fn remove_row(&mut self, prefix: &str, row: usize) -> Result<Removal, PanelError> {
        let index = self.formset_index(prefix)?;
        let manager = &self.formsets[index];
        let missing = || PanelError::NodeNotFound {
            selector: format!("row {} of formset '{}'", row, prefix),
        };
        let node = manager.rows(&self.doc).get(row).copied().ok_or_else(missing)?;
        manager.remove_row(&mut self.doc, node).ok_or_else(missing)
    }

    // ------------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------------

    pub fn dispatch(&mut self, event: UiEvent) -> Dispatch {
        self.step += 1;
        let step = self.step;

        let mut cx = Context::new(
            &mut self.doc,
            &mut self.dialogs,
            &mut self.storage,
            self.transport.as_mut(),
            &mut self.sent,
            self.csrf_token.as_deref(),
        );

        let mut components: Vec<&mut dyn Component> = Vec::new();
        for formset in self.formsets.iter_mut() {
            components.push(formset);
        }
        for widget in self.widgets.iter_mut() {
            components.push(widget.as_mut());
        }

        let mut outcome = Dispatch::default();
        for component in components {
            let reaction = component.handle(&event, &mut cx);
            if reaction != Reaction::Ignored {
                outcome.handled_by.push(component.name().to_string());
            }
            if reaction == Reaction::DefaultPrevented {
                outcome.default_prevented = true;
            }
            let mut entry = TraceEvent::now(step, component.name(), &event).with_reaction(reaction);
            if reaction != Reaction::Ignored {
                if let Some(tag) = cx.doc.tag(event.target()) {
                    entry = entry.with_detail(format!("<{}>", tag));
                }
            }
            self.tracer.log(&entry);
        }

        self.last_dispatch = outcome.clone();
        outcome
    }

    pub fn click(&mut self, target: NodeId) -> Dispatch {
        self.dispatch(UiEvent::Click { target })
    }

    pub fn change(&mut self, target: NodeId) -> Dispatch {
        self.dispatch(UiEvent::Change { target })
    }

    pub fn submit(&mut self, form: NodeId) -> Dispatch {
        self.dispatch(UiEvent::Submit { form })
    }

    pub fn select_files(&mut self, target: NodeId, files: Vec<UploadFile>) -> Dispatch {
        self.dispatch(UiEvent::FilesSelected { target, files })
    }

    /// Click the first element matching `css`.
    pub fn click_selector(&mut self, css: &str) -> Result<Dispatch, PanelError> {
        let node = self.find(css)?;
        Ok(self.click(node))
    }

    pub fn find(&self, css: &str) -> Result<NodeId, PanelError> {
        self.doc
            .select_first(self.doc.root(), css)?
            .ok_or_else(|| PanelError::NodeNotFound {
                selector: css.to_string(),
            })
    }
}
