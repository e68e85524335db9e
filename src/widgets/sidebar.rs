use tracing::{debug, warn};

use crate::dom::document::{Document, NodeId};
use crate::dom::selector::Selector;
use crate::dom::serialize::escape_text;
use crate::error::PanelError;
use crate::events::component::{Component, Context};
use crate::events::event::{Reaction, UiEvent};
use crate::events::storage::LocalStorage;
use crate::widgets::ACTIVE;

pub const HIDDEN_CLASS: &str = "hidden";
pub const STORAGE_KEY: &str = "sidebarHidden";

/// Panel navigation: `li` links under `#sidebar` switch the active entry
/// and load their `data-page` into `#mainContent`. Any
/// `[data-toggle="sidebar"]` control collapses the sidebar, and the
/// collapsed state is kept in storage for the next visit.
pub struct Sidebar {
    sidebar: NodeId,
    main_content: NodeId,
    links: Vec<NodeId>,
    link_selector: Selector,
    toggle_selector: Selector,
}

impl Sidebar {
    pub fn attach(doc: &Document) -> Option<Self> {
        let sidebar = doc.get_element_by_id("sidebar")?;
        let main_content = doc.get_element_by_id("mainContent")?;
        Self::bind(doc, sidebar, main_content).ok()
    }

    fn bind(doc: &Document, sidebar: NodeId, main_content: NodeId) -> Result<Self, PanelError> {
        let link_selector = Selector::parse("li")?;
        Ok(Self {
            sidebar,
            main_content,
            links: doc.query_selector_all(sidebar, &link_selector),
            link_selector,
            toggle_selector: Selector::parse(r#"[data-toggle="sidebar"]"#)?,
        })
    }

    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    /// Re-apply a collapsed state saved by an earlier visit.
    pub fn restore(&self, doc: &mut Document, storage: &LocalStorage) {
        if storage.flag(STORAGE_KEY) {
            doc.add_class(self.sidebar, HIDDEN_CLASS);
        }
    }

    pub fn toggle(&self, doc: &mut Document, storage: &mut LocalStorage) -> bool {
        let hidden = !doc.has_class(self.sidebar, HIDDEN_CLASS);
        if hidden {
            doc.add_class(self.sidebar, HIDDEN_CLASS);
        } else {
            doc.remove_class(self.sidebar, HIDDEN_CLASS);
        }
        storage.set(STORAGE_KEY, hidden);
        hidden
    }

    pub fn activate(&self, doc: &mut Document, link: NodeId) {
        for l in &self.links {
            doc.remove_class(*l, ACTIVE);
        }
        doc.add_class(link, ACTIVE);

        let Some(page) = doc.attr(link, "data-page").map(str::to_string) else {
            debug!("sidebar link has no data-page");
            return;
        };
        if let Err(e) = doc.set_inner_html(self.main_content, &page_markup(&page)) {
            warn!(page = %page, error = %e, "page content rejected");
        }
    }
}

/// Placeholder content for a panel page: a title-cased heading and a line
/// naming the page.
pub fn page_markup(page: &str) -> String {
    let mut chars = page.chars();
    let title: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!(
        "<h2>{}</h2><p>Content for {}</p>",
        escape_text(&title),
        escape_text(page)
    )
}

impl Component for Sidebar {
    fn name(&self) -> &str {
        "sidebar"
    }

    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction {
        let UiEvent::Click { target } = event else {
            return Reaction::Ignored;
        };
        let target = *target;

        if cx.doc.closest(target, &self.toggle_selector).is_some() {
            self.toggle(cx.doc, cx.storage);
            return Reaction::Handled;
        }

        if !cx.doc.contains(self.sidebar, target) {
            return Reaction::Ignored;
        }
        match cx.doc.closest(target, &self.link_selector) {
            Some(link) if self.links.contains(&link) => {
                self.activate(cx.doc, link);
                Reaction::Handled
            }
            _ => Reaction::Ignored,
        }
    }
}
