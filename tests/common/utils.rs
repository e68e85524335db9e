#![allow(dead_code)]

use std::path::PathBuf;

use menu_panel::dom::document::{Document, NodeId};
use menu_panel::events::page::Page;
use menu_panel::formset::formset_config::FormsetConfig;
use menu_panel::transport::mock::{MockTransport, ScriptedReply};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("missing fixture {}: {}", name, e))
}

/// Parse a fixture and attach every preset formset and widget.
pub fn load_page(name: &str) -> Page {
    let mut page = Page::parse(&fixture(name)).expect("fixture should parse");
    page.attach_all(&FormsetConfig::presets());
    page
}

pub fn load_page_with(name: &str, replies: Vec<ScriptedReply>) -> Page {
    let mut page = Page::parse(&fixture(name))
        .expect("fixture should parse")
        .with_transport(Box::new(MockTransport::with_replies(replies)));
    page.attach_all(&FormsetConfig::presets());
    page
}

pub fn all(doc: &Document, css: &str) -> Vec<NodeId> {
    doc.select(doc.root(), css).expect("valid selector")
}

pub fn first(doc: &Document, css: &str) -> NodeId {
    doc.select_first(doc.root(), css)
        .expect("valid selector")
        .unwrap_or_else(|| panic!("nothing matches {}", css))
}

/// `name` attributes of every field in `scope`, in document order.
pub fn field_names(doc: &Document, scope: NodeId) -> Vec<String> {
    doc.select(scope, "input, select, textarea")
        .expect("valid selector")
        .into_iter()
        .filter_map(|n| doc.attr(n, "name").map(str::to_string))
        .collect()
}
