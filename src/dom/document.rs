use serde::Serialize;

use crate::dom::parser::parse_fragment;
use crate::dom::selector::Selector;
use crate::dom::serialize::{serialize_children, serialize_node};
use crate::error::PanelError;

/// Handle to a node inside one [`Document`]. Only meaningful for the
/// document that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot, stable for the lifetime of the document.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    attributes: Vec<(String, String)>,
    /// Unparsed body of raw-text elements (`script`, `style`, `template`).
    pub raw: Option<String>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            raw: None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|(k, _)| k == name)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name, value.to_string())),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|(k, _)| k != name);
        before != self.attributes.len()
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut classes: Vec<&str> = self.classes().collect();
        classes.push(class);
        let joined = classes.join(" ");
        self.set_attr("class", &joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let joined = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", &joined);
    }

    /// `input`, `select` and `textarea`: the elements a formset row submits.
    pub fn is_form_field(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    fn style_property(&self, property: &str) -> Option<String> {
        parse_style(self.attr("style").unwrap_or(""))
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    fn set_style_property(&mut self, property: &str, value: &str) {
        let mut declarations = parse_style(self.attr("style").unwrap_or(""));
        match declarations.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }
        let style = declarations
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("style", &style);
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim().to_ascii_lowercase();
            if k.is_empty() {
                return None;
            }
            Some((k, v.trim().to_string()))
        })
        .collect()
}

// ============================================================================
// Document arena
// ============================================================================

/// Arena-backed document tree. Detached nodes stay in the arena but are
/// unreachable from the root, so lookups never see them.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse a full page (or any fragment) into a fresh document.
    pub fn parse(html: &str) -> Result<Self, PanelError> {
        let mut doc = Self::new();
        let root = doc.root();
        doc.append_html(root, html)?;
        Ok(doc)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_attr(name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            el.add_class(class);
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_class(class);
        }
    }

    // ------------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|c| self.element(*c).is_some())
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    fn create(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.create(NodeKind::Element(element))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.create(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.create(NodeKind::Comment(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` as the first child of `parent`, moving it if attached elsewhere.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Parse `html` into detached top-level nodes owned by this document.
    pub fn parse_fragment(&mut self, html: &str) -> Result<Vec<NodeId>, PanelError> {
        parse_fragment(self, html)
    }

    /// Parse `html` and append it after the last child of `parent`.
    /// On a parse error the tree is left untouched.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, PanelError> {
        let nodes = self.parse_fragment(html)?;
        for node in &nodes {
            self.append_child(parent, *node);
        }
        Ok(nodes)
    }

    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), PanelError> {
        let nodes = self.parse_fragment(html)?;
        self.clear_children(id);
        for node in nodes {
            self.append_child(id, node);
        }
        Ok(())
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        match self.element(id).and_then(|el| el.raw.as_ref()) {
            Some(raw) => raw.clone(),
            None => serialize_children(self, id),
        }
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        serialize_node(self, id)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match &self.nodes[id.0].kind {
            NodeKind::Text(t) => t.clone(),
            NodeKind::Comment(_) => String::new(),
            _ => self
                .descendants(id)
                .into_iter()
                .filter_map(|n| match &self.nodes[n.0].kind {
                    NodeKind::Text(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| selector.matches(self, *n))
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    /// Nearest inclusive ancestor of `id` matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(n) = current {
            if selector.matches(self, n) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    pub fn select(&self, scope: NodeId, css: &str) -> Result<Vec<NodeId>, PanelError> {
        let selector = Selector::parse(css)?;
        Ok(self.query_selector_all(scope, &selector))
    }

    pub fn select_first(&self, scope: NodeId, css: &str) -> Result<Option<NodeId>, PanelError> {
        let selector = Selector::parse(css)?;
        Ok(self.query_selector(scope, &selector))
    }

    // ------------------------------------------------------------------------
    // Form state
    // ------------------------------------------------------------------------

    /// Current value of a form control, following browser rules for
    /// `select` (selected option, else first) and `textarea` (text body).
    pub fn value(&self, id: NodeId) -> String {
        match self.tag(id) {
            Some("select") => {
                let options: Vec<NodeId> = self
                    .descendants(id)
                    .into_iter()
                    .filter(|n| self.tag(*n) == Some("option"))
                    .collect();
                options
                    .iter()
                    .copied()
                    .find(|o| self.element(*o).is_some_and(|el| el.has_attr("selected")))
                    .or_else(|| options.first().copied())
                    .map(|o| self.option_value(o))
                    .unwrap_or_default()
            }
            Some("textarea") => self.text_content(id),
            Some("option") => self.option_value(id),
            _ => self.attr(id, "value").unwrap_or("").to_string(),
        }
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.attr(option, "value") {
            Some(v) => v.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        match self.tag(id) {
            Some("select") => {
                let options: Vec<NodeId> = self
                    .descendants(id)
                    .into_iter()
                    .filter(|n| self.tag(*n) == Some("option"))
                    .collect();
                for option in options {
                    if self.option_value(option) == value {
                        self.set_attr(option, "selected", "");
                    } else {
                        self.remove_attr(option, "selected");
                    }
                }
            }
            Some("textarea") => {
                self.clear_children(id);
                let text = self.create_text(value);
                self.append_child(id, text);
            }
            Some(_) => self.set_attr(id, "value", value),
            None => {}
        }
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.has_attr("checked"))
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if checked {
            self.set_attr(id, "checked", "");
        } else {
            self.remove_attr(id, "checked");
        }
    }

    /// Hide an element via inline `display: none`.
    pub fn hide(&mut self, id: NodeId) {
        if let Some(el) = self.element_mut(id) {
            el.set_style_property("display", "none");
        }
    }

    /// Hidden by itself or an ancestor: inline `display: none`, the
    /// `hidden` attribute, or the `d-none` utility class.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            if let Some(el) = self.element(n) {
                if el.has_attr("hidden")
                    || el.has_class("d-none")
                    || el.style_property("display").as_deref() == Some("none")
                {
                    return true;
                }
            }
            current = self.parent(n);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_property_is_replaced_not_duplicated() {
        let mut el = Element::new("div");
        el.set_attr("style", "color: red; display: block");
        el.set_style_property("display", "none");
        assert_eq!(el.attr("style"), Some("color: red; display: none;"));
        assert_eq!(el.style_property("display").as_deref(), Some("none"));
    }

    #[test]
    fn class_list_edits_keep_other_classes() {
        let mut el = Element::new("DIV");
        el.set_attr("class", "tab-btn  active");
        el.add_class("active");
        el.remove_class("tab-btn");
        assert_eq!(el.tag, "div");
        assert_eq!(el.attr("class"), Some("active"));
    }
}
