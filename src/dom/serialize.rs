use crate::dom::document::{Document, NodeId, NodeKind};
use crate::dom::parser::VOID_ELEMENTS;

pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

pub fn serialize_children(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    for child in doc.children(id) {
        write_node(doc, *child, &mut out);
    }
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Root => {
            for child in doc.children(id) {
                write_node(doc, *child, out);
            }
        }
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in el.attributes() {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            match &el.raw {
                Some(raw) => out.push_str(raw),
                None => {
                    for child in doc.children(id) {
                        write_node(doc, *child, out);
                    }
                }
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}
