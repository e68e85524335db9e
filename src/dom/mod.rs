pub mod document;
pub mod parser;
pub mod selector;
pub mod serialize;

pub use document::{Document, Element, NodeId, NodeKind};
pub use selector::Selector;
