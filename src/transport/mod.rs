pub mod http;
pub mod mock;
pub mod transport_model;

pub use http::HttpTransport;
pub use mock::{MockTransport, ScriptedReply};
pub use transport_model::{ActionReply, ActionRequest, Transport};
