pub mod component;
pub mod dialogs;
pub mod event;
pub mod page;
pub mod storage;

pub use component::{Component, Context};
pub use dialogs::{Dialogs, RecordedDialogs};
pub use event::{Dispatch, Reaction, UiEvent, UploadFile};
pub use page::Page;
pub use storage::LocalStorage;
