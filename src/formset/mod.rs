pub mod formset_config;
pub mod manager;
pub mod naming;
pub mod template;

pub use formset_config::FormsetConfig;
pub use manager::{FormsetRowManager, Removal};
pub use naming::FieldNaming;
pub use template::RowTemplate;
