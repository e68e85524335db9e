/// Markup for one empty row, with a placeholder where the index goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTemplate {
    markup: String,
    placeholder: String,
}

impl RowTemplate {
    pub fn new(markup: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn has_placeholder(&self) -> bool {
        !self.placeholder.is_empty() && self.markup.contains(&self.placeholder)
    }

    /// Replace every placeholder occurrence with `index` in decimal.
    pub fn instantiate(&self, index: usize) -> String {
        if self.placeholder.is_empty() {
            return self.markup.clone();
        }
        self.markup.replace(&self.placeholder, &index.to_string())
    }
}
