use regex::{NoExpand, Regex};

use crate::error::PanelError;

/// The `<prefix>-<index>-<field>` convention for one formset prefix.
///
/// Patterns are anchored at the start of the attribute, so only the index
/// right after the prefix is ever touched; digits inside the field name
/// or in a nested prefix stay as they are.
#[derive(Debug, Clone)]
pub struct FieldNaming {
    prefix: String,
    name_pattern: Regex,
    id_pattern: Regex,
}

impl FieldNaming {
    pub fn new(prefix: &str) -> Result<Self, PanelError> {
        let escaped = regex::escape(prefix);
        Ok(Self {
            prefix: prefix.to_string(),
            name_pattern: Regex::new(&format!(r"^{}-(\d+)-", escaped))?,
            id_pattern: Regex::new(&format!(r"^id_{}-(\d+)-", escaped))?,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn field_name(&self, index: usize, field: &str) -> String {
        format!("{}-{}-{}", self.prefix, index, field)
    }

    pub fn field_id(&self, index: usize, field: &str) -> String {
        format!("id_{}-{}-{}", self.prefix, index, field)
    }

    /// Index embedded in a field name, if it follows the convention.
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.name_pattern
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn index_of_id(&self, id: &str) -> Option<usize> {
        self.id_pattern
            .captures(id)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// `None` when `name` does not belong to this formset.
    pub fn rewrite_name(&self, name: &str, index: usize) -> Option<String> {
        if !self.name_pattern.is_match(name) {
            return None;
        }
        let replacement = format!("{}-{}-", self.prefix, index);
        Some(
            self.name_pattern
                .replacen(name, 1, NoExpand(&replacement))
                .into_owned(),
        )
    }

    /// `None` when `id` does not belong to this formset.
    pub fn rewrite_id(&self, id: &str, index: usize) -> Option<String> {
        if !self.id_pattern.is_match(id) {
            return None;
        }
        let replacement = format!("id_{}-{}-", self.prefix, index);
        Some(
            self.id_pattern
                .replacen(id, 1, NoExpand(&replacement))
                .into_owned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_only_the_leading_index() {
        let naming = FieldNaming::new("items").unwrap();
        assert_eq!(
            naming.rewrite_name("items-12-extra-3-qty", 4).as_deref(),
            Some("items-4-extra-3-qty")
        );
        assert_eq!(
            naming.rewrite_id("id_items-12-size2", 0).as_deref(),
            Some("id_items-0-size2")
        );
    }

    #[test]
    fn ignores_other_prefixes() {
        let naming = FieldNaming::new("options").unwrap();
        assert_eq!(naming.rewrite_name("suboptions-1-name", 0), None);
        assert_eq!(naming.rewrite_name("options-TOTAL_FORMS", 0), None);
        assert_eq!(naming.rewrite_id("options-1-name", 0), None);
    }

    #[test]
    fn prefix_is_matched_literally() {
        let naming = FieldNaming::new("a.b").unwrap();
        assert_eq!(naming.index_of_name("a.b-2-x"), Some(2));
        assert_eq!(naming.index_of_name("axb-2-x"), None);
    }
}
