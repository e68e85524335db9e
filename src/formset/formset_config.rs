use serde::{Deserialize, Serialize};

/// Where a formset lives on the page and how its rows are marked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormsetConfig {
    /// Form prefix shared by every field name (`<prefix>-<index>-<field>`)
    pub prefix: String,

    pub container_id: String,
    pub add_button_id: String,
    pub template_id: String,

    /// Class carried by every row element
    pub row_class: String,

    /// Class of the per-row remove button
    pub remove_class: String,

    /// Token standing for the new row's index inside the template
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Keep `-position` fields in sync with display order
    #[serde(default)]
    pub track_positions: bool,
}

pub const DEFAULT_PLACEHOLDER: &str = "__prefix__";

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl FormsetConfig {
    /// Option-group editor: choices with a price adjustment and a position.
    pub fn options() -> Self {
        Self {
            prefix: "options".to_string(),
            container_id: "options-form-container".to_string(),
            add_button_id: "add-form-row".to_string(),
            template_id: "empty-form-template".to_string(),
            row_class: "option-form-row".to_string(),
            remove_class: "remove-form-row".to_string(),
            placeholder: default_placeholder(),
            track_positions: true,
        }
    }

    /// Meal editor: the products bundled into a meal.
    pub fn meal_items() -> Self {
        Self {
            prefix: "items".to_string(),
            container_id: "meal-items-container".to_string(),
            add_button_id: "add-item-row".to_string(),
            template_id: "empty-item-template".to_string(),
            row_class: "meal-item-row".to_string(),
            remove_class: "remove-item-row".to_string(),
            placeholder: default_placeholder(),
            track_positions: false,
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::options(), Self::meal_items()]
    }

    /// Id of the hidden management field holding the row count.
    pub fn total_forms_id(&self) -> String {
        format!("id_{}-TOTAL_FORMS", self.prefix)
    }
}

/// Presets overlaid with configured formsets; a configured entry replaces
/// the preset with the same prefix.
pub fn merge_formsets(extra: &[FormsetConfig]) -> Vec<FormsetConfig> {
    let mut merged = FormsetConfig::presets();
    for config in extra {
        match merged.iter_mut().find(|c| c.prefix == config.prefix) {
            Some(existing) => *existing = config.clone(),
            None => merged.push(config.clone()),
        }
    }
    merged
}
