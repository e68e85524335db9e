use crate::dom::document::{Document, NodeId};
use crate::events::component::{Component, Context};
use crate::events::event::{Reaction, UiEvent};

pub const PRODUCT_FIELDS_REQUIRED: &str = "Please fill in all required fields";
pub const PRODUCT_PRICE_INVALID: &str = "Please enter a valid price";
pub const CATEGORY_NAME_REQUIRED: &str = "Please enter a category name";

/// Blocks submission of the add-product and add-category forms while a
/// required field is empty or the price is not a positive number.
pub struct SubmitValidation {
    product_form: Option<NodeId>,
    category_form: Option<NodeId>,
}

impl SubmitValidation {
    pub fn attach(doc: &Document) -> Option<Self> {
        let product_form = doc.select_first(doc.root(), "#productModal form").ok()?;
        let category_form = doc.select_first(doc.root(), "#manageCategoriesModal form").ok()?;
        if product_form.is_none() && category_form.is_none() {
            return None;
        }
        Some(Self {
            product_form,
            category_form,
        })
    }

    /// Value of the form's `name=<field>` control; absent controls read empty.
    fn field(doc: &Document, form: NodeId, field: &str) -> String {
        doc.select_first(form, &format!("[name=\"{}\"]", field))
            .ok()
            .flatten()
            .map(|node| doc.value(node))
            .unwrap_or_default()
    }

    /// The message to show, or `None` when the product form may submit.
    pub fn check_product(doc: &Document, form: NodeId) -> Option<&'static str> {
        let name = Self::field(doc, form, "name");
        let price = Self::field(doc, form, "price");
        let category = Self::field(doc, form, "category");

        if name.trim().is_empty() || price.trim().is_empty() || category.is_empty() {
            return Some(PRODUCT_FIELDS_REQUIRED);
        }
        match price.trim().parse::<f64>() {
            Ok(p) if p > 0.0 => None,
            _ => Some(PRODUCT_PRICE_INVALID),
        }
    }

    pub fn check_category(doc: &Document, form: NodeId) -> Option<&'static str> {
        if Self::field(doc, form, "name").trim().is_empty() {
            Some(CATEGORY_NAME_REQUIRED)
        } else {
            None
        }
    }
}

impl Component for SubmitValidation {
    fn name(&self) -> &str {
        "submit_validation"
    }

    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction {
        let UiEvent::Submit { form } = event else {
            return Reaction::Ignored;
        };
        let form = *form;

        let failure = if Some(form) == self.product_form {
            Self::check_product(cx.doc, form)
        } else if Some(form) == self.category_form {
            Self::check_category(cx.doc, form)
        } else {
            return Reaction::Ignored;
        };

        match failure {
            Some(message) => {
                cx.dialogs.alert(message);
                Reaction::DefaultPrevented
            }
            None => Reaction::Handled,
        }
    }
}
