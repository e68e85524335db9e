use tracing::{debug, warn};

use crate::dom::document::{Document, NodeId};
use crate::dom::selector::Selector;
use crate::error::PanelError;
use crate::events::component::{Component, Context};
use crate::events::event::{Reaction, UiEvent};
use crate::formset::formset_config::FormsetConfig;
use crate::formset::naming::FieldNaming;
use crate::formset::template::RowTemplate;

/// How `remove_row` disposed of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Row existed on the server: delete flag set, row hidden, index kept.
    SoftDeleted,
    /// Row was added on this page: taken out and the rest re-indexed.
    Removed,
}

/// Keeps a formset's rows and its `TOTAL_FORMS` field consistent while rows
/// are added and removed.
///
/// Invariant after every operation: the rows in the container carry
/// indices `0..count` in document order, and the count field equals the
/// number of rows present (soft-deleted rows included).
#[derive(Debug, Clone)]
pub struct FormsetRowManager {
    label: String,
    config: FormsetConfig,
    naming: FieldNaming,
    template: RowTemplate,
    container: NodeId,
    add_button: NodeId,
    count_field: NodeId,
    row_selector: Selector,
    remove_selector: Selector,
    delete_selector: Selector,
    position_selector: Selector,
    field_selector: Selector,
    label_selector: Selector,
}

impl FormsetRowManager {
    /// Bind to the formset described by `config`, or `None` if the page
    /// does not carry it (any anchor missing or unusable).
    pub fn attach(doc: &Document, config: &FormsetConfig) -> Option<Self> {
        let prefix = config.prefix.as_str();
        let container = anchor(doc, prefix, &config.container_id)?;
        let add_button = anchor(doc, prefix, &config.add_button_id)?;
        let template_node = anchor(doc, prefix, &config.template_id)?;
        let count_field = anchor(doc, prefix, &config.total_forms_id())?;

        let markup = doc.inner_html(template_node);
        if markup.trim().is_empty() {
            debug!(formset = prefix, "empty row template; not attaching");
            return None;
        }
        if doc.value(count_field).trim().parse::<usize>().is_err() {
            debug!(formset = prefix, "TOTAL_FORMS is not a number; not attaching");
            return None;
        }

        let template = RowTemplate::new(markup, config.placeholder.as_str());
        if !template.has_placeholder() {
            debug!(formset = prefix, placeholder = %config.placeholder, "template has no placeholder");
        }

        match Self::bind(config, template, container, add_button, count_field) {
            Ok(manager) => Some(manager),
            Err(e) => {
                debug!(formset = prefix, error = %e, "formset config unusable; not attaching");
                None
            }
        }
    }

    fn bind(
        config: &FormsetConfig,
        template: RowTemplate,
        container: NodeId,
        add_button: NodeId,
        count_field: NodeId,
    ) -> Result<Self, PanelError> {
        Ok(Self {
            label: format!("formset:{}", config.prefix),
            config: config.clone(),
            naming: FieldNaming::new(&config.prefix)?,
            template,
            container,
            add_button,
            count_field,
            row_selector: Selector::parse(&format!(".{}", config.row_class))?,
            remove_selector: Selector::parse(&format!(".{}", config.remove_class))?,
            delete_selector: Selector::parse(r#"input[type="checkbox"][id$="-DELETE"]"#)?,
            position_selector: Selector::parse(r#"input[id$="-position"]"#)?,
            field_selector: Selector::parse("input, select, textarea")?,
            label_selector: Selector::parse("label[for]")?,
        })
    }

    pub fn config(&self) -> &FormsetConfig {
        &self.config
    }

    pub fn prefix(&self) -> &str {
        self.naming.prefix()
    }

    pub fn naming(&self) -> &FieldNaming {
        &self.naming
    }

    pub fn template(&self) -> &RowTemplate {
        &self.template
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn add_button(&self) -> NodeId {
        self.add_button
    }

    /// Rows currently in the container, in document order.
    pub fn rows(&self, doc: &Document) -> Vec<NodeId> {
        doc.query_selector_all(self.container, &self.row_selector)
    }

    /// Value of the count field; unreadable values count as zero.
    pub fn form_count(&self, doc: &Document) -> usize {
        doc.value(self.count_field).trim().parse().unwrap_or(0)
    }

    fn set_form_count(&self, doc: &mut Document, count: usize) {
        doc.set_value(self.count_field, &count.to_string());
    }

    /// Append a fresh row built from the template at index `form_count`.
    ///
    /// Existing rows are not touched. If the instantiated markup does not
    /// parse, or yields no element, the document and count are unchanged.
    pub fn add_row(&self, doc: &mut Document) -> Result<NodeId, PanelError> {
        let index = self.form_count(doc);
        let markup = self.template.instantiate(index);
        let nodes = doc.parse_fragment(&markup)?;

        let row = nodes
            .iter()
            .copied()
            .find(|n| doc.matches(*n, &self.row_selector))
            .or_else(|| nodes.iter().copied().find(|n| doc.element(*n).is_some()))
            .ok_or_else(|| PanelError::Markup {
                offset: 0,
                message: format!("template for '{}' produced no element", self.prefix()),
            })?;

        for node in nodes {
            doc.append_child(self.container, node);
        }
        self.set_form_count(doc, index + 1);
        debug!(formset = self.prefix(), index, "row added");

        if self.config.track_positions {
            self.update_positions(doc);
        }
        Ok(row)
    }

    /// Remove `row` the way the server expects: soft delete for rows it
    /// knows about, hard removal plus re-index for rows added on the page.
    /// Returns `None` when `row` is not one of this formset's rows.
    pub fn remove_row(&self, doc: &mut Document, row: NodeId) -> Option<Removal> {
        if !self.rows(doc).contains(&row) {
            return None;
        }

        let removal = match doc.query_selector(row, &self.delete_selector) {
            Some(delete_field) => {
                doc.set_checked(delete_field, true);
                doc.hide(row);
                Removal::SoftDeleted
            }
            None => {
                doc.detach(row);
                let count = self.form_count(doc);
                self.set_form_count(doc, count.saturating_sub(1));
                self.reindex(doc);
                Removal::Removed
            }
        };
        debug!(formset = self.prefix(), ?removal, "row removed");

        if self.config.track_positions {
            self.update_positions(doc);
        }
        Some(removal)
    }

    /// Renumber every row by document order and set the count to match.
    ///
    /// Only the index segment after the prefix changes; labels pointing at a
    /// rewritten id follow it.
    pub fn reindex(&self, doc: &mut Document) {
        let rows = self.rows(doc);
        for (index, row) in rows.iter().enumerate() {
            for field in doc.query_selector_all(*row, &self.field_selector) {
                let new_name = doc
                    .attr(field, "name")
                    .and_then(|name| self.naming.rewrite_name(name, index));
                if let Some(name) = new_name {
                    doc.set_attr(field, "name", &name);
                }

                let new_id = doc
                    .attr(field, "id")
                    .and_then(|id| self.naming.rewrite_id(id, index));
                if let Some(id) = new_id {
                    doc.set_attr(field, "id", &id);
                }
            }

            for label in doc.query_selector_all(*row, &self.label_selector) {
                let new_for = doc
                    .attr(label, "for")
                    .and_then(|target| self.naming.rewrite_id(target, index));
                if let Some(target) = new_for {
                    doc.set_attr(label, "for", &target);
                }
            }
        }
        self.set_form_count(doc, rows.len());
        debug!(formset = self.prefix(), rows = rows.len(), "reindexed");
    }

    /// Write each row's display order into its `-position` field, if any.
    pub fn update_positions(&self, doc: &mut Document) {
        for (order, row) in self.rows(doc).into_iter().enumerate() {
            if let Some(position) = doc.query_selector(row, &self.position_selector) {
                doc.set_value(position, &order.to_string());
            }
        }
    }

    /// Index each row's fields carry, taken from its first field that
    /// follows the naming convention.
    pub fn indices(&self, doc: &Document) -> Vec<Option<usize>> {
        self.rows(doc)
            .into_iter()
            .map(|row| {
                doc.query_selector_all(row, &self.field_selector)
                    .into_iter()
                    .find_map(|field| {
                        doc.attr(field, "name")
                            .and_then(|name| self.naming.index_of_name(name))
                    })
            })
            .collect()
    }

    /// Rows carry exactly `0..count` in order and count equals the row total.
    pub fn is_consistent(&self, doc: &Document) -> bool {
        let count = self.form_count(doc);
        let indices = self.indices(doc);
        indices.len() == count
            && indices
                .iter()
                .enumerate()
                .all(|(i, index)| *index == Some(i))
    }

    pub fn is_soft_deleted(&self, doc: &Document, row: NodeId) -> bool {
        doc.query_selector(row, &self.delete_selector)
            .is_some_and(|field| doc.is_checked(field))
    }
}

fn anchor(doc: &Document, prefix: &str, id: &str) -> Option<NodeId> {
    let node = doc.get_element_by_id(id);
    if node.is_none() {
        debug!(formset = prefix, anchor = id, "anchor missing; not attaching");
    }
    node
}

impl Component for FormsetRowManager {
    fn name(&self) -> &str {
        &self.label
    }

    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction {
        let UiEvent::Click { target } = event else {
            return Reaction::Ignored;
        };
        let target = *target;

        if cx.doc.contains(self.add_button, target) {
            return match self.add_row(cx.doc) {
                Ok(_) => Reaction::Handled,
                Err(e) => {
                    warn!(formset = self.prefix(), error = %e, "could not add row");
                    Reaction::Ignored
                }
            };
        }

        if !cx.doc.contains(self.container, target) {
            return Reaction::Ignored;
        }
        let Some(button) = cx.doc.closest(target, &self.remove_selector) else {
            return Reaction::Ignored;
        };
        let Some(row) = cx.doc.closest(button, &self.row_selector) else {
            return Reaction::Ignored;
        };

        match self.remove_row(cx.doc, row) {
            Some(_) => Reaction::Handled,
            None => Reaction::Ignored,
        }
    }
}
