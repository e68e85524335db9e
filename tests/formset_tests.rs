mod common;

use std::collections::HashSet;

use menu_panel::dom::document::{Document, NodeId};
use menu_panel::error::PanelError;
use menu_panel::formset::formset_config::{FormsetConfig, merge_formsets};
use menu_panel::formset::manager::{FormsetRowManager, Removal};

use crate::common::utils::{all, field_names, first, fixture, load_page};

fn options_doc() -> (Document, FormsetRowManager) {
    let doc = Document::parse(&fixture("options_page.html")).expect("fixture parses");
    let manager = FormsetRowManager::attach(&doc, &FormsetConfig::options()).expect("attaches");
    (doc, manager)
}

const BARE_FORMSET: &str = r#"
<input type="hidden" id="id_options-TOTAL_FORMS" name="options-TOTAL_FORMS" value="0">
<div id="options-form-container"></div>
<button id="add-form-row">Add</button>
<template id="empty-form-template"><div class="option-form-row"><input name="options-__prefix__-name" id="id_options-__prefix__-name"><button class="remove-form-row">x</button></div></template>
"#;

// =========================================================================
// attach
// =========================================================================

#[test]
fn attach_binds_options_formset_from_page() {
    let page = load_page("options_page.html");
    let formset = page.formset("options").expect("options formset attached");

    assert_eq!(formset.form_count(page.doc()), 2);
    assert_eq!(formset.rows(page.doc()).len(), 2);
    assert_eq!(formset.indices(page.doc()), vec![Some(0), Some(1)]);
    assert!(formset.is_consistent(page.doc()));
    assert!(page.formset("items").is_none());
}

#[test]
fn attach_is_silent_when_an_anchor_is_missing() {
    let without_button = BARE_FORMSET.replace(r#"<button id="add-form-row">Add</button>"#, "");
    let doc = Document::parse(&without_button).unwrap();
    assert!(FormsetRowManager::attach(&doc, &FormsetConfig::options()).is_none());

    let without_count = BARE_FORMSET.replace("id_options-TOTAL_FORMS", "id_other-TOTAL_FORMS");
    let doc = Document::parse(&without_count).unwrap();
    assert!(FormsetRowManager::attach(&doc, &FormsetConfig::options()).is_none());
}

#[test]
fn attach_rejects_empty_template_and_non_numeric_count() {
    let empty_template = BARE_FORMSET.replace(
        r#"<div class="option-form-row"><input name="options-__prefix__-name" id="id_options-__prefix__-name"><button class="remove-form-row">x</button></div>"#,
        "   ",
    );
    let doc = Document::parse(&empty_template).unwrap();
    assert!(FormsetRowManager::attach(&doc, &FormsetConfig::options()).is_none());

    let bad_count = BARE_FORMSET.replace(r#"value="0""#, r#"value="two""#);
    let doc = Document::parse(&bad_count).unwrap();
    assert!(FormsetRowManager::attach(&doc, &FormsetConfig::options()).is_none());
}

#[test]
fn merged_formsets_replace_presets_by_prefix() {
    let mut custom = FormsetConfig::options();
    custom.container_id = "choices".to_string();
    let extra = FormsetConfig {
        prefix: "sides".to_string(),
        ..FormsetConfig::meal_items()
    };

    let merged = merge_formsets(&[custom, extra]);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].container_id, "choices");
    assert_eq!(merged[2].prefix, "sides");
    assert_eq!(merged[2].total_forms_id(), "id_sides-TOTAL_FORMS");
}

// =========================================================================
// add_row
// =========================================================================

#[test]
fn add_row_appends_next_index_and_bumps_count() {
    let mut page = load_page("options_page.html");
    let before: Vec<String> = {
        let doc = page.doc();
        let rows = page.formset("options").unwrap().rows(doc);
        rows.iter().flat_map(|r| field_names(doc, *r)).collect()
    };

    let dispatch = page.click_selector("#add-form-row").unwrap();
    assert_eq!(dispatch.handled_by, vec!["formset:options".to_string()]);

    let doc = page.doc();
    let formset = page.formset("options").unwrap();
    let rows = formset.rows(doc);
    assert_eq!(rows.len(), 3);
    assert_eq!(formset.form_count(doc), 3);
    assert_eq!(
        field_names(doc, rows[2]),
        vec![
            "options-2-id",
            "options-2-name",
            "options-2-price_adjustment",
            "options-2-position",
        ]
    );

    let after: Vec<String> = rows[..2].iter().flat_map(|r| field_names(doc, *r)).collect();
    assert_eq!(before, after);
    assert!(formset.is_consistent(doc));
}

#[test]
fn add_row_from_empty_formset_starts_at_zero() {
    let mut doc = Document::parse(BARE_FORMSET).unwrap();
    let manager = FormsetRowManager::attach(&doc, &FormsetConfig::options()).unwrap();

    let first_row = manager.add_row(&mut doc).unwrap();
    let second_row = manager.add_row(&mut doc).unwrap();

    assert_eq!(field_names(&doc, first_row), vec!["options-0-name"]);
    assert_eq!(field_names(&doc, second_row), vec!["options-1-name"]);
    assert_eq!(manager.form_count(&doc), 2);
}

#[test]
fn add_row_writes_display_positions() {
    let mut page = load_page("options_page.html");
    page.add_row("options").unwrap();

    let doc = page.doc();
    let positions: Vec<String> = all(doc, "#options-form-container input[id$=\"-position\"]")
        .into_iter()
        .map(|n| doc.value(n))
        .collect();
    assert_eq!(positions, vec!["0", "1", "2"]);
}

#[test]
fn add_row_with_malformed_template_leaves_page_unchanged() {
    let broken = BARE_FORMSET.replace(
        r#"<div class="option-form-row"><input name="options-__prefix__-name" id="id_options-__prefix__-name"><button class="remove-form-row">x</button></div>"#,
        r#"<div class="option-form-row"><input name="options-__prefix__-name></div>"#,
    );
    let mut doc = Document::parse(&broken).unwrap();
    let manager = FormsetRowManager::attach(&doc, &FormsetConfig::options()).unwrap();
    let html_before = doc.outer_html(doc.root());

    let result = manager.add_row(&mut doc);

    assert!(matches!(result, Err(PanelError::Markup { .. })));
    assert_eq!(manager.form_count(&doc), 0);
    assert_eq!(doc.outer_html(doc.root()), html_before);
}

#[test]
fn add_row_with_text_only_template_is_an_error() {
    let text_only = BARE_FORMSET.replace(
        r#"<div class="option-form-row"><input name="options-__prefix__-name" id="id_options-__prefix__-name"><button class="remove-form-row">x</button></div>"#,
        "row __prefix__",
    );
    let mut doc = Document::parse(&text_only).unwrap();
    let manager = FormsetRowManager::attach(&doc, &FormsetConfig::options()).unwrap();

    assert!(manager.add_row(&mut doc).is_err());
    assert_eq!(manager.form_count(&doc), 0);
    assert!(doc.children(manager.container()).is_empty());
}

// =========================================================================
// remove_row
// =========================================================================

#[test]
fn removing_existing_row_soft_deletes_it() {
    let mut page = load_page("options_page.html");
    page.click_selector("#options-form-container .option-form-row .remove-form-row i")
        .unwrap();

    let doc = page.doc();
    let formset = page.formset("options").unwrap();
    let rows = formset.rows(doc);
    assert_eq!(rows.len(), 2);
    assert_eq!(formset.form_count(doc), 2);
    assert!(doc.is_checked(first(doc, "#id_options-0-DELETE")));
    assert!(!doc.is_checked(first(doc, "#id_options-1-DELETE")));
    assert_eq!(doc.attr(rows[0], "style"), Some("display: none;"));
    assert!(doc.is_hidden(rows[0]));
    assert!(formset.is_soft_deleted(doc, rows[0]));
    assert_eq!(formset.indices(doc), vec![Some(0), Some(1)]);
}

#[test]
fn removing_added_row_reindexes_the_rest() {
    let mut page = load_page("options_page.html");
    page.add_row("options").unwrap();
    let kept = page.add_row("options").unwrap();
    let name_field = first(page.doc(), "#id_options-3-name");
    page.doc_mut().set_value(name_field, "Extra large");

    let removal = page.remove_row("options", 2).unwrap();
    assert_eq!(removal, Removal::Removed);

    let doc = page.doc();
    let formset = page.formset("options").unwrap();
    assert_eq!(formset.form_count(doc), 3);
    assert_eq!(formset.rows(doc).len(), 3);
    assert_eq!(formset.rows(doc)[2], kept);
    assert_eq!(
        field_names(doc, kept),
        vec![
            "options-2-id",
            "options-2-name",
            "options-2-price_adjustment",
            "options-2-position",
        ]
    );
    let name_field = first(doc, "#id_options-2-name");
    assert_eq!(doc.value(name_field), "Extra large");
    let label = doc.select_first(kept, "label").unwrap().unwrap();
    assert_eq!(doc.attr(label, "for"), Some("id_options-2-name"));
    assert_eq!(doc.value(first(doc, "#id_options-2-position")), "2");
    assert!(formset.is_consistent(doc));
}

#[test]
fn removing_added_row_keeps_other_delete_flags() {
    let mut page = load_page("options_page.html");
    page.remove_row("options", 0).unwrap();
    page.add_row("options").unwrap();
    page.add_row("options").unwrap();

    let removal = page.remove_row("options", 2).unwrap();

    assert_eq!(removal, Removal::Removed);
    let doc = page.doc();
    assert!(doc.is_checked(first(doc, "#id_options-0-DELETE")));
    assert!(!doc.is_checked(first(doc, "#id_options-1-DELETE")));
    assert_eq!(page.formset("options").unwrap().form_count(doc), 3);
}

#[test]
fn remove_row_ignores_foreign_nodes() {
    let (mut doc, manager) = options_doc();
    let outsider = first(&doc, "#id_name");

    assert_eq!(manager.remove_row(&mut doc, outsider), None);
    assert_eq!(manager.form_count(&doc), 2);
}

#[test]
fn remove_row_out_of_range_is_not_found() {
    let mut page = load_page("options_page.html");
    assert!(matches!(
        page.remove_row("options", 9),
        Err(PanelError::NodeNotFound { .. })
    ));
    assert!(matches!(
        page.remove_row("sizes", 0),
        Err(PanelError::NodeNotFound { .. })
    ));
}

#[test]
fn clicks_outside_the_container_are_ignored() {
    let mut page = load_page("options_page.html");
    let dispatch = page.click_selector("#id_name").unwrap();

    assert!(!dispatch.handled_by.contains(&"formset:options".to_string()));
    assert_eq!(page.formset("options").unwrap().form_count(page.doc()), 2);
}

// =========================================================================
// reindex
// =========================================================================

#[test]
fn reindex_rewrites_only_the_index_after_the_prefix() {
    let html = r#"
<input type="hidden" id="id_options-TOTAL_FORMS" value="7">
<div id="options-form-container">
  <div class="option-form-row">
    <label for="id_options-4-price_2">Price</label>
    <input name="options-4-price_2" id="id_options-4-price_2">
    <input name="options-4-options-9-note" id="id_options-4-options-9-note">
    <input name="extra-4-note" id="id_extra-4-note">
  </div>
  <div class="option-form-row">
    <select name="options-9-name" id="id_options-9-name"><option>a</option></select>
    <textarea name="options-9-text" id="id_options-9-text">hi</textarea>
  </div>
</div>
<button id="add-form-row">+</button>
<template id="empty-form-template"><div class="option-form-row"></div></template>
"#;
    let mut doc = Document::parse(html).unwrap();
    let manager = FormsetRowManager::attach(&doc, &FormsetConfig::options()).unwrap();

    manager.reindex(&mut doc);

    let rows = manager.rows(&doc);
    assert_eq!(
        field_names(&doc, rows[0]),
        vec!["options-0-price_2", "options-0-options-9-note", "extra-4-note"]
    );
    assert_eq!(field_names(&doc, rows[1]), vec!["options-1-name", "options-1-text"]);
    assert!(doc.get_element_by_id("id_options-0-price_2").is_some());
    assert!(doc.get_element_by_id("id_options-0-options-9-note").is_some());
    assert!(doc.get_element_by_id("id_extra-4-note").is_some());
    assert!(doc.get_element_by_id("id_options-1-text").is_some());
    let label = first(&doc, "label");
    assert_eq!(doc.attr(label, "for"), Some("id_options-0-price_2"));
    assert_eq!(manager.form_count(&doc), 2);
}

// =========================================================================
// meal items
// =========================================================================

#[test]
fn meal_items_rows_are_added_and_removed() {
    let mut page = load_page("meal_page.html");
    assert!(page.formset("items").is_some());
    assert!(page.formset("options").is_none());

    page.click_selector("#add-item-row").unwrap();
    page.click_selector("#add-item-row").unwrap();
    {
        let doc = page.doc();
        let formset = page.formset("items").unwrap();
        assert_eq!(formset.form_count(doc), 3);
        let rows = formset.rows(doc);
        assert_eq!(doc.tag(rows[2]), Some("tr"));
        assert_eq!(doc.value(first(doc, "#id_items-2-product")), "");
        assert_eq!(doc.value(first(doc, "#id_items-0-product")), "3");
    }

    let second = page.formset("items").unwrap().rows(page.doc())[1];
    let button = page
        .doc()
        .select_first(second, ".remove-item-row")
        .unwrap()
        .unwrap();
    page.click(button);

    let doc = page.doc();
    let formset = page.formset("items").unwrap();
    assert_eq!(formset.form_count(doc), 2);
    assert_eq!(formset.indices(doc), vec![Some(0), Some(1)]);
    assert!(doc.get_element_by_id("id_items-1-quantity").is_some());
    assert!(doc.get_element_by_id("id_items-2-quantity").is_none());

    page.remove_row("items", 0).unwrap();
    let doc = page.doc();
    assert!(doc.is_checked(first(doc, "#id_items-0-DELETE")));
    assert_eq!(page.formset("items").unwrap().form_count(doc), 2);
}

// =========================================================================
// properties over operation sequences
// =========================================================================

/// Small deterministic generator so sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn indices_stay_contiguous_over_random_sequences() {
    for seed in [1_u64, 7, 42, 2024, 99991] {
        let (mut doc, manager) = options_doc();
        let mut rng = Lcg(seed);
        let mut soft_deleted: HashSet<NodeId> = HashSet::new();

        for _ in 0..120 {
            let rows = manager.rows(&doc);
            if rows.is_empty() || rng.next() % 3 != 0 {
                manager.add_row(&mut doc).unwrap();
            } else {
                let row = rows[(rng.next() as usize) % rows.len()];
                match manager.remove_row(&mut doc, row) {
                    Some(Removal::SoftDeleted) => {
                        soft_deleted.insert(row);
                    }
                    Some(Removal::Removed) => assert!(!doc.is_attached(row)),
                    None => panic!("row of the formset was rejected"),
                }
            }

            let rows = manager.rows(&doc);
            assert_eq!(manager.form_count(&doc), rows.len(), "seed {}", seed);
            assert!(manager.is_consistent(&doc), "seed {}: {:?}", seed, manager.indices(&doc));
            for row in &soft_deleted {
                assert!(rows.contains(row), "soft-deleted row left the document");
                assert!(manager.is_soft_deleted(&doc, *row));
            }
        }
    }
}

#[test]
fn form_count_tracks_every_click() {
    let mut page = load_page("options_page.html");
    for expected in 3..=6 {
        page.click_selector("#add-form-row").unwrap();
        assert_eq!(page.formset("options").unwrap().form_count(page.doc()), expected);
    }
    for _ in 0..4 {
        let rows = page.formset("options").unwrap().rows(page.doc());
        let last = *rows.last().unwrap();
        let button = page.doc().select_first(last, ".remove-form-row").unwrap().unwrap();
        page.click(button);
    }
    let doc = page.doc();
    let formset = page.formset("options").unwrap();
    assert_eq!(formset.form_count(doc), 2);
    assert!(formset.is_consistent(doc));
}
