use tracing::warn;

use crate::dom::document::{Document, NodeId};
use crate::dom::selector::Selector;
use crate::dom::serialize::escape_attr;
use crate::error::PanelError;
use crate::events::component::{Component, Context};
use crate::events::event::{Reaction, UiEvent, UploadFile};
use crate::transport::transport_model::ActionRequest;
use crate::widgets::HIDDEN;

pub const SET_COVER_FAILED: &str = "Could not set the image as cover";
pub const DELETE_FAILED: &str = "Could not delete the image";
pub const CONFIRM_DELETE: &str = "Delete this image?";

const COVER_BADGE: &str = r#"<div class="cover-badge"><i class="fas fa-star"></i> Cover</div>"#;

/// Product image gallery: set-cover and delete actions on existing images,
/// plus local previews of files picked for upload.
pub struct Gallery {
    grid: NodeId,
    upload_input: Option<NodeId>,
    preview_container: Option<NodeId>,
    item_selector: Selector,
    set_cover_selector: Selector,
    delete_selector: Selector,
    badge_selector: Selector,
}

impl Gallery {
    pub fn attach(doc: &Document) -> Option<Self> {
        let grid = doc.get_element_by_id("gallery-grid")?;
        let upload_input = doc.get_element_by_id("image-upload-input");
        let preview_container = doc.get_element_by_id("image-preview-container");
        Self::bind(grid, upload_input, preview_container).ok()
    }

    fn bind(
        grid: NodeId,
        upload_input: Option<NodeId>,
        preview_container: Option<NodeId>,
    ) -> Result<Self, PanelError> {
        Ok(Self {
            grid,
            upload_input,
            preview_container,
            item_selector: Selector::parse(".gallery-item")?,
            set_cover_selector: Selector::parse(".set-cover-btn")?,
            delete_selector: Selector::parse(".delete-image-btn")?,
            badge_selector: Selector::parse(".cover-badge")?,
        })
    }

    pub fn grid(&self) -> NodeId {
        self.grid
    }

    pub fn set_cover_endpoint(image_id: &str) -> String {
        format!("/menu/product/image/{}/set-cover/", image_id)
    }

    pub fn delete_endpoint(image_id: &str) -> String {
        format!("/menu/product/image/{}/delete/", image_id)
    }

    fn request(cx: &Context<'_>, path: String) -> ActionRequest {
        let mut request = ActionRequest::post(path).header("X-Requested-With", "XMLHttpRequest");
        if let Some(token) = cx.csrf_token() {
            request = request.header("X-CSRFToken", &token);
        }
        request
    }

    /// The gallery item an action button belongs to, with its image id.
    fn item_for(&self, doc: &Document, button: NodeId) -> Option<(NodeId, String)> {
        let item = doc.closest(button, &self.item_selector)?;
        if !doc.contains(self.grid, item) {
            return None;
        }
        let image_id = doc.attr(item, "data-image-id")?.to_string();
        Some((item, image_id))
    }

    fn set_cover(&self, cx: &mut Context<'_>, item: NodeId, image_id: &str) {
        let request = Self::request(cx, Self::set_cover_endpoint(image_id));
        match cx.post(request) {
            Ok(reply) if reply.success => self.mark_cover(cx.doc, item),
            Ok(_) => cx.dialogs.alert(SET_COVER_FAILED),
            Err(e) => {
                warn!(image = image_id, error = %e, "set cover failed");
                cx.dialogs.alert(SET_COVER_FAILED);
            }
        }
    }

    /// Move the cover badge to `item` and make it the first tile.
    pub fn mark_cover(&self, doc: &mut Document, item: NodeId) {
        if let Some(badge) = doc.query_selector(self.grid, &self.badge_selector) {
            let previous = doc.closest(badge, &self.item_selector);
            if let Some(button) = previous.and_then(|p| doc.query_selector(p, &self.set_cover_selector)) {
                doc.remove_class(button, HIDDEN);
            }
            doc.detach(badge);
        }

        if let Err(e) = doc.append_html(item, COVER_BADGE) {
            warn!(error = %e, "cover badge markup rejected");
        }
        if let Some(button) = doc.query_selector(item, &self.set_cover_selector) {
            doc.add_class(button, HIDDEN);
        }
        doc.prepend_child(self.grid, item);
    }

    fn delete(&self, cx: &mut Context<'_>, item: NodeId, image_id: &str) {
        if !cx.dialogs.confirm(CONFIRM_DELETE) {
            return;
        }
        let request = Self::request(cx, Self::delete_endpoint(image_id));
        match cx.post(request) {
            Ok(reply) if reply.success => cx.doc.detach(item),
            Ok(_) => cx.dialogs.alert(DELETE_FAILED),
            Err(e) => {
                warn!(image = image_id, error = %e, "image delete failed");
                cx.dialogs.alert(DELETE_FAILED);
            }
        }
    }

    /// Replace the preview area with one tile per picked image file.
    pub fn preview(&self, doc: &mut Document, files: &[UploadFile]) -> usize {
        let Some(container) = self.preview_container else {
            return 0;
        };
        doc.clear_children(container);

        let mut shown = 0;
        for file in files.iter().filter(|f| f.is_image()) {
            let tile = format!(
                r#"<div class="gallery-item preview-item"><img src="{}" alt="Preview"><div class="gallery-item-overlay"><span class="preview-text">Uploads on save</span></div></div>"#,
                escape_attr(&file.data_url())
            );
            match doc.append_html(container, &tile) {
                Ok(_) => shown += 1,
                Err(e) => warn!(file = %file.name, error = %e, "preview tile rejected"),
            }
        }
        shown
    }
}

impl Component for Gallery {
    fn name(&self) -> &str {
        "gallery"
    }

    fn handle(&mut self, event: &UiEvent, cx: &mut Context<'_>) -> Reaction {
        match event {
            UiEvent::Click { target } if cx.doc.contains(self.grid, *target) => {
                let mut reaction = Reaction::Ignored;
                if let Some(button) = cx.doc.closest(*target, &self.set_cover_selector) {
                    if let Some((item, image_id)) = self.item_for(cx.doc, button) {
                        self.set_cover(cx, item, &image_id);
                        reaction = Reaction::Handled;
                    }
                }
                if let Some(button) = cx.doc.closest(*target, &self.delete_selector) {
                    if let Some((item, image_id)) = self.item_for(cx.doc, button) {
                        self.delete(cx, item, &image_id);
                        reaction = Reaction::Handled;
                    }
                }
                reaction
            }
            UiEvent::FilesSelected { target, files } if Some(*target) == self.upload_input => {
                self.preview(cx.doc, files);
                Reaction::Handled
            }
            _ => Reaction::Ignored,
        }
    }
}
