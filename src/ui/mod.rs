/// UI widgets shared by the editor and viewer windows
///
/// - `card.rs` - one editable product card in the editor grid
/// - `gallery.rs` - the viewer's tabbed, read-only product sections

pub mod card;
pub mod gallery;

use iced::widget::image::Handle;
use tracing::debug;

use crate::media::payload::decode_data_url;
use crate::state::{ImageRef, ImageSource, Slot};

/// Build a displayable handle for a slot image
///
/// Remote URLs other than `file://` are not fetched; cards show a
/// placeholder for them.
pub fn image_handle(image: &ImageRef) -> Option<Handle> {
    match image.source() {
        ImageSource::None | ImageSource::Url(_) => None,
        ImageSource::Inline(url) => match decode_data_url(url) {
            Ok(bytes) => Some(Handle::from_bytes(bytes)),
            Err(e) => {
                debug!("Unreadable inline image: {}", e);
                None
            }
        },
        ImageSource::File(path) => Some(Handle::from_path(path)),
    }
}

/// Decoded image handles for each catalog position
///
/// Rebuilding a handle for an inline image means decoding its base64
/// payload, so handles are kept until the slot's image changes.
#[derive(Debug, Default)]
pub struct ThumbnailCache {
    entries: Vec<Option<(ImageRef, Handle)>>,
}

impl ThumbnailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cache in line with the current slots
    pub fn refresh(&mut self, slots: &[Slot]) {
        self.entries.resize(slots.len(), None);

        for (entry, slot) in self.entries.iter_mut().zip(slots) {
            let current = matches!(entry, Some((image, _)) if *image == slot.image);
            if current {
                continue;
            }
            *entry = image_handle(&slot.image).map(|handle| (slot.image.clone(), handle));
        }
    }

    pub fn get(&self, index: usize) -> Option<&Handle> {
        self.entries
            .get(index)
            .and_then(|entry| entry.as_ref())
            .map(|(_, handle)| handle)
    }
}
