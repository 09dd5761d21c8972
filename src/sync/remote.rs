/// Remote catalog synchronization
///
/// The remote service is only reached through [`RemoteCatalog`]: upload an
/// image blob and get back a durable URL, read the whole catalog document,
/// or replace it. The document maps string positions ("0".."199") to
/// records; slots with neither a name nor an image are left out.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::media::payload::decode_data_url;
use crate::state::data::parse_category;
use crate::state::{Catalog, Category, ImageRef, Rotation, Slot};

/// One product as stored in the remote document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rotation: i64,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
}

impl RemoteRecord {
    /// Normalize into the slot for position `index`
    pub fn to_slot(&self, index: usize) -> Slot {
        let mut slot = Slot::empty(index);
        slot.name = self.name.clone();
        slot.image = ImageRef::new(self.image_url.as_str());
        slot.category = parse_category(&self.category, index);
        slot.rotation = Rotation::from_degrees(self.rotation);
        slot
    }
}

/// Stored category label, `""` when unassigned
fn category_label(category: Option<Category>) -> String {
    category.map(|c| c.label().to_string()).unwrap_or_default()
}

/// The contract of the remote catalog service
pub trait RemoteCatalog {
    /// Store image bytes under `key` and return a durable URL for them
    fn upload_image(&self, bytes: Vec<u8>, key: String) -> impl Future<Output = Result<String>> + Send;

    /// Read the whole catalog document; empty when nothing was saved yet
    fn read_all(&self) -> impl Future<Output = Result<BTreeMap<String, RemoteRecord>>> + Send;

    /// Replace the whole catalog document
    fn write_all(&self, records: BTreeMap<String, RemoteRecord>) -> impl Future<Output = Result<()>> + Send;
}

/// Object key for the image of the slot at `index`
pub fn image_key(index: usize) -> String {
    format!("products/product_{}.jpg", index + 1)
}

/// An inline image replaced by a remote URL during a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub index: usize,
    /// The inline payload that was uploaded
    pub inline: ImageRef,
    pub url: String,
}

/// Outcome of a successful remote save
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveReport {
    /// Records written to the remote document
    pub written: usize,
    pub uploads: Vec<Upload>,
}

impl SaveReport {
    /// Point uploaded slots at their new URLs so the next save skips them
    ///
    /// Returns how many slots were updated; slots edited since the save
    /// started keep their new content.
    pub fn apply_to(&self, catalog: &mut Catalog) -> usize {
        self.uploads
            .iter()
            .filter(|upload| catalog.adopt_url(upload.index, &upload.inline, &upload.url))
            .count()
    }
}

/// Save a snapshot of the catalog's slots to the remote service
///
/// Inline images are uploaded first; if any upload fails the whole save
/// is aborted and the document is not written.
pub async fn save<R: RemoteCatalog>(remote: &R, slots: Vec<Slot>) -> Result<SaveReport> {
    let mut records = BTreeMap::new();
    let mut uploads = Vec::new();

    for (index, slot) in slots.into_iter().enumerate() {
        if slot.is_unset() {
            continue;
        }

        let image_url = if slot.image.is_inline() {
            let bytes = decode_data_url(slot.image.as_str())?;
            let url = remote.upload_image(bytes, image_key(index)).await?;
            debug!("Uploaded image for product {} -> {}", index + 1, url);
            uploads.push(Upload {
                index,
                inline: slot.image.clone(),
                url: url.clone(),
            });
            url
        } else {
            slot.image.as_str().to_string()
        };

        records.insert(
            index.to_string(),
            RemoteRecord {
                name: slot.name,
                category: category_label(slot.category),
                rotation: slot.rotation.degrees() as i64,
                image_url,
            },
        );
    }

    let written = records.len();
    remote.write_all(records).await?;
    info!("Saved {} products to remote catalog ({} new images)", written, uploads.len());

    Ok(SaveReport { written, uploads })
}

/// Fetch the remote document as `(position, slot)` pairs
///
/// Keys that are not positions inside the catalog are skipped.
pub async fn fetch<R: RemoteCatalog>(remote: &R, capacity: usize) -> Result<Vec<(usize, Slot)>> {
    let records = remote.read_all().await?;
    if records.is_empty() {
        info!("Remote catalog is empty, nothing to load");
    }

    let mut slots = Vec::with_capacity(records.len());
    for (key, record) in records {
        match key.parse::<usize>() {
            Ok(index) if index < capacity => slots.push((index, record.to_slot(index))),
            _ => warn!("Skipping remote record with key {:?}", key),
        }
    }
    Ok(slots)
}

/// Merge fetched slots into the catalog by position, returning how many applied
pub fn apply_fetched(catalog: &mut Catalog, fetched: Vec<(usize, Slot)>) -> usize {
    let count = fetched.len();
    for (index, slot) in fetched {
        catalog.set(index, slot);
    }
    count
}

/// Load the remote catalog into `catalog`
pub async fn load<R: RemoteCatalog>(remote: &R, catalog: &mut Catalog) -> Result<usize> {
    let fetched = fetch(remote, catalog.len()).await?;
    Ok(apply_fetched(catalog, fetched))
}
