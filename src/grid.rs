/// Grid controller logic
///
/// The editor's card grid turns user events into [`GridCommand`]s that are
/// applied to the catalog by slot index. Ids are derived from positions and
/// shift on every reorder, so nothing here addresses a slot by id.

use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::error::CatalogError;
use crate::media::{compress_file, CompressedImage};
use crate::state::{Catalog, Category, ImageRef};

/// One edit to one slot (or, for swaps, two)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCommand {
    SetImage { index: usize, image: ImageRef },
    /// Image that finished processing after being requested under `layout`
    ReplaceImage { index: usize, layout: u64, image: ImageRef },
    SetName { index: usize, name: String },
    SetCategory { index: usize, category: Option<Category> },
    Rotate { index: usize },
    Delete { index: usize },
    Swap { from: usize, to: usize },
}

impl GridCommand {
    /// Commands that move slot contents to other positions
    pub fn is_structural(&self) -> bool {
        matches!(self, GridCommand::Delete { .. } | GridCommand::Swap { .. })
    }
}

/// Apply a command to the catalog
///
/// Returns false when a [`GridCommand::ReplaceImage`] arrived after the
/// slots were rearranged and was dropped.
pub fn apply(catalog: &mut Catalog, command: GridCommand) -> bool {
    match command {
        GridCommand::SetImage { index, image } => catalog.set_image(index, image),
        GridCommand::ReplaceImage { index, layout, image } => {
            let applied = catalog.replace_image(index, layout, image);
            if !applied {
                warn!("Dropped image for product {}: cards were moved meanwhile", index + 1);
            }
            return applied;
        }
        GridCommand::SetName { index, name } => catalog.set_name(index, name),
        GridCommand::SetCategory { index, category } => catalog.set_category(index, category),
        GridCommand::Rotate { index } => catalog.rotate(index),
        GridCommand::Delete { index } => catalog.delete_at(index),
        GridCommand::Swap { from, to } => catalog.swap(from, to),
    }
    true
}

/// Which cards the grid shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Category(Category),
}

impl Filter {
    /// Filter buttons, in display order
    pub fn options() -> Vec<Filter> {
        std::iter::once(Filter::All)
            .chain(Category::ALL.into_iter().map(Filter::Category))
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "전체",
            Filter::Category(category) => category.label(),
        }
    }

    /// Positions of the slots shown under this filter, in catalog order
    pub fn visible_indices(self, catalog: &Catalog) -> Vec<usize> {
        catalog
            .slots()
            .iter()
            .enumerate()
            .filter(|(_, slot)| match self {
                Filter::All => true,
                Filter::Category(category) => slot.category == Some(category),
            })
            .map(|(index, _)| index)
            .collect()
    }
}

/// Outcome of compressing a batch of files
#[derive(Debug, Clone, Default)]
pub struct CompressedBatch {
    pub images: Vec<CompressedImage>,
    pub failed: usize,
}

/// Compress files one after another, stopping after `limit` successes
///
/// Files are processed strictly in order and never concurrently, so the
/// placement of results is deterministic. A file that fails is logged and
/// counted, and the batch carries on.
pub async fn compress_batch(
    files: Vec<PathBuf>,
    limit: usize,
    max_kb: u32,
    max_dimension: u32,
) -> CompressedBatch {
    let mut batch = CompressedBatch::default();

    for (n, path) in files.into_iter().enumerate() {
        if batch.images.len() >= limit {
            break;
        }
        match compress_file(path.clone(), max_kb, max_dimension).await {
            Ok(image) => batch.images.push(image),
            Err(e) => {
                error!("Image {} ({}) could not be compressed: {}", n + 1, path.display(), e);
                batch.failed += 1;
            }
        }
    }

    batch
}

/// Tally of a bulk upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkReport {
    /// First empty slot when placement started
    pub start: usize,
    /// Images stored in the catalog
    pub placed: usize,
    /// Files that could not be decoded or compressed
    pub failed: usize,
    /// Images left over because the catalog ran out of empty slots
    pub dropped: usize,
}

/// Place compressed images into empty slots, starting at the first empty one
///
/// Each image takes the next slot without an image at or after the
/// previous placement, so slots that already hold products are never
/// overwritten. When the catalog is full nothing is placed.
pub fn place_bulk<I>(catalog: &mut Catalog, images: I, failed: usize) -> BulkReport
where
    I: IntoIterator<Item = ImageRef>,
{
    let start = catalog.find_first_empty();
    let mut report = BulkReport {
        start,
        failed,
        ..Default::default()
    };

    let mut cursor = catalog.next_empty_from(start);
    for image in images {
        match cursor {
            Some(index) => {
                catalog.set_image(index, image);
                report.placed += 1;
                cursor = catalog.next_empty_from(index + 1);
            }
            None => report.dropped += 1,
        }
    }

    info!(
        "Bulk upload from product {}: {} placed, {} failed, {} dropped",
        start + 1,
        report.placed,
        report.failed,
        report.dropped
    );
    report
}

/// Number of images a bulk upload can still place
pub fn bulk_capacity(catalog: &Catalog) -> usize {
    catalog.free_from(catalog.find_first_empty())
}

/// Notification text naming the failed operation and its cause
pub fn describe_failure(operation: &str, err: &CatalogError) -> String {
    format!("{} failed: {}", operation, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CATALOG_CAPACITY;

    fn image(tag: &str) -> ImageRef {
        ImageRef::new(format!("data:image/jpeg;base64,{}", tag))
    }

    #[test]
    fn test_commands_address_slots_by_index() {
        let mut catalog = Catalog::new();
        apply(&mut catalog, GridCommand::SetName { index: 0, name: "a".to_string() });
        apply(&mut catalog, GridCommand::SetName { index: 1, name: "b".to_string() });
        apply(&mut catalog, GridCommand::Swap { from: 0, to: 1 });

        // after the swap, index 0 addresses what used to be product 2
        apply(&mut catalog, GridCommand::Rotate { index: 0 });
        apply(&mut catalog, GridCommand::SetCategory { index: 0, category: Some(Category::Nogari) });

        let first = catalog.get(0).unwrap();
        assert_eq!(first.name, "b");
        assert_eq!(first.id, 1);
        assert_eq!(first.rotation.degrees(), 90);
        assert_eq!(first.category, Some(Category::Nogari));

        apply(&mut catalog, GridCommand::Delete { index: 0 });
        assert_eq!(catalog.get(0).unwrap().name, "a");
    }

    #[test]
    fn test_late_image_after_delete_is_dropped() {
        let mut catalog = Catalog::new();
        catalog.set_name(5, "product 6");
        catalog.set_name(6, "product 7");
        catalog.rotate(6);

        // compression for position 5 starts, then a card before it is deleted
        let layout = catalog.layout();
        apply(&mut catalog, GridCommand::Delete { index: 2 });

        let applied = apply(
            &mut catalog,
            GridCommand::ReplaceImage { index: 5, layout, image: image("late") },
        );
        assert!(!applied);
        let shifted = catalog.get(5).unwrap();
        assert_eq!(shifted.name, "product 7");
        assert!(shifted.image.is_empty());
        assert_eq!(shifted.rotation.degrees(), 90);
    }

    #[test]
    fn test_late_image_without_moves_is_applied() {
        let mut catalog = Catalog::new();
        let layout = catalog.layout();
        apply(&mut catalog, GridCommand::SetName { index: 3, name: "멸치".to_string() });

        assert!(apply(
            &mut catalog,
            GridCommand::ReplaceImage { index: 3, layout, image: image("done") },
        ));
        assert_eq!(catalog.get(3).unwrap().image, image("done"));
    }

    #[test]
    fn test_structural_commands() {
        assert!(GridCommand::Delete { index: 0 }.is_structural());
        assert!(GridCommand::Swap { from: 0, to: 1 }.is_structural());
        assert!(!GridCommand::Rotate { index: 0 }.is_structural());
    }

    #[test]
    fn test_filter_never_mutates() {
        let mut catalog = Catalog::new();
        catalog.set_category(2, Some(Category::Laver));
        catalog.set_category(7, Some(Category::Laver));
        catalog.set_category(9, Some(Category::Other));
        let before = catalog.clone();

        assert_eq!(Filter::Category(Category::Laver).visible_indices(&catalog), vec![2, 7]);
        assert_eq!(Filter::All.visible_indices(&catalog).len(), CATALOG_CAPACITY);
        assert!(Filter::Category(Category::Anchovy).visible_indices(&catalog).is_empty());
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_filter_options() {
        let options = Filter::options();
        assert_eq!(options.len(), 11);
        assert_eq!(options[0].label(), "전체");
        assert_eq!(options[1].label(), "미역/미역귀/다시마");
    }

    #[test]
    fn test_bulk_upload_fills_gaps_without_collisions() {
        let mut catalog = Catalog::new();
        catalog.set_image(0, image("zero"));
        catalog.set_image(2, image("two"));
        assert_eq!(catalog.find_first_empty(), 1);

        let report = place_bulk(&mut catalog, vec![image("f1"), image("f2")], 0);

        assert_eq!(report, BulkReport { start: 1, placed: 2, failed: 0, dropped: 0 });
        assert_eq!(catalog.get(0).unwrap().image, image("zero"));
        assert_eq!(catalog.get(1).unwrap().image, image("f1"));
        assert_eq!(catalog.get(2).unwrap().image, image("two"));
        assert_eq!(catalog.get(3).unwrap().image, image("f2"));
    }

    #[test]
    fn test_bulk_upload_resets_rotation() {
        let mut catalog = Catalog::new();
        catalog.rotate(0);
        place_bulk(&mut catalog, vec![image("a")], 0);
        assert_eq!(catalog.get(0).unwrap().rotation.degrees(), 0);
    }

    #[test]
    fn test_bulk_upload_stops_at_capacity() {
        let mut catalog = Catalog::new();
        for index in 0..CATALOG_CAPACITY - 1 {
            catalog.set_image(index, image("full"));
        }
        assert_eq!(bulk_capacity(&catalog), 1);

        let report = place_bulk(&mut catalog, vec![image("a"), image("b"), image("c")], 1);
        assert_eq!(report, BulkReport { start: 199, placed: 1, failed: 1, dropped: 2 });
        assert_eq!(catalog.get(199).unwrap().image, image("a"));
    }

    #[test]
    fn test_bulk_upload_into_full_catalog_places_nothing() {
        let mut catalog = Catalog::new();
        for index in 0..CATALOG_CAPACITY {
            catalog.set_image(index, image("full"));
        }
        let before = catalog.clone();

        let report = place_bulk(&mut catalog, vec![image("a")], 0);
        assert_eq!(report.placed, 0);
        assert_eq!(report.dropped, 1);
        assert_eq!(bulk_capacity(&catalog), 0);
        assert_eq!(catalog, before);
    }

    #[tokio::test]
    async fn test_compress_batch_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]))
            .save(&good)
            .unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not a png").unwrap();

        let batch = compress_batch(vec![bad, good.clone(), good.clone(), good], 2, 200, 1920).await;
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.images.len(), 2);
    }

    #[test]
    fn test_describe_failure() {
        let err = CatalogError::Decode("bad header".to_string());
        assert_eq!(
            describe_failure("Image upload", &err),
            "Image upload failed: image could not be processed: bad header"
        );
    }
}
