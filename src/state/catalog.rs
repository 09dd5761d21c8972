use serde_json::Value;
use tracing::debug;

use super::data::{Category, ImageRef, Slot};
use crate::config::CATALOG_CAPACITY;

/// The Catalog holds the fixed set of product slots being edited.
///
/// Every mutation goes through the methods below, which keep two
/// invariants: there are always exactly `CATALOG_CAPACITY` slots, and
/// the slot at position `i` always has `id == i + 1`.
#[derive(Debug, Clone)]
pub struct Catalog {
    slots: Vec<Slot>,
    /// Bumped whenever slot contents may have moved to other positions
    layout: u64,
}

// Equality compares slots only
impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl Eq for Catalog {}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create a catalog with every slot empty
    pub fn new() -> Self {
        let slots = (0..CATALOG_CAPACITY).map(Slot::empty).collect();
        Catalog { slots, layout: 0 }
    }

    /// Always `CATALOG_CAPACITY`
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots holding an image or a name
    pub fn populated_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_blank()).count()
    }

    /// Layout version
    ///
    /// Changes on every swap, delete, merge or whole-slot replacement, so
    /// an index remembered under one version may name a different product
    /// under the next.
    pub fn layout(&self) -> u64 {
        self.layout
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Replace the slot at `index`; out-of-range indices are ignored
    pub fn set(&mut self, index: usize, mut slot: Slot) {
        if index >= self.slots.len() {
            debug!("Ignoring set at out-of-range index {}", index);
            return;
        }
        slot.id = index + 1;
        self.slots[index] = slot;
        self.layout += 1;
    }

    pub fn set_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.name = name.into();
        }
    }

    pub fn set_category(&mut self, index: usize, category: Option<Category>) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.category = category;
        }
    }

    /// Put a new image into a slot; a new image always starts upright
    pub fn set_image(&mut self, index: usize, image: ImageRef) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.image = image;
            slot.rotation = Default::default();
        }
    }

    /// Turn the slot's image 90 degrees clockwise
    pub fn rotate(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.rotation = slot.rotation.turned();
        }
    }

    /// Exchange the contents of two slots (drag-and-drop reorder)
    pub fn swap(&mut self, i: usize, j: usize) {
        if i == j || i >= self.slots.len() || j >= self.slots.len() {
            return;
        }
        self.slots.swap(i, j);
        self.slots[i].id = i + 1;
        self.slots[j].id = j + 1;
        self.layout += 1;
    }

    /// Delete the product at `index`, shifting every later product left
    ///
    /// The last position becomes an empty slot, so the catalog keeps its length.
    pub fn delete_at(&mut self, index: usize) {
        if index >= self.slots.len() {
            return;
        }
        self.slots.remove(index);
        let last = self.slots.len();
        self.slots.push(Slot::empty(last));
        for (position, slot) in self.slots.iter_mut().enumerate().skip(index) {
            slot.id = position + 1;
        }
        self.layout += 1;
    }

    /// Merge external entries into the catalog by position
    ///
    /// Entry `i` replaces slot `i` unless it is `null`. Positions past the
    /// end of `entries` (or past capacity) are left as they are.
    /// Returns how many slots were replaced.
    pub fn reset_from(&mut self, entries: &[Value]) -> usize {
        let mut replaced = 0;
        for (index, entry) in entries.iter().take(self.slots.len()).enumerate() {
            if entry.is_null() {
                continue;
            }
            self.slots[index] = Slot::from_external(index, entry);
            replaced += 1;
        }
        if replaced > 0 {
            self.layout += 1;
        }
        replaced
    }

    /// Put a new image into a slot only if the layout is still `layout`
    ///
    /// Returns false, changing nothing, when the slots were rearranged
    /// after the caller read the layout version.
    pub fn replace_image(&mut self, index: usize, layout: u64, image: ImageRef) -> bool {
        if layout != self.layout || index >= self.slots.len() {
            return false;
        }
        self.set_image(index, image);
        true
    }

    /// Index of the first slot without an image, or 0 when every slot has one
    pub fn find_first_empty(&self) -> usize {
        self.next_empty_from(0).unwrap_or(0)
    }

    /// Index of the first slot without an image at or after `start`
    pub fn next_empty_from(&self, start: usize) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .skip(start)
            .find(|(_, slot)| slot.image.is_empty())
            .map(|(index, _)| index)
    }

    /// Number of slots without an image at or after `start`
    pub fn free_from(&self, start: usize) -> usize {
        self.slots
            .iter()
            .skip(start)
            .filter(|slot| slot.image.is_empty())
            .count()
    }

    /// Swap an uploaded inline payload for its remote URL
    ///
    /// Only applies if the slot still holds exactly the payload that was
    /// uploaded, so edits made while a save was running are kept.
    pub fn adopt_url(&mut self, index: usize, uploaded: &ImageRef, url: &str) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.image == *uploaded => {
                slot.image = ImageRef::new(url);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Rotation;
    use serde_json::json;

    fn named(index: usize, name: &str) -> Slot {
        let mut slot = Slot::empty(index);
        slot.name = name.to_string();
        slot.image = ImageRef::new(format!("img-{}", name));
        slot
    }

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        for (index, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            catalog.set(index, named(index, name));
        }
        catalog
    }

    fn assert_ids(catalog: &Catalog) {
        assert_eq!(catalog.len(), CATALOG_CAPACITY);
        for (position, slot) in catalog.slots().iter().enumerate() {
            assert_eq!(slot.id, position + 1);
        }
    }

    fn names(catalog: &Catalog, n: usize) -> Vec<String> {
        catalog.slots()[..n].iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_new_catalog_is_full_of_empty_slots() {
        let catalog = Catalog::new();
        assert_ids(&catalog);
        assert!(catalog.is_empty());
        assert_eq!(catalog.find_first_empty(), 0);
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut catalog = Catalog::new();
        catalog.set(CATALOG_CAPACITY, named(0, "x"));
        catalog.set_name(999, "y");
        catalog.rotate(CATALOG_CAPACITY);
        assert_eq!(catalog, Catalog::new());
    }

    #[test]
    fn test_set_forces_positional_id() {
        let mut catalog = Catalog::new();
        let mut slot = named(0, "x");
        slot.id = 42;
        catalog.set(7, slot);
        assert_eq!(catalog.get(7).unwrap().id, 8);
    }

    #[test]
    fn test_swap_twice_is_identity() {
        let original = sample();
        let mut catalog = original.clone();
        catalog.swap(1, 3);
        assert_eq!(names(&catalog, 5), ["a", "d", "c", "b", "e"]);
        assert_ids(&catalog);

        catalog.swap(1, 3);
        assert_eq!(catalog, original);
    }

    #[test]
    fn test_swap_same_or_invalid_index_is_noop() {
        let original = sample();
        let mut catalog = original.clone();
        catalog.swap(2, 2);
        catalog.swap(0, CATALOG_CAPACITY);
        assert_eq!(catalog, original);
    }

    #[test]
    fn test_delete_compacts_and_keeps_order() {
        let mut catalog = sample();
        catalog.delete_at(1);

        assert_eq!(names(&catalog, 5), ["a", "c", "d", "e", ""]);
        let last = catalog.get(CATALOG_CAPACITY - 1).unwrap();
        assert_eq!(*last, Slot::empty(CATALOG_CAPACITY - 1));
        assert_eq!(last.id, 200);
        assert_ids(&catalog);
    }

    #[test]
    fn test_delete_last_slot_clears_it() {
        let mut catalog = Catalog::new();
        catalog.set(CATALOG_CAPACITY - 1, named(0, "z"));
        catalog.delete_at(CATALOG_CAPACITY - 1);
        assert_eq!(catalog, Catalog::new());
    }

    #[test]
    fn test_reset_from_merges_by_position() {
        let mut catalog = sample();
        let replaced = catalog.reset_from(&[
            json!({ "name": "x", "rotation": 270 }),
            Value::Null,
            json!({ "id": 50, "name": "y", "category": "김" }),
        ]);

        assert_eq!(replaced, 2);
        assert_eq!(names(&catalog, 5), ["x", "b", "y", "d", "e"]);
        assert_eq!(catalog.get(0).unwrap().rotation, Rotation::ThreeQuarter);
        assert!(catalog.get(0).unwrap().image.is_empty());
        assert_eq!(catalog.get(2).unwrap().category, Some(Category::Laver));
        // positions past the list keep their content
        assert_eq!(catalog.get(3).unwrap().image.as_str(), "img-d");
        assert_ids(&catalog);
    }

    #[test]
    fn test_reset_from_ignores_entries_past_capacity() {
        let mut catalog = Catalog::new();
        let entries: Vec<Value> = (0..CATALOG_CAPACITY + 5)
            .map(|i| json!({ "name": format!("p{}", i) }))
            .collect();
        assert_eq!(catalog.reset_from(&entries), CATALOG_CAPACITY);
        assert_eq!(catalog.get(CATALOG_CAPACITY - 1).unwrap().name, "p199");
        assert_ids(&catalog);
    }

    #[test]
    fn test_ids_survive_mixed_operations() {
        let mut catalog = sample();
        catalog.swap(0, 150);
        catalog.delete_at(3);
        catalog.reset_from(&[Value::Null, json!({ "name": "n" })]);
        catalog.swap(199, 1);
        catalog.delete_at(0);
        assert_ids(&catalog);
    }

    #[test]
    fn test_find_first_empty() {
        let mut catalog = Catalog::new();
        catalog.set(0, named(0, "a"));
        catalog.set(2, named(2, "c"));
        assert_eq!(catalog.find_first_empty(), 1);
        assert_eq!(catalog.next_empty_from(2), Some(3));

        // whitespace-only images count as empty
        catalog.set_image(1, ImageRef::new("  "));
        assert_eq!(catalog.find_first_empty(), 1);
    }

    #[test]
    fn test_find_first_empty_when_full_falls_back_to_zero() {
        let mut catalog = Catalog::new();
        for index in 0..CATALOG_CAPACITY {
            catalog.set_image(index, ImageRef::new("x"));
        }
        assert_eq!(catalog.find_first_empty(), 0);
        assert_eq!(catalog.next_empty_from(0), None);
        assert_eq!(catalog.free_from(0), 0);
    }

    #[test]
    fn test_set_image_resets_rotation() {
        let mut catalog = Catalog::new();
        catalog.rotate(0);
        catalog.rotate(0);
        assert_eq!(catalog.get(0).unwrap().rotation, Rotation::Half);
        catalog.set_image(0, ImageRef::new("data:image/jpeg;base64,AA=="));
        assert_eq!(catalog.get(0).unwrap().rotation, Rotation::Upright);
    }

    #[test]
    fn test_layout_changes_only_when_slots_move() {
        let mut catalog = Catalog::new();
        let start = catalog.layout();

        catalog.set_name(0, "김");
        catalog.set_image(0, ImageRef::new("x"));
        catalog.rotate(0);
        catalog.swap(3, 3);
        assert_eq!(catalog.layout(), start);

        catalog.swap(0, 1);
        assert_ne!(catalog.layout(), start);

        let before = catalog.layout();
        catalog.delete_at(0);
        assert_ne!(catalog.layout(), before);
    }

    #[test]
    fn test_replace_image_rejects_stale_layout() {
        let mut catalog = Catalog::new();
        catalog.set_name(5, "노가리");
        catalog.set_name(6, "황태");
        let layout = catalog.layout();

        catalog.delete_at(2);
        assert!(!catalog.replace_image(5, layout, ImageRef::new("late")));
        assert_eq!(catalog.get(5).unwrap().name, "황태");
        assert!(catalog.get(5).unwrap().image.is_empty());

        let layout = catalog.layout();
        assert!(catalog.replace_image(4, layout, ImageRef::new("fresh")));
        assert_eq!(catalog.get(4).unwrap().image.as_str(), "fresh");
    }

    #[test]
    fn test_adopt_url_only_when_payload_unchanged() {
        let uploaded = ImageRef::new("data:image/jpeg;base64,AA==");
        let mut catalog = Catalog::new();
        catalog.set_image(0, uploaded.clone());
        catalog.set_image(1, uploaded.clone());
        catalog.set_image(1, ImageRef::new("data:image/jpeg;base64,BB=="));

        assert!(catalog.adopt_url(0, &uploaded, "file:///blobs/product_1.jpg"));
        assert!(!catalog.adopt_url(1, &uploaded, "file:///blobs/product_2.jpg"));
        assert_eq!(catalog.get(0).unwrap().image.as_str(), "file:///blobs/product_1.jpg");
        assert!(catalog.get(1).unwrap().image.is_inline());
    }
}
