/// Shared data structures for the catalog
///
/// These structs represent the data model that flows between
/// the catalog store, the sync adapters and the UI layer.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// Product categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Seaweed,
    Laver,
    DriedPollack,
    Anchovy,
    DriedShrimp,
    SquidSideDish,
    SquidSnack,
    Nogari,
    Snacks,
    Other,
}

impl Category {
    /// Every category, in the order sections and filters are shown
    pub const ALL: [Category; 10] = [
        Category::Seaweed,
        Category::Laver,
        Category::DriedPollack,
        Category::Anchovy,
        Category::DriedShrimp,
        Category::SquidSideDish,
        Category::SquidSnack,
        Category::Nogari,
        Category::Snacks,
        Category::Other,
    ];

    /// Label stored in snapshots and shown to the operator
    pub fn label(self) -> &'static str {
        match self {
            Category::Seaweed => "미역/미역귀/다시마",
            Category::Laver => "김",
            Category::DriedPollack => "황태",
            Category::Anchovy => "멸치",
            Category::DriedShrimp => "건새우",
            Category::SquidSideDish => "오징어(반찬)",
            Category::SquidSnack => "오징어(안주)",
            Category::Nogari => "노가리",
            Category::Snacks => "안주류",
            Category::Other => "기타",
        }
    }

    /// Parse a stored label; `None` for anything that is not a category
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Unassigned categories are written as the empty string
pub fn serialize_category<S: Serializer>(
    category: &Option<Category>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(category.map(Category::label).unwrap_or(""))
}

/// Display rotation of a product image, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Upright,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Upright => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    /// Reduce any angle to one of the four right angles
    ///
    /// The angle is taken modulo 360 and snapped down to a multiple of 90.
    pub fn from_degrees(degrees: i64) -> Self {
        match degrees.rem_euclid(360) / 90 {
            1 => Rotation::Quarter,
            2 => Rotation::Half,
            3 => Rotation::ThreeQuarter,
            _ => Rotation::Upright,
        }
    }

    /// Next rotation, 90 degrees clockwise
    pub fn turned(self) -> Self {
        Self::from_degrees(self.degrees() as i64 + 90)
    }
}

impl Serialize for Rotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.degrees())
    }
}

/// Where an image payload can be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource<'a> {
    None,
    /// Inline data URL, decoded with `media::payload`
    Inline(&'a str),
    /// Local file (bundled remote store blobs)
    File(PathBuf),
    /// Any other remote reference
    Url(&'a str),
}

/// Image payload of a slot: empty, an inline data URL, or a remote URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        ImageRef(value.into())
    }

    pub fn empty() -> Self {
        ImageRef(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// No image, or only whitespace
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Payload embedded in the record rather than referenced remotely
    pub fn is_inline(&self) -> bool {
        self.0.starts_with("data:")
    }

    pub fn source(&self) -> ImageSource<'_> {
        if self.is_empty() {
            ImageSource::None
        } else if self.is_inline() {
            ImageSource::Inline(&self.0)
        } else if let Some(path) = self.0.strip_prefix("file://") {
            ImageSource::File(PathBuf::from(path))
        } else {
            ImageSource::Url(&self.0)
        }
    }
}

/// One position in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// Always position + 1, maintained by the catalog
    pub id: usize,
    pub name: String,
    pub image: ImageRef,
    #[serde(serialize_with = "serialize_category")]
    pub category: Option<Category>,
    pub rotation: Rotation,
}

impl Slot {
    /// Empty slot for position `index`
    pub fn empty(index: usize) -> Self {
        Self {
            id: index + 1,
            name: String::new(),
            image: ImageRef::empty(),
            category: None,
            rotation: Rotation::Upright,
        }
    }

    /// True when the slot holds neither an image nor a name
    ///
    /// Whitespace counts as nothing here. Use [`Slot::is_unset`] to decide
    /// whether a slot is stored or shown at all.
    pub fn is_blank(&self) -> bool {
        self.image.is_empty() && self.name.trim().is_empty()
    }

    /// True when both the image and the name are exactly empty
    pub fn is_unset(&self) -> bool {
        self.image.as_str().is_empty() && self.name.is_empty()
    }

    /// Normalize an external record into the slot for position `index`
    ///
    /// Fields of the wrong type or missing fields fall back to their
    /// empty defaults; unknown categories become unassigned.
    pub fn from_external(index: usize, entry: &Value) -> Self {
        let mut slot = Slot::empty(index);

        let Some(record) = entry.as_object() else {
            return slot;
        };

        if let Some(name) = record.get("name").and_then(Value::as_str) {
            slot.name = name.to_string();
        }
        if let Some(image) = record.get("image").and_then(Value::as_str) {
            slot.image = ImageRef::new(image);
        }
        if let Some(label) = record.get("category").and_then(Value::as_str) {
            slot.category = parse_category(label, index);
        }
        if let Some(degrees) = record.get("rotation").and_then(Value::as_i64) {
            slot.rotation = Rotation::from_degrees(degrees);
        }

        slot
    }
}

/// Parse a stored category label, warning about labels we do not know
pub(crate) fn parse_category(label: &str, index: usize) -> Option<Category> {
    if label.is_empty() {
        return None;
    }
    let category = Category::from_label(label);
    if category.is_none() {
        warn!("Unknown category {:?} for product {}, leaving it unassigned", label, index + 1);
    }
    category
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("해산물"), None);
    }

    #[test]
    fn test_rotation_snaps_to_right_angles() {
        assert_eq!(Rotation::from_degrees(0), Rotation::Upright);
        assert_eq!(Rotation::from_degrees(90), Rotation::Quarter);
        assert_eq!(Rotation::from_degrees(450), Rotation::Quarter);
        assert_eq!(Rotation::from_degrees(-90), Rotation::ThreeQuarter);
        assert_eq!(Rotation::from_degrees(100), Rotation::Quarter);
        assert_eq!(Rotation::ThreeQuarter.turned(), Rotation::Upright);
    }

    #[test]
    fn test_image_ref_kinds() {
        assert!(ImageRef::new("   ").is_empty());
        assert_eq!(ImageRef::empty().source(), ImageSource::None);

        let inline = ImageRef::new("data:image/jpeg;base64,AAAA");
        assert!(inline.is_inline());
        assert!(matches!(inline.source(), ImageSource::Inline(_)));

        let file = ImageRef::new("file:///tmp/blobs/product_1.jpg");
        assert_eq!(file.source(), ImageSource::File(PathBuf::from("/tmp/blobs/product_1.jpg")));

        let url = ImageRef::new("https://cdn.example.com/p.jpg");
        assert!(!url.is_inline());
        assert_eq!(url.source(), ImageSource::Url("https://cdn.example.com/p.jpg"));
    }

    #[test]
    fn test_from_external_defaults_missing_fields() {
        let slot = Slot::from_external(4, &json!({ "name": "김" }));
        assert_eq!(slot.id, 5);
        assert_eq!(slot.name, "김");
        assert!(slot.image.is_empty());
        assert_eq!(slot.category, None);
        assert_eq!(slot.rotation, Rotation::Upright);
    }

    #[test]
    fn test_from_external_ignores_wrong_types() {
        let slot = Slot::from_external(
            0,
            &json!({ "id": 77, "name": 12, "image": "x", "category": "황태", "rotation": "90" }),
        );
        assert_eq!(slot.id, 1);
        assert_eq!(slot.name, "");
        assert_eq!(slot.image.as_str(), "x");
        assert_eq!(slot.category, Some(Category::DriedPollack));
        assert_eq!(slot.rotation, Rotation::Upright);

        let slot = Slot::from_external(2, &json!(5));
        assert_eq!(slot, Slot::empty(2));
    }

    #[test]
    fn test_whitespace_is_blank_but_not_unset() {
        let mut slot = Slot::empty(0);
        assert!(slot.is_blank());
        assert!(slot.is_unset());

        slot.name = "  ".to_string();
        assert!(slot.is_blank());
        assert!(!slot.is_unset());

        let spaced = Slot::from_external(1, &json!({ "image": " " }));
        assert!(spaced.is_blank());
        assert!(!spaced.is_unset());
    }

    #[test]
    fn test_serialized_shape() {
        let mut slot = Slot::empty(0);
        slot.name = "멸치".to_string();
        slot.category = Some(Category::Anchovy);
        slot.rotation = Rotation::Half;

        let value = serde_json::to_value(&slot).unwrap();
        assert_eq!(
            value,
            json!({ "id": 1, "name": "멸치", "image": "", "category": "멸치", "rotation": 180 })
        );

        let blank = serde_json::to_value(Slot::empty(1)).unwrap();
        assert_eq!(blank["category"], json!(""));
    }
}
