/// Read-only catalog viewer logic
///
/// The viewer reads the local JSON snapshot, drops blank slots, and groups
/// the remaining products into an "all" bucket plus one bucket per
/// category. Tabs switch between buckets without reading the file again.

use serde_json::Value;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{info, warn};

use crate::grid::Filter;
use crate::state::{Category, Slot};
use crate::sync::local;

/// Title of the bucket holding every product
pub const ALL_TITLE: &str = "전체";

/// Shown instead of the grid when there is nothing to display
pub const UNAVAILABLE_TITLE: &str = "데이터를 불러올 수 없습니다";
pub const UNAVAILABLE_HINT: &str = "catalog_data.json 파일을 확인해주세요";

/// Card placeholders
pub const NO_IMAGE: &str = "이미지 없음";
pub const NO_NAME: &str = "제품명 없음";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerOptions {
    /// Sort every bucket by product name
    pub sort_by_name: bool,
    /// Show one bucket at a time behind tabs; otherwise every bucket is
    /// stacked as its own titled section
    pub tabbed: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            sort_by_name: true,
            tabbed: true,
        }
    }
}

/// A titled group of products
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub filter: Filter,
    pub products: Vec<Slot>,
}

impl Bucket {
    pub fn title(&self) -> &'static str {
        match self.filter {
            Filter::All => ALL_TITLE,
            Filter::Category(category) => category.label(),
        }
    }
}

/// Compare product names in Korean dictionary order
///
/// Precomposed Hangul syllables are laid out in Unicode in dictionary
/// order, so comparing case-folded characters orders Korean names the way
/// the Korean locale does. Names that differ only in case put the
/// lowercase letter first, as the Korean locale does.
pub fn korean_cmp(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| -> Vec<char> { s.trim().chars().flat_map(char::to_lowercase).collect() };
    let case_key = |s: &str| -> Vec<(bool, char)> { s.chars().map(|c| (c.is_uppercase(), c)).collect() };
    fold(a).cmp(&fold(b)).then_with(|| case_key(a).cmp(&case_key(b)))
}

/// Group products into the "all" bucket and per-category buckets
///
/// A product is shown when its image or name is non-empty, even if that
/// text is only whitespace; its card then falls back to the placeholders.
/// Only buckets with at least one product are returned, "all" first and
/// categories in their display order.
pub fn group(products: Vec<Slot>, options: ViewerOptions) -> Vec<Bucket> {
    let products: Vec<Slot> = products.into_iter().filter(|p| !p.is_unset()).collect();

    let mut buckets = vec![Bucket {
        filter: Filter::All,
        products: products.clone(),
    }];
    for category in Category::ALL {
        buckets.push(Bucket {
            filter: Filter::Category(category),
            products: products
                .iter()
                .filter(|p| p.category == Some(category))
                .cloned()
                .collect(),
        });
    }

    buckets.retain(|bucket| !bucket.products.is_empty());

    if options.sort_by_name {
        for bucket in &mut buckets {
            bucket.products.sort_by(|a, b| korean_cmp(&a.name, &b.name));
        }
    }

    buckets
}

/// Normalize raw snapshot entries, skipping nulls
pub fn products_from_entries(entries: &[Value]) -> Vec<Slot> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| !entry.is_null())
        .map(|(index, entry)| Slot::from_external(index, entry))
        .collect()
}

/// What the viewer window shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Showcase {
    buckets: Vec<Bucket>,
    selected: usize,
    tabbed: bool,
}

impl Showcase {
    pub fn from_entries(entries: &[Value], options: ViewerOptions) -> Self {
        Self {
            buckets: group(products_from_entries(entries), options),
            selected: 0,
            tabbed: options.tabbed,
        }
    }

    /// Load the snapshot at `path`
    ///
    /// A missing or unreadable snapshot is not an error for the viewer; it
    /// simply has nothing to show.
    pub fn load(path: &Path, options: ViewerOptions) -> Self {
        match local::load_entries(path) {
            Ok(entries) => {
                let showcase = Self::from_entries(&entries, options);
                info!(
                    "Loaded {} products from {}",
                    showcase.buckets.first().map_or(0, |b| b.products.len()),
                    path.display()
                );
                showcase
            }
            Err(e) if e.is_not_found() => {
                info!("No catalog snapshot at {}", path.display());
                Self::unavailable()
            }
            Err(e) => {
                warn!("Could not read catalog snapshot {}: {}", path.display(), e);
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self {
            buckets: Vec::new(),
            selected: 0,
            tabbed: true,
        }
    }

    /// True when the "unavailable" message should replace the grid
    pub fn is_unavailable(&self) -> bool {
        self.buckets.is_empty()
    }

    /// False when every bucket is shown at once as stacked sections
    pub fn is_tabbed(&self) -> bool {
        self.tabbed
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Tab titles, in display order
    pub fn tabs(&self) -> Vec<&'static str> {
        self.buckets.iter().map(Bucket::title).collect()
    }

    /// Switch tabs; unknown filters are ignored
    pub fn select(&mut self, filter: Filter) {
        if let Some(position) = self.buckets.iter().position(|b| b.filter == filter) {
            self.selected = position;
        }
    }

    pub fn selected(&self) -> Option<&Bucket> {
        self.buckets.get(self.selected)
    }
}
