/// State management module
///
/// This module handles all editor state, including:
/// - The fixed-capacity product catalog (catalog.rs)
/// - Shared data structures (data.rs)
/// - Debounced name edits waiting to be committed (pending.rs)

pub mod catalog;
pub mod data;
pub mod pending;

pub use catalog::Catalog;
pub use data::{Category, ImageRef, ImageSource, Rotation, Slot};
pub use pending::PendingEdits;
