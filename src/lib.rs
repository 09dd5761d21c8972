//! Product catalog editor and viewer
//!
//! The editor lets an operator fill a fixed grid of 200 product slots
//! (image, name, category, rotation), reorder and delete them, and save the
//! catalog to a JSON file or a remote catalog store. The viewer renders a
//! saved catalog grouped by category.

pub mod config;
pub mod error;
pub mod grid;
pub mod logging;
pub mod media;
pub mod state;
pub mod sync;
pub mod ui;
pub mod viewer;

pub use error::{CatalogError, Result};
