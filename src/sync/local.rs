/// Local JSON snapshot export and import
///
/// The snapshot is a JSON array holding all slots in position order,
/// empty ones included. Import merges entries back by position.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::state::Catalog;

/// Serialize every slot of the catalog, in position order
pub fn export_json(catalog: &Catalog) -> Result<String> {
    serde_json::to_string_pretty(catalog.slots()).map_err(|e| CatalogError::Io(e.to_string()))
}

/// Parse a snapshot into its raw entries without touching any catalog
pub fn parse_snapshot(json: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
    match value {
        Value::Array(entries) => Ok(entries),
        other => Err(CatalogError::Parse(format!(
            "expected an array of products, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Merge a snapshot into the catalog
///
/// The snapshot is fully parsed before the catalog is modified, so a
/// malformed file leaves the catalog untouched. Returns the number of
/// slots replaced.
pub fn import_json(catalog: &mut Catalog, json: &str) -> Result<usize> {
    let entries = parse_snapshot(json)?;
    Ok(catalog.reset_from(&entries))
}

/// Write an exported snapshot to disk
pub async fn write_snapshot(path: PathBuf, contents: String) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&path, contents).await?;
    info!("Saved catalog snapshot to {}", path.display());
    Ok(path)
}

/// Read a snapshot file's text
pub async fn read_snapshot(path: PathBuf) -> Result<String> {
    let contents = tokio::fs::read_to_string(&path).await?;
    Ok(contents)
}

/// Read and parse a snapshot file into its entries
pub fn load_entries(path: &Path) -> Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)?;
    parse_snapshot(&contents)
}
