use chrono::Utc;
use rusqlite::{Connection, Result as SqlResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::info;

use super::remote::{RemoteCatalog, RemoteRecord};
use crate::error::{CatalogError, Result};

/// A remote catalog store kept on the local file system.
///
/// Image blobs are written as files under `blobs/` and referenced with
/// `file://` URLs; the catalog document lives in a SQLite database
/// (`catalog.db`), one row per position key.
///
/// rusqlite::Connection is not Send, so every operation opens its own
/// connection on a blocking worker thread.
#[derive(Debug, Clone)]
pub struct SqliteRemote {
    root: PathBuf,
}

impl SqliteRemote {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the document database
    pub fn db_path(&self) -> PathBuf {
        self.root.join("catalog.db")
    }

    /// Directory holding uploaded image blobs
    pub fn blob_dir(&self) -> PathBuf {
        self.root.join("blobs")
    }

    /// Open the document database, creating the schema if needed
    fn open(db_path: &Path) -> SqlResult<Connection> {
        let conn = Connection::open(db_path)?;

        // One row per catalog position
        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                key             TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                category        TEXT NOT NULL,
                rotation        INTEGER NOT NULL,
                image_url       TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(conn)
    }

    fn read_all_blocking(db_path: &Path) -> Result<BTreeMap<String, RemoteRecord>> {
        // No database yet means nothing was ever saved
        if !db_path.exists() {
            return Ok(BTreeMap::new());
        }

        let conn = Self::open(db_path)?;
        let mut stmt = conn.prepare(
            "SELECT key, name, category, rotation, image_url FROM products",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                RemoteRecord {
                    name: row.get(1)?,
                    category: row.get(2)?,
                    rotation: row.get(3)?,
                    image_url: row.get(4)?,
                },
            ))
        })?;

        let mut records = BTreeMap::new();
        for row in rows {
            let (key, record) = row?;
            records.insert(key, record);
        }
        Ok(records)
    }

    fn write_all_blocking(db_path: &Path, records: BTreeMap<String, RemoteRecord>) -> Result<()> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Self::open(db_path)?;
        let now = Utc::now().timestamp();

        // Replace the whole document in one transaction; nothing is kept on failure
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM products", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO products (key, name, category, rotation, image_url, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (key, record) in &records {
                insert.execute(rusqlite::params![
                    key,
                    record.name,
                    record.category,
                    record.rotation,
                    record.image_url,
                    now,
                ])?;
            }
        }
        tx.commit()?;

        info!("Wrote {} products to {}", records.len(), db_path.display());
        Ok(())
    }
}

/// Wrap a blocking-task join failure
fn join_error(e: task::JoinError) -> CatalogError {
    CatalogError::Remote(format!("Task join error: {}", e))
}

/// Treat local file failures inside the store as remote failures
fn remote_error(e: CatalogError) -> CatalogError {
    match e {
        CatalogError::Io(msg) | CatalogError::NotFound(msg) => CatalogError::Remote(msg),
        other => other,
    }
}

impl RemoteCatalog for SqliteRemote {
    async fn upload_image(&self, bytes: Vec<u8>, key: String) -> Result<String> {
        let path = self.blob_dir().join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| CatalogError::Remote(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CatalogError::Remote(format!("upload of {} failed: {}", key, e)))?;

        let absolute = std::path::absolute(&path).unwrap_or(path);
        Ok(format!("file://{}", absolute.display()))
    }

    async fn read_all(&self) -> Result<BTreeMap<String, RemoteRecord>> {
        let db_path = self.db_path();
        task::spawn_blocking(move || Self::read_all_blocking(&db_path))
            .await
            .map_err(join_error)?
            .map_err(remote_error)
    }

    async fn write_all(&self, records: BTreeMap<String, RemoteRecord>) -> Result<()> {
        let db_path = self.db_path();
        task::spawn_blocking(move || Self::write_all_blocking(&db_path, records))
            .await
            .map_err(join_error)?
            .map_err(remote_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Catalog, ImageRef, ImageSource};
    use crate::sync::remote;

    fn record(name: &str) -> RemoteRecord {
        RemoteRecord {
            name: name.to_string(),
            category: "김".to_string(),
            rotation: 90,
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_database_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteRemote::new(dir.path().join("never-created"));
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_replaces_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteRemote::new(dir.path());

        let mut first = BTreeMap::new();
        first.insert("0".to_string(), record("a"));
        first.insert("1".to_string(), record("b"));
        store.write_all(first).await.unwrap();

        let mut second = BTreeMap::new();
        second.insert("5".to_string(), record("c"));
        store.write_all(second.clone()).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_upload_returns_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteRemote::new(dir.path());

        let url = store
            .upload_image(vec![0xFF, 0xD8, 0xFF], remote::image_key(6))
            .await
            .unwrap();

        let image = ImageRef::new(url);
        let ImageSource::File(path) = image.source() else {
            panic!("expected a file reference, got {:?}", image);
        };
        assert!(path.ends_with("blobs/products/product_7.jpg"));
        assert_eq!(std::fs::read(path).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_catalog_save_and_load_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteRemote::new(dir.path());

        let mut catalog = Catalog::new();
        catalog.set_image(3, ImageRef::new("data:image/jpeg;base64,/9j/"));
        catalog.set_name(3, "노가리");
        catalog.set_name(8, "건새우");

        let report = remote::save(&store, catalog.slots().to_vec()).await.unwrap();
        assert_eq!(report.written, 2);
        report.apply_to(&mut catalog);

        let mut restored = Catalog::new();
        assert_eq!(remote::load(&store, &mut restored).await.unwrap(), 2);
        assert_eq!(restored, catalog);
        assert!(restored.get(3).unwrap().image.as_str().starts_with("file://"));
    }
}
