/// Catalog synchronization module
///
/// This module handles:
/// - Exporting and importing the local JSON snapshot (local.rs)
/// - Saving and loading through a remote catalog service (remote.rs)
/// - A bundled remote store backed by SQLite and blob files (sqlite.rs)

pub mod local;
pub mod remote;
pub mod sqlite;

pub use remote::{RemoteCatalog, RemoteRecord, SaveReport};
pub use sqlite::SqliteRemote;
