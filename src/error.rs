/// Error types shared by every part of the catalog
///
/// Variants carry plain messages so errors can travel inside UI messages
/// (which must be `Clone`) and be shown to the operator as-is.

use thiserror::Error;

/// Everything that can go wrong while editing, syncing or viewing a catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// An image could not be decoded or re-encoded
    #[error("image could not be processed: {0}")]
    Decode(String),

    /// An imported snapshot is not a valid catalog JSON array
    #[error("catalog data could not be parsed: {0}")]
    Parse(String),

    /// The remote catalog service rejected or failed an operation
    #[error("remote catalog failed: {0}")]
    Remote(String),

    /// A snapshot that was expected to exist is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Local file system failure
    #[error("file error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CatalogError::NotFound(err.to_string())
        } else {
            CatalogError::Io(err.to_string())
        }
    }
}

impl From<image::ImageError> for CatalogError {
    fn from(err: image::ImageError) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Remote(err.to_string())
    }
}

impl CatalogError {
    /// True when the error only means "there was nothing there"
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err: CatalogError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.is_not_found());

        let err: CatalogError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_display_names_the_failure() {
        let err = CatalogError::Remote("upload refused".to_string());
        assert_eq!(err.to_string(), "remote catalog failed: upload refused");
    }
}
