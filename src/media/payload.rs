/// Inline image payloads
///
/// Compressed images travel inside catalog records as data URLs
/// (`data:image/jpeg;base64,...`) until a remote save swaps them for URLs.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::error::{CatalogError, Result};

/// MIME type of every image the compressor produces
pub const JPEG_MIME: &str = "image/jpeg";

/// Wrap encoded bytes in a data URL
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, B64.encode(bytes))
}

/// Extract the bytes from a base64 data URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CatalogError::Decode("not an inline data URL".to_string()))?;

    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| CatalogError::Decode("data URL has no payload".to_string()))?;

    if !header.ends_with(";base64") {
        return Err(CatalogError::Decode(format!(
            "unsupported data URL encoding: {}",
            header
        )));
    }

    B64.decode(data.trim())
        .map_err(|e| CatalogError::Decode(format!("invalid base64 payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_shape() {
        let url = to_data_url(JPEG_MIME, &[0xFF, 0xD8, 0xFF]);
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
        assert_eq!(decode_data_url(&url).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_rejects_non_inline_payloads() {
        assert!(matches!(
            decode_data_url("https://example.com/a.jpg"),
            Err(CatalogError::Decode(_))
        ));
        assert!(decode_data_url("data:image/jpeg;base64").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("data:image/jpeg;base64,!!!").is_err());
    }
}
