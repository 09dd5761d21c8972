/// Image ingestion module
///
/// This module handles:
/// - Downscaling and size-bounded JPEG recompression (compress.rs)
/// - Inline data URL encoding of compressed images (payload.rs)

pub mod compress;
pub mod payload;

pub use compress::{compress_bytes, compress_file, CompressedImage};
