//! Text compression for the processed layer
//!
//! Payloads are compressed with zstd and carried as standard base64 so they
//! fit a string-only store. Decompression never fails loudly: any corrupt,
//! empty or non-UTF-8 input yields `None`, which callers treat as a miss.

use crate::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Default zstd level; favours speed since payloads are rewritten every sync.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Reversible text codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    level: i32,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Codec {
    /// Create a codec using the given zstd level
    #[must_use]
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    /// Configured zstd level
    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Compress `text` into a base64 string
    ///
    /// # Errors
    ///
    /// Returns error if the zstd encoder rejects the input or level
    pub fn compress(&self, text: &str) -> Result<String> {
        let compressed = zstd::encode_all(text.as_bytes(), self.level)
            .map_err(|e| Error::compression(format!("zstd encode failed: {e}")))?;
        Ok(STANDARD.encode(compressed))
    }

    /// Reverse [`Codec::compress`]; `None` on any malformed input
    #[must_use]
    pub fn decompress(&self, encoded: &str) -> Option<String> {
        if encoded.is_empty() {
            return None;
        }
        let compressed = STANDARD.decode(encoded).ok()?;
        let raw = zstd::decode_all(compressed.as_slice()).ok()?;
        String::from_utf8(raw).ok()
    }
}
