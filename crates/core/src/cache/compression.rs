//! Value compression with a decompression-bomb guard.
//!
//! The ratio is measured as original size over compressed size, i.e. how far
//! a stored value expands when it is read back.

use crate::Error;

/// Largest accepted expansion factor between stored and original bytes.
pub const MAX_COMPRESSION_RATIO: usize = 100;

/// Compress `input`, refusing values whose expansion factor exceeds
/// [`MAX_COMPRESSION_RATIO`].
pub fn compress(input: &[u8]) -> Result<Vec<u8>, Error> {
    let compressed = lz4_flex::compress_prepend_size(input);
    let ratio = ratio(input.len(), compressed.len());
    if ratio > MAX_COMPRESSION_RATIO as f64 {
        tracing::warn!(original = input.len(), compressed = compressed.len(), ratio, "compression ratio rejected");
        return Err(Error::CompressionRatio { ratio, max: MAX_COMPRESSION_RATIO });
    }
    Ok(compressed)
}

/// Decompress bytes produced by [`compress`].
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, Error> {
    lz4_flex::decompress_size_prepended(input).map_err(|e| Error::Decompression(e.to_string()))
}

/// Expansion factor of `compressed` bytes back to `original` bytes.
pub fn ratio(original: usize, compressed: usize) -> f64 {
    if compressed == 0 {
        return 0.0;
    }
    original as f64 / compressed as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        assert_eq!(MAX_COMPRESSION_RATIO, 100);
    }

    #[test]
    fn test_compress_text() {
        let body = b"# MI-1 AI Data Leakage Prevention\n\nKeep secrets out of prompts.\n".repeat(4);
        let compressed = compress(&body).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), body);
    }

    #[test]
    fn test_repeated_byte_rejected() {
        let bomb = vec![b'A'; 500_000];
        let result = compress(&bomb);
        assert!(matches!(result, Err(Error::CompressionRatio { max: 100, .. })));
    }

    #[test]
    fn test_decompress_garbage() {
        assert!(matches!(decompress(&[4, 0, 0, 0, 0xf0]), Err(Error::Decompression(_))));
    }

    #[test]
    fn test_ratio_empty() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(200, 2), 100.0);
    }
}
