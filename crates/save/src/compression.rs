// ---------------------------------------------------------------------------
// Piece compression: zlib for legacy files, LZ4 for everything current
// ---------------------------------------------------------------------------
//
// Compressed pieces are stored as [stored_size u32][payload]. A stored size
// equal to UNCOMPRESSED_MARKER means the payload is the piece verbatim:
// the writer falls back to it whenever compression fails or does not help,
// and readers of every version must accept it.

use std::io::Read;

use crate::error::SaveError;

/// Stored-size sentinel marking an uncompressed payload.
pub const UNCOMPRESSED_MARKER: u32 = 0xFFFF_FFFF;

/// Which algorithm a file's compressed pieces use. Picked once per load
/// from the format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgo {
    /// zlib streams, written by builds up to the compression switch.
    LegacyZlib,
    /// LZ4 blocks, the only algorithm the current writer emits.
    Lz4,
}

/// Decompresses a piece payload into exactly `expected` bytes.
pub fn decompress_piece(
    algo: CompressionAlgo,
    src: &[u8],
    expected: usize,
) -> Result<Vec<u8>, SaveError> {
    let out = match algo {
        CompressionAlgo::LegacyZlib => {
            let mut out = Vec::with_capacity(expected);
            flate2::read::ZlibDecoder::new(src)
                .read_to_end(&mut out)
                .map_err(|e| SaveError::Decompress(format!("zlib: {e}")))?;
            out
        }
        CompressionAlgo::Lz4 => lz4_flex::block::decompress(src, expected)
            .map_err(|e| SaveError::Decompress(format!("lz4: {e}")))?,
    };
    if out.len() != expected {
        return Err(SaveError::Decompress(format!(
            "decompressed to {} bytes, expected {expected}",
            out.len()
        )));
    }
    Ok(out)
}

/// Compresses a piece with the current algorithm. Returns None when the
/// result would not be smaller than the input, in which case the caller
/// stores the piece raw behind UNCOMPRESSED_MARKER.
pub fn compress_piece(src: &[u8]) -> Option<Vec<u8>> {
    let compressed = lz4_flex::block::compress(src);
    if compressed.len() < src.len() {
        Some(compressed)
    } else {
        None
    }
}
