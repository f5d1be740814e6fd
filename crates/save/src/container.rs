// ---------------------------------------------------------------------------
// Container codec: reads and writes the ordered piece sequence of a file
// ---------------------------------------------------------------------------
//
// Layout per piece:
//   dynamic pieces:     [length u32] (zero = absent), then the payload
//   compressed payload: [stored_size u32][stored_size bytes], where
//                       UNCOMPRESSED_MARKER means the piece is stored raw
//   raw payload:        piece-size bytes
//
// The final piece of a file may be shorter than declared (files finalized
// early); a short read anywhere else fails the whole load. Reading never
// installs partial state: the piece set is dropped on error.

use tracing::debug;

use crate::buffer::BufferReader;
use crate::compression::{
    compress_piece, decompress_piece, CompressionAlgo, UNCOMPRESSED_MARKER,
};
use crate::error::SaveError;
use crate::piece::{Piece, PieceSet, PieceSizing, PieceSpec};

/// Reads every piece of `specs`, in order, starting at `pos`.
pub fn read_pieces(
    data: &[u8],
    pos: usize,
    specs: &[PieceSpec],
    algo: CompressionAlgo,
) -> Result<PieceSet, SaveError> {
    read_pieces_filtered(data, pos, specs, algo, |_| true)
}

/// Reads only the pieces `wanted` accepts, seeking over the payloads of the
/// rest. Used for header/metadata peeks that must not pay for a full
/// decompressing load.
pub fn read_pieces_selective(
    data: &[u8],
    pos: usize,
    specs: &[PieceSpec],
    algo: CompressionAlgo,
    wanted: &[&str],
) -> Result<PieceSet, SaveError> {
    read_pieces_filtered(data, pos, specs, algo, |name| wanted.contains(&name))
}

fn read_pieces_filtered(
    data: &[u8],
    pos: usize,
    specs: &[PieceSpec],
    algo: CompressionAlgo,
    wanted: impl Fn(&str) -> bool,
) -> Result<PieceSet, SaveError> {
    let mut r = BufferReader::new(data);
    r.set_pos(pos);
    let mut set = PieceSet::default();

    for (index, spec) in specs.iter().enumerate() {
        let is_last = index == specs.len() - 1;

        let size = match spec.sizing {
            PieceSizing::Fixed(n) => n,
            PieceSizing::Dynamic => {
                if r.remaining() < 4 {
                    if is_last {
                        // Trailing dynamic piece missing entirely: written by
                        // a build that finalized the file before this piece
                        // existed.
                        set.push(Piece {
                            spec: *spec,
                            buf: Vec::new(),
                        });
                        continue;
                    }
                    return Err(SaveError::WrongFormat(format!(
                        "file ends before the length of piece '{}'",
                        spec.name
                    )));
                }
                r.u32() as usize
            }
        };

        if size == 0 {
            debug!(piece = spec.name, "piece absent");
            set.push(Piece {
                spec: *spec,
                buf: Vec::new(),
            });
            continue;
        }

        let buf = if spec.compressed {
            if r.remaining() < 4 {
                return Err(SaveError::WrongFormat(format!(
                    "file ends before the stored size of piece '{}'",
                    spec.name
                )));
            }
            let stored = r.u32();
            if stored == UNCOMPRESSED_MARKER {
                read_raw_payload(&mut r, spec, size, is_last, wanted(spec.name))?
            } else {
                let stored = stored as usize;
                if r.remaining() < stored {
                    return Err(SaveError::PieceSizeMismatch {
                        piece: spec.name,
                        expected: stored,
                        actual: r.remaining(),
                    });
                }
                let compressed = r.raw(stored);
                if wanted(spec.name) {
                    decompress_piece(algo, compressed, size)?
                } else {
                    Vec::new()
                }
            }
        } else {
            read_raw_payload(&mut r, spec, size, is_last, wanted(spec.name))?
        };

        debug!(piece = spec.name, size, "piece read");
        set.push(Piece { spec: *spec, buf });
    }

    Ok(set)
}

/// Reads `size` raw bytes. Only the last piece of the sequence may come up
/// short; its buffer is zero-extended to the declared size.
fn read_raw_payload(
    r: &mut BufferReader<'_>,
    spec: &PieceSpec,
    size: usize,
    is_last: bool,
    materialize: bool,
) -> Result<Vec<u8>, SaveError> {
    let available = r.remaining().min(size);
    if available < size && !is_last {
        return Err(SaveError::PieceSizeMismatch {
            piece: spec.name,
            expected: size,
            actual: available,
        });
    }
    let bytes = r.raw(available);
    if !materialize {
        return Ok(Vec::new());
    }
    let mut buf = Vec::with_capacity(size);
    buf.extend_from_slice(bytes);
    buf.resize(size, 0);
    Ok(buf)
}

/// Appends every piece to `out`, compressing with the current algorithm.
/// A piece that refuses to compress is stored raw behind the marker; that
/// fallback is part of the format, not a failure.
pub fn write_pieces(out: &mut Vec<u8>, pieces: &[(PieceSpec, &[u8])]) {
    for (spec, buf) in pieces {
        if let PieceSizing::Fixed(n) = spec.sizing {
            assert_eq!(
                n,
                buf.len(),
                "piece '{}' buffer does not match its planned size",
                spec.name
            );
        }
        if spec.sizing == PieceSizing::Dynamic {
            out.extend_from_slice(&(buf.len() as u32).to_le_bytes());
            if buf.is_empty() {
                continue;
            }
        }
        if spec.compressed {
            match compress_piece(buf) {
                Some(compressed) => {
                    out.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
                    out.extend_from_slice(&compressed);
                }
                None => {
                    out.extend_from_slice(&UNCOMPRESSED_MARKER.to_le_bytes());
                    out.extend_from_slice(buf);
                }
            }
        } else {
            out.extend_from_slice(buf);
        }
    }
}
