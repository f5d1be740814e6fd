// ---------------------------------------------------------------------------
// SaveError: typed errors for savegame/scenario load and save operations
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while reading or writing savegame/scenario files.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// The file was written by a newer game build than this one.
    UnsupportedVersion { found: u32, supported: u32 },
    /// The file does not match the expected layout.
    WrongFormat(String),
    /// A piece's payload did not decode to its declared size.
    PieceSizeMismatch {
        piece: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A compressed piece could not be decompressed.
    Decompress(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::UnsupportedVersion { found, supported } => write!(
                f,
                "File version {found:#x} is newer than the latest supported \
                 version {supported:#x}. Please update the game to load this file."
            ),
            SaveError::WrongFormat(msg) => write!(f, "Not a valid file: {msg}"),
            SaveError::PieceSizeMismatch {
                piece,
                expected,
                actual,
            } => write!(
                f,
                "Piece '{piece}' has {actual} bytes, expected {expected}"
            ),
            SaveError::Decompress(msg) => write!(f, "Decompression failed: {msg}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unsupported_version() {
        let err = SaveError::UnsupportedVersion {
            found: 0x95,
            supported: 0x90,
        };
        let msg = format!("{err}");
        assert!(msg.contains("0x95"), "got: {msg}");
        assert!(msg.contains("0x90"), "got: {msg}");
    }

    #[test]
    fn test_display_piece_size_mismatch() {
        let err = SaveError::PieceSizeMismatch {
            piece: "terrain_grid",
            expected: 104976,
            actual: 12,
        };
        let msg = format!("{err}");
        assert!(msg.contains("terrain_grid"), "got: {msg}");
        assert!(msg.contains("104976"), "got: {msg}");
    }

    #[test]
    fn test_from_io_preserves_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SaveError = io_err.into();
        assert!(matches!(err, SaveError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
