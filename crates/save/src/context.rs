// ---------------------------------------------------------------------------
// DecodeContext: per-load decoding state, passed explicitly
// ---------------------------------------------------------------------------
//
// One context is built per load operation, after the header (and for
// savegames the scenario settings) are known. Nothing about the active
// version or epoch is process-wide.

use crate::resource_mapping::ResourceMapping;
use crate::version::{SaveVersion, SAVE_GAME_CURRENT_VERSION};

#[derive(Debug, Clone, Copy)]
pub struct DecodeContext {
    pub version: SaveVersion,
    pub mapping: ResourceMapping,
}

impl DecodeContext {
    pub fn new(version: SaveVersion, mapping: ResourceMapping) -> Self {
        DecodeContext { version, mapping }
    }

    /// Context for data written by this build: current version, identity
    /// mapping.
    pub fn current() -> Self {
        DecodeContext {
            version: SAVE_GAME_CURRENT_VERSION,
            mapping: ResourceMapping::current(),
        }
    }
}
