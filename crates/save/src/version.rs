// ---------------------------------------------------------------------------
// Format versions and the feature thresholds that partition file history
// ---------------------------------------------------------------------------
//
// Every layout change in the file history is keyed on a "last version with
// the old behavior" constant. A version is loadable iff it lies between the
// classic baseline and the current version; everything in between is decoded
// by comparing against these thresholds. Saving always writes the current
// version.

use crate::resource_mapping::ResourceEpoch;

/// Savegame format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SaveVersion(pub u32);

/// Oldest savegame this build can load.
pub const SAVE_GAME_VERSION_CLASSIC: SaveVersion = SaveVersion(0x66);
/// Entity pieces (figures, routes, formations, buildings) are fixed-count
/// arrays at or below this, size-prefixed dynamic pieces above.
pub const SAVE_GAME_LAST_STATIC_COUNT_VERSION: SaveVersion = SaveVersion(0x6A);
/// Image grid holds u16 image ids at or below this, u32 above.
pub const SAVE_GAME_LAST_SMALL_IMAGE_ID_VERSION: SaveVersion = SaveVersion(0x6E);
/// Terrain grid holds u16 tile flags at or below this, u32 above.
pub const SAVE_GAME_LAST_NARROW_TERRAIN_VERSION: SaveVersion = SaveVersion(0x72);
/// Docks could be saved with the orientation sentinel 4 at or below this.
pub const SAVE_GAME_LAST_DOCK_ORIENTATION_BUG_VERSION: SaveVersion = SaveVersion(0x74);
/// Caravanserai type data is one byte short at or below this. The writer
/// bug shipped; readers must consume 41 bytes to stay aligned.
pub const SAVE_GAME_LAST_SHORT_CARAVANSERAI_VERSION: SaveVersion = SaveVersion(0x76);
/// Compressed pieces use zlib at or below this, LZ4 above.
pub const SAVE_GAME_LAST_LEGACY_COMPRESSION_VERSION: SaveVersion = SaveVersion(0x78);
/// Building type data occupies 42 bytes at or below this, 26 above.
pub const SAVE_GAME_LAST_ORIGINAL_TYPE_DATA_VERSION: SaveVersion = SaveVersion(0x7A);
/// Resource amounts live inline in type data at or below this; above it the
/// per-record resource block exists and the header carries a resource
/// version field.
pub const SAVE_GAME_LAST_STATIC_RESOURCE_VERSION: SaveVersion = SaveVersion(0x7C);
/// Workshop progress counted half units at or below this.
pub const SAVE_GAME_LAST_UNSCALED_PROGRESS_VERSION: SaveVersion = SaveVersion(0x7E);
/// Roadblock-like buildings had no meaningful permission byte at or below
/// this.
pub const SAVE_GAME_LAST_OPEN_PERMISSIONS_VERSION: SaveVersion = SaveVersion(0x80);
/// Industry buildings tracked output in the global loads_stored counter at
/// or below this.
pub const SAVE_GAME_LAST_GLOBAL_LOADS_VERSION: SaveVersion = SaveVersion(0x82);
/// Markets and docks had no accepted-goods mask at or below this.
pub const SAVE_GAME_LAST_UNFILTERED_ACCEPTS_VERSION: SaveVersion = SaveVersion(0x84);
/// Warehouse resource slots could disagree with the stored type at or below
/// this.
pub const SAVE_GAME_LAST_UNCHECKED_STORAGE_VERSION: SaveVersion = SaveVersion(0x86);
/// The embedded scenario version is derived from the save version at or
/// below this, stored in the header above.
pub const SAVE_GAME_LAST_DERIVED_SCENARIO_VERSION: SaveVersion = SaveVersion(0x88);
/// The version this build writes.
pub const SAVE_GAME_CURRENT_VERSION: SaveVersion = SaveVersion(0x90);

impl SaveVersion {
    pub fn is_supported(self) -> bool {
        self >= SAVE_GAME_VERSION_CLASSIC && self <= SAVE_GAME_CURRENT_VERSION
    }

    pub fn has_dynamic_entities(self) -> bool {
        self > SAVE_GAME_LAST_STATIC_COUNT_VERSION
    }

    pub fn has_wide_image_ids(self) -> bool {
        self > SAVE_GAME_LAST_SMALL_IMAGE_ID_VERSION
    }

    pub fn has_wide_terrain(self) -> bool {
        self > SAVE_GAME_LAST_NARROW_TERRAIN_VERSION
    }

    pub fn has_short_caravanserai(self) -> bool {
        self <= SAVE_GAME_LAST_SHORT_CARAVANSERAI_VERSION
    }

    pub fn uses_legacy_compression(self) -> bool {
        self <= SAVE_GAME_LAST_LEGACY_COMPRESSION_VERSION
    }

    pub fn has_reduced_type_data(self) -> bool {
        self > SAVE_GAME_LAST_ORIGINAL_TYPE_DATA_VERSION
    }

    pub fn has_dynamic_resources(self) -> bool {
        self > SAVE_GAME_LAST_STATIC_RESOURCE_VERSION
    }

    pub fn stores_resource_version(self) -> bool {
        self.has_dynamic_resources()
    }

    pub fn stores_scenario_version(self) -> bool {
        self > SAVE_GAME_LAST_DERIVED_SCENARIO_VERSION
    }

    /// Resource table epoch for saves old enough to predate the resource
    /// version header field.
    pub fn derived_resource_epoch(self) -> ResourceEpoch {
        if self <= SAVE_GAME_LAST_SMALL_IMAGE_ID_VERSION {
            ResourceEpoch::JoinedMeat
        } else if self <= SAVE_GAME_LAST_DOCK_ORIENTATION_BUG_VERSION {
            ResourceEpoch::SeparateFish
        } else if self <= SAVE_GAME_LAST_LEGACY_COMPRESSION_VERSION {
            ResourceEpoch::WithGold
        } else {
            ResourceEpoch::WithStone
        }
    }

    /// Embedded scenario version for saves that predate the explicit field.
    pub fn derived_scenario_version(self) -> ScenarioVersion {
        if self <= SAVE_GAME_LAST_STATIC_COUNT_VERSION {
            SCENARIO_VERSION_NONE
        } else if self <= SAVE_GAME_LAST_NARROW_TERRAIN_VERSION {
            ScenarioVersion(3)
        } else if self <= SAVE_GAME_LAST_STATIC_RESOURCE_VERSION {
            ScenarioVersion(4)
        } else if self <= SAVE_GAME_LAST_OPEN_PERMISSIONS_VERSION {
            ScenarioVersion(5)
        } else {
            ScenarioVersion(6)
        }
    }
}

/// Scenario format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScenarioVersion(pub u32);

/// Version assigned to scenario files without the magic header.
pub const SCENARIO_VERSION_NONE: ScenarioVersion = ScenarioVersion(1);
/// Terrain grid holds u16 tile flags at or below this, u32 above.
pub const SCENARIO_LAST_NARROW_TERRAIN_VERSION: ScenarioVersion = ScenarioVersion(3);
/// Compressed scenario pieces use zlib at or below this, LZ4 above.
pub const SCENARIO_LAST_LEGACY_COMPRESSION_VERSION: ScenarioVersion = ScenarioVersion(4);
/// Request/invasion arrays are fixed 20-entry tables at or below this,
/// dynamic pieces above.
pub const SCENARIO_LAST_STATIC_REQUESTS_VERSION: ScenarioVersion = ScenarioVersion(5);
/// Allowed-buildings array holds 50 entries at or below this, 80 above.
pub const SCENARIO_LAST_SMALL_ALLOWED_BUILDINGS_VERSION: ScenarioVersion = ScenarioVersion(6);
/// The version this build writes.
pub const SCENARIO_CURRENT_VERSION: ScenarioVersion = ScenarioVersion(7);

impl ScenarioVersion {
    pub fn is_supported(self) -> bool {
        self >= SCENARIO_VERSION_NONE && self <= SCENARIO_CURRENT_VERSION
    }

    pub fn has_wide_terrain(self) -> bool {
        self > SCENARIO_LAST_NARROW_TERRAIN_VERSION
    }

    pub fn uses_legacy_compression(self) -> bool {
        self <= SCENARIO_LAST_LEGACY_COMPRESSION_VERSION
    }

    pub fn has_dynamic_requests(self) -> bool {
        self > SCENARIO_LAST_STATIC_REQUESTS_VERSION
    }

    pub fn has_large_allowed_buildings(self) -> bool {
        self > SCENARIO_LAST_SMALL_ALLOWED_BUILDINGS_VERSION
    }

    pub fn resource_epoch(self) -> ResourceEpoch {
        match self.0 {
            0..=2 => ResourceEpoch::JoinedMeat,
            3 => ResourceEpoch::SeparateFish,
            4 => ResourceEpoch::WithGold,
            5 | 6 => ResourceEpoch::WithStone,
            _ => ResourceEpoch::Current,
        }
    }
}
