// ---------------------------------------------------------------------------
// save – versioned binary persistence for savegames and scenarios
// ---------------------------------------------------------------------------
//
// Reads every historical format revision, migrating old layouts (resource
// id epochs, piece sizes, building record growth, preserved legacy bugs)
// onto current in-memory state; writes only the current format.

mod atomic_write;
pub mod buffer;
pub mod building_fixes;
pub mod building_state;
pub mod compression;
pub mod container;
pub mod context;
pub mod error;
pub mod layout;
pub mod map_state;
pub mod piece;
pub mod resource_mapping;
pub mod savegame_io;
pub mod scenario_io;
pub mod version;

pub use context::DecodeContext;
pub use error::SaveError;
pub use map_state::{GameTime, TradePrices};
pub use resource_mapping::{ResourceEpoch, ResourceMapping};
pub use savegame_io::{
    load_savegame, read_savegame_info, savegame_from_slice, savegame_info_from_slice,
    savegame_to_vec, write_savegame, Savegame, SavegameInfo,
};
pub use scenario_io::{
    load_scenario, scenario_from_slice, scenario_to_vec, write_scenario, ScenarioFile,
    ScenarioMap,
};
pub use version::{SaveVersion, ScenarioVersion, SAVE_GAME_CURRENT_VERSION};
