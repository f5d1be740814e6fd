// ---------------------------------------------------------------------------
// Layout planner: the exact piece sequence for a given format version
// ---------------------------------------------------------------------------
//
// Piece order is append-only across history: newer versions only resize
// pieces or switch them between fixed and dynamic sizing, never reorder
// them. Each planner therefore walks the current order and resolves every
// size from the version's feature predicates.

use city::config::GRID_AREA;

use crate::building_state::BUILDING_STATE_ORIGINAL_BUFFER_SIZE;
use crate::piece::PieceSpec;
use crate::version::{SaveVersion, ScenarioVersion};

// Entity array shapes of the static-count era.
pub const MAX_BUILDINGS_LEGACY: usize = 2000;
pub const MAX_FIGURES_LEGACY: usize = 2000;
pub const FIGURE_STATE_SIZE: usize = 128;
pub const MAX_ROUTES_LEGACY: usize = 600;
pub const ROUTE_PATH_LENGTH: usize = 500;
pub const MAX_FORMATIONS_LEGACY: usize = 50;
pub const FORMATION_STATE_SIZE: usize = 128;

// Fixed piece sizes.
pub const MAP_INFO_SIZE: usize = 16;
pub const GAME_TIME_SIZE: usize = 20;
pub const CAMERA_SIZE: usize = 8;
pub const HIGHEST_BUILDING_ID_SIZE: usize = 4;
pub const RANDOM_IV_SIZE: usize = 8;
pub const EMPIRE_CITIES_SIZE: usize = 2706;
pub const CUSTOM_NAME_SIZE: usize = 64;

/// City state grew at the end across versions; older files are
/// zero-extended on load.
pub const CITY_DATA_ORIGINAL_SIZE: usize = 2432;
pub const CITY_DATA_CURRENT_SIZE: usize = 2560;

pub const SCENARIO_SETTINGS_BASE_SIZE: usize = 97;
pub const ALLOWED_BUILDINGS_ORIGINAL_COUNT: usize = 50;
pub const ALLOWED_BUILDINGS_CURRENT_COUNT: usize = 80;

pub const REQUEST_STATE_SIZE: usize = 8;
pub const INVASION_STATE_SIZE: usize = 8;
pub const MAX_REQUESTS_LEGACY: usize = 20;
pub const MAX_INVASIONS_LEGACY: usize = 20;

/// Buy and sell price per resource id.
pub const TRADE_PRICE_ENTRY_SIZE: usize = 8;

pub fn allowed_buildings_count(version: ScenarioVersion) -> usize {
    if version.has_large_allowed_buildings() {
        ALLOWED_BUILDINGS_CURRENT_COUNT
    } else {
        ALLOWED_BUILDINGS_ORIGINAL_COUNT
    }
}

pub fn scenario_settings_size(version: ScenarioVersion) -> usize {
    SCENARIO_SETTINGS_BASE_SIZE + allowed_buildings_count(version)
}

/// The scenario-rule pieces shared by both families. In a savegame these
/// are sized by the embedded scenario version.
fn push_scenario_rule_pieces(plan: &mut Vec<PieceSpec>, version: ScenarioVersion) {
    plan.push(PieceSpec::fixed("map_info", MAP_INFO_SIZE, false));
    plan.push(PieceSpec::fixed(
        "scenario_settings",
        scenario_settings_size(version),
        false,
    ));
    if version.has_dynamic_requests() {
        plan.push(PieceSpec::dynamic("scenario_requests", true));
        plan.push(PieceSpec::dynamic("scenario_invasions", true));
    } else {
        plan.push(PieceSpec::fixed(
            "scenario_requests",
            MAX_REQUESTS_LEGACY * REQUEST_STATE_SIZE,
            true,
        ));
        plan.push(PieceSpec::fixed(
            "scenario_invasions",
            MAX_INVASIONS_LEGACY * INVASION_STATE_SIZE,
            true,
        ));
    }
    plan.push(PieceSpec::fixed("custom_name", CUSTOM_NAME_SIZE, false));
}

/// Piece sequence of a scenario file at `version`.
pub fn scenario_pieces(version: ScenarioVersion) -> Vec<PieceSpec> {
    let terrain_size = if version.has_wide_terrain() {
        GRID_AREA * 4
    } else {
        GRID_AREA * 2
    };

    let mut plan = Vec::new();
    plan.push(PieceSpec::fixed("map_info", MAP_INFO_SIZE, false));
    plan.push(PieceSpec::fixed(
        "scenario_settings",
        scenario_settings_size(version),
        false,
    ));
    plan.push(PieceSpec::fixed("terrain_grid", terrain_size, true));
    plan.push(PieceSpec::fixed("elevation_grid", GRID_AREA, true));
    plan.push(PieceSpec::fixed("random_grid", GRID_AREA, false));
    plan.push(PieceSpec::fixed("edge_grid", GRID_AREA, true));
    if version.has_dynamic_requests() {
        plan.push(PieceSpec::dynamic("scenario_requests", true));
        plan.push(PieceSpec::dynamic("scenario_invasions", true));
    } else {
        plan.push(PieceSpec::fixed(
            "scenario_requests",
            MAX_REQUESTS_LEGACY * REQUEST_STATE_SIZE,
            true,
        ));
        plan.push(PieceSpec::fixed(
            "scenario_invasions",
            MAX_INVASIONS_LEGACY * INVASION_STATE_SIZE,
            true,
        ));
    }
    plan.push(PieceSpec::fixed("custom_name", CUSTOM_NAME_SIZE, false));
    plan
}

/// Piece sequence of a savegame at `version`. The scenario-rule pieces are
/// sized by the embedded `scenario_version`; `resource_count` is the
/// file's epoch resource total and sizes the trade price table.
pub fn savegame_pieces(
    version: SaveVersion,
    scenario_version: ScenarioVersion,
    resource_count: usize,
) -> Vec<PieceSpec> {
    let image_grid_size = if version.has_wide_image_ids() {
        GRID_AREA * 4
    } else {
        GRID_AREA * 2
    };
    let terrain_size = if version.has_wide_terrain() {
        GRID_AREA * 4
    } else {
        GRID_AREA * 2
    };
    let city_data_size = if version.has_dynamic_resources() {
        CITY_DATA_CURRENT_SIZE
    } else {
        CITY_DATA_ORIGINAL_SIZE
    };
    let dynamic_entities = version.has_dynamic_entities();

    let mut plan = Vec::new();
    push_scenario_rule_pieces(&mut plan, scenario_version);

    plan.push(PieceSpec::fixed("image_grid", image_grid_size, true));
    plan.push(PieceSpec::fixed("edge_grid", GRID_AREA, true));
    plan.push(PieceSpec::fixed("building_grid", GRID_AREA * 2, true));
    plan.push(PieceSpec::fixed("terrain_grid", terrain_size, true));
    plan.push(PieceSpec::fixed("aqueduct_grid", GRID_AREA, true));
    plan.push(PieceSpec::fixed("figure_grid", GRID_AREA * 2, true));
    plan.push(PieceSpec::fixed("bitfields_grid", GRID_AREA, true));
    plan.push(PieceSpec::fixed("sprite_grid", GRID_AREA, true));
    plan.push(PieceSpec::fixed("random_grid", GRID_AREA, false));
    plan.push(PieceSpec::fixed("desirability_grid", GRID_AREA, true));
    plan.push(PieceSpec::fixed("elevation_grid", GRID_AREA, true));

    if dynamic_entities {
        plan.push(PieceSpec::dynamic("figures", true));
        plan.push(PieceSpec::dynamic("route_figures", true));
        plan.push(PieceSpec::dynamic("route_paths", true));
        plan.push(PieceSpec::dynamic("formations", true));
    } else {
        plan.push(PieceSpec::fixed(
            "figures",
            MAX_FIGURES_LEGACY * FIGURE_STATE_SIZE,
            true,
        ));
        plan.push(PieceSpec::fixed(
            "route_figures",
            MAX_ROUTES_LEGACY * 2,
            true,
        ));
        plan.push(PieceSpec::fixed(
            "route_paths",
            MAX_ROUTES_LEGACY * ROUTE_PATH_LENGTH,
            true,
        ));
        plan.push(PieceSpec::fixed(
            "formations",
            MAX_FORMATIONS_LEGACY * FORMATION_STATE_SIZE,
            true,
        ));
    }

    plan.push(PieceSpec::fixed("city_data", city_data_size, true));
    plan.push(PieceSpec::fixed("game_time", GAME_TIME_SIZE, false));
    plan.push(PieceSpec::fixed("city_view_camera", CAMERA_SIZE, false));
    plan.push(PieceSpec::fixed(
        "highest_building_id",
        HIGHEST_BUILDING_ID_SIZE,
        false,
    ));
    plan.push(PieceSpec::fixed("random_iv", RANDOM_IV_SIZE, false));
    plan.push(PieceSpec::fixed(
        "trade_prices",
        resource_count * TRADE_PRICE_ENTRY_SIZE,
        false,
    ));

    if dynamic_entities {
        plan.push(PieceSpec::dynamic("buildings", true));
    } else {
        plan.push(PieceSpec::fixed(
            "buildings",
            MAX_BUILDINGS_LEGACY * BUILDING_STATE_ORIGINAL_BUFFER_SIZE,
            true,
        ));
    }

    plan.push(PieceSpec::fixed(
        "empire_cities",
        EMPIRE_CITIES_SIZE,
        true,
    ));
    plan.push(PieceSpec::dynamic("messages", true));
    plan.push(PieceSpec::dynamic("custom_empire", false));
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceSizing;
    use crate::version::{SAVE_GAME_CURRENT_VERSION, SCENARIO_CURRENT_VERSION};
    use city::resource::RESOURCE_MAX;

    #[test]
    fn test_savegame_order_is_stable_across_versions() {
        let old = savegame_pieces(SaveVersion(0x66), ScenarioVersion(1), 16);
        let new = savegame_pieces(SAVE_GAME_CURRENT_VERSION, SCENARIO_CURRENT_VERSION, RESOURCE_MAX);
        assert_eq!(old.len(), new.len());
        for (a, b) in old.iter().zip(new.iter()) {
            assert_eq!(a.name, b.name);
        }
    }

    #[test]
    fn test_image_and_terrain_grids_widen() {
        let old = savegame_pieces(SaveVersion(0x66), ScenarioVersion(1), 16);
        let new = savegame_pieces(SAVE_GAME_CURRENT_VERSION, SCENARIO_CURRENT_VERSION, RESOURCE_MAX);
        let size_of = |plan: &[PieceSpec], name: &str| match plan
            .iter()
            .find(|p| p.name == name)
            .unwrap()
            .sizing
        {
            PieceSizing::Fixed(n) => n,
            PieceSizing::Dynamic => panic!("{name} should be fixed"),
        };
        assert_eq!(size_of(&old, "image_grid"), GRID_AREA * 2);
        assert_eq!(size_of(&new, "image_grid"), GRID_AREA * 4);
        assert_eq!(size_of(&old, "terrain_grid"), GRID_AREA * 2);
        assert_eq!(size_of(&new, "terrain_grid"), GRID_AREA * 4);
    }

    #[test]
    fn test_entity_pieces_switch_to_dynamic() {
        let old = savegame_pieces(SaveVersion(0x6A), ScenarioVersion(1), 16);
        let new = savegame_pieces(SaveVersion(0x6B), ScenarioVersion(3), 16);
        for name in ["figures", "route_figures", "route_paths", "formations", "buildings"] {
            let find = |plan: &[PieceSpec]| plan.iter().find(|p| p.name == name).unwrap().sizing;
            assert!(matches!(find(&old), PieceSizing::Fixed(_)), "{name}");
            assert_eq!(find(&new), PieceSizing::Dynamic, "{name}");
        }
    }

    #[test]
    fn test_trade_prices_scale_with_epoch() {
        let plan = savegame_pieces(SaveVersion(0x90), SCENARIO_CURRENT_VERSION, 18);
        let prices = plan.iter().find(|p| p.name == "trade_prices").unwrap();
        assert_eq!(prices.sizing, PieceSizing::Fixed(18 * TRADE_PRICE_ENTRY_SIZE));
    }

    #[test]
    fn test_scenario_requests_switch_to_dynamic() {
        let old = scenario_pieces(ScenarioVersion(5));
        let new = scenario_pieces(ScenarioVersion(6));
        let find = |plan: &[PieceSpec], name: &str| {
            plan.iter().find(|p| p.name == name).unwrap().sizing
        };
        assert_eq!(
            find(&old, "scenario_requests"),
            PieceSizing::Fixed(MAX_REQUESTS_LEGACY * REQUEST_STATE_SIZE)
        );
        assert_eq!(find(&new, "scenario_requests"), PieceSizing::Dynamic);
    }

    #[test]
    fn test_settings_size_grows_with_allowed_buildings() {
        assert_eq!(
            scenario_settings_size(ScenarioVersion(6)),
            SCENARIO_SETTINGS_BASE_SIZE + ALLOWED_BUILDINGS_ORIGINAL_COUNT
        );
        assert_eq!(
            scenario_settings_size(SCENARIO_CURRENT_VERSION),
            SCENARIO_SETTINGS_BASE_SIZE + ALLOWED_BUILDINGS_CURRENT_COUNT
        );
    }

    #[test]
    fn test_last_savegame_piece_is_custom_empire() {
        let plan = savegame_pieces(SAVE_GAME_CURRENT_VERSION, SCENARIO_CURRENT_VERSION, RESOURCE_MAX);
        assert_eq!(plan.last().unwrap().name, "custom_empire");
    }
}
