// ---------------------------------------------------------------------------
// Savegame files: header, full load/save pipeline, and the info peek
// ---------------------------------------------------------------------------
//
// Header layout:
//   [campaign_mission u32][version u32]
//   [resource_version u32]   only above the static-resource version
//   [scenario_version u32]   only above the derived-scenario version
// followed by the savegame piece sequence. The version check happens on the
// header alone, before any piece is sized or allocated.
//
// Loading runs in stages: header, piece container, scenario rules, grids,
// entities, buildings (with fixes), opaque subsystem buffers. Saving always
// emits the current version.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use city::building::Building;
use city::config::GRID_AREA;
use city::resource::RESOURCE_MAX;
use city::scenario::Scenario;

use crate::atomic_write::atomic_write;
use crate::buffer::BufferReader;
use crate::building_fixes::apply_building_fixes;
use crate::building_state::{read_buildings, write_buildings};
use crate::compression::CompressionAlgo;
use crate::container::{read_pieces, read_pieces_selective, write_pieces};
use crate::context::DecodeContext;
use crate::error::SaveError;
use crate::layout::{savegame_pieces, CITY_DATA_CURRENT_SIZE};
use crate::map_state::{
    city_data_population, city_data_treasury, extend_city_data, read_game_time,
    read_scaling_grid, read_trade_prices, write_game_time, write_scaling_grid,
    write_trade_prices, GameTime, TradePrices,
};
use crate::resource_mapping::{epoch_for_savegame, ResourceEpoch, ResourceMapping};
use crate::scenario_io::{
    read_fixed_string, read_invasions, read_map_info, read_requests, read_scenario_settings,
    write_fixed_string, write_invasions, write_map_info, write_requests,
    write_scenario_settings,
};
use crate::version::{
    SaveVersion, ScenarioVersion, SAVE_GAME_CURRENT_VERSION, SAVE_GAME_VERSION_CLASSIC,
    SCENARIO_CURRENT_VERSION,
};

const CUSTOM_NAME_FIELD_SIZE: usize = 64;

/// A fully loaded savegame, migrated to current semantics. Pieces the save
/// layer does not interpret are carried as opaque buffers for their
/// subsystems.
#[derive(Debug, Clone, PartialEq)]
pub struct Savegame {
    pub campaign_mission: u32,
    pub scenario: Scenario,
    pub image_grid: Vec<u32>,
    pub terrain_grid: Vec<u32>,
    pub edge_grid: Vec<u8>,
    pub building_grid: Vec<u8>,
    pub aqueduct_grid: Vec<u8>,
    pub figure_grid: Vec<u8>,
    pub bitfields_grid: Vec<u8>,
    pub sprite_grid: Vec<u8>,
    pub random_grid: Vec<u8>,
    pub desirability_grid: Vec<u8>,
    pub elevation_grid: Vec<u8>,
    pub figures: Vec<u8>,
    pub route_figures: Vec<u8>,
    pub route_paths: Vec<u8>,
    pub formations: Vec<u8>,
    pub city_data: Vec<u8>,
    pub game_time: GameTime,
    pub camera_x: i32,
    pub camera_y: i32,
    pub highest_building_id: u32,
    pub random_iv: [u32; 2],
    pub trade_prices: TradePrices,
    pub buildings: Vec<Building>,
    pub empire_cities: Vec<u8>,
    pub messages: Vec<u8>,
    pub custom_empire: Option<Vec<u8>>,
}

impl Default for Savegame {
    fn default() -> Self {
        Savegame {
            campaign_mission: 0,
            scenario: Scenario::default(),
            image_grid: vec![0; GRID_AREA],
            terrain_grid: vec![0; GRID_AREA],
            edge_grid: vec![0; GRID_AREA],
            building_grid: vec![0; GRID_AREA * 2],
            aqueduct_grid: vec![0; GRID_AREA],
            figure_grid: vec![0; GRID_AREA * 2],
            bitfields_grid: vec![0; GRID_AREA],
            sprite_grid: vec![0; GRID_AREA],
            random_grid: vec![0; GRID_AREA],
            desirability_grid: vec![0; GRID_AREA],
            elevation_grid: vec![0; GRID_AREA],
            figures: Vec::new(),
            route_figures: Vec::new(),
            route_paths: Vec::new(),
            formations: Vec::new(),
            city_data: vec![0; CITY_DATA_CURRENT_SIZE],
            game_time: GameTime::default(),
            camera_x: 0,
            camera_y: 0,
            highest_building_id: 0,
            random_iv: [0; 2],
            trade_prices: TradePrices::default(),
            buildings: Vec::new(),
            empire_cities: vec![0; crate::layout::EMPIRE_CITIES_SIZE],
            messages: Vec::new(),
            custom_empire: None,
        }
    }
}

/// Summary a file picker shows without loading the world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavegameInfo {
    pub campaign_mission: u32,
    pub version: u32,
    pub description: String,
    pub population: u32,
    pub treasury: i32,
    pub game_year: i32,
}

struct SavegameHeader {
    campaign_mission: u32,
    version: SaveVersion,
    resource_version: Option<u32>,
    scenario_version: ScenarioVersion,
    piece_start: usize,
}

fn read_savegame_header(bytes: &[u8]) -> Result<SavegameHeader, SaveError> {
    if bytes.len() < 8 {
        return Err(SaveError::WrongFormat(format!(
            "file is only {} bytes long",
            bytes.len()
        )));
    }
    let mut r = BufferReader::new(bytes);
    let campaign_mission = r.u32();
    let version = SaveVersion(r.u32());

    // Reject future files on the header alone, before sizing anything.
    if version > SAVE_GAME_CURRENT_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: version.0,
            supported: SAVE_GAME_CURRENT_VERSION.0,
        });
    }
    if version < SAVE_GAME_VERSION_CLASSIC {
        return Err(SaveError::WrongFormat(format!(
            "version field {:#x} is below the oldest known format",
            version.0
        )));
    }

    let resource_version = if version.stores_resource_version() {
        Some(r.u32())
    } else {
        None
    };
    let scenario_version = if version.stores_scenario_version() {
        ScenarioVersion(r.u32())
    } else {
        version.derived_scenario_version()
    };
    if scenario_version > SCENARIO_CURRENT_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: scenario_version.0,
            supported: SCENARIO_CURRENT_VERSION.0,
        });
    }

    Ok(SavegameHeader {
        campaign_mission,
        version,
        resource_version,
        scenario_version,
        piece_start: r.pos(),
    })
}

fn compression_for(version: SaveVersion) -> CompressionAlgo {
    if version.uses_legacy_compression() {
        CompressionAlgo::LegacyZlib
    } else {
        CompressionAlgo::Lz4
    }
}

fn resolve_epoch(header: &SavegameHeader) -> Result<ResourceEpoch, SaveError> {
    epoch_for_savegame(header.version, header.resource_version).ok_or_else(|| {
        SaveError::WrongFormat(format!(
            "unknown resource version {:?}",
            header.resource_version
        ))
    })
}

pub fn load_savegame(path: &Path) -> Result<Savegame, SaveError> {
    let bytes = std::fs::read(path)?;
    savegame_from_slice(&bytes)
}

pub fn savegame_from_slice(bytes: &[u8]) -> Result<Savegame, SaveError> {
    let header = read_savegame_header(bytes)?;
    let version = header.version;
    let epoch = resolve_epoch(&header)?;

    info!(
        version = version.0,
        scenario_version = header.scenario_version.0,
        resource_version = epoch.resource_version(),
        "loading savegame"
    );

    let plan = savegame_pieces(version, header.scenario_version, epoch.resource_count());
    let pieces = read_pieces(bytes, header.piece_start, &plan, compression_for(version))?;

    // -- Scenario rules: decoded first, the remap epoch depends on them --
    let mut scenario = Scenario {
        map: read_map_info(pieces.buf("map_info")),
        settings: read_scenario_settings(pieces.buf("scenario_settings"), header.scenario_version),
        requests: Vec::new(),
        invasions: Vec::new(),
        custom_name: read_fixed_string(pieces.buf("custom_name")),
    };
    let mapping = ResourceMapping::new(epoch, &scenario);
    scenario.requests = read_requests(pieces.buf("scenario_requests"), &mapping);
    scenario.invasions = read_invasions(pieces.buf("scenario_invasions"));

    let ctx = DecodeContext::new(version, mapping);

    // -- Buildings: decode, then the version-gated fixes --
    let mut buildings = read_buildings(pieces.buf("buildings"), &ctx)?;
    for (fix, affected) in apply_building_fixes(&mut buildings, version) {
        info!(fix, affected, "building migration applied");
    }

    let mut camera = BufferReader::new(pieces.buf("city_view_camera"));
    let mut highest = BufferReader::new(pieces.buf("highest_building_id"));
    let mut random_iv = BufferReader::new(pieces.buf("random_iv"));

    Ok(Savegame {
        campaign_mission: header.campaign_mission,
        scenario,
        image_grid: read_scaling_grid(pieces.buf("image_grid"), version.has_wide_image_ids())?,
        terrain_grid: read_scaling_grid(pieces.buf("terrain_grid"), version.has_wide_terrain())?,
        edge_grid: pieces.buf("edge_grid").to_vec(),
        building_grid: pieces.buf("building_grid").to_vec(),
        aqueduct_grid: pieces.buf("aqueduct_grid").to_vec(),
        figure_grid: pieces.buf("figure_grid").to_vec(),
        bitfields_grid: pieces.buf("bitfields_grid").to_vec(),
        sprite_grid: pieces.buf("sprite_grid").to_vec(),
        random_grid: pieces.buf("random_grid").to_vec(),
        desirability_grid: pieces.buf("desirability_grid").to_vec(),
        elevation_grid: pieces.buf("elevation_grid").to_vec(),
        figures: pieces.buf("figures").to_vec(),
        route_figures: pieces.buf("route_figures").to_vec(),
        route_paths: pieces.buf("route_paths").to_vec(),
        formations: pieces.buf("formations").to_vec(),
        city_data: extend_city_data(pieces.buf("city_data")),
        game_time: read_game_time(pieces.buf("game_time")),
        camera_x: camera.i32(),
        camera_y: camera.i32(),
        highest_building_id: highest.u32(),
        random_iv: [random_iv.u32(), random_iv.u32()],
        trade_prices: read_trade_prices(pieces.buf("trade_prices"), &ctx.mapping),
        buildings,
        empire_cities: pieces.buf("empire_cities").to_vec(),
        messages: pieces.buf("messages").to_vec(),
        custom_empire: pieces
            .get("custom_empire")
            .filter(|p| !p.is_absent())
            .map(|p| p.buf.clone()),
    })
}

/// Serializes a savegame in the current format. Reading an old file and
/// saving always produces the current layout; old layouts are never
/// written back.
pub fn savegame_to_vec(save: &Savegame) -> Vec<u8> {
    let version = SAVE_GAME_CURRENT_VERSION;
    let plan = savegame_pieces(version, SCENARIO_CURRENT_VERSION, RESOURCE_MAX);

    let map_info = write_map_info(&save.scenario.map);
    let settings = write_scenario_settings(&save.scenario.settings);
    let requests = write_requests(&save.scenario.requests);
    let invasions = write_invasions(&save.scenario.invasions);
    let custom_name = write_fixed_string(&save.scenario.custom_name, CUSTOM_NAME_FIELD_SIZE);
    let image_grid = write_scaling_grid(&save.image_grid);
    let terrain_grid = write_scaling_grid(&save.terrain_grid);
    let game_time = write_game_time(&save.game_time);
    let mut camera = vec![0u8; crate::layout::CAMERA_SIZE];
    camera[..4].copy_from_slice(&save.camera_x.to_le_bytes());
    camera[4..].copy_from_slice(&save.camera_y.to_le_bytes());
    let highest = save.highest_building_id.to_le_bytes().to_vec();
    let mut random_iv = Vec::with_capacity(8);
    random_iv.extend_from_slice(&save.random_iv[0].to_le_bytes());
    random_iv.extend_from_slice(&save.random_iv[1].to_le_bytes());
    let trade_prices = write_trade_prices(&save.trade_prices);
    let buildings = write_buildings(&save.buildings);
    let empty: Vec<u8> = Vec::new();
    let custom_empire = save.custom_empire.as_ref().unwrap_or(&empty);

    let buffers: Vec<(&str, &[u8])> = vec![
        ("map_info", &map_info),
        ("scenario_settings", &settings),
        ("scenario_requests", &requests),
        ("scenario_invasions", &invasions),
        ("custom_name", &custom_name),
        ("image_grid", &image_grid),
        ("edge_grid", &save.edge_grid),
        ("building_grid", &save.building_grid),
        ("terrain_grid", &terrain_grid),
        ("aqueduct_grid", &save.aqueduct_grid),
        ("figure_grid", &save.figure_grid),
        ("bitfields_grid", &save.bitfields_grid),
        ("sprite_grid", &save.sprite_grid),
        ("random_grid", &save.random_grid),
        ("desirability_grid", &save.desirability_grid),
        ("elevation_grid", &save.elevation_grid),
        ("figures", &save.figures),
        ("route_figures", &save.route_figures),
        ("route_paths", &save.route_paths),
        ("formations", &save.formations),
        ("city_data", &save.city_data),
        ("game_time", &game_time),
        ("city_view_camera", &camera),
        ("highest_building_id", &highest),
        ("random_iv", &random_iv),
        ("trade_prices", &trade_prices),
        ("buildings", &buildings),
        ("empire_cities", &save.empire_cities),
        ("messages", &save.messages),
        ("custom_empire", custom_empire),
    ];

    let ordered: Vec<_> = plan
        .iter()
        .map(|spec| {
            let buf = buffers
                .iter()
                .find(|(name, _)| *name == spec.name)
                .map(|(_, buf)| *buf)
                .unwrap_or(&[]);
            (*spec, buf)
        })
        .collect();

    let mut out = Vec::new();
    out.extend_from_slice(&save.campaign_mission.to_le_bytes());
    out.extend_from_slice(&version.0.to_le_bytes());
    out.extend_from_slice(&ResourceEpoch::Current.resource_version().to_le_bytes());
    out.extend_from_slice(&SCENARIO_CURRENT_VERSION.0.to_le_bytes());
    write_pieces(&mut out, &ordered);
    out
}

pub fn write_savegame(save: &Savegame, path: &Path) -> Result<(), SaveError> {
    atomic_write(path, &savegame_to_vec(save))?;
    info!(path = %path.display(), "savegame written");
    Ok(())
}

pub fn read_savegame_info(path: &Path) -> Result<SavegameInfo, SaveError> {
    let bytes = std::fs::read(path)?;
    savegame_info_from_slice(&bytes)
}

/// Reads the file-picker summary without decompressing the world pieces:
/// the container walk seeks over everything except the three pieces the
/// summary needs.
pub fn savegame_info_from_slice(bytes: &[u8]) -> Result<SavegameInfo, SaveError> {
    let header = read_savegame_header(bytes)?;
    let epoch = resolve_epoch(&header)?;

    let plan = savegame_pieces(header.version, header.scenario_version, epoch.resource_count());
    let pieces = read_pieces_selective(
        bytes,
        header.piece_start,
        &plan,
        compression_for(header.version),
        &["scenario_settings", "city_data", "game_time"],
    )?;

    let settings = read_scenario_settings(pieces.buf("scenario_settings"), header.scenario_version);
    let city_data = pieces.buf("city_data");
    let game_time = read_game_time(pieces.buf("game_time"));

    Ok(SavegameInfo {
        campaign_mission: header.campaign_mission,
        version: header.version.0,
        description: settings.description,
        population: city_data_population(city_data),
        treasury: city_data_treasury(city_data),
        game_year: game_time.year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferWriter;
    use crate::building_state::BUILDING_STATE_ORIGINAL_BUFFER_SIZE;
    use crate::compression::UNCOMPRESSED_MARKER;
    use crate::layout::{
        CITY_DATA_ORIGINAL_SIZE, MAX_BUILDINGS_LEGACY, TRADE_PRICE_ENTRY_SIZE,
    };
    use crate::piece::PieceSizing;
    use city::building::{BuildingType, SupplierData, TypeData};
    use city::resource::Resource;
    use city::scenario::Request;

    /// Serializes pieces the way a legacy writer would, storing compressed
    /// pieces raw behind the marker (readers of every version accept it).
    fn legacy_container(plan: &[crate::piece::PieceSpec], filled: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut out = Vec::new();
        for spec in plan {
            let buf: Vec<u8> = match filled.iter().find(|(name, _)| *name == spec.name) {
                Some((_, buf)) => buf.clone(),
                None => match spec.sizing {
                    PieceSizing::Fixed(n) => vec![0u8; n],
                    PieceSizing::Dynamic => Vec::new(),
                },
            };
            if spec.sizing == PieceSizing::Dynamic {
                out.extend_from_slice(&(buf.len() as u32).to_le_bytes());
                if buf.is_empty() {
                    continue;
                }
            }
            if spec.compressed {
                out.extend_from_slice(&UNCOMPRESSED_MARKER.to_le_bytes());
            }
            out.extend_from_slice(&buf);
        }
        out
    }

    /// A complete v0x66 savegame: fixed-count entities, joined meat/fish
    /// epoch, narrow grids, original city data, wharf-allowing scenario.
    fn legacy_savegame_v66() -> Vec<u8> {
        let version = SaveVersion(0x66);
        let scenario_version = version.derived_scenario_version();
        let plan = savegame_pieces(version, scenario_version, 16);

        // Scenario settings: 64-byte description, climate, 9 win/funds
        // fields, 50 allowed-building bytes.
        let mut settings = vec![0u8; crate::layout::scenario_settings_size(scenario_version)];
        {
            let mut w = BufferWriter::new(&mut settings);
            let mut description = vec![0u8; 64];
            description[..8].copy_from_slice(b"Old city");
            w.raw(&description);
            w.u8(2); // climate
            for _ in 0..8 {
                w.i32(0); // start year, funds, loan, five win criteria
            }
            for _ in 0..crate::layout::allowed_buildings_count(scenario_version) {
                w.bool8(true); // wharf allowed: the joined meat slot reads as fish
            }
        }

        // One emperor request for the joined meat/fish id.
        let mut requests = vec![0u8; crate::layout::MAX_REQUESTS_LEGACY * 8];
        {
            let mut w = BufferWriter::new(&mut requests);
            w.i16(2); // year
            w.i16(6); // legacy joined meat id
            w.i16(10); // amount
            w.u8(1);
            w.u8(4);
        }

        // Buildings: 2000 fixed slots, slot 0 is a market with meat in the
        // legacy inventory.
        let mut buildings =
            vec![0u8; MAX_BUILDINGS_LEGACY * BUILDING_STATE_ORIGINAL_BUFFER_SIZE];
        {
            let mut w = BufferWriter::new(&mut buildings);
            w.u8(1); // state
            w.pad_to(12);
            w.i16(BuildingType::Market.id());
            w.pad_to(70);
            for slot in 0..8i16 {
                w.i16(if slot == 3 { 5 } else { 0 }); // meat inventory slot
            }
        }

        let mut terrain = vec![0u8; city::config::GRID_AREA * 2];
        terrain[0] = 3;

        let mut city_data = vec![0u8; CITY_DATA_ORIGINAL_SIZE];
        city_data[crate::map_state::CITY_DATA_POPULATION_OFFSET
            ..crate::map_state::CITY_DATA_POPULATION_OFFSET + 4]
            .copy_from_slice(&777u32.to_le_bytes());
        city_data[crate::map_state::CITY_DATA_TREASURY_OFFSET
            ..crate::map_state::CITY_DATA_TREASURY_OFFSET + 4]
            .copy_from_slice(&4242i32.to_le_bytes());

        let mut game_time = vec![0u8; crate::layout::GAME_TIME_SIZE];
        game_time[12..16].copy_from_slice(&(-5i32).to_le_bytes());

        // Trade prices for the 16-resource epoch: the joined meat id buys
        // at 77.
        let mut trade_prices = vec![0u8; 16 * TRADE_PRICE_ENTRY_SIZE];
        trade_prices[6 * 8..6 * 8 + 4].copy_from_slice(&77i32.to_le_bytes());

        let mut out = Vec::new();
        out.extend_from_slice(&3u32.to_le_bytes()); // campaign mission
        out.extend_from_slice(&0x66u32.to_le_bytes());
        out.extend_from_slice(&legacy_container(
            &plan,
            &[
                ("scenario_settings", settings),
                ("scenario_requests", requests),
                ("buildings", buildings),
                ("terrain_grid", terrain),
                ("city_data", city_data),
                ("game_time", game_time),
                ("trade_prices", trade_prices),
            ],
        ));
        out
    }

    fn sample_savegame() -> Savegame {
        let mut save = Savegame::default();
        save.campaign_mission = 7;
        save.scenario.settings.description = "Port of marble".to_string();
        save.scenario.settings.allowed_buildings =
            vec![true; crate::layout::ALLOWED_BUILDINGS_CURRENT_COUNT];
        save.scenario.requests = vec![Request {
            year: 4,
            resource: Resource::Marble,
            amount: 20,
            deadline_years: 2,
            favor: 10,
        }];
        save.scenario.custom_name = "marble_port".to_string();
        save.image_grid[10] = 0x12345;
        save.terrain_grid[10] = 0x55;
        save.random_grid[0] = 0x9C;
        save.figures = vec![1u8; 256];
        save.city_data[crate::map_state::CITY_DATA_POPULATION_OFFSET] = 0x10;
        save.game_time = GameTime {
            tick: 12,
            day: 3,
            month: 7,
            year: 14,
            total_days: 1000,
        };
        save.camera_x = 81;
        save.camera_y = 90;
        save.highest_building_id = 2;
        save.random_iv = [0xDEAD, 0xBEEF];
        save.trade_prices.buy[Resource::Marble.index()] = 140;
        save.buildings = vec![
            {
                let mut b = Building::default();
                b.state = 1;
                b.building_type = BuildingType::Market;
                b.type_data = TypeData::Supplier(SupplierData {
                    buyer_figure_id: 4,
                    fetch_resource: Resource::Wheat,
                    accepted_goods: 0xFF,
                });
                b
            },
            Building::default(),
        ];
        save.messages = vec![9u8; 40];
        save.custom_empire = Some(vec![1, 2, 3, 4]);
        save
    }

    #[test]
    fn test_current_savegame_roundtrip() {
        let save = sample_savegame();
        let bytes = savegame_to_vec(&save);
        let loaded = savegame_from_slice(&bytes).expect("load");
        assert_eq!(loaded, save);
    }

    #[test]
    fn test_absent_custom_empire_roundtrips_as_none() {
        let mut save = sample_savegame();
        save.custom_empire = None;
        let bytes = savegame_to_vec(&save);
        let loaded = savegame_from_slice(&bytes).expect("load");
        assert_eq!(loaded.custom_empire, None);
        assert_eq!(loaded, save);
    }

    #[test]
    fn test_info_peek_matches_full_load() {
        let save = sample_savegame();
        let bytes = savegame_to_vec(&save);
        let info = savegame_info_from_slice(&bytes).expect("info");
        assert_eq!(info.campaign_mission, 7);
        assert_eq!(info.version, SAVE_GAME_CURRENT_VERSION.0);
        assert_eq!(info.description, "Port of marble");
        assert_eq!(info.population, 0x10);
        assert_eq!(info.game_year, 14);
    }

    #[test]
    fn test_future_version_rejected_before_reading_pieces() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&(SAVE_GAME_CURRENT_VERSION.0 + 1).to_le_bytes());
        // No piece data at all: the header check must fire first.
        let err = savegame_from_slice(&bytes).unwrap_err();
        assert!(
            matches!(err, SaveError::UnsupportedVersion { .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn test_prehistoric_version_rejected_as_wrong_format() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0x10u32.to_le_bytes());
        let err = savegame_from_slice(&bytes).unwrap_err();
        assert!(matches!(err, SaveError::WrongFormat(_)), "got {err:?}");
    }

    #[test]
    fn test_legacy_v66_savegame_loads_and_migrates() {
        let bytes = legacy_savegame_v66();
        let save = savegame_from_slice(&bytes).expect("load");

        assert_eq!(save.campaign_mission, 3);
        assert_eq!(save.buildings.len(), MAX_BUILDINGS_LEGACY);
        assert_eq!(save.buildings[0].building_type, BuildingType::Market);
        // Joined meat remaps to fish because the scenario allows wharves.
        assert_eq!(
            save.buildings[0].resources_stored[Resource::Fish.index()],
            5
        );
        assert_eq!(save.scenario.requests.len(), 1);
        assert_eq!(save.scenario.requests[0].resource, Resource::Fish);
        assert_eq!(save.trade_prices.buy[Resource::Fish.index()], 77);
        assert_eq!(save.terrain_grid[0], 3);
        assert_eq!(save.city_data.len(), CITY_DATA_CURRENT_SIZE);
        assert_eq!(city_data_population(&save.city_data), 777);
        assert_eq!(save.game_time.year, -5);
        assert_eq!(save.custom_empire, None);
        assert_eq!(save.scenario.settings.description, "Old city");
    }

    #[test]
    fn test_legacy_load_then_resave_is_stable() {
        let bytes = legacy_savegame_v66();
        let first = savegame_from_slice(&bytes).expect("load");

        let second = savegame_from_slice(&savegame_to_vec(&first)).expect("reload");
        let third = savegame_from_slice(&savegame_to_vec(&second)).expect("reload");
        assert_eq!(second, third);
    }

    #[test]
    fn test_info_peek_on_legacy_file() {
        let bytes = legacy_savegame_v66();
        let info = savegame_info_from_slice(&bytes).expect("info");
        assert_eq!(info.version, 0x66);
        assert_eq!(info.description, "Old city");
        assert_eq!(info.population, 777);
        assert_eq!(info.treasury, 4242);
        assert_eq!(info.game_year, -5);
    }

    #[test]
    fn test_truncated_middle_of_file_fails_cleanly() {
        let save = sample_savegame();
        let mut bytes = savegame_to_vec(&save);
        bytes.truncate(bytes.len() / 2);
        let err = savegame_from_slice(&bytes).unwrap_err();
        assert!(
            matches!(
                err,
                SaveError::PieceSizeMismatch { .. } | SaveError::WrongFormat(_)
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn test_file_roundtrip_on_disk() {
        let dir = std::path::PathBuf::from("/tmp/save_savegame_io_test_file_roundtrip");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("slot0.sav");

        let save = sample_savegame();
        write_savegame(&save, &path).expect("write");
        let loaded = load_savegame(&path).expect("load");
        assert_eq!(loaded, save);

        let info = read_savegame_info(&path).expect("info");
        assert_eq!(info.description, "Port of marble");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_surfaces_io_error() {
        let err = load_savegame(Path::new("/tmp/save_savegame_io_test_missing/nope.sav"))
            .unwrap_err();
        match err {
            SaveError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
