// ---------------------------------------------------------------------------
// Scenario files: magic sniffing, rule pieces, map grids
// ---------------------------------------------------------------------------
//
// A scenario file optionally starts with the 8-byte ASCII magic "VERSION\0"
// followed by the u32 format version. Files from before the magic existed
// start directly with piece data; the reader detects that and rewinds to
// offset zero with the unversioned constant.

use std::path::Path;

use tracing::info;

use city::scenario::{Invasion, MapInfo, Request, Scenario, ScenarioSettings};

use crate::atomic_write::atomic_write;
use crate::buffer::{BufferReader, BufferWriter};
use crate::compression::CompressionAlgo;
use crate::container::{read_pieces, write_pieces};
use crate::error::SaveError;
use crate::layout::{
    allowed_buildings_count, scenario_pieces, scenario_settings_size, INVASION_STATE_SIZE,
    MAP_INFO_SIZE, REQUEST_STATE_SIZE,
};
use crate::map_state::{read_scaling_grid, write_scaling_grid};
use crate::resource_mapping::ResourceMapping;
use crate::version::{
    ScenarioVersion, SCENARIO_CURRENT_VERSION, SCENARIO_VERSION_NONE,
};

/// Magic prefix of versioned scenario files.
pub const SCENARIO_MAGIC: [u8; 8] = *b"VERSION\0";

const DESCRIPTION_SIZE: usize = 64;

/// The map grids of a standalone scenario file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioMap {
    pub terrain: Vec<u32>,
    pub elevation: Vec<u8>,
    pub random: Vec<u8>,
    pub edge: Vec<u8>,
}

/// A fully loaded scenario file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioFile {
    pub scenario: Scenario,
    pub map: ScenarioMap,
}

/// Detects the scenario version and the offset piece data starts at.
pub(crate) fn sniff_scenario_version(bytes: &[u8]) -> (ScenarioVersion, usize) {
    if bytes.len() >= SCENARIO_MAGIC.len() + 4 && bytes[..SCENARIO_MAGIC.len()] == SCENARIO_MAGIC {
        let mut r = BufferReader::new(bytes);
        r.set_pos(SCENARIO_MAGIC.len());
        (ScenarioVersion(r.u32()), SCENARIO_MAGIC.len() + 4)
    } else {
        (SCENARIO_VERSION_NONE, 0)
    }
}

pub fn load_scenario(path: &Path) -> Result<ScenarioFile, SaveError> {
    let bytes = std::fs::read(path)?;
    scenario_from_slice(&bytes)
}

pub fn scenario_from_slice(bytes: &[u8]) -> Result<ScenarioFile, SaveError> {
    let (version, piece_start) = sniff_scenario_version(bytes);
    if version > SCENARIO_CURRENT_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: version.0,
            supported: SCENARIO_CURRENT_VERSION.0,
        });
    }

    let plan = scenario_pieces(version);
    let algo = if version.uses_legacy_compression() {
        CompressionAlgo::LegacyZlib
    } else {
        CompressionAlgo::Lz4
    };
    let pieces = read_pieces(bytes, piece_start, &plan, algo)?;

    let map_info = read_map_info(pieces.buf("map_info"));
    let settings = read_scenario_settings(pieces.buf("scenario_settings"), version);
    let custom_name = read_fixed_string(pieces.buf("custom_name"));

    let mut scenario = Scenario {
        map: map_info,
        settings,
        requests: Vec::new(),
        invasions: Vec::new(),
        custom_name,
    };
    // The remap epoch needs the settings (wharf rule) before requests decode.
    let mapping = ResourceMapping::new(version.resource_epoch(), &scenario);
    scenario.requests = read_requests(pieces.buf("scenario_requests"), &mapping);
    scenario.invasions = read_invasions(pieces.buf("scenario_invasions"));

    let map = ScenarioMap {
        terrain: read_scaling_grid(pieces.buf("terrain_grid"), version.has_wide_terrain())?,
        elevation: pieces.buf("elevation_grid").to_vec(),
        random: pieces.buf("random_grid").to_vec(),
        edge: pieces.buf("edge_grid").to_vec(),
    };

    info!(
        version = version.0,
        requests = scenario.requests.len(),
        invasions = scenario.invasions.len(),
        "scenario loaded"
    );
    Ok(ScenarioFile { scenario, map })
}

/// Serializes a scenario in the current format.
pub fn scenario_to_vec(file: &ScenarioFile) -> Vec<u8> {
    let version = SCENARIO_CURRENT_VERSION;
    let plan = scenario_pieces(version);

    let map_info = write_map_info(&file.scenario.map);
    let settings = write_scenario_settings(&file.scenario.settings);
    let terrain = write_scaling_grid(&file.map.terrain);
    let requests = write_requests(&file.scenario.requests);
    let invasions = write_invasions(&file.scenario.invasions);
    let custom_name = write_fixed_string(&file.scenario.custom_name, DESCRIPTION_SIZE);

    let buffers: Vec<(&str, &[u8])> = vec![
        ("map_info", &map_info),
        ("scenario_settings", &settings),
        ("terrain_grid", &terrain),
        ("elevation_grid", &file.map.elevation),
        ("random_grid", &file.map.random),
        ("edge_grid", &file.map.edge),
        ("scenario_requests", &requests),
        ("scenario_invasions", &invasions),
        ("custom_name", &custom_name),
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
    out.extend_from_slice(&SCENARIO_MAGIC);
    out.extend_from_slice(&version.0.to_le_bytes());
    write_pieces(&mut out, &ordered);
    out
}

pub fn write_scenario(file: &ScenarioFile, path: &Path) -> Result<(), SaveError> {
    atomic_write(path, &scenario_to_vec(file))?;
    info!(path = %path.display(), "scenario written");
    Ok(())
}

pub(crate) fn read_map_info(piece: &[u8]) -> MapInfo {
    let mut r = BufferReader::new(piece);
    MapInfo {
        width: r.i32(),
        height: r.i32(),
        grid_border_size: r.i32(),
        start_offset: r.i32(),
    }
}

pub(crate) fn write_map_info(map: &MapInfo) -> Vec<u8> {
    let mut out = vec![0u8; MAP_INFO_SIZE];
    let mut w = BufferWriter::new(&mut out);
    w.i32(map.width);
    w.i32(map.height);
    w.i32(map.grid_border_size);
    w.i32(map.start_offset);
    out
}

pub(crate) fn read_scenario_settings(piece: &[u8], version: ScenarioVersion) -> ScenarioSettings {
    let mut r = BufferReader::new(piece);
    let description = bytes_to_string(r.raw(DESCRIPTION_SIZE));
    let climate = r.u8();
    let start_year = r.i32();
    let initial_funds = r.i32();
    let rescue_loan = r.i32();
    let win_culture = r.i32();
    let win_prosperity = r.i32();
    let win_peace = r.i32();
    let win_favor = r.i32();
    let win_population = r.i32();
    let allowed_buildings = (0..allowed_buildings_count(version))
        .map(|_| r.bool8())
        .collect();
    ScenarioSettings {
        description,
        climate,
        start_year,
        initial_funds,
        rescue_loan,
        win_culture,
        win_prosperity,
        win_peace,
        win_favor,
        win_population,
        allowed_buildings,
    }
}

pub(crate) fn write_scenario_settings(settings: &ScenarioSettings) -> Vec<u8> {
    let mut out = vec![0u8; scenario_settings_size(SCENARIO_CURRENT_VERSION)];
    let mut w = BufferWriter::new(&mut out);
    w.raw(&string_to_bytes(&settings.description, DESCRIPTION_SIZE));
    w.u8(settings.climate);
    w.i32(settings.start_year);
    w.i32(settings.initial_funds);
    w.i32(settings.rescue_loan);
    w.i32(settings.win_culture);
    w.i32(settings.win_prosperity);
    w.i32(settings.win_peace);
    w.i32(settings.win_favor);
    w.i32(settings.win_population);
    for index in 0..allowed_buildings_count(SCENARIO_CURRENT_VERSION) {
        w.bool8(settings.allowed_buildings.get(index).copied().unwrap_or(true));
    }
    out
}

pub(crate) fn read_requests(piece: &[u8], mapping: &ResourceMapping) -> Vec<Request> {
    let mut r = BufferReader::new(piece);
    let count = piece.len() / REQUEST_STATE_SIZE;
    let mut requests = Vec::new();
    for _ in 0..count {
        let request = Request {
            year: r.i16(),
            resource: mapping.remap(r.i16() as u16),
            amount: r.i16(),
            deadline_years: r.u8(),
            favor: r.u8(),
        };
        // The legacy fixed table pads with empty slots.
        if request.year != 0 || request.amount != 0 {
            requests.push(request);
        }
    }
    requests
}

pub(crate) fn write_requests(requests: &[Request]) -> Vec<u8> {
    let mut out = vec![0u8; requests.len() * REQUEST_STATE_SIZE];
    let mut w = BufferWriter::new(&mut out);
    for request in requests {
        w.i16(request.year);
        w.i16(request.resource.index() as i16);
        w.i16(request.amount);
        w.u8(request.deadline_years);
        w.u8(request.favor);
    }
    out
}

pub(crate) fn read_invasions(piece: &[u8]) -> Vec<Invasion> {
    let mut r = BufferReader::new(piece);
    let count = piece.len() / INVASION_STATE_SIZE;
    let mut invasions = Vec::new();
    for _ in 0..count {
        let invasion = Invasion {
            year: r.i16(),
            amount: r.i16(),
            invasion_type: r.u8(),
            from: r.u8(),
            attack_type: r.u8(),
            month: r.u8(),
        };
        if invasion.year != 0 || invasion.amount != 0 {
            invasions.push(invasion);
        }
    }
    invasions
}

pub(crate) fn write_invasions(invasions: &[Invasion]) -> Vec<u8> {
    let mut out = vec![0u8; invasions.len() * INVASION_STATE_SIZE];
    let mut w = BufferWriter::new(&mut out);
    for invasion in invasions {
        w.i16(invasion.year);
        w.i16(invasion.amount);
        w.u8(invasion.invasion_type);
        w.u8(invasion.from);
        w.u8(invasion.attack_type);
        w.u8(invasion.month);
    }
    out
}

pub(crate) fn read_fixed_string(piece: &[u8]) -> String {
    bytes_to_string(piece)
}

pub(crate) fn write_fixed_string(s: &str, size: usize) -> Vec<u8> {
    string_to_bytes(s, size)
}

fn bytes_to_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn string_to_bytes(s: &str, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    let bytes = s.as_bytes();
    let len = bytes.len().min(size - 1);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}
