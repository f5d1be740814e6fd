// ---------------------------------------------------------------------------
// Map and city state pieces the engine itself interprets
// ---------------------------------------------------------------------------
//
// Most savegame pieces are carried as opaque buffers for their subsystems.
// The ones decoded here are the pieces whose layout changed across versions
// (terrain/image grids widened, city data grew) or that the save layer
// consumes directly (game time, trade prices, the info peek offsets).

use city::config::GRID_AREA;
use city::resource::RESOURCE_MAX;

use crate::buffer::{BufferReader, BufferWriter};
use crate::error::SaveError;
use crate::layout::{CITY_DATA_CURRENT_SIZE, GAME_TIME_SIZE, TRADE_PRICE_ENTRY_SIZE};
use crate::resource_mapping::ResourceMapping;

/// Offsets of the fields the savegame info peek reads out of city data.
/// City data only ever grew at the end, so these hold for every version.
pub const CITY_DATA_POPULATION_OFFSET: usize = 20;
pub const CITY_DATA_TREASURY_OFFSET: usize = 52;

/// Decodes a tile grid stored as u16 (old) or u32 (current) per tile.
pub fn read_scaling_grid(piece: &[u8], wide: bool) -> Result<Vec<u32>, SaveError> {
    let entry = if wide { 4 } else { 2 };
    if piece.len() != GRID_AREA * entry {
        return Err(SaveError::WrongFormat(format!(
            "grid piece has {} bytes, expected {}",
            piece.len(),
            GRID_AREA * entry
        )));
    }
    let mut r = BufferReader::new(piece);
    let mut grid = Vec::with_capacity(GRID_AREA);
    for _ in 0..GRID_AREA {
        grid.push(if wide { r.u32() } else { u32::from(r.u16()) });
    }
    Ok(grid)
}

/// Encodes a tile grid in the current u32-per-tile layout.
pub fn write_scaling_grid(grid: &[u32]) -> Vec<u8> {
    let mut out = vec![0u8; grid.len() * 4];
    let mut w = BufferWriter::new(&mut out);
    for value in grid {
        w.u32(*value);
    }
    out
}

/// City data is opaque to the save layer but grew across versions; older
/// payloads are zero-extended to the current size.
pub fn extend_city_data(piece: &[u8]) -> Vec<u8> {
    let mut data = piece.to_vec();
    data.resize(CITY_DATA_CURRENT_SIZE.max(data.len()), 0);
    data
}

pub fn city_data_population(city_data: &[u8]) -> u32 {
    let mut r = BufferReader::new(city_data);
    r.set_pos(CITY_DATA_POPULATION_OFFSET);
    r.u32()
}

pub fn city_data_treasury(city_data: &[u8]) -> i32 {
    let mut r = BufferReader::new(city_data);
    r.set_pos(CITY_DATA_TREASURY_OFFSET);
    r.i32()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameTime {
    pub tick: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub total_days: u32,
}

pub fn read_game_time(piece: &[u8]) -> GameTime {
    let mut r = BufferReader::new(piece);
    GameTime {
        tick: r.u32(),
        day: r.u32(),
        month: r.u32(),
        year: r.i32(),
        total_days: r.u32(),
    }
}

pub fn write_game_time(time: &GameTime) -> Vec<u8> {
    let mut out = vec![0u8; GAME_TIME_SIZE];
    let mut w = BufferWriter::new(&mut out);
    w.u32(time.tick);
    w.u32(time.day);
    w.u32(time.month);
    w.i32(time.year);
    w.u32(time.total_days);
    out
}

/// Buy/sell price per resource, indexed by current resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradePrices {
    pub buy: [i32; RESOURCE_MAX],
    pub sell: [i32; RESOURCE_MAX],
}

impl Default for TradePrices {
    fn default() -> Self {
        TradePrices {
            buy: [0; RESOURCE_MAX],
            sell: [0; RESOURCE_MAX],
        }
    }
}

/// The on-disk table is indexed by the file epoch's resource ids.
pub fn read_trade_prices(piece: &[u8], mapping: &ResourceMapping) -> TradePrices {
    let mut r = BufferReader::new(piece);
    let mut prices = TradePrices::default();
    for legacy_id in 0..mapping.total() as u16 {
        let buy = r.i32();
        let sell = r.i32();
        let index = mapping.remap(legacy_id).index();
        prices.buy[index] = buy;
        prices.sell[index] = sell;
    }
    prices
}

pub fn write_trade_prices(prices: &TradePrices) -> Vec<u8> {
    let mut out = vec![0u8; RESOURCE_MAX * TRADE_PRICE_ENTRY_SIZE];
    let mut w = BufferWriter::new(&mut out);
    for index in 0..RESOURCE_MAX {
        w.i32(prices.buy[index]);
        w.i32(prices.sell[index]);
    }
    out
}
