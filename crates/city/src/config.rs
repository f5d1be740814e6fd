// ---------------------------------------------------------------------------
// Map dimensions shared by the scenario and savegame formats
// ---------------------------------------------------------------------------

/// Side length of the square world grid, in tiles.
pub const GRID_SIDE: usize = 162;

/// Total tile count of the world grid.
pub const GRID_AREA: usize = GRID_SIDE * GRID_SIDE;
