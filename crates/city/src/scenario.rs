// ---------------------------------------------------------------------------
// Scenario rules: the data a scenario file (or the scenario section of a
// savegame) carries about the map and its win conditions
// ---------------------------------------------------------------------------

use crate::building::{BuildingType, BUILDING_TYPE_MAX};
use crate::resource::Resource;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapInfo {
    pub width: i32,
    pub height: i32,
    pub grid_border_size: i32,
    pub start_offset: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSettings {
    pub description: String,
    pub climate: u8,
    pub start_year: i32,
    pub initial_funds: i32,
    pub rescue_loan: i32,
    pub win_culture: i32,
    pub win_prosperity: i32,
    pub win_peace: i32,
    pub win_favor: i32,
    pub win_population: i32,
    /// Indexed by building type id. Older files carry a shorter array;
    /// missing entries default to allowed.
    pub allowed_buildings: Vec<bool>,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        ScenarioSettings {
            description: String::new(),
            climate: 0,
            start_year: 0,
            initial_funds: 0,
            rescue_loan: 0,
            win_culture: 0,
            win_prosperity: 0,
            win_peace: 0,
            win_favor: 0,
            win_population: 0,
            allowed_buildings: vec![true; BUILDING_TYPE_MAX],
        }
    }
}

impl ScenarioSettings {
    pub fn building_allowed(&self, building_type: BuildingType) -> bool {
        self.allowed_buildings
            .get(building_type.id() as usize)
            .copied()
            .unwrap_or(true)
    }
}

/// An emperor request for goods, due at a scenario-relative year.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub year: i16,
    pub resource: Resource,
    pub amount: i16,
    pub deadline_years: u8,
    pub favor: u8,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Invasion {
    pub year: i16,
    pub amount: i16,
    pub invasion_type: u8,
    pub from: u8,
    pub attack_type: u8,
    pub month: u8,
}

/// The rules half of a scenario: everything except the map grids.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Scenario {
    pub map: MapInfo,
    pub settings: ScenarioSettings,
    pub requests: Vec<Request>,
    pub invasions: Vec<Invasion>,
    pub custom_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_allowed_defaults_to_true_past_array() {
        let mut settings = ScenarioSettings {
            allowed_buildings: vec![true; 10],
            ..ScenarioSettings::default()
        };
        settings.allowed_buildings[5] = false;
        assert!(!settings.building_allowed(BuildingType::HouseSmallHovel));
        // Wharf's id is far past the 10-entry array.
        assert!(settings.building_allowed(BuildingType::Wharf));
    }
}
