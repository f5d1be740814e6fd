// ---------------------------------------------------------------------------
// Building records: the in-memory shape the savegame building array fills
// ---------------------------------------------------------------------------
//
// A building is a fixed common record plus a type-tagged data region whose
// interpretation depends on the building type. The save crate owns the byte
// layout; this module owns the semantic shape.

use crate::resource::{Resource, RESOURCE_MAX};

/// Building type identifier. The discriminant is the id stored on disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum BuildingType {
    #[default]
    None = 0,
    HouseSmallTent = 1,
    HouseLargeTent = 2,
    HouseSmallShack = 3,
    HouseLargeShack = 4,
    HouseSmallHovel = 5,
    HouseLargeHovel = 6,
    HouseSmallCasa = 7,
    HouseLargeCasa = 8,
    HouseSmallInsula = 9,
    HouseLargeInsula = 10,
    HouseSmallVilla = 11,
    HouseLargeVilla = 12,
    Theater = 13,
    Amphitheater = 14,
    Colosseum = 15,
    Hippodrome = 16,
    Tavern = 17,
    GladiatorSchool = 18,
    ActorColony = 19,
    Market = 20,
    Granary = 21,
    Warehouse = 22,
    WarehouseSpace = 23,
    Dock = 24,
    Wharf = 25,
    WheatFarm = 26,
    VegetableFarm = 27,
    FruitFarm = 28,
    OliveFarm = 29,
    VineFarm = 30,
    PigFarm = 31,
    ClayPit = 32,
    IronMine = 33,
    TimberYard = 34,
    MarbleQuarry = 35,
    StoneQuarry = 36,
    GoldMine = 37,
    WineWorkshop = 38,
    OilWorkshop = 39,
    WeaponsWorkshop = 40,
    FurnitureWorkshop = 41,
    PotteryWorkshop = 42,
    Roadblock = 43,
    Gatehouse = 44,
    Depot = 45,
    Caravanserai = 46,
    MessHall = 47,
    Prefecture = 48,
    EngineersPost = 49,
    Senate = 50,
}

/// Number of building type ids, including `None`.
pub const BUILDING_TYPE_MAX: usize = 51;

impl BuildingType {
    pub fn from_id(id: i16) -> BuildingType {
        if id > 0 && (id as usize) < BUILDING_TYPE_MAX {
            ALL_TYPES[id as usize]
        } else {
            BuildingType::None
        }
    }

    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn is_house(self) -> bool {
        (self as i16) >= BuildingType::HouseSmallTent as i16
            && (self as i16) <= BuildingType::HouseLargeVilla as i16
    }

    pub fn is_entertainment(self) -> bool {
        matches!(
            self,
            BuildingType::Theater
                | BuildingType::Amphitheater
                | BuildingType::Colosseum
                | BuildingType::Hippodrome
                | BuildingType::GladiatorSchool
                | BuildingType::ActorColony
        )
    }

    /// Buildings that hand goods to visiting citizens and keep a fetch list.
    pub fn is_supplier(self) -> bool {
        matches!(
            self,
            BuildingType::Market
                | BuildingType::Tavern
                | BuildingType::Caravanserai
                | BuildingType::MessHall
        )
    }

    pub fn is_farm(self) -> bool {
        (self as i16) >= BuildingType::WheatFarm as i16
            && (self as i16) <= BuildingType::PigFarm as i16
    }

    pub fn is_raw_material_producer(self) -> bool {
        (self as i16) >= BuildingType::ClayPit as i16
            && (self as i16) <= BuildingType::GoldMine as i16
    }

    pub fn is_workshop(self) -> bool {
        (self as i16) >= BuildingType::WineWorkshop as i16
            && (self as i16) <= BuildingType::PotteryWorkshop as i16
    }

    /// Industry covers everything with a production progress counter.
    pub fn is_industry(self) -> bool {
        self.is_farm()
            || self.is_raw_material_producer()
            || self.is_workshop()
            || self == BuildingType::Wharf
    }

    pub fn is_roadblock_like(self) -> bool {
        matches!(self, BuildingType::Roadblock | BuildingType::Gatehouse)
    }

    /// The resource an industry building produces, `None` for everything else.
    pub fn output_resource(self) -> Resource {
        match self {
            BuildingType::WheatFarm => Resource::Wheat,
            BuildingType::VegetableFarm => Resource::Vegetables,
            BuildingType::FruitFarm => Resource::Fruit,
            BuildingType::OliveFarm => Resource::Olives,
            BuildingType::VineFarm => Resource::Vines,
            BuildingType::PigFarm => Resource::Meat,
            BuildingType::ClayPit => Resource::Clay,
            BuildingType::IronMine => Resource::Iron,
            BuildingType::TimberYard => Resource::Timber,
            BuildingType::MarbleQuarry => Resource::Marble,
            BuildingType::StoneQuarry => Resource::Stone,
            BuildingType::GoldMine => Resource::Gold,
            BuildingType::WineWorkshop => Resource::Wine,
            BuildingType::OilWorkshop => Resource::Oil,
            BuildingType::WeaponsWorkshop => Resource::Weapons,
            BuildingType::FurnitureWorkshop => Resource::Furniture,
            BuildingType::PotteryWorkshop => Resource::Pottery,
            BuildingType::Wharf => Resource::Fish,
            _ => Resource::None,
        }
    }
}

const ALL_TYPES: [BuildingType; BUILDING_TYPE_MAX] = [
    BuildingType::None,
    BuildingType::HouseSmallTent,
    BuildingType::HouseLargeTent,
    BuildingType::HouseSmallShack,
    BuildingType::HouseLargeShack,
    BuildingType::HouseSmallHovel,
    BuildingType::HouseLargeHovel,
    BuildingType::HouseSmallCasa,
    BuildingType::HouseLargeCasa,
    BuildingType::HouseSmallInsula,
    BuildingType::HouseLargeInsula,
    BuildingType::HouseSmallVilla,
    BuildingType::HouseLargeVilla,
    BuildingType::Theater,
    BuildingType::Amphitheater,
    BuildingType::Colosseum,
    BuildingType::Hippodrome,
    BuildingType::Tavern,
    BuildingType::GladiatorSchool,
    BuildingType::ActorColony,
    BuildingType::Market,
    BuildingType::Granary,
    BuildingType::Warehouse,
    BuildingType::WarehouseSpace,
    BuildingType::Dock,
    BuildingType::Wharf,
    BuildingType::WheatFarm,
    BuildingType::VegetableFarm,
    BuildingType::FruitFarm,
    BuildingType::OliveFarm,
    BuildingType::VineFarm,
    BuildingType::PigFarm,
    BuildingType::ClayPit,
    BuildingType::IronMine,
    BuildingType::TimberYard,
    BuildingType::MarbleQuarry,
    BuildingType::StoneQuarry,
    BuildingType::GoldMine,
    BuildingType::WineWorkshop,
    BuildingType::OilWorkshop,
    BuildingType::WeaponsWorkshop,
    BuildingType::FurnitureWorkshop,
    BuildingType::PotteryWorkshop,
    BuildingType::Roadblock,
    BuildingType::Gatehouse,
    BuildingType::Depot,
    BuildingType::Caravanserai,
    BuildingType::MessHall,
    BuildingType::Prefecture,
    BuildingType::EngineersPost,
    BuildingType::Senate,
];

/// Permission bitmask for roadblock-like buildings: one bit per walker class.
pub const ROADBLOCK_PERMISSION_ALL: u8 = 0x3F;

/// Accepted-goods bitmask covering every current resource id.
pub const ACCEPT_ALL_GOODS: u32 = (1 << RESOURCE_MAX as u32) - 1;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HouseData {
    pub entertainment: u8,
    pub education: u8,
    pub health: u8,
    pub religion: u8,
    pub school: u8,
    pub library: u8,
    pub academy: u8,
    pub clinic: u8,
    pub hospital: u8,
    pub bathhouse: u8,
    pub barber: u8,
    pub evolution_progress: i8,
    pub devolve_delay: u8,
    pub days_without_stock: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SupplierData {
    pub buyer_figure_id: i16,
    pub fetch_resource: Resource,
    pub accepted_goods: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GranaryData {
    pub fetch_resource: Resource,
    pub accepted_goods: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndustryData {
    pub progress: i16,
    pub blessing_days_left: u8,
    pub curse_days_left: u8,
    pub has_raw_materials: bool,
    pub stored_amount: i16,
    pub fishing_boat_id: i16,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DockData {
    pub queued_docker_id: i16,
    pub num_ships: u8,
    pub orientation: i8,
    pub docker_ids: [i16; 3],
    pub trade_ship_id: i16,
    pub accepted_goods: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoadblockData {
    pub permissions: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntertainmentData {
    pub num_shows: u8,
    pub days1: u8,
    pub days2: u8,
    pub play_index: u8,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DepotData {
    pub resource: Resource,
    pub src_storage_id: i16,
    pub dst_storage_id: i16,
    pub condition_type: u8,
    pub condition_threshold: u8,
}

/// Type-tagged data region of a building record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum TypeData {
    #[default]
    None,
    House(HouseData),
    Supplier(SupplierData),
    Granary(GranaryData),
    Industry(IndustryData),
    Dock(DockData),
    Roadblock(RoadblockData),
    Entertainment(EntertainmentData),
    Depot(DepotData),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonumentData {
    pub progress: u8,
    pub phase: u8,
    pub upgrades: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SicknessData {
    pub level: u8,
    pub duration: u8,
    pub doctor_cure: u8,
    pub fumigation_frame: u8,
    pub fumigation_direction: u8,
}

/// One building record with current in-memory semantics. The savegame
/// building array is a `Vec<Building>`; unused slots keep `state == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Building {
    pub state: u8,
    pub faction_id: u8,
    pub unknown_value: u8,
    pub size: u8,
    pub house_is_merged: bool,
    pub house_size: u8,
    pub x: u8,
    pub y: u8,
    pub grid_offset: i32,
    pub building_type: BuildingType,
    /// House level, stored resource, or orientation depending on type.
    pub subtype: i16,
    pub road_network_id: u8,
    pub creation_sequence_number: u16,
    pub houses_covered: i16,
    pub percentage_houses_covered: i16,
    pub house_population: i16,
    pub house_population_room: i16,
    pub distance_from_entry: i16,
    pub house_highest_population: i16,
    pub house_unreachable_ticks: i16,
    pub road_access_x: u8,
    pub road_access_y: u8,
    pub figure_id: i16,
    pub figure_id2: i16,
    pub immigrant_figure_id: i16,
    pub figure_id4: i16,
    pub figure_spawn_delay: u8,
    pub figure_roam_direction: u8,
    pub has_water_access: bool,
    pub has_well_access: bool,
    pub prev_part_building_id: i16,
    pub next_part_building_id: i16,
    /// Legacy global load counter; modern records keep per-resource amounts
    /// in `resources_stored` instead.
    pub loads_stored: i16,
    pub has_road_access: bool,
    pub house_criminal_active: u8,
    pub damage_risk: i16,
    pub fire_risk: i16,
    pub fire_duration: i16,
    pub fire_proof: u8,
    pub house_figure_generation_delay: u8,
    pub house_tax_coverage: u8,
    pub days_since_offering: u8,
    pub formation_id: i16,
    pub num_workers: i16,
    pub labor_category: u8,
    pub type_data: TypeData,
    pub tax_income_or_storage: i32,
    pub house_days_without_food: u8,
    pub has_plague: bool,
    pub desirability: i8,
    pub is_deleted: bool,
    pub is_adjacent_to_water: bool,
    pub storage_id: u8,
    pub sentiment_value: i8,
    pub show_on_problem_overlay: u8,
    pub house_tavern_wine_access: u8,
    pub house_tavern_food_access: u8,
    pub days_active: u16,
    pub monument: MonumentData,
    pub tourism_disabled: bool,
    pub tourism_income: u8,
    pub tourism_income_this_year: u16,
    pub variant: u8,
    pub upgrade_level: u8,
    pub strike_duration_days: u8,
    pub sickness: SicknessData,
    pub resources_stored: [u16; RESOURCE_MAX],
}

impl Default for Building {
    fn default() -> Self {
        Building {
            state: 0,
            faction_id: 0,
            unknown_value: 0,
            size: 0,
            house_is_merged: false,
            house_size: 0,
            x: 0,
            y: 0,
            grid_offset: 0,
            building_type: BuildingType::None,
            subtype: 0,
            road_network_id: 0,
            creation_sequence_number: 0,
            houses_covered: 0,
            percentage_houses_covered: 0,
            house_population: 0,
            house_population_room: 0,
            distance_from_entry: 0,
            house_highest_population: 0,
            house_unreachable_ticks: 0,
            road_access_x: 0,
            road_access_y: 0,
            figure_id: 0,
            figure_id2: 0,
            immigrant_figure_id: 0,
            figure_id4: 0,
            figure_spawn_delay: 0,
            figure_roam_direction: 0,
            has_water_access: false,
            has_well_access: false,
            prev_part_building_id: 0,
            next_part_building_id: 0,
            loads_stored: 0,
            has_road_access: false,
            house_criminal_active: 0,
            damage_risk: 0,
            fire_risk: 0,
            fire_duration: 0,
            fire_proof: 0,
            house_figure_generation_delay: 0,
            house_tax_coverage: 0,
            days_since_offering: 0,
            formation_id: 0,
            num_workers: 0,
            labor_category: 0,
            type_data: TypeData::None,
            tax_income_or_storage: 0,
            house_days_without_food: 0,
            has_plague: false,
            desirability: 0,
            is_deleted: false,
            is_adjacent_to_water: false,
            storage_id: 0,
            sentiment_value: 0,
            show_on_problem_overlay: 0,
            house_tavern_wine_access: 0,
            house_tavern_food_access: 0,
            days_active: 0,
            monument: MonumentData::default(),
            tourism_disabled: false,
            tourism_income: 0,
            tourism_income_this_year: 0,
            variant: 0,
            upgrade_level: 0,
            strike_duration_days: 0,
            sickness: SicknessData::default(),
            resources_stored: [0; RESOURCE_MAX],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_roundtrip() {
        for id in 0..BUILDING_TYPE_MAX as i16 {
            assert_eq!(BuildingType::from_id(id).id(), id);
        }
    }

    #[test]
    fn test_unknown_type_maps_to_none() {
        assert_eq!(BuildingType::from_id(999), BuildingType::None);
        assert_eq!(BuildingType::from_id(-3), BuildingType::None);
    }

    #[test]
    fn test_category_predicates_are_disjoint_for_shapes() {
        // Every type must map to at most one type-data shape.
        for id in 0..BUILDING_TYPE_MAX as i16 {
            let t = BuildingType::from_id(id);
            let shapes = [
                t.is_house(),
                t.is_supplier(),
                t == BuildingType::Granary,
                t.is_industry(),
                t == BuildingType::Dock,
                t.is_roadblock_like(),
                t.is_entertainment(),
                t == BuildingType::Depot,
            ];
            let count = shapes.iter().filter(|s| **s).count();
            assert!(count <= 1, "type {t:?} matches {count} shapes");
        }
    }

    #[test]
    fn test_industry_output_resources() {
        assert_eq!(BuildingType::WheatFarm.output_resource(), Resource::Wheat);
        assert_eq!(BuildingType::Wharf.output_resource(), Resource::Fish);
        assert_eq!(
            BuildingType::PotteryWorkshop.output_resource(),
            Resource::Pottery
        );
        assert_eq!(BuildingType::Senate.output_resource(), Resource::None);
    }
}
