// ---------------------------------------------------------------------------
// Resource catalog: the current canonical resource identifiers
// ---------------------------------------------------------------------------
//
// Older savegames index resources through one of five historical table
// layouts; the save crate remaps those onto this enum at load time. Foods
// are grouped at the front (Wheat..=Fish) so per-food arrays can be sized
// with RESOURCE_MAX_FOOD.

/// Current semantic resource identifier. The discriminant is the id written
/// to disk by the current format.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Resource {
    #[default]
    None = 0,
    Wheat = 1,
    Vegetables = 2,
    Fruit = 3,
    Meat = 4,
    Fish = 5,
    Olives = 6,
    Vines = 7,
    Wine = 8,
    Oil = 9,
    Iron = 10,
    Timber = 11,
    Clay = 12,
    Marble = 13,
    Stone = 14,
    Gold = 15,
    Weapons = 16,
    Furniture = 17,
    Pottery = 18,
}

/// Number of resource ids in the current catalog, including `None`.
pub const RESOURCE_MAX: usize = 19;

/// Number of food resources (Wheat..=Fish).
pub const RESOURCE_MAX_FOOD: usize = 5;

impl Resource {
    pub fn from_id(id: u8) -> Resource {
        match id {
            1 => Resource::Wheat,
            2 => Resource::Vegetables,
            3 => Resource::Fruit,
            4 => Resource::Meat,
            5 => Resource::Fish,
            6 => Resource::Olives,
            7 => Resource::Vines,
            8 => Resource::Wine,
            9 => Resource::Oil,
            10 => Resource::Iron,
            11 => Resource::Timber,
            12 => Resource::Clay,
            13 => Resource::Marble,
            14 => Resource::Stone,
            15 => Resource::Gold,
            16 => Resource::Weapons,
            17 => Resource::Furniture,
            18 => Resource::Pottery,
            _ => Resource::None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_food(self) -> bool {
        matches!(
            self,
            Resource::Wheat
                | Resource::Vegetables
                | Resource::Fruit
                | Resource::Meat
                | Resource::Fish
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_covers_catalog() {
        for id in 0..RESOURCE_MAX as u8 {
            assert_eq!(Resource::from_id(id).index(), id as usize);
        }
    }

    #[test]
    fn test_unknown_id_maps_to_none() {
        assert_eq!(Resource::from_id(200), Resource::None);
    }

    #[test]
    fn test_food_block_is_contiguous() {
        for id in 1..=RESOURCE_MAX_FOOD as u8 {
            assert!(Resource::from_id(id).is_food(), "id {id} should be food");
        }
        assert!(!Resource::from_id(RESOURCE_MAX_FOOD as u8 + 1).is_food());
    }
}
