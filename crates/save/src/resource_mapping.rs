// ---------------------------------------------------------------------------
// Resource ID remapping: five historical table layouts onto the current one
// ---------------------------------------------------------------------------
//
// Resource ids on disk are indices into whichever table the writing build
// used. Tables only ever appended ids until the current epoch reordered the
// catalog, so each epoch is a flat remap array. The epoch is picked once per
// load (from the header's resource version field, or derived from the file
// version) and carried in the DecodeContext.

use city::resource::Resource;
use city::{BuildingType, Scenario};

use crate::version::SaveVersion;

/// One of the five historical resource table layouts. The discriminant is
/// the resource version number stored in savegame headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ResourceEpoch {
    /// Meat and fish share a single id.
    JoinedMeat = 1,
    /// Fish appended as its own id.
    SeparateFish = 2,
    /// Gold appended.
    WithGold = 3,
    /// Stone appended.
    WithStone = 4,
    /// Current canonical ordering.
    Current = 5,
}

impl ResourceEpoch {
    pub fn from_resource_version(v: u32) -> Option<ResourceEpoch> {
        match v {
            1 => Some(ResourceEpoch::JoinedMeat),
            2 => Some(ResourceEpoch::SeparateFish),
            3 => Some(ResourceEpoch::WithGold),
            4 => Some(ResourceEpoch::WithStone),
            5 => Some(ResourceEpoch::Current),
            _ => None,
        }
    }

    pub fn resource_version(self) -> u32 {
        self as u32
    }

    /// Number of resource ids in this epoch's table, including None.
    pub fn resource_count(self) -> usize {
        table_for(self).len()
    }
}

fn table_for(epoch: ResourceEpoch) -> &'static [Resource] {
    match epoch {
        ResourceEpoch::JoinedMeat => TABLE_JOINED_MEAT,
        ResourceEpoch::SeparateFish => TABLE_SEPARATE_FISH,
        ResourceEpoch::WithGold => TABLE_WITH_GOLD,
        ResourceEpoch::WithStone => TABLE_WITH_STONE,
        ResourceEpoch::Current => TABLE_CURRENT,
    }
}

/// Epoch table for saves before fish split off: meat and fish share id 6.
const TABLE_JOINED_MEAT: &[Resource] = &[
    Resource::None,
    Resource::Wheat,
    Resource::Vegetables,
    Resource::Fruit,
    Resource::Olives,
    Resource::Vines,
    Resource::Meat, // joined meat/fish slot, see ResourceMapping::remap
    Resource::Wine,
    Resource::Oil,
    Resource::Iron,
    Resource::Timber,
    Resource::Clay,
    Resource::Marble,
    Resource::Weapons,
    Resource::Furniture,
    Resource::Pottery,
];

const TABLE_SEPARATE_FISH: &[Resource] = &[
    Resource::None,
    Resource::Wheat,
    Resource::Vegetables,
    Resource::Fruit,
    Resource::Olives,
    Resource::Vines,
    Resource::Meat,
    Resource::Wine,
    Resource::Oil,
    Resource::Iron,
    Resource::Timber,
    Resource::Clay,
    Resource::Marble,
    Resource::Weapons,
    Resource::Furniture,
    Resource::Pottery,
    Resource::Fish,
];

const TABLE_WITH_GOLD: &[Resource] = &[
    Resource::None,
    Resource::Wheat,
    Resource::Vegetables,
    Resource::Fruit,
    Resource::Olives,
    Resource::Vines,
    Resource::Meat,
    Resource::Wine,
    Resource::Oil,
    Resource::Iron,
    Resource::Timber,
    Resource::Clay,
    Resource::Marble,
    Resource::Weapons,
    Resource::Furniture,
    Resource::Pottery,
    Resource::Fish,
    Resource::Gold,
];

const TABLE_WITH_STONE: &[Resource] = &[
    Resource::None,
    Resource::Wheat,
    Resource::Vegetables,
    Resource::Fruit,
    Resource::Olives,
    Resource::Vines,
    Resource::Meat,
    Resource::Wine,
    Resource::Oil,
    Resource::Iron,
    Resource::Timber,
    Resource::Clay,
    Resource::Marble,
    Resource::Weapons,
    Resource::Furniture,
    Resource::Pottery,
    Resource::Fish,
    Resource::Gold,
    Resource::Stone,
];

const TABLE_CURRENT: &[Resource] = &[
    Resource::None,
    Resource::Wheat,
    Resource::Vegetables,
    Resource::Fruit,
    Resource::Meat,
    Resource::Fish,
    Resource::Olives,
    Resource::Vines,
    Resource::Wine,
    Resource::Oil,
    Resource::Iron,
    Resource::Timber,
    Resource::Clay,
    Resource::Marble,
    Resource::Stone,
    Resource::Gold,
    Resource::Weapons,
    Resource::Furniture,
    Resource::Pottery,
];

/// Food counts per epoch; foods were always the low non-zero ids.
const FOOD_COUNTS: [usize; 5] = [4, 5, 5, 5, 5];

/// The 8-slot inventory enumeration used by pre-dynamic-resource supplier
/// records.
const INVENTORY_TO_RESOURCE: [Resource; 8] = [
    Resource::Wheat,
    Resource::Vegetables,
    Resource::Fruit,
    Resource::Meat,
    Resource::Wine,
    Resource::Oil,
    Resource::Furniture,
    Resource::Pottery,
];

pub const LEGACY_INVENTORY_MAX: usize = 8;

/// Remapping table selected for one load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceMapping {
    epoch: ResourceEpoch,
    /// When the epoch joins meat and fish, a legacy meat id means fish for
    /// scenarios that can build wharves. This mirrors what the original
    /// writers meant by the joined slot on such maps.
    fish_redirect: bool,
}

impl ResourceMapping {
    pub fn new(epoch: ResourceEpoch, scenario: &Scenario) -> Self {
        ResourceMapping {
            epoch,
            fish_redirect: epoch == ResourceEpoch::JoinedMeat
                && scenario.settings.building_allowed(BuildingType::Wharf),
        }
    }

    /// Mapping for the current epoch; remaps are the identity.
    pub fn current() -> Self {
        ResourceMapping {
            epoch: ResourceEpoch::Current,
            fish_redirect: false,
        }
    }

    pub fn epoch(self) -> ResourceEpoch {
        self.epoch
    }

    fn table(self) -> &'static [Resource] {
        table_for(self.epoch)
    }

    /// Total resource ids in this epoch's table, including the None slot.
    pub fn total(self) -> usize {
        self.table().len()
    }

    /// Food ids in this epoch's table.
    pub fn total_food(self) -> usize {
        FOOD_COUNTS[self.epoch as usize - 1]
    }

    /// Maps a legacy resource id to the current catalog. Ids past the
    /// epoch's table come from corrupt data and collapse to None.
    pub fn remap(self, legacy_id: u16) -> Resource {
        let mapped = self
            .table()
            .get(legacy_id as usize)
            .copied()
            .unwrap_or(Resource::None);
        if mapped == Resource::Meat && self.fish_redirect {
            Resource::Fish
        } else {
            mapped
        }
    }

    /// Maps a legacy 8-slot inventory index to the current catalog.
    pub fn remap_inventory(self, inventory_index: usize) -> Resource {
        let mapped = INVENTORY_TO_RESOURCE
            .get(inventory_index)
            .copied()
            .unwrap_or(Resource::None);
        if mapped == Resource::Meat && self.fish_redirect {
            Resource::Fish
        } else {
            mapped
        }
    }

    /// Rebuilds a per-resource bitmask from epoch indexing to current
    /// indexing.
    pub fn remap_goods_mask(self, mask: u32) -> u32 {
        if self.epoch == ResourceEpoch::Current {
            return mask;
        }
        let mut out = 0u32;
        for legacy_id in 0..self.total() as u16 {
            if mask & (1 << legacy_id) != 0 {
                out |= 1 << self.remap(legacy_id).index() as u32;
            }
        }
        out
    }
}

/// Epoch for a savegame: the header field when present, otherwise derived
/// from the file version.
pub fn epoch_for_savegame(
    version: SaveVersion,
    resource_version: Option<u32>,
) -> Option<ResourceEpoch> {
    match resource_version {
        Some(v) => ResourceEpoch::from_resource_version(v),
        None => Some(version.derived_resource_epoch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use city::resource::RESOURCE_MAX;

    fn scenario_with_wharf(allowed: bool) -> Scenario {
        let mut scenario = Scenario::default();
        scenario.settings.allowed_buildings[BuildingType::Wharf.id() as usize] = allowed;
        scenario
    }

    #[test]
    fn test_remap_total_over_every_epoch() {
        let scenario = scenario_with_wharf(false);
        for epoch in [
            ResourceEpoch::JoinedMeat,
            ResourceEpoch::SeparateFish,
            ResourceEpoch::WithGold,
            ResourceEpoch::WithStone,
            ResourceEpoch::Current,
        ] {
            let mapping = ResourceMapping::new(epoch, &scenario);
            for legacy_id in 0..mapping.total() as u16 {
                let mapped = mapping.remap(legacy_id);
                assert!(
                    mapped.index() < RESOURCE_MAX,
                    "epoch {epoch:?} id {legacy_id} out of range"
                );
            }
        }
    }

    #[test]
    fn test_current_epoch_is_identity() {
        let mapping = ResourceMapping::current();
        for legacy_id in 0..RESOURCE_MAX as u16 {
            assert_eq!(mapping.remap(legacy_id).index(), legacy_id as usize);
        }
    }

    #[test]
    fn test_joined_meat_redirects_to_fish_when_wharf_allowed() {
        let with_wharf = ResourceMapping::new(ResourceEpoch::JoinedMeat, &scenario_with_wharf(true));
        assert_eq!(with_wharf.remap(6), Resource::Fish);

        let without = ResourceMapping::new(ResourceEpoch::JoinedMeat, &scenario_with_wharf(false));
        assert_eq!(without.remap(6), Resource::Meat);

        // The redirect is specific to the joined epoch.
        let separate = ResourceMapping::new(ResourceEpoch::SeparateFish, &scenario_with_wharf(true));
        assert_eq!(separate.remap(6), Resource::Meat);
        assert_eq!(separate.remap(16), Resource::Fish);
    }

    #[test]
    fn test_inventory_remap_follows_redirect() {
        let with_wharf = ResourceMapping::new(ResourceEpoch::JoinedMeat, &scenario_with_wharf(true));
        assert_eq!(with_wharf.remap_inventory(0), Resource::Wheat);
        assert_eq!(with_wharf.remap_inventory(3), Resource::Fish);
        assert_eq!(with_wharf.remap_inventory(7), Resource::Pottery);
        assert_eq!(with_wharf.remap_inventory(99), Resource::None);
    }

    #[test]
    fn test_epoch_counts() {
        let scenario = scenario_with_wharf(false);
        let joined = ResourceMapping::new(ResourceEpoch::JoinedMeat, &scenario);
        assert_eq!(joined.total(), 16);
        assert_eq!(joined.total_food(), 4);
        let current = ResourceMapping::current();
        assert_eq!(current.total(), RESOURCE_MAX);
        assert_eq!(current.total_food(), 5);
    }

    #[test]
    fn test_goods_mask_remap() {
        let scenario = scenario_with_wharf(false);
        let mapping = ResourceMapping::new(ResourceEpoch::WithGold, &scenario);
        // Legacy bits: wheat (1) and fish (16).
        let mask = (1 << 1) | (1 << 16);
        let remapped = mapping.remap_goods_mask(mask);
        assert_eq!(
            remapped,
            (1 << Resource::Wheat.index()) | (1 << Resource::Fish.index())
        );
    }

    #[test]
    fn test_epoch_for_savegame_prefers_header_field() {
        assert_eq!(
            epoch_for_savegame(SaveVersion(0x90), Some(3)),
            Some(ResourceEpoch::WithGold)
        );
        assert_eq!(
            epoch_for_savegame(SaveVersion(0x66), None),
            Some(ResourceEpoch::JoinedMeat)
        );
        assert_eq!(epoch_for_savegame(SaveVersion(0x90), Some(42)), None);
    }
}
