// ---------------------------------------------------------------------------
// Building fixes: version-gated point migrations applied after decode
// ---------------------------------------------------------------------------
//
// Each fix repairs one historical behavior and applies to every record of a
// file whose version is at or below the fix's threshold. Fixes are pure
// functions of one record and run in threshold order; saving never applies
// any of them, so a migrated save decodes identically from then on.

use city::building::{Building, BuildingType, TypeData, ACCEPT_ALL_GOODS, ROADBLOCK_PERMISSION_ALL};

use crate::version::{
    SaveVersion, SAVE_GAME_LAST_DOCK_ORIENTATION_BUG_VERSION, SAVE_GAME_LAST_GLOBAL_LOADS_VERSION,
    SAVE_GAME_LAST_OPEN_PERMISSIONS_VERSION, SAVE_GAME_LAST_UNCHECKED_STORAGE_VERSION,
    SAVE_GAME_LAST_UNFILTERED_ACCEPTS_VERSION, SAVE_GAME_LAST_UNSCALED_PROGRESS_VERSION,
};

/// Orientation value old builds wrote for docks that were never rotated.
const DOCK_ORIENTATION_SENTINEL: i8 = 4;

struct BuildingFix {
    /// Last version that still wrote the behavior this fix repairs.
    last_affected: SaveVersion,
    name: &'static str,
    /// Returns true when the record was changed.
    apply: fn(&mut Building) -> bool,
}

const FIXES: &[BuildingFix] = &[
    BuildingFix {
        last_affected: SAVE_GAME_LAST_DOCK_ORIENTATION_BUG_VERSION,
        name: "dock orientation sentinel",
        apply: |b| {
            if let TypeData::Dock(dock) = &mut b.type_data {
                if dock.orientation == DOCK_ORIENTATION_SENTINEL {
                    dock.orientation = 0;
                    return true;
                }
            }
            false
        },
    },
    BuildingFix {
        last_affected: SAVE_GAME_LAST_UNSCALED_PROGRESS_VERSION,
        name: "workshop progress rescale",
        apply: |b| {
            if b.building_type.is_workshop() {
                if let TypeData::Industry(industry) = &mut b.type_data {
                    industry.progress = industry.progress.saturating_mul(2);
                    return true;
                }
            }
            false
        },
    },
    BuildingFix {
        last_affected: SAVE_GAME_LAST_OPEN_PERMISSIONS_VERSION,
        name: "roadblock default permissions",
        apply: |b| {
            if b.building_type.is_roadblock_like() {
                if let TypeData::Roadblock(roadblock) = &mut b.type_data {
                    if roadblock.permissions == 0 {
                        roadblock.permissions = ROADBLOCK_PERMISSION_ALL;
                        return true;
                    }
                }
            }
            false
        },
    },
    BuildingFix {
        last_affected: SAVE_GAME_LAST_GLOBAL_LOADS_VERSION,
        name: "industry loads backfill",
        apply: |b| {
            if b.building_type.is_industry() && b.loads_stored > 0 {
                let output = b.building_type.output_resource();
                if output != city::Resource::None {
                    b.resources_stored[output.index()] = b.loads_stored as u16;
                    b.loads_stored = 0;
                    return true;
                }
            }
            false
        },
    },
    BuildingFix {
        last_affected: SAVE_GAME_LAST_UNFILTERED_ACCEPTS_VERSION,
        name: "storage accept-all defaults",
        apply: |b| match (&b.building_type, &mut b.type_data) {
            (BuildingType::Market, TypeData::Supplier(supplier)) => {
                supplier.accepted_goods = ACCEPT_ALL_GOODS;
                true
            }
            (BuildingType::Dock, TypeData::Dock(dock)) => {
                dock.accepted_goods = ACCEPT_ALL_GOODS;
                true
            }
            _ => false,
        },
    },
    BuildingFix {
        last_affected: SAVE_GAME_LAST_UNCHECKED_STORAGE_VERSION,
        name: "warehouse slot scrub",
        apply: |b| {
            if !matches!(
                b.building_type,
                BuildingType::Warehouse | BuildingType::WarehouseSpace
            ) {
                return false;
            }
            let stored = b.subtype.max(0) as usize;
            let mut changed = false;
            for (index, amount) in b.resources_stored.iter_mut().enumerate() {
                if index != stored && *amount != 0 {
                    *amount = 0;
                    changed = true;
                }
            }
            changed
        },
    },
];

/// Applies every fix the file version calls for. Returns (fix name,
/// affected record count) pairs for the load log.
pub fn apply_building_fixes(
    buildings: &mut [Building],
    version: SaveVersion,
) -> Vec<(&'static str, usize)> {
    debug_assert!(
        FIXES.windows(2).all(|w| w[0].last_affected < w[1].last_affected),
        "fixes must stay in threshold order"
    );

    let mut applied = Vec::new();
    for fix in FIXES {
        if version > fix.last_affected {
            continue;
        }
        let mut affected = 0;
        for b in buildings.iter_mut() {
            if b.state != 0 && (fix.apply)(b) {
                affected += 1;
            }
        }
        if affected > 0 {
            applied.push((fix.name, affected));
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use city::building::{DockData, IndustryData, RoadblockData, SupplierData};
    use city::Resource;

    fn active(building_type: BuildingType) -> Building {
        Building {
            state: 1,
            building_type,
            ..Building::default()
        }
    }

    #[test]
    fn test_fix_thresholds_are_ordered() {
        assert!(FIXES
            .windows(2)
            .all(|w| w[0].last_affected < w[1].last_affected));
    }

    #[test]
    fn test_dock_orientation_sentinel_cleared() {
        let mut dock = active(BuildingType::Dock);
        dock.type_data = TypeData::Dock(DockData {
            orientation: 4,
            ..DockData::default()
        });
        let mut buildings = vec![dock];
        let applied = apply_building_fixes(&mut buildings, SaveVersion(0x70));
        assert_eq!(applied, vec![("dock orientation sentinel", 1)]);
        match &buildings[0].type_data {
            TypeData::Dock(d) => assert_eq!(d.orientation, 0),
            other => panic!("unexpected type data {other:?}"),
        }
    }

    #[test]
    fn test_dock_orientation_untouched_after_threshold() {
        let mut dock = active(BuildingType::Dock);
        dock.type_data = TypeData::Dock(DockData {
            orientation: 4,
            ..DockData::default()
        });
        let mut buildings = vec![dock];
        let applied = apply_building_fixes(&mut buildings, SaveVersion(0x75));
        assert!(applied.is_empty());
    }

    #[test]
    fn test_workshop_progress_doubles() {
        let mut shop = active(BuildingType::WineWorkshop);
        shop.type_data = TypeData::Industry(IndustryData {
            progress: 150,
            ..IndustryData::default()
        });
        // Farms predate the rescale and must not double.
        let mut farm = active(BuildingType::WheatFarm);
        farm.type_data = TypeData::Industry(IndustryData {
            progress: 150,
            ..IndustryData::default()
        });
        let mut buildings = vec![shop, farm];
        apply_building_fixes(&mut buildings, SaveVersion(0x7E));
        match &buildings[0].type_data {
            TypeData::Industry(i) => assert_eq!(i.progress, 300),
            other => panic!("unexpected type data {other:?}"),
        }
        match &buildings[1].type_data {
            TypeData::Industry(i) => assert_eq!(i.progress, 150),
            other => panic!("unexpected type data {other:?}"),
        }
    }

    #[test]
    fn test_roadblock_permissions_defaulted() {
        let mut roadblock = active(BuildingType::Roadblock);
        roadblock.type_data = TypeData::Roadblock(RoadblockData { permissions: 0 });
        let mut gatehouse = active(BuildingType::Gatehouse);
        gatehouse.type_data = TypeData::Roadblock(RoadblockData { permissions: 0x05 });
        let mut buildings = vec![roadblock, gatehouse];
        apply_building_fixes(&mut buildings, SaveVersion(0x80));
        match &buildings[0].type_data {
            TypeData::Roadblock(rb) => assert_eq!(rb.permissions, ROADBLOCK_PERMISSION_ALL),
            other => panic!("unexpected type data {other:?}"),
        }
        // An explicit mask survives.
        match &buildings[1].type_data {
            TypeData::Roadblock(rb) => assert_eq!(rb.permissions, 0x05),
            other => panic!("unexpected type data {other:?}"),
        }
    }

    #[test]
    fn test_loads_stored_backfilled_into_output_slot() {
        let mut farm = active(BuildingType::WheatFarm);
        farm.loads_stored = 3;
        let mut buildings = vec![farm];
        apply_building_fixes(&mut buildings, SaveVersion(0x82));
        assert_eq!(buildings[0].resources_stored[Resource::Wheat.index()], 3);
        assert_eq!(buildings[0].loads_stored, 0);
    }

    #[test]
    fn test_market_and_dock_accept_all() {
        let mut market = active(BuildingType::Market);
        market.type_data = TypeData::Supplier(SupplierData::default());
        let mut dock = active(BuildingType::Dock);
        dock.type_data = TypeData::Dock(DockData::default());
        let mut buildings = vec![market, dock];
        apply_building_fixes(&mut buildings, SaveVersion(0x84));
        match &buildings[0].type_data {
            TypeData::Supplier(s) => assert_eq!(s.accepted_goods, ACCEPT_ALL_GOODS),
            other => panic!("unexpected type data {other:?}"),
        }
        match &buildings[1].type_data {
            TypeData::Dock(d) => assert_eq!(d.accepted_goods, ACCEPT_ALL_GOODS),
            other => panic!("unexpected type data {other:?}"),
        }
    }

    #[test]
    fn test_warehouse_slots_scrubbed_to_stored_type() {
        let mut space = active(BuildingType::WarehouseSpace);
        space.subtype = Resource::Iron.index() as i16;
        space.resources_stored[Resource::Iron.index()] = 4;
        space.resources_stored[Resource::Wheat.index()] = 2;
        let mut buildings = vec![space];
        apply_building_fixes(&mut buildings, SaveVersion(0x86));
        assert_eq!(buildings[0].resources_stored[Resource::Iron.index()], 4);
        assert_eq!(buildings[0].resources_stored[Resource::Wheat.index()], 0);
    }

    #[test]
    fn test_unused_slots_are_skipped() {
        let mut empty = Building::default();
        empty.building_type = BuildingType::Dock;
        empty.type_data = TypeData::Dock(DockData {
            orientation: 4,
            ..DockData::default()
        });
        let mut buildings = vec![empty];
        let applied = apply_building_fixes(&mut buildings, SaveVersion(0x70));
        assert!(applied.is_empty());
    }

    #[test]
    fn test_no_fixes_at_current_version() {
        let mut dock = active(BuildingType::Dock);
        dock.type_data = TypeData::Dock(DockData {
            orientation: 4,
            ..DockData::default()
        });
        let mut buildings = vec![dock];
        let applied =
            apply_building_fixes(&mut buildings, crate::version::SAVE_GAME_CURRENT_VERSION);
        assert!(applied.is_empty());
    }
}
