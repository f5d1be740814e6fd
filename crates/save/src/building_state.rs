// ---------------------------------------------------------------------------
// Building array codec: one variable-interpretation record per building
// ---------------------------------------------------------------------------
//
// A record is a fixed common header, a type-tagged data region whose width
// depends on the format version, a fixed tail, and a run of expanded blocks
// whose presence is gated on the record width the file declares. Decoding
// must consume exactly the declared width for every record so the next
// record's header stays aligned, whatever this build knows about the
// fields in between.

use city::building::{
    Building, BuildingType, DepotData, DockData, EntertainmentData, GranaryData, HouseData,
    IndustryData, MonumentData, RoadblockData, SicknessData, SupplierData, TypeData,
};
use city::resource::RESOURCE_MAX;

use crate::buffer::{BufferReader, BufferWriter};
use crate::context::DecodeContext;
use crate::error::SaveError;
use crate::resource_mapping::LEGACY_INVENTORY_MAX;
use crate::version::SaveVersion;

/// Width of the type data region before it was reduced.
pub const TYPE_DATA_ORIGINAL_BUFFER_SIZE: usize = 42;
/// Width of the type data region in the current format.
pub const TYPE_DATA_CURRENT_BUFFER_SIZE: usize = 26;

const HEADER_SIZE: usize = 70;
const FIXED_TAIL_SIZE: usize = 16;

/// Full record width with the original 42-byte type data region.
pub const BUILDING_STATE_ORIGINAL_BUFFER_SIZE: usize =
    HEADER_SIZE + TYPE_DATA_ORIGINAL_BUFFER_SIZE + FIXED_TAIL_SIZE;
/// Full record width right after the type data reduction.
pub const BUILDING_STATE_REDUCED_BUFFER_SIZE: usize =
    HEADER_SIZE + TYPE_DATA_CURRENT_BUFFER_SIZE + FIXED_TAIL_SIZE;
/// Width once the per-record resource block exists (current epoch terms).
pub const BUILDING_STATE_RESOURCES_BUFFER_SIZE: usize =
    BUILDING_STATE_REDUCED_BUFFER_SIZE + 2 * RESOURCE_MAX;
pub const BUILDING_STATE_MONUMENTS_BUFFER_SIZE: usize = BUILDING_STATE_RESOURCES_BUFFER_SIZE + 6;
pub const BUILDING_STATE_TOURISM_BUFFER_SIZE: usize = BUILDING_STATE_MONUMENTS_BUFFER_SIZE + 4;
pub const BUILDING_STATE_VARIANTS_BUFFER_SIZE: usize = BUILDING_STATE_TOURISM_BUFFER_SIZE + 2;
pub const BUILDING_STATE_STRIKES_BUFFER_SIZE: usize = BUILDING_STATE_VARIANTS_BUFFER_SIZE + 1;
pub const BUILDING_STATE_SICKNESS_BUFFER_SIZE: usize = BUILDING_STATE_STRIKES_BUFFER_SIZE + 5;
/// Full record width written by the current format.
pub const BUILDING_STATE_CURRENT_BUFFER_SIZE: usize = BUILDING_STATE_SICKNESS_BUFFER_SIZE;

/// Type data width for one record. The caravanserai's legacy width is one
/// byte short of the general legacy width: the writer bug shipped in
/// released builds, so the reader must reproduce it to stay aligned.
pub fn type_data_size(version: SaveVersion, building_type: BuildingType) -> usize {
    let base = if version.has_reduced_type_data() {
        TYPE_DATA_CURRENT_BUFFER_SIZE
    } else {
        TYPE_DATA_ORIGINAL_BUFFER_SIZE
    };
    if building_type == BuildingType::Caravanserai && version.has_short_caravanserai() {
        base - 1
    } else {
        base
    }
}

/// Bytes one record actually occupies in the stream.
fn record_bytes_consumed(
    declared_width: usize,
    version: SaveVersion,
    building_type: BuildingType,
) -> usize {
    if building_type == BuildingType::Caravanserai && version.has_short_caravanserai() {
        declared_width - 1
    } else {
        declared_width
    }
}

/// Declared width translated into current-epoch terms, so the expanded
/// block gates can compare against the fixed BUILDING_STATE_* constants
/// even when the file's epoch has fewer resources.
fn normalized_width(declared_width: usize, ctx: &DecodeContext) -> usize {
    if ctx.version.has_dynamic_resources() {
        declared_width + 2 * (RESOURCE_MAX - ctx.mapping.total())
    } else {
        declared_width
    }
}

/// Decodes the whole buildings piece.
pub fn read_buildings(piece: &[u8], ctx: &DecodeContext) -> Result<Vec<Building>, SaveError> {
    let mut r = BufferReader::new(piece);

    let (width, count) = if ctx.version.has_dynamic_entities() {
        let width = r.u32() as usize;
        let count = r.u32() as usize;
        (width, count)
    } else {
        (
            BUILDING_STATE_ORIGINAL_BUFFER_SIZE,
            piece.len() / BUILDING_STATE_ORIGINAL_BUFFER_SIZE,
        )
    };

    // The reduced layout is the narrowest record any version ever wrote.
    if width < BUILDING_STATE_REDUCED_BUFFER_SIZE {
        return Err(SaveError::WrongFormat(format!(
            "building record width {width} is impossibly small"
        )));
    }
    if count > r.remaining() {
        return Err(SaveError::WrongFormat(format!(
            "building count {count} exceeds the piece payload"
        )));
    }

    let mut buildings = Vec::with_capacity(count);
    for _ in 0..count {
        buildings.push(read_building(&mut r, width, ctx));
    }
    Ok(buildings)
}

/// Encodes the buildings piece in the current format.
pub fn write_buildings(buildings: &[Building]) -> Vec<u8> {
    let mut out = vec![0u8; 8 + buildings.len() * BUILDING_STATE_CURRENT_BUFFER_SIZE];
    let mut w = BufferWriter::new(&mut out);
    w.u32(BUILDING_STATE_CURRENT_BUFFER_SIZE as u32);
    w.u32(buildings.len() as u32);
    for building in buildings {
        write_building(&mut w, building);
    }
    out
}

/// Decodes one record and leaves the cursor at the start of the next one.
pub fn read_building(r: &mut BufferReader<'_>, declared_width: usize, ctx: &DecodeContext) -> Building {
    let record_start = r.pos();
    let mut b = Building::default();

    b.state = r.u8();
    b.faction_id = r.u8();
    b.unknown_value = r.u8();
    b.size = r.u8();
    b.house_is_merged = r.bool8();
    b.house_size = r.u8();
    b.x = r.u8();
    b.y = r.u8();
    b.grid_offset = r.i32();
    b.building_type = BuildingType::from_id(r.i16());
    b.subtype = r.i16();
    b.road_network_id = r.u8();
    b.creation_sequence_number = r.u16();
    b.houses_covered = r.i16();
    b.percentage_houses_covered = r.i16();
    b.house_population = r.i16();
    b.house_population_room = r.i16();
    b.distance_from_entry = r.i16();
    b.house_highest_population = r.i16();
    b.house_unreachable_ticks = r.i16();
    b.road_access_x = r.u8();
    b.road_access_y = r.u8();
    b.figure_id = r.i16();
    b.figure_id2 = r.i16();
    b.immigrant_figure_id = r.i16();
    b.figure_id4 = r.i16();
    b.figure_spawn_delay = r.u8();
    b.figure_roam_direction = r.u8();
    b.has_water_access = r.bool8();
    b.has_well_access = r.bool8();
    b.prev_part_building_id = r.i16();
    b.next_part_building_id = r.i16();
    b.loads_stored = r.i16();
    b.has_road_access = r.bool8();
    b.house_criminal_active = r.u8();
    b.damage_risk = r.i16();
    b.fire_risk = r.i16();
    b.fire_duration = r.i16();
    b.fire_proof = r.u8();
    b.house_figure_generation_delay = r.u8();
    b.house_tax_coverage = r.u8();
    b.days_since_offering = r.u8();
    b.formation_id = r.i16();
    b.num_workers = r.i16();
    b.labor_category = r.u8();
    debug_assert_eq!(r.pos() - record_start, HEADER_SIZE);

    // Warehouses keep the stored resource id in the subtype; bring it into
    // the current catalog before anything branches on it.
    if matches!(
        b.building_type,
        BuildingType::Warehouse | BuildingType::WarehouseSpace
    ) {
        b.subtype = ctx.mapping.remap(b.subtype as u16).index() as i16;
    }

    let type_data_start = r.pos();
    read_type_data(r, &mut b, ctx);
    // Realign over trailing type-data bytes: unused legacy fields on old
    // widths, unknown future fields on new ones.
    r.set_pos(type_data_start + type_data_size(ctx.version, b.building_type));

    b.tax_income_or_storage = r.i32();
    b.house_days_without_food = r.u8();
    b.has_plague = r.bool8();
    b.desirability = r.i8();
    b.is_deleted = r.bool8();
    b.is_adjacent_to_water = r.bool8();
    b.storage_id = r.u8();
    b.sentiment_value = r.i8();
    b.show_on_problem_overlay = r.u8();
    b.house_tavern_wine_access = r.u8();
    b.house_tavern_food_access = r.u8();
    b.days_active = r.u16();

    let norm = normalized_width(declared_width, ctx);
    if ctx.version.has_dynamic_resources() && norm >= BUILDING_STATE_RESOURCES_BUFFER_SIZE {
        for legacy_id in 0..ctx.mapping.total() as u16 {
            let amount = r.u16();
            b.resources_stored[ctx.mapping.remap(legacy_id).index()] = amount;
        }
    }
    if norm >= BUILDING_STATE_MONUMENTS_BUFFER_SIZE {
        b.monument = MonumentData {
            progress: r.u8(),
            phase: r.u8(),
            upgrades: r.u32(),
        };
    }
    if norm >= BUILDING_STATE_TOURISM_BUFFER_SIZE {
        b.tourism_disabled = r.bool8();
        b.tourism_income = r.u8();
        b.tourism_income_this_year = r.u16();
    }
    if norm >= BUILDING_STATE_VARIANTS_BUFFER_SIZE {
        b.variant = r.u8();
        b.upgrade_level = r.u8();
    }
    if norm >= BUILDING_STATE_STRIKES_BUFFER_SIZE {
        b.strike_duration_days = r.u8();
    }
    if norm >= BUILDING_STATE_SICKNESS_BUFFER_SIZE {
        b.sickness = SicknessData {
            level: r.u8(),
            duration: r.u8(),
            doctor_cure: r.u8(),
            fumigation_frame: r.u8(),
            fumigation_direction: r.u8(),
        };
    }

    // Whatever remains of the declared width belongs to fields newer than
    // this build; skipping them keeps the next record aligned.
    r.set_pos(record_start + record_bytes_consumed(declared_width, ctx.version, b.building_type));
    b
}

fn read_type_data(r: &mut BufferReader<'_>, b: &mut Building, ctx: &DecodeContext) {
    let t = b.building_type;
    let static_resources = !ctx.version.has_dynamic_resources();

    if t.is_house() {
        b.type_data = TypeData::House(HouseData {
            entertainment: r.u8(),
            education: r.u8(),
            health: r.u8(),
            religion: r.u8(),
            school: r.u8(),
            library: r.u8(),
            academy: r.u8(),
            clinic: r.u8(),
            hospital: r.u8(),
            bathhouse: r.u8(),
            barber: r.u8(),
            evolution_progress: r.i8(),
            devolve_delay: r.u8(),
            days_without_stock: r.u8(),
        });
    } else if t.is_supplier() {
        if static_resources {
            for slot in 0..LEGACY_INVENTORY_MAX {
                let amount = r.i16();
                let resource = ctx.mapping.remap_inventory(slot);
                b.resources_stored[resource.index()] = amount.max(0) as u16;
            }
        }
        b.type_data = TypeData::Supplier(SupplierData {
            buyer_figure_id: r.i16(),
            fetch_resource: ctx.mapping.remap(r.i16() as u16),
            accepted_goods: ctx.mapping.remap_goods_mask(r.u32()),
        });
    } else if t == BuildingType::Granary {
        if static_resources {
            // Slot 0 is the legacy "no food" id; it maps to None and lands
            // in the unused zero slot.
            for legacy_id in 0..=ctx.mapping.total_food() as u16 {
                let amount = r.i16();
                let resource = ctx.mapping.remap(legacy_id);
                b.resources_stored[resource.index()] = amount.max(0) as u16;
            }
        }
        b.type_data = TypeData::Granary(GranaryData {
            fetch_resource: ctx.mapping.remap(r.i16() as u16),
            accepted_goods: ctx.mapping.remap_goods_mask(r.u32()),
        });
    } else if t.is_industry() {
        b.type_data = TypeData::Industry(IndustryData {
            progress: r.i16(),
            blessing_days_left: r.u8(),
            curse_days_left: r.u8(),
            has_raw_materials: r.bool8(),
            stored_amount: r.i16(),
            fishing_boat_id: r.i16(),
        });
    } else if t == BuildingType::Dock {
        b.type_data = TypeData::Dock(DockData {
            queued_docker_id: r.i16(),
            num_ships: r.u8(),
            orientation: r.i8(),
            docker_ids: [r.i16(), r.i16(), r.i16()],
            trade_ship_id: r.i16(),
            accepted_goods: ctx.mapping.remap_goods_mask(r.u32()),
        });
    } else if t.is_roadblock_like() {
        b.type_data = TypeData::Roadblock(RoadblockData {
            permissions: r.u8(),
        });
    } else if t.is_entertainment() {
        b.type_data = TypeData::Entertainment(EntertainmentData {
            num_shows: r.u8(),
            days1: r.u8(),
            days2: r.u8(),
            play_index: r.u8(),
        });
    } else if t == BuildingType::Depot {
        b.type_data = TypeData::Depot(DepotData {
            resource: ctx.mapping.remap(r.i16() as u16),
            src_storage_id: r.i16(),
            dst_storage_id: r.i16(),
            condition_type: r.u8(),
            condition_threshold: r.u8(),
        });
    } else {
        b.type_data = TypeData::None;
    }
}

/// Encodes one record in the current format: fixed width, current type
/// data, every expanded block, no version branching.
pub fn write_building(w: &mut BufferWriter<'_>, b: &Building) {
    let record_start = w.pos();

    w.u8(b.state);
    w.u8(b.faction_id);
    w.u8(b.unknown_value);
    w.u8(b.size);
    w.bool8(b.house_is_merged);
    w.u8(b.house_size);
    w.u8(b.x);
    w.u8(b.y);
    w.i32(b.grid_offset);
    w.i16(b.building_type.id());
    w.i16(b.subtype);
    w.u8(b.road_network_id);
    w.u16(b.creation_sequence_number);
    w.i16(b.houses_covered);
    w.i16(b.percentage_houses_covered);
    w.i16(b.house_population);
    w.i16(b.house_population_room);
    w.i16(b.distance_from_entry);
    w.i16(b.house_highest_population);
    w.i16(b.house_unreachable_ticks);
    w.u8(b.road_access_x);
    w.u8(b.road_access_y);
    w.i16(b.figure_id);
    w.i16(b.figure_id2);
    w.i16(b.immigrant_figure_id);
    w.i16(b.figure_id4);
    w.u8(b.figure_spawn_delay);
    w.u8(b.figure_roam_direction);
    w.bool8(b.has_water_access);
    w.bool8(b.has_well_access);
    w.i16(b.prev_part_building_id);
    w.i16(b.next_part_building_id);
    w.i16(b.loads_stored);
    w.bool8(b.has_road_access);
    w.u8(b.house_criminal_active);
    w.i16(b.damage_risk);
    w.i16(b.fire_risk);
    w.i16(b.fire_duration);
    w.u8(b.fire_proof);
    w.u8(b.house_figure_generation_delay);
    w.u8(b.house_tax_coverage);
    w.u8(b.days_since_offering);
    w.i16(b.formation_id);
    w.i16(b.num_workers);
    w.u8(b.labor_category);
    debug_assert_eq!(w.pos() - record_start, HEADER_SIZE);

    let type_data_start = w.pos();
    write_type_data(w, b);
    w.pad_to(type_data_start + TYPE_DATA_CURRENT_BUFFER_SIZE);

    w.i32(b.tax_income_or_storage);
    w.u8(b.house_days_without_food);
    w.bool8(b.has_plague);
    w.i8(b.desirability);
    w.bool8(b.is_deleted);
    w.bool8(b.is_adjacent_to_water);
    w.u8(b.storage_id);
    w.i8(b.sentiment_value);
    w.u8(b.show_on_problem_overlay);
    w.u8(b.house_tavern_wine_access);
    w.u8(b.house_tavern_food_access);
    w.u16(b.days_active);

    for amount in b.resources_stored {
        w.u16(amount);
    }
    w.u8(b.monument.progress);
    w.u8(b.monument.phase);
    w.u32(b.monument.upgrades);
    w.bool8(b.tourism_disabled);
    w.u8(b.tourism_income);
    w.u16(b.tourism_income_this_year);
    w.u8(b.variant);
    w.u8(b.upgrade_level);
    w.u8(b.strike_duration_days);
    w.u8(b.sickness.level);
    w.u8(b.sickness.duration);
    w.u8(b.sickness.doctor_cure);
    w.u8(b.sickness.fumigation_frame);
    w.u8(b.sickness.fumigation_direction);

    debug_assert_eq!(
        w.pos() - record_start,
        BUILDING_STATE_CURRENT_BUFFER_SIZE,
        "record encoder out of step with the current layout"
    );
}

fn write_type_data(w: &mut BufferWriter<'_>, b: &Building) {
    match &b.type_data {
        TypeData::None => {}
        TypeData::House(h) => {
            w.u8(h.entertainment);
            w.u8(h.education);
            w.u8(h.health);
            w.u8(h.religion);
            w.u8(h.school);
            w.u8(h.library);
            w.u8(h.academy);
            w.u8(h.clinic);
            w.u8(h.hospital);
            w.u8(h.bathhouse);
            w.u8(h.barber);
            w.i8(h.evolution_progress);
            w.u8(h.devolve_delay);
            w.u8(h.days_without_stock);
        }
        TypeData::Supplier(s) => {
            w.i16(s.buyer_figure_id);
            w.i16(s.fetch_resource.index() as i16);
            w.u32(s.accepted_goods);
        }
        TypeData::Granary(g) => {
            w.i16(g.fetch_resource.index() as i16);
            w.u32(g.accepted_goods);
        }
        TypeData::Industry(i) => {
            w.i16(i.progress);
            w.u8(i.blessing_days_left);
            w.u8(i.curse_days_left);
            w.bool8(i.has_raw_materials);
            w.i16(i.stored_amount);
            w.i16(i.fishing_boat_id);
        }
        TypeData::Dock(d) => {
            w.i16(d.queued_docker_id);
            w.u8(d.num_ships);
            w.i8(d.orientation);
            for id in d.docker_ids {
                w.i16(id);
            }
            w.i16(d.trade_ship_id);
            w.u32(d.accepted_goods);
        }
        TypeData::Roadblock(rb) => {
            w.u8(rb.permissions);
        }
        TypeData::Entertainment(e) => {
            w.u8(e.num_shows);
            w.u8(e.days1);
            w.u8(e.days2);
            w.u8(e.play_index);
        }
        TypeData::Depot(d) => {
            w.i16(d.resource.index() as i16);
            w.i16(d.src_storage_id);
            w.i16(d.dst_storage_id);
            w.u8(d.condition_type);
            w.u8(d.condition_threshold);
        }
    }
}
