//! Deterministic village generation.
//!
//! Each structure region rolls once against its center biome's village
//! chance. A successful roll yields a [`VillagePlan`] (well, farm, one to
//! three houses and gravel paths) that every intersecting chunk stamps
//! independently, so a village straddling chunk seams renders identically
//! from all sides.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voxelgen_core::{BlockType, WorldPos};

use crate::chunk::Chunk;
use crate::column::ColumnSynthesizer;
use crate::structure_template::{YRotation, HOUSE};
use crate::structures::{
    chunk_world_bounds, clear_world_block_if_in_chunk, fill_foundation_rect, region_seed,
    region_world_bounds, regions_overlapping, set_world_block_if_in_chunk, StructureBounds,
};

const VILLAGE_SEED_SALT: u64 = 0x56_49_4C_4C_41_47_45_u64; // "VILLAGE"

/// Villages keep this many blocks away from their region's edges.
pub const VILLAGE_MARGIN: i32 = 24;

const HOUSE_SIZE: i32 = 7;
const HOUSE_HEIGHT: i32 = 5;
const WELL_SIZE: i32 = 5;
const FARM_SIZE_X: i32 = 7;
const FARM_SIZE_Z: i32 = 5;
const HOUSE_SPACING: i32 = 12;
const MAX_HOUSES: usize = 3;

/// One house in a village plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HousePlacement {
    pub origin_x: i32,
    pub origin_z: i32,
    pub rotation: YRotation,
}

/// Fully resolved layout of one village.
#[derive(Debug, Clone, PartialEq)]
pub struct VillagePlan {
    pub region: (i32, i32),
    pub bounds: StructureBounds,
    pub base_y: i32,
    pub center_x: i32,
    pub center_z: i32,
    pub well_origin_x: i32,
    pub well_origin_z: i32,
    pub farm_origin_x: i32,
    pub farm_origin_z: i32,
    pub houses: Vec<HousePlacement>,
    rng_seed: u64,
}

/// Region-based village placement that can cross chunk boundaries.
#[derive(Debug, Clone, Copy)]
pub struct VillageGenerator {
    world_seed: u64,
    world_height: i32,
}

impl VillageGenerator {
    pub const fn new(world_seed: u64, world_height: i32) -> Self {
        Self {
            world_seed,
            world_height,
        }
    }

    /// The village planned for a region, if its roll succeeds.
    pub fn plan_for_region(
        &self,
        region_x: i32,
        region_z: i32,
        columns: &ColumnSynthesizer,
    ) -> Option<VillagePlan> {
        let seed = region_seed(self.world_seed, region_x, region_z, VILLAGE_SEED_SALT);
        let mut rng = StdRng::seed_from_u64(seed);

        let (region_min_x, region_max_x, region_min_z, region_max_z) =
            region_world_bounds(region_x, region_z);

        let center_x =
            rng.gen_range((region_min_x + VILLAGE_MARGIN)..=(region_max_x - VILLAGE_MARGIN));
        let center_z =
            rng.gen_range((region_min_z + VILLAGE_MARGIN)..=(region_max_z - VILLAGE_MARGIN));

        let surface = columns.surface(center_x, center_z);
        let chance = surface.biome.descriptor().village_chance;
        if rng.gen::<f64>() >= chance {
            return None;
        }

        // Villages sit on dry land.
        if surface.height < columns.sea_level() {
            return None;
        }
        let base_y = surface.height + 1;
        let max_y = base_y + HOUSE_HEIGHT + 2;
        if max_y >= self.world_height {
            return None;
        }

        let well_origin_x = center_x - WELL_SIZE / 2;
        let well_origin_z = center_z - WELL_SIZE / 2;

        // Small farm patch north of the well.
        let farm_origin_x = center_x - FARM_SIZE_X / 2;
        let farm_origin_z = well_origin_z - FARM_SIZE_Z - 3;

        let slots = [
            // west
            (
                center_x - HOUSE_SIZE / 2 - HOUSE_SPACING,
                center_z - HOUSE_SIZE / 2,
            ),
            // east
            (
                center_x + HOUSE_SIZE / 2 + (HOUSE_SPACING - HOUSE_SIZE),
                center_z - HOUSE_SIZE / 2,
            ),
            // south
            (center_x - HOUSE_SIZE / 2, center_z + WELL_SIZE + 3),
        ];
        let house_count = rng.gen_range(1..=MAX_HOUSES);
        let houses: Vec<HousePlacement> = slots
            .iter()
            .take(house_count)
            .map(|&(origin_x, origin_z)| HousePlacement {
                origin_x,
                origin_z,
                rotation: YRotation::ALL[rng.gen_range(0..YRotation::ALL.len())],
            })
            .collect();

        // Well roof overhangs the well by one block.
        let mut min_x = (well_origin_x - 1).min(farm_origin_x);
        let mut max_x = (well_origin_x + WELL_SIZE).max(farm_origin_x + FARM_SIZE_X - 1);
        let mut min_z = (well_origin_z - 1).min(farm_origin_z);
        let mut max_z = well_origin_z + WELL_SIZE;
        for house in &houses {
            min_x = min_x.min(house.origin_x);
            max_x = max_x.max(house.origin_x + HOUSE_SIZE - 1);
            min_z = min_z.min(house.origin_z);
            max_z = max_z.max(house.origin_z + HOUSE_SIZE - 1);
        }

        Some(VillagePlan {
            region: (region_x, region_z),
            bounds: StructureBounds {
                min_x,
                max_x,
                min_y: (base_y - 2).max(1),
                max_y,
                min_z,
                max_z,
            },
            base_y,
            center_x,
            center_z,
            well_origin_x,
            well_origin_z,
            farm_origin_x,
            farm_origin_z,
            houses,
            rng_seed: seed ^ 0xA11C_E0DE_1234_5678,
        })
    }

    /// Plans of every region touched by the given inclusive rectangle.
    pub fn plans_overlapping(
        &self,
        min_x: i32,
        max_x: i32,
        min_z: i32,
        max_z: i32,
        columns: &ColumnSynthesizer,
    ) -> Vec<VillagePlan> {
        regions_overlapping(min_x, max_x, min_z, max_z)
            .filter_map(|(rx, rz)| self.plan_for_region(rx, rz, columns))
            .collect()
    }

    /// Stamp every village intersecting this chunk. Returns how many were stamped.
    pub fn generate_into_chunk(&self, chunk: &mut Chunk, columns: &ColumnSynthesizer) -> usize {
        let chunk_pos = chunk.position();
        let chunk_size = chunk.dims().size;
        let (min_x, max_x, min_z, max_z) = chunk_world_bounds(chunk_pos, chunk_size);

        let mut stamped = 0;
        for plan in self.plans_overlapping(min_x, max_x, min_z, max_z, columns) {
            if plan.bounds.intersects_chunk(chunk_pos, chunk_size) {
                render_village(chunk, &plan);
                stamped += 1;
            }
        }
        stamped
    }
}

/// Renders the whole plan; writes outside the chunk are dropped, so every
/// chunk consumes the same random sequence.
fn render_village(chunk: &mut Chunk, plan: &VillagePlan) {
    let mut rng = StdRng::seed_from_u64(plan.rng_seed);

    render_paths(chunk, plan);
    render_well(chunk, plan.base_y, plan.well_origin_x, plan.well_origin_z);
    render_farm(
        chunk,
        &mut rng,
        plan.base_y,
        plan.farm_origin_x,
        plan.farm_origin_z,
    );
    for house in &plan.houses {
        render_house(chunk, plan.base_y, house);
    }
}

/// Gravel paths from the well to the farm and to every house, drawn first so
/// the buildings overwrite them where they meet.
fn render_paths(chunk: &mut Chunk, plan: &VillagePlan) {
    let path_y = plan.base_y - 1;
    let well_center_x = plan.well_origin_x + WELL_SIZE / 2;
    let well_center_z = plan.well_origin_z + WELL_SIZE / 2;

    let farm_south_z = plan.farm_origin_z + FARM_SIZE_Z;
    for z in farm_south_z..plan.well_origin_z {
        place_path_block(chunk, well_center_x, path_y, z);
    }

    for house in &plan.houses {
        let house_center_x = house.origin_x + HOUSE_SIZE / 2;
        let house_center_z = house.origin_z + HOUSE_SIZE / 2;

        for x in well_center_x.min(house_center_x)..=well_center_x.max(house_center_x) {
            place_path_block(chunk, x, path_y, well_center_z);
        }
        for z in well_center_z.min(house_center_z)..=well_center_z.max(house_center_z) {
            place_path_block(chunk, house_center_x, path_y, z);
        }
    }
}

fn place_path_block(chunk: &mut Chunk, world_x: i32, world_y: i32, world_z: i32) {
    // Support blocks under the path so it doesn't float over small depressions.
    fill_foundation_rect(chunk, world_y - 1, world_x, world_z, 1, 1, BlockType::Dirt);

    set_world_block_if_in_chunk(chunk, world_x, world_y, world_z, BlockType::Gravel);

    // Clear 2 blocks above so path isn't buried by hills.
    for dy in 1..=2 {
        clear_world_block_if_in_chunk(chunk, world_x, world_y + dy, world_z);
    }
}

fn render_farm(chunk: &mut Chunk, rng: &mut StdRng, base_y: i32, origin_x: i32, origin_z: i32) {
    let farmland_y = base_y - 1;

    fill_foundation_rect(
        chunk,
        farmland_y - 1,
        origin_x,
        origin_z,
        FARM_SIZE_X,
        FARM_SIZE_Z,
        BlockType::Dirt,
    );

    // Clear the crop volume (2 blocks tall) so hills don't bury farms.
    for dy in 1..=2 {
        for dz in 0..FARM_SIZE_Z {
            for dx in 0..FARM_SIZE_X {
                clear_world_block_if_in_chunk(
                    chunk,
                    origin_x + dx,
                    farmland_y + dy,
                    origin_z + dz,
                );
            }
        }
    }

    let water_x = origin_x + FARM_SIZE_X / 2;
    let water_z = origin_z + FARM_SIZE_Z / 2;

    for dz in 0..FARM_SIZE_Z {
        for dx in 0..FARM_SIZE_X {
            let world_x = origin_x + dx;
            let world_z = origin_z + dz;

            if world_x == water_x && world_z == water_z {
                set_world_block_if_in_chunk(chunk, world_x, farmland_y, world_z, BlockType::Water);
                continue;
            }

            set_world_block_if_in_chunk(chunk, world_x, farmland_y, world_z, BlockType::Farmland);

            let stage = rng.gen_range(0..=2u8);
            set_world_block_if_in_chunk(
                chunk,
                world_x,
                farmland_y + 1,
                world_z,
                BlockType::wheat_at_stage(stage),
            );
        }
    }
}

fn render_well(chunk: &mut Chunk, base_y: i32, origin_x: i32, origin_z: i32) {
    fill_foundation_rect(
        chunk,
        base_y - 1,
        origin_x,
        origin_z,
        WELL_SIZE,
        WELL_SIZE,
        BlockType::Cobblestone,
    );

    // Clear interior volume above the water so terrain doesn't intersect the well.
    for dy in 1..=3 {
        for dz in 1..(WELL_SIZE - 1) {
            for dx in 1..(WELL_SIZE - 1) {
                clear_world_block_if_in_chunk(
                    chunk,
                    origin_x + dx,
                    base_y + dy,
                    origin_z + dz,
                );
            }
        }
    }

    // Floor + walls.
    for dz in 0..WELL_SIZE {
        for dx in 0..WELL_SIZE {
            let x = origin_x + dx;
            let z = origin_z + dz;

            set_world_block_if_in_chunk(chunk, x, base_y - 1, z, BlockType::Cobblestone);

            let is_wall = dx == 0 || dz == 0 || dx + 1 == WELL_SIZE || dz + 1 == WELL_SIZE;
            let block = if is_wall {
                BlockType::Cobblestone
            } else {
                BlockType::Water
            };
            set_world_block_if_in_chunk(chunk, x, base_y, z, block);
        }
    }

    // Corner posts + simple roof.
    for (dx, dz) in [
        (0, 0),
        (0, WELL_SIZE - 1),
        (WELL_SIZE - 1, 0),
        (WELL_SIZE - 1, WELL_SIZE - 1),
    ] {
        for dy in 1..=3 {
            set_world_block_if_in_chunk(
                chunk,
                origin_x + dx,
                base_y + dy,
                origin_z + dz,
                BlockType::Wood,
            );
        }
    }

    for dz in -1..=WELL_SIZE {
        for dx in -1..=WELL_SIZE {
            set_world_block_if_in_chunk(
                chunk,
                origin_x + dx,
                base_y + 4,
                origin_z + dz,
                BlockType::Planks,
            );
        }
    }
}

fn render_house(chunk: &mut Chunk, base_y: i32, house: &HousePlacement) {
    let origin = WorldPos::new(house.origin_x, base_y - 1, house.origin_z);
    HOUSE.stamp(chunk, origin, house.rotation);
}
