//! Structure seam worldtest
//!
//! Villages and tree canopies straddle chunk borders. Generating the same
//! area with 16-block and 32-block chunks must give identical blocks, which
//! only holds when every chunk stamps its share of a structure exactly as
//! its neighbours expect.

use std::collections::BTreeMap;

use voxelgen_world::{BlockType, ChunkPos, TerrainGenerator, VillagePlan, WorldConfig, WorldPos};

fn generator(seed: u64, chunk_size: u32) -> TerrainGenerator {
    TerrainGenerator::new(WorldConfig {
        chunk_size,
        ..WorldConfig::with_seed(seed)
    })
    .unwrap()
}

/// Blocks of one 32-chunk assembled from its four 16-chunks.
fn assembled_from_small_chunks(
    small: &TerrainGenerator,
    big_pos: ChunkPos,
) -> BTreeMap<WorldPos, BlockType> {
    let mut blocks = BTreeMap::new();
    for dz in 0..2 {
        for dx in 0..2 {
            let pos = ChunkPos::new(big_pos.x * 2 + dx, big_pos.z * 2 + dz);
            blocks.extend(small.generate_chunk(pos).sorted_blocks());
        }
    }
    blocks
}

fn find_village(seeds: std::ops::Range<u64>) -> Option<(u64, VillagePlan)> {
    for seed in seeds {
        let gen = generator(seed, 16);
        for rz in -3..3 {
            for rx in -3..3 {
                if let Some(plan) = gen.villages().plan_for_region(rx, rz, gen.columns()) {
                    return Some((seed, plan));
                }
            }
        }
    }
    None
}

#[test]
fn villages_are_identical_across_chunk_sizes() {
    let (seed, plan) = find_village(1..20).expect("no village in 720 regions");
    println!(
        "Village in region {:?} (seed {}) at ({}, {}) with {} houses",
        plan.region,
        seed,
        plan.center_x,
        plan.center_z,
        plan.houses.len()
    );

    let small = generator(seed, 16);
    let big = generator(seed, 32);

    let min = ChunkPos::containing(plan.bounds.min_x, plan.bounds.min_z, 32);
    let max = ChunkPos::containing(plan.bounds.max_x, plan.bounds.max_z, 32);
    let mut structure_blocks = 0;
    for z in min.z..=max.z {
        for x in min.x..=max.x {
            let pos = ChunkPos::new(x, z);
            let expected = big.generate_chunk(pos).sorted_blocks();
            let assembled = assembled_from_small_chunks(&small, pos);
            assert_eq!(expected, assembled, "village seam mismatch in 32-chunk {pos}");

            structure_blocks += assembled
                .iter()
                .filter(|(p, block)| {
                    plan.bounds.contains(p.x, p.y, p.z)
                        && matches!(block, BlockType::Planks | BlockType::Farmland)
                })
                .count();
        }
    }
    assert!(structure_blocks > 0, "village left no planks or farmland");
}

#[test]
fn tree_canopies_are_identical_across_chunk_sizes() {
    let seed = 2468;
    let small = generator(seed, 16);
    let big = generator(seed, 32);

    let mut leaves = 0;
    for z in -3..3 {
        for x in -3..3 {
            let pos = ChunkPos::new(x, z);
            let expected = big.generate_chunk(pos).sorted_blocks();
            let assembled = assembled_from_small_chunks(&small, pos);
            assert_eq!(expected, assembled, "tree seam mismatch in 32-chunk {pos}");
            leaves += expected
                .values()
                .filter(|&&block| block == BlockType::Leaves)
                .count();
        }
    }
    assert!(leaves > 0, "no trees in a 192x192 area");
}
