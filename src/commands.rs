//! Subcommand implementations.

use anyhow::Result;
use tracing::info;
use voxelgen_world::heightmap::{seam_max_difference, MAX_BOUNDARY_DIFF};
use voxelgen_world::pregen::positions_around;
use voxelgen_world::{pregenerate, BiomeId, BlockType, ChunkPos, ChunkStore, TerrainGenerator};

/// One character per biome for the ASCII map.
pub fn biome_glyph(biome: BiomeId) -> char {
    match biome {
        BiomeId::Plains => '.',
        BiomeId::Forest => 'T',
        BiomeId::Desert => 'd',
        BiomeId::Mountains => '^',
        BiomeId::Ocean => '~',
        BiomeId::Tundra => '*',
    }
}

/// Pregenerate a square of chunks around the origin, then save.
pub fn generate(store: &ChunkStore, radius: i32, workers: Option<usize>) -> Result<()> {
    store.load_world();
    let report = pregenerate(store, positions_around(ChunkPos::new(0, 0), radius), workers);
    let saved = store.save_dirty_chunks()?;
    let stats = store.stats();

    println!(
        "Generated {} of {} chunks with {} workers in {:.2?}",
        report.generated, report.requested, report.workers, report.elapsed
    );
    println!(
        "Resident: {}  evicted: {}  saved: {}",
        stats.resident, stats.evicted, saved
    );
    Ok(())
}

/// Dump one column from the sky down to bedrock, run-length encoded.
pub fn inspect(store: &ChunkStore, x: i32, z: i32) -> Result<()> {
    store.load_world();
    let generator = store.generator();
    let climate = generator.columns().biomes().climate(x, z);
    let surface = generator.surface_height(x, z);
    let chunk = ChunkPos::containing(x, z, store.config().chunk_size as i32);

    println!("Column ({x}, {z}) in chunk {chunk}");
    println!(
        "  biome: {}  surface: {}  temperature: {:.3}  humidity: {:.3}  elevation: {:.3}",
        generator.biome_at(x, z).as_str(),
        surface,
        climate.temperature,
        climate.humidity,
        climate.elevation
    );

    let top = store.config().world_height as i32 - 1;
    let mut runs: Vec<(i32, i32, BlockType)> = Vec::new();
    for y in (0..=top).rev() {
        let block = store.get_block(x, y, z);
        match runs.last_mut() {
            Some((_, low, run_block)) if *run_block == block => *low = y,
            _ => runs.push((y, y, block)),
        }
    }
    // The sky above the tallest block is not interesting.
    if matches!(runs.first(), Some((_, _, BlockType::Air))) {
        runs.remove(0);
    }
    for (high, low, block) in runs {
        if high == low {
            println!("  y {high:>3}          {block}");
        } else {
            println!("  y {low:>3}..={high:<3}    {block}");
        }
    }
    Ok(())
}

/// Print an ASCII biome map, one character per chunk.
pub fn biomes(generator: &TerrainGenerator, radius: i32) -> Result<()> {
    let size = generator.config().chunk_size as i32;
    let half = size / 2;
    let mut counts = [0usize; 6];

    for cz in -radius..=radius {
        let row: String = (-radius..=radius)
            .map(|cx| {
                let biome = generator.biome_at(cx * size + half, cz * size + half);
                if let Some(index) = BiomeId::all().iter().position(|&b| b == biome) {
                    counts[index] += 1;
                }
                biome_glyph(biome)
            })
            .collect();
        println!("{row}");
    }

    println!();
    for (biome, count) in BiomeId::all().iter().zip(counts) {
        println!("  {} {:<10} {count}", biome_glyph(*biome), biome.as_str());
    }
    Ok(())
}

/// Check height continuity on every seam inside the square.
pub fn validate_seams(generator: &TerrainGenerator, radius: i32) -> Result<()> {
    let size = generator.config().chunk_size as i32;
    let sampler = generator.columns().heights();
    let mut checked = 0usize;
    let mut failed = Vec::new();
    let mut max_diff = 0;

    for cz in -radius..=radius {
        for cx in -radius..=radius {
            let here = ChunkPos::new(cx, cz);
            let neighbours = [ChunkPos::new(cx + 1, cz), ChunkPos::new(cx, cz + 1)];
            for there in neighbours {
                if there.x > radius || there.z > radius {
                    continue;
                }
                let Some(diff) = seam_max_difference(sampler, size, here, there) else {
                    continue;
                };
                checked += 1;
                max_diff = max_diff.max(diff);
                if diff > MAX_BOUNDARY_DIFF {
                    failed.push((here, there, diff));
                }
            }
        }
    }

    info!(checked, failed = failed.len(), max_diff, "Seam validation finished");
    println!("Checked {checked} seams, max height step {max_diff} (limit {MAX_BOUNDARY_DIFF})");
    for (a, b, diff) in &failed {
        println!("  seam {a} | {b}: {diff}");
    }
    if !failed.is_empty() {
        anyhow::bail!("{} of {} seams exceed the height limit", failed.len(), checked);
    }
    Ok(())
}

/// Apply one edit and persist it.
pub fn set_block(store: &ChunkStore, x: i32, y: i32, z: i32, block: BlockType) -> Result<()> {
    if store.world_file().is_none() {
        anyhow::bail!("No world file configured; the edit would be lost");
    }
    store.load_world();
    let previous = store.get_block(x, y, z);
    store.set_block(x, y, z, block)?;
    store.save_dirty_chunks()?;
    println!("({x}, {y}, {z}): {previous} -> {block}");
    Ok(())
}
