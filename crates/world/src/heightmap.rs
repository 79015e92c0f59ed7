//! Heightmap generation for terrain.
//!
//! Converts noise layers into block heights. Height depends only on
//! continuous noise (never on the discrete biome), so neighbouring columns
//! differ by a small bounded amount even across biome borders.

use tracing::debug;

use crate::chunk::ChunkPos;
use crate::config::WorldConfig;
use crate::noise::{fold_seed, NoiseConfig, NoiseGenerator};

/// Blocks of relief contributed by the continental layer.
pub const CONTINENTAL_AMPLITUDE: f64 = 24.0;

/// Blocks of relief contributed by rolling hills.
pub const HILLS_AMPLITUDE: f64 = 6.0;

/// Blocks of relief contributed by ridges where the mountain mask is full.
pub const MOUNTAIN_AMPLITUDE: f64 = 48.0;

/// Continental values over which ridges fade in.
const MOUNTAIN_MASK_START: f64 = 0.25;
const MOUNTAIN_MASK_END: f64 = 0.6;

/// Maximum allowed height difference across a chunk boundary.
pub const MAX_BOUNDARY_DIFF: i32 = 20;

fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Samples surface height for any world column.
#[derive(Clone)]
pub struct HeightSampler {
    continental: NoiseGenerator,
    hills: NoiseGenerator,
    ridges: NoiseGenerator,
    sea_level: i32,
    world_height: i32,
}

impl HeightSampler {
    pub fn new(config: &WorldConfig) -> Self {
        let seed = fold_seed(config.seed);
        Self {
            continental: NoiseGenerator::new(NoiseConfig::continental(seed)),
            hills: NoiseGenerator::new(NoiseConfig::hills(seed)),
            ridges: NoiseGenerator::new(NoiseConfig::ridges(seed)),
            sea_level: config.sea_level as i32,
            world_height: config.world_height as i32,
        }
    }

    /// Unclamped height before flooring.
    pub fn raw_height(&self, world_x: i32, world_z: i32) -> f64 {
        let x = world_x as f64;
        let z = world_z as f64;

        let continental = self.continental.sample_2d(x, z);
        let hills = self.hills.sample_2d(x, z);
        let ridged = self.ridges.sample_ridged(x, z);
        let mountain_mask = smoothstep(MOUNTAIN_MASK_START, MOUNTAIN_MASK_END, continental);

        self.sea_level as f64
            + continental * CONTINENTAL_AMPLITUDE
            + hills * HILLS_AMPLITUDE
            + ridged * mountain_mask * MOUNTAIN_AMPLITUDE
    }

    /// Surface height in `[1, world_height - 1]`.
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let raw = self.raw_height(world_x, world_z).floor();
        let max = self.world_height - 1;

        if raw < 1.0 || raw > max as f64 {
            debug!(
                world_x,
                world_z,
                raw,
                max,
                "surface height clamped to world bounds"
            );
        }

        // Float-to-int casts saturate, so the clamp sees a finite i32.
        (raw as i32).clamp(1, max)
    }
}

/// Heightmap for a single chunk.
///
/// Each value is the surface block's Y coordinate at that column.
pub struct Heightmap {
    size: usize,
    /// Indexed as `heights[z * size + x]` for cache-friendly iteration.
    heights: Vec<i32>,
}

impl Heightmap {
    /// Generate a heightmap for the given chunk.
    pub fn generate(sampler: &HeightSampler, chunk: ChunkPos, chunk_size: i32) -> Self {
        let size = chunk_size.max(0) as usize;
        let (origin_x, origin_z) = chunk.origin(chunk_size);

        let mut heights = Vec::with_capacity(size * size);
        for local_z in 0..chunk_size {
            for local_x in 0..chunk_size {
                heights.push(sampler.surface_height(origin_x + local_x, origin_z + local_z));
            }
        }

        Self { size, heights }
    }

    /// Height at a local column, or `None` outside the chunk.
    pub fn get(&self, local_x: usize, local_z: usize) -> Option<i32> {
        if local_x >= self.size || local_z >= self.size {
            return None;
        }
        self.heights.get(local_z * self.size + local_x).copied()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Get the minimum height in this heightmap.
    pub fn min_height(&self) -> i32 {
        self.heights.iter().copied().min().unwrap_or(0)
    }

    /// Get the maximum height in this heightmap.
    pub fn max_height(&self) -> i32 {
        self.heights.iter().copied().max().unwrap_or(0)
    }

    /// Get the average height in this heightmap.
    pub fn avg_height(&self) -> f32 {
        if self.heights.is_empty() {
            return 0.0;
        }
        let sum: i64 = self.heights.iter().map(|&h| h as i64).sum();
        sum as f32 / self.heights.len() as f32
    }
}

/// Largest height difference along the shared edge of two adjacent chunks.
///
/// Returns `None` when the chunks do not share an edge.
pub fn seam_max_difference(
    sampler: &HeightSampler,
    chunk_size: i32,
    a: ChunkPos,
    b: ChunkPos,
) -> Option<i32> {
    let (first, second) = if (a.x, a.z) <= (b.x, b.z) { (a, b) } else { (b, a) };
    let hm1 = Heightmap::generate(sampler, first, chunk_size);
    let hm2 = Heightmap::generate(sampler, second, chunk_size);
    let last = hm1.size().checked_sub(1)?;

    let pairs: Vec<(Option<i32>, Option<i32>)> =
        if second.x == first.x + 1 && second.z == first.z {
            // second is +X: first's x = last edge against second's x = 0
            (0..hm1.size())
                .map(|z| (hm1.get(last, z), hm2.get(0, z)))
                .collect()
        } else if second.x == first.x && second.z == first.z + 1 {
            (0..hm1.size())
                .map(|x| (hm1.get(x, last), hm2.get(x, 0)))
                .collect()
        } else {
            return None;
        };

    pairs
        .into_iter()
        .filter_map(|(h1, h2)| Some((h1? - h2?).abs()))
        .max()
}

/// True when two adjacent chunks meet without a visible seam.
///
/// Non-adjacent chunks have no shared edge and report `false`.
pub fn check_seam_continuity(
    sampler: &HeightSampler,
    chunk_size: i32,
    a: ChunkPos,
    b: ChunkPos,
) -> bool {
    matches!(
        seam_max_difference(sampler, chunk_size, a, b),
        Some(diff) if diff <= MAX_BOUNDARY_DIFF
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(seed: u64) -> HeightSampler {
        HeightSampler::new(&WorldConfig::with_seed(seed))
    }

    #[test]
    fn test_heightmap_determinism() {
        let hm1 = Heightmap::generate(&sampler(12345), ChunkPos::new(10, 20), 16);
        let hm2 = Heightmap::generate(&sampler(12345), ChunkPos::new(10, 20), 16);

        assert_eq!(hm1.heights(), hm2.heights());
    }

    #[test]
    fn test_heightmap_range() {
        let config = WorldConfig::with_seed(54321);
        let hm = Heightmap::generate(&HeightSampler::new(&config), ChunkPos::new(0, 0), 16);

        for &height in hm.heights() {
            assert!(
                height >= 1 && height < config.world_height as i32,
                "Height {} out of range",
                height
            );
        }
    }

    #[test]
    fn test_tiny_world_clamps_without_panicking() {
        let config = WorldConfig {
            world_height: 8,
            sea_level: 4,
            ..WorldConfig::with_seed(3)
        };
        let sampler = HeightSampler::new(&config);
        for x in -50..50 {
            let h = sampler.surface_height(x * 31, x * 17);
            assert!((1..=7).contains(&h));
        }
    }

    #[test]
    fn test_different_seeds_produce_different_heightmaps() {
        let mut any_different = false;
        for cx in 0..4 {
            let hm1 = Heightmap::generate(&sampler(111), ChunkPos::new(cx * 8, 0), 16);
            let hm2 = Heightmap::generate(&sampler(222), ChunkPos::new(cx * 8, 0), 16);
            if hm1.heights() != hm2.heights() {
                any_different = true;
                break;
            }
        }

        assert!(
            any_different,
            "Different seeds should produce different heightmaps"
        );
    }

    #[test]
    fn test_no_seams_between_adjacent_chunks() {
        let s = sampler(42);

        assert!(check_seam_continuity(&s, 16, ChunkPos::new(0, 0), ChunkPos::new(1, 0)));
        assert!(check_seam_continuity(&s, 16, ChunkPos::new(5, 10), ChunkPos::new(6, 10)));
        assert!(check_seam_continuity(&s, 16, ChunkPos::new(0, 0), ChunkPos::new(0, 1)));
        assert!(check_seam_continuity(&s, 16, ChunkPos::new(10, 5), ChunkPos::new(10, 6)));
    }

    #[test]
    fn test_seam_continuity_negative_coords() {
        let s = sampler(123);

        assert!(
            check_seam_continuity(&s, 16, ChunkPos::new(-1, 0), ChunkPos::new(0, 0)),
            "Seam detected crossing chunk boundary at X=0"
        );
        assert!(
            check_seam_continuity(&s, 16, ChunkPos::new(0, 0), ChunkPos::new(0, -1)),
            "Seam detected crossing chunk boundary at Z=0"
        );
    }

    #[test]
    fn test_non_adjacent_chunks_have_no_seam() {
        let s = sampler(42);
        assert_eq!(
            seam_max_difference(&s, 16, ChunkPos::new(0, 0), ChunkPos::new(5, 5)),
            None
        );
        assert!(!check_seam_continuity(&s, 16, ChunkPos::new(0, 0), ChunkPos::new(2, 0)));
    }

    #[test]
    fn test_heightmap_stats() {
        let hm = Heightmap::generate(&sampler(777), ChunkPos::new(0, 0), 16);

        let min = hm.min_height();
        let max = hm.max_height();
        let avg = hm.avg_height();

        assert_eq!(min, *hm.heights().iter().min().unwrap());
        assert_eq!(max, *hm.heights().iter().max().unwrap());
        assert!(min <= max);
        assert!(avg >= min as f32 && avg <= max as f32);
    }

    #[test]
    fn test_get_matches_sampler_and_rejects_out_of_bounds() {
        let s = sampler(999);
        let chunk = ChunkPos::new(-3, 2);
        let hm = Heightmap::generate(&s, chunk, 16);
        let (ox, oz) = chunk.origin(16);

        assert_eq!(hm.get(3, 7), Some(s.surface_height(ox + 3, oz + 7)));
        assert_eq!(hm.get(16, 0), None);
        assert_eq!(hm.get(0, 16), None);
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.25, 0.6, 0.0), 0.0);
        assert_eq!(smoothstep(0.25, 0.6, 1.0), 1.0);
        let mid = smoothstep(0.25, 0.6, 0.425);
        assert!((mid - 0.5).abs() < 1e-9);
    }
}
