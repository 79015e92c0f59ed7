//! Noise generation utilities for terrain generation.
//!
//! Provides deterministic seeded simplex noise plus the fractal compositions
//! (fBm, ridged) that heights, biomes, caves and ores are built from. Every
//! function here is pure, so one field can be shared by any number of
//! generation workers.

use noise::{NoiseFn, Simplex};

/// Fold a 64-bit world seed into the 32-bit seed of a permutation table.
///
/// Plain truncation would discard the high half of 53-bit seeds.
pub fn fold_seed(world_seed: u64) -> u32 {
    (world_seed ^ (world_seed >> 32)) as u32
}

/// Seeded continuous noise in two and three dimensions.
#[derive(Clone)]
pub struct NoiseField {
    simplex: Simplex,
    seed: u32,
}

impl NoiseField {
    /// Build the permutation table for `seed`. Same seed, same outputs.
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: Simplex::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Simplex noise at a 2D point, in [-1.0, 1.0].
    #[inline]
    pub fn noise_2d(&self, x: f64, y: f64) -> f64 {
        self.simplex.get([x, y]).clamp(-1.0, 1.0)
    }

    /// Simplex noise at a 3D point, in [-1.0, 1.0].
    #[inline]
    pub fn noise_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        self.simplex.get([x, y, z]).clamp(-1.0, 1.0)
    }

    /// Fractal Brownian motion over `octaves` layers of 2D noise.
    ///
    /// Returns a value in [-1.0, 1.0]; zero octaves contribute nothing.
    pub fn fbm(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        accumulate_octaves(octaves, persistence, lacunarity, |frequency| {
            self.noise_2d(x * frequency, y * frequency)
        })
    }

    /// Ridged multifractal: each octave contributes `1 - |noise|`.
    ///
    /// Returns a value in [0.0, 1.0] with sharp crests where the base noise
    /// crosses zero.
    pub fn ridged(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        accumulate_octaves(octaves, persistence, lacunarity, |frequency| {
            1.0 - self.noise_2d(x * frequency, y * frequency).abs()
        })
        .clamp(0.0, 1.0)
    }

    /// Fractal Brownian motion over 3D noise, in [-1.0, 1.0].
    pub fn fbm_3d(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        accumulate_octaves(octaves, persistence, lacunarity, |frequency| {
            self.noise_3d(x * frequency, y * frequency, z * frequency)
        })
    }
}

fn accumulate_octaves(
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
    mut sample: impl FnMut(f64) -> f64,
) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        value += sample(frequency) * amplitude;
        max_value += amplitude;

        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_value.abs() < f64::EPSILON {
        return 0.0;
    }

    // Normalize to [-1.0, 1.0]
    (value / max_value).clamp(-1.0, 1.0)
}

/// Configuration for multi-octave noise generation.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseConfig {
    /// Number of octaves (layers of detail)
    pub octaves: u32,
    /// Frequency multiplier between octaves
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves (persistence)
    pub persistence: f64,
    /// Base frequency (scale)
    pub frequency: f64,
    /// Permutation table seed
    pub seed: u32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 1.0,
            seed: 0,
        }
    }
}

impl NoiseConfig {
    /// Continental scale: oceans versus land. Also the biome elevation signal.
    pub fn continental(seed: u32) -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.004,
            seed,
        }
    }

    /// Rolling hills layered on top of the continental shape.
    pub fn hills(seed: u32) -> Self {
        Self {
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.02,
            seed: seed.wrapping_add(1000),
        }
    }

    /// Ridgelines for mountain ranges.
    pub fn ridges(seed: u32) -> Self {
        Self {
            octaves: 5,
            lacunarity: 2.1,
            persistence: 0.5,
            frequency: 0.008,
            seed: seed.wrapping_add(2000),
        }
    }

    /// Temperature for biome assignment.
    pub fn temperature(seed: u32) -> Self {
        Self {
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.0025,
            seed: seed.wrapping_add(3000),
        }
    }

    /// Humidity for biome assignment.
    pub fn humidity(seed: u32) -> Self {
        Self {
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: 0.003,
            seed: seed.wrapping_add(4000),
        }
    }
}

/// A noise field bound to one [`NoiseConfig`].
#[derive(Clone)]
pub struct NoiseGenerator {
    field: NoiseField,
    config: NoiseConfig,
}

impl NoiseGenerator {
    /// Create a new noise generator with the given configuration.
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            field: NoiseField::new(config.seed),
            config,
        }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Multi-octave 2D sample in [-1.0, 1.0].
    pub fn sample_2d(&self, x: f64, y: f64) -> f64 {
        let freq = self.config.frequency;
        self.field.fbm(
            x * freq,
            y * freq,
            self.config.octaves,
            self.config.persistence,
            self.config.lacunarity,
        )
    }

    /// Multi-octave 3D sample in [-1.0, 1.0].
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f64 {
        let freq = self.config.frequency;
        self.field.fbm_3d(
            x * freq,
            y * freq,
            z * freq,
            self.config.octaves,
            self.config.persistence,
            self.config.lacunarity,
        )
    }

    /// Multi-octave ridged sample in [0.0, 1.0].
    pub fn sample_ridged(&self, x: f64, y: f64) -> f64 {
        let freq = self.config.frequency;
        self.field.ridged(
            x * freq,
            y * freq,
            self.config.octaves,
            self.config.persistence,
            self.config.lacunarity,
        )
    }

    /// Sample noise and map to a specific range.
    pub fn sample_2d_range(&self, x: f64, y: f64, min: f64, max: f64) -> f64 {
        let noise = self.sample_2d(x, y);
        // Map from [-1, 1] to [min, max]
        (noise + 1.0) * 0.5 * (max - min) + min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_determinism() {
        let field1 = NoiseField::new(12345);
        let field2 = NoiseField::new(12345);

        for x in 0..10 {
            for y in 0..10 {
                let (fx, fy) = (x as f64 * 0.37, y as f64 * 0.41);
                assert_eq!(
                    field1.noise_2d(fx, fy),
                    field2.noise_2d(fx, fy),
                    "Noise not deterministic at ({}, {})",
                    x,
                    y
                );
                assert_eq!(
                    field1.fbm(fx, fy, 4, 0.5, 2.0),
                    field2.fbm(fx, fy, 4, 0.5, 2.0)
                );
            }
        }
    }

    #[test]
    fn test_noise_range() {
        let field = NoiseField::new(7);

        for x in 0..100 {
            for y in 0..100 {
                let (fx, fy) = (x as f64 * 0.1, y as f64 * 0.1);
                let val = field.noise_2d(fx, fy);
                assert!((-1.0..=1.0).contains(&val), "noise {} out of range", val);
                let fbm = field.fbm(fx, fy, 5, 0.5, 2.0);
                assert!((-1.0..=1.0).contains(&fbm), "fbm {} out of range", fbm);
                let ridged = field.ridged(fx, fy, 5, 0.5, 2.0);
                assert!((0.0..=1.0).contains(&ridged), "ridged {} out of range", ridged);
            }
        }
    }

    #[test]
    fn test_zero_octaves_contribute_nothing() {
        let field = NoiseField::new(99);
        assert_eq!(field.fbm(1.5, 2.5, 0, 0.5, 2.0), 0.0);
        assert_eq!(field.ridged(1.5, 2.5, 0, 0.5, 2.0), 0.0);
        assert_eq!(field.fbm_3d(1.5, 2.5, 3.5, 0, 0.5, 2.0), 0.0);
    }

    #[test]
    fn test_cancelling_amplitudes_do_not_divide_by_zero() {
        let field = NoiseField::new(99);
        let val = field.fbm(0.3, 0.7, 2, -1.0, 2.0);
        assert!(val.is_finite());
        assert_eq!(val, 0.0);
    }

    #[test]
    fn test_noise_is_continuous_across_lattice_lines() {
        let field = NoiseField::new(4242);
        let eps = 1e-6;
        for i in -5..5 {
            let lattice = i as f64;
            let before = field.noise_2d(lattice - eps, 0.5);
            let after = field.noise_2d(lattice + eps, 0.5);
            assert!(
                (before - after).abs() < 1e-3,
                "jump at lattice line x={}: {} vs {}",
                lattice,
                before,
                after
            );
        }
    }

    #[test]
    fn test_different_seeds_produce_different_noise() {
        let gen1 = NoiseGenerator::new(NoiseConfig::continental(1));
        let gen2 = NoiseGenerator::new(NoiseConfig::continental(2));

        let mut any_different = false;
        for x in 0..20 {
            for y in 0..20 {
                let val1 = gen1.sample_2d(x as f64 * 50.0, y as f64 * 50.0);
                let val2 = gen2.sample_2d(x as f64 * 50.0, y as f64 * 50.0);
                if (val1 - val2).abs() > 0.001 {
                    any_different = true;
                    break;
                }
            }
            if any_different {
                break;
            }
        }

        assert!(
            any_different,
            "Different seeds should produce different noise"
        );
    }

    #[test]
    fn test_fold_seed_keeps_high_bits() {
        let low = 0x0000_0000_1234_5678u64;
        let high = 0x0010_0000_1234_5678u64;
        assert_ne!(fold_seed(low), fold_seed(high));
        assert_eq!(fold_seed(42), 42);
    }

    #[test]
    fn test_noise_config_presets() {
        let seed = 123;

        let continental = NoiseConfig::continental(seed);
        assert_eq!(continental.seed, seed);
        assert!(continental.frequency < 0.01); // Very large scale

        let hills = NoiseConfig::hills(seed);
        assert_eq!(hills.seed, seed + 1000); // Offset seed

        let humidity = NoiseConfig::humidity(seed);
        assert_ne!(humidity.seed, NoiseConfig::temperature(seed).seed);
    }

    #[test]
    fn test_sample_2d_range() {
        let gen = NoiseGenerator::new(NoiseConfig::default());

        for x in 0..10 {
            for y in 0..10 {
                let val = gen.sample_2d_range(x as f64 * 0.5, y as f64 * 0.5, 0.0, 100.0);
                assert!(
                    (0.0..=100.0).contains(&val),
                    "Value {} out of range [0, 100]",
                    val
                );
            }
        }
    }

    #[test]
    fn test_fbm_3d_determinism() {
        let config = NoiseConfig {
            seed: 12345,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
            frequency: 0.1,
        };

        let gen1 = NoiseGenerator::new(config.clone());
        let gen2 = NoiseGenerator::new(config);

        for x in 0..5 {
            for y in 0..5 {
                for z in 0..5 {
                    let val1 = gen1.sample_3d(x as f64, y as f64, z as f64);
                    let val2 = gen2.sample_3d(x as f64, y as f64, z as f64);
                    assert_eq!(
                        val1, val2,
                        "3D noise not deterministic at ({}, {}, {})",
                        x, y, z
                    );
                    assert!((-1.0..=1.0).contains(&val1));
                }
            }
        }
    }

    #[test]
    fn test_noise_field_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NoiseField>();
        assert_send_sync::<NoiseGenerator>();
    }
}
