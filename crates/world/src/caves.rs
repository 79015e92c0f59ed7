//! Cave generation using 3D noise carving.
//!
//! Two kinds of cavity are combined: "spaghetti" tunnels where two
//! independent fields are both close to zero, and "cheese" caverns where a
//! third field rises above a threshold. Carving is a pure predicate over
//! (position, seed); the column synthesizer simply omits cavity positions.

use crate::config::WorldConfig;
use crate::noise::{fold_seed, NoiseConfig, NoiseGenerator};

/// Cave generation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CaveParams {
    /// Base frequency for the tunnel fields
    pub spaghetti_frequency: f64,
    /// Tunnels open where both tunnel fields are within this distance of zero
    pub spaghetti_width: f64,
    /// Base frequency for the cavern field
    pub cheese_frequency: f64,
    /// Caverns open where the normalized cavern field exceeds this (0.0-1.0)
    pub cheese_threshold: f64,
    /// Depth below the crust over which caverns fade in
    pub cheese_fade_depth: f64,
    /// Vertical squash factor (makes caves more horizontal)
    pub vertical_squash: f64,
    /// Maximum Y level for caves
    pub max_y: i32,
    /// Solid crust kept directly below the surface
    pub surface_margin: i32,
}

impl CaveParams {
    /// Defaults scaled to the world's sea level.
    pub fn for_world(config: &WorldConfig) -> Self {
        Self {
            spaghetti_frequency: 0.025,
            spaghetti_width: 0.06,
            cheese_frequency: 0.03,
            cheese_threshold: 0.7,
            cheese_fade_depth: 16.0,
            vertical_squash: 1.5,
            max_y: config.sea_level as i32 + 16,
            surface_margin: 4,
        }
    }
}

/// Cave carver using 3D simplex noise
#[derive(Clone)]
pub struct CaveCarver {
    spaghetti_a: NoiseGenerator,
    spaghetti_b: NoiseGenerator,
    cheese: NoiseGenerator,
    params: CaveParams,
}

impl CaveCarver {
    pub fn new(config: &WorldConfig) -> Self {
        Self::with_params(config.seed, CaveParams::for_world(config))
    }

    pub fn with_params(world_seed: u64, params: CaveParams) -> Self {
        let seed = fold_seed(world_seed);
        let tunnel = |salt: u32| NoiseConfig {
            octaves: 2,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: params.spaghetti_frequency,
            seed: seed ^ salt,
        };
        let cheese_config = NoiseConfig {
            octaves: 3,
            lacunarity: 2.0,
            persistence: 0.5,
            frequency: params.cheese_frequency,
            seed: seed ^ 0xCBEE_5E01,
        };

        Self {
            spaghetti_a: NoiseGenerator::new(tunnel(0xCAFE_1234)),
            spaghetti_b: NoiseGenerator::new(tunnel(0x5A6E_7710)),
            cheese: NoiseGenerator::new(cheese_config),
            params,
        }
    }

    pub fn params(&self) -> &CaveParams {
        &self.params
    }

    /// Whether the block at `(x, y, z)` is hollow in a column whose surface
    /// sits at `surface_height`.
    ///
    /// Never true for the bedrock layer, at or above the surface, above
    /// `max_y`, or inside the crust just below the surface.
    pub fn is_cavity(&self, x: i32, y: i32, z: i32, surface_height: i32) -> bool {
        if y <= 0 || y >= surface_height || y > self.params.max_y {
            return false;
        }
        let crust_bottom = surface_height - self.params.surface_margin;
        if y >= crust_bottom {
            return false;
        }

        let fx = x as f64;
        let fy = y as f64 / self.params.vertical_squash;
        let fz = z as f64;

        if self.is_tunnel(fx, fy, fz) {
            return true;
        }

        let depth_below_crust = (crust_bottom - y) as f64;
        let fade = (depth_below_crust / self.params.cheese_fade_depth).min(1.0);
        // Normalize from [-1, 1] to [0, 1]
        let cheese = (self.cheese.sample_3d(fx, fy, fz) + 1.0) * 0.5;
        cheese * fade > self.params.cheese_threshold
    }

    fn is_tunnel(&self, fx: f64, fy: f64, fz: f64) -> bool {
        let width = self.params.spaghetti_width;
        self.spaghetti_a.sample_3d(fx, fy, fz).abs() < width
            && self.spaghetti_b.sample_3d(fx, fy, fz).abs() < width
    }
}
