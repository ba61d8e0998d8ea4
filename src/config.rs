//! Tunable parameters for subdivision, tree compilation and lighting.
//!
//! Every knob has a default matching the values the level compiler has been
//! tuned with; [`BakeConfig::validate`] rejects combinations that would make a
//! phase loop forever or divide by zero.

use crate::errors::ConfigError;
use crate::float_types::Real;
use crate::mesh::material::Color;

/// Adaptive subdivision limits (world units, not squared).
#[derive(Debug, Clone, PartialEq)]
pub struct SubdivideConfig {
    /// Triangles with an edge longer than this are split into 4.
    pub max_edge: Real,
    /// Triangles with any edge at or below this are never split.
    pub min_edge: Real,
    /// Hard recursion cap, independent of geometry.
    pub max_depth: u32,
}

impl Default for SubdivideConfig {
    fn default() -> Self {
        Self {
            max_edge: 1.0,
            min_edge: 0.1,
            max_depth: 16,
        }
    }
}

/// Tree compilation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BspConfig {
    /// Triangle count at or below which a node becomes a leaf.
    pub leaf_size: usize,
    /// Weight of one split in the splitter score.
    pub split_penalty: usize,
    /// Only every `stride`-th triangle is tried as a splitter.
    pub stride: usize,
    /// Splitter search stops at the first candidate scoring below this.
    pub good_enough: usize,
    /// Half-width of the "on plane" band used by classification.
    pub classify_epsilon: Real,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            leaf_size: 10,
            split_penalty: 8,
            stride: 1,
            good_enough: 5,
            classify_epsilon: 1e-3,
        }
    }
}

/// Lighting simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiosityConfig {
    /// Hemisphere rays cast per patch for sky injection.
    pub sky_samples: usize,
    /// Color of rays escaping straight up.
    pub sky_color: Color,
    /// Color of rays escaping straight down.
    pub ground_color: Color,
    /// Scalar applied to the gathered sky light.
    pub sky_intensity: Real,
    /// Upper bound on shooting iterations.
    pub max_iterations: usize,
    /// Shooting stops once the brightest unshot energy (R+G+B) drops below this.
    pub convergence_threshold: Real,
    /// Re-bake vertex colors every N iterations while building in the background.
    pub bake_interval: usize,
    /// Also create virtual back-face patches (never baked to the mesh).
    pub two_sided: bool,
    /// Seed for the direction table.
    pub seed: u64,
    /// Number of precomputed unit directions.
    pub direction_table_size: usize,
    /// Grid size used to merge vertex positions when smoothing.
    pub smooth_position_epsilon: Real,
    /// Grid size used to merge vertex normals when smoothing.
    pub smooth_normal_epsilon: Real,
}

impl Default for RadiosityConfig {
    fn default() -> Self {
        Self {
            sky_samples: 32,
            sky_color: Color::WHITE,
            ground_color: Color::rgb(0.99, 0.0, 0.0),
            sky_intensity: 4.0,
            max_iterations: 4096,
            convergence_threshold: 1e-3,
            bake_interval: 1,
            two_sided: false,
            seed: 0x5eed_1ab5,
            direction_table_size: 4096,
            smooth_position_epsilon: 1e-3,
            smooth_normal_epsilon: 0.1,
        }
    }
}

/// Everything the level compiler can be tuned with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BakeConfig {
    pub subdivide: SubdivideConfig,
    pub bsp: BspConfig,
    pub radiosity: RadiosityConfig,
}

fn positive(name: &'static str, value: Real) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_zero(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 { Err(ConfigError::Zero(name)) } else { Ok(()) }
}

impl BakeConfig {
    pub fn with_subdivide(mut self, subdivide: SubdivideConfig) -> Self {
        self.subdivide = subdivide;
        self
    }

    pub fn with_bsp(mut self, bsp: BspConfig) -> Self {
        self.bsp = bsp;
        self
    }

    pub fn with_radiosity(mut self, radiosity: RadiosityConfig) -> Self {
        self.radiosity = radiosity;
        self
    }

    /// Check every tunable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.subdivide;
        positive("subdivide.max_edge", s.max_edge)?;
        positive("subdivide.min_edge", s.min_edge)?;
        if s.min_edge >= s.max_edge {
            return Err(ConfigError::EdgeRange {
                min: s.min_edge,
                max: s.max_edge,
            });
        }

        let b = &self.bsp;
        non_zero("bsp.leaf_size", b.leaf_size)?;
        non_zero("bsp.stride", b.stride)?;
        positive("bsp.classify_epsilon", b.classify_epsilon)?;

        let r = &self.radiosity;
        non_zero("radiosity.sky_samples", r.sky_samples)?;
        non_zero("radiosity.bake_interval", r.bake_interval)?;
        non_zero("radiosity.direction_table_size", r.direction_table_size)?;
        positive("radiosity.convergence_threshold", r.convergence_threshold)?;
        positive("radiosity.smooth_position_epsilon", r.smooth_position_epsilon)?;
        positive("radiosity.smooth_normal_epsilon", r.smooth_normal_epsilon)?;
        if r.sky_intensity < 0.0 || !r.sky_intensity.is_finite() {
            return Err(ConfigError::NonPositive {
                name: "radiosity.sky_intensity",
                value: r.sky_intensity,
            });
        }
        Ok(())
    }
}
