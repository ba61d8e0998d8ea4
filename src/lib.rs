//! A level compiler for static indoor scenes: a triangle soup goes in, a
//! [BSP](mesh::bsp) tree with baked, progressive-refinement **radiosity**
//! vertex lighting comes out.
//!
//! Pipeline: [subdivide](mesh::subdivide) the input into lighting patches,
//! compile them into a [`BspTree`], inject sky light and shoot energy between
//! patches with the tree as visibility oracle ([`Radiosity`]), then bake
//! tone-mapped, smoothed colors into the tree's vertices. A [`Level`] runs all
//! of it on a background thread ([`BackgroundBuild`]) and draws the result
//! back to front through a host-provided [`DrawTarget`].
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - **parallel**: use rayon for sky sampling and energy shooting
//! - **demo**: the `bsp-radiosity` demo binary (installs `simple_logger`)
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]

pub mod build;
pub mod collision;
pub mod config;
pub mod errors;
pub mod float_types;
pub mod level;
pub mod mesh;
pub mod radiosity;
pub mod shapes;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use build::{BackgroundBuild, BuildJob, BuildState, BuildUpdate, BuiltLevel};
pub use config::{BakeConfig, BspConfig, RadiosityConfig, SubdivideConfig};
pub use errors::{BuildError, CollisionError, ConfigError, LevelError};
pub use level::Level;
pub use mesh::bsp::{BspBuilder, BspTree, DebugMode, DrawTarget, NodeId, NodeInfo};
pub use mesh::{Color, Material, MaterialSet, Plane, Side, Triangle, Vertex};
pub use radiosity::{Patch, Radiosity};
