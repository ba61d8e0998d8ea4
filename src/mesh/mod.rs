//! Level geometry: vertices, triangles, materials, planes, subdivision and the BSP tree.

pub mod bsp;
pub mod material;
pub mod plane;
pub mod subdivide;
pub mod triangle;
pub mod vertex;

pub use material::{Color, Material, MaterialSet};
pub use plane::{Plane, Side};
pub use triangle::Triangle;
pub use vertex::Vertex;
