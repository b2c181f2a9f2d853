//! Scene representation and loading for the helios ray tracer.
//!
//! This crate owns everything that exists before the first ray is cast:
//! the immutable scene aggregate (geometry, materials, lights, textures,
//! cameras), the XML scene loader, and per-mesh BVH construction. The
//! renderer consumes a fully built [`Scene`] and never mutates it.

mod bvh;
pub mod loader;
mod mesh;
mod scene;
mod texture;

pub use bvh::{build as build_bvh, BvhNode};
pub use mesh::{Face, Mesh, Sphere, Triangle, Vertex};
pub use scene::{Camera, Material, PointLight, Scene};
pub use texture::{DecalMode, FilterMode, Texture, TextureError, WrapMode};
