//! Geometric primitives: faces, meshes, free triangles, spheres.

use helios_math::{Aabb, Vec2, Vec3};

use crate::bvh::{self, BvhNode};

/// A vertex with position and texture coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position, uv }
    }
}

/// A triangle face with a precomputed normal.
///
/// The normal is unit length and consistent with CCW winding of
/// (v0, v1, v2); a degenerate face gets a zero normal and never
/// intersects (its determinant is zero).
#[derive(Debug, Copy, Clone)]
pub struct Face {
    pub v0: Vertex,
    pub v1: Vertex,
    pub v2: Vertex,
    pub normal: Vec3,
}

impl Face {
    /// Create a face from three vertices, computing the normal.
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        let normal = (v1.position - v0.position)
            .cross(v2.position - v0.position)
            .normalize_or_zero();
        Self { v0, v1, v2, normal }
    }

    /// Bounding box over the three vertices.
    pub fn bbox(&self) -> Aabb {
        let mut bbox = Aabb::from_points(self.v0.position, self.v1.position);
        bbox.grow(self.v2.position);
        bbox
    }

    /// Centroid of the three vertices, used for BVH partitioning.
    pub fn centroid(&self) -> Vec3 {
        (self.v0.position + self.v1.position + self.v2.position) / 3.0
    }
}

/// A triangle mesh with one material, an optional texture, and a BVH
/// over its faces.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Faces, reordered at construction so BVH leaf ranges are contiguous.
    pub faces: Vec<Face>,
    /// Index into `Scene::materials`.
    pub material: usize,
    /// Index into `Scene::textures`.
    pub texture: Option<usize>,
    /// Root BVH node; `None` for an empty mesh.
    pub bvh: Option<BvhNode>,
}

impl Mesh {
    /// Create a mesh and build its BVH.
    pub fn new(mut faces: Vec<Face>, material: usize, texture: Option<usize>) -> Self {
        let bvh = bvh::build(&mut faces);
        Self {
            faces,
            material,
            texture,
            bvh,
        }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// A free-standing triangle.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub face: Face,
    pub material: usize,
    pub texture: Option<usize>,
}

/// A sphere with a local orthonormal frame for UV mapping.
#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    pub material: usize,
    pub texture: Option<usize>,
    /// Local frame (u, v, w); v is the polar axis of the UV mapping.
    pub u: Vec3,
    pub v: Vec3,
    pub w: Vec3,
}

impl Sphere {
    /// Create a sphere with the world axes as its local frame.
    pub fn new(center: Vec3, radius: f64, material: usize, texture: Option<usize>) -> Self {
        Self {
            center,
            radius,
            material,
            texture,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
        }
    }
}
