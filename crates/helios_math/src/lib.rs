// Double-precision math types, re-exported from glam
pub use glam::{DMat3 as Mat3, DMat4 as Mat4, DVec2 as Vec2, DVec3 as Vec3, DVec4 as Vec4};

mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::Ray;
