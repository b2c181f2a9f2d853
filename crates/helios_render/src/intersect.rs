//! Ray/primitive intersection and closest-hit queries.
//!
//! Triangles are solved with Cramer's rule so the same solver yields
//! both the hit test and the barycentrics needed for UV interpolation.
//! Mesh queries walk the precomputed BVH; the scene query folds meshes,
//! free triangles, and spheres in that order with a strict `t <`
//! comparison, so exact ties go to the earliest-tested primitive.

use helios_core::{BvhNode, Face, Mesh, Scene, Sphere};
use helios_math::{Mat3, Ray};

use crate::hit::{Hit, Surface};

/// Solve the triangle system for (t, beta, gamma) by Cramer's rule on
/// the matrix with columns (a-b, a-c, d). A zero determinant (degenerate
/// or edge-on triangle) yields `None`.
pub(crate) fn barycentrics(ray: &Ray, face: &Face) -> Option<(f64, f64, f64)> {
    let a = face.v0.position;
    let b = face.v1.position;
    let c = face.v2.position;

    let det = Mat3::from_cols(a - b, a - c, ray.direction).determinant();
    if det == 0.0 {
        return None;
    }

    let rhs = a - ray.origin;
    let beta = Mat3::from_cols(rhs, a - c, ray.direction).determinant() / det;
    let gamma = Mat3::from_cols(a - b, rhs, ray.direction).determinant() / det;
    let t = Mat3::from_cols(a - b, a - c, rhs).determinant() / det;
    Some((t, beta, gamma))
}

/// Ray/triangle intersection. Returns the ray parameter when the hit
/// lies inside the triangle (edges included) and in front of the origin.
pub fn intersect_face(ray: &Ray, face: &Face) -> Option<f64> {
    let (t, beta, gamma) = barycentrics(ray, face)?;
    (beta >= 0.0 && gamma >= 0.0 && beta + gamma <= 1.0 && t > 0.0).then_some(t)
}

/// Ray/sphere intersection. Returns the smaller positive root, falling
/// back to the larger one when the origin is inside the sphere.
pub fn intersect_sphere(ray: &Ray, sphere: &Sphere) -> Option<f64> {
    if sphere.radius <= 0.0 {
        return None;
    }

    let oc = ray.origin - sphere.center;
    let a = ray.direction.length_squared();
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.length_squared() - sphere.radius * sphere.radius;

    let delta = b * b - 4.0 * a * c;
    if delta < 0.0 {
        return None;
    }

    let sqrt_delta = delta.sqrt();
    let near = (-b - sqrt_delta) / (2.0 * a);
    let far = (-b + sqrt_delta) / (2.0 * a);
    let t = if near > 0.0 { near } else { far };
    (t > 0.0).then_some(t)
}

/// Closest hit within one mesh: recursive BVH descent returning the
/// minimal ray parameter and the face that produced it.
fn traverse_mesh(ray: &Ray, node: &BvhNode, mesh: &Mesh) -> Option<(f64, usize)> {
    if !node.bbox().hit(ray) {
        return None;
    }
    match node {
        BvhNode::Leaf { faces, .. } => {
            let mut best: Option<(f64, usize)> = None;
            for index in faces.clone() {
                if let Some(t) = intersect_face(ray, &mesh.faces[index]) {
                    if best.map_or(true, |(closest, _)| t < closest) {
                        best = Some((t, index));
                    }
                }
            }
            best
        }
        BvhNode::Interior { left, right, .. } => {
            // Both children are visited unconditionally; the nearer hit wins
            match (traverse_mesh(ray, left, mesh), traverse_mesh(ray, right, mesh)) {
                (Some(l), Some(r)) => Some(if l.0 < r.0 { l } else { r }),
                (left_hit, right_hit) => left_hit.or(right_hit),
            }
        }
    }
}

/// Closest hit across the whole scene, or `None` if the ray escapes.
pub fn closest_hit(ray: &Ray, scene: &Scene) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    let closer = |best: &Option<Hit>, t: f64| best.as_ref().map_or(true, |hit| t < hit.t);

    for (mesh_index, mesh) in scene.meshes.iter().enumerate() {
        let Some(root) = &mesh.bvh else { continue };
        if let Some((t, face_index)) = traverse_mesh(ray, root, mesh) {
            if closer(&best, t) {
                best = Some(Hit {
                    point: ray.at(t),
                    normal: mesh.faces[face_index].normal,
                    t,
                    material: mesh.material,
                    surface: Surface::MeshFace {
                        mesh: mesh_index,
                        face: face_index,
                    },
                });
            }
        }
    }

    for (index, triangle) in scene.triangles.iter().enumerate() {
        if let Some(t) = intersect_face(ray, &triangle.face) {
            if closer(&best, t) {
                best = Some(Hit {
                    point: ray.at(t),
                    normal: triangle.face.normal,
                    t,
                    material: triangle.material,
                    surface: Surface::Triangle { index },
                });
            }
        }
    }

    for (index, sphere) in scene.spheres.iter().enumerate() {
        if let Some(t) = intersect_sphere(ray, sphere) {
            if closer(&best, t) {
                let point = ray.at(t);
                best = Some(Hit {
                    point,
                    normal: (point - sphere.center).normalize(),
                    t,
                    material: sphere.material,
                    surface: Surface::Sphere { index },
                });
            }
        }
    }

    best
}
