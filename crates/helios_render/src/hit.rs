//! Hit records and per-hit surface capabilities.

use std::f64::consts::PI;

use helios_core::{Scene, Texture};
use helios_math::{Mat4, Ray, Vec2, Vec3, Vec4};

use crate::intersect::barycentrics;

/// The closest intersection found for a ray. Transient per pixel.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Ray parameter, in direction-length units.
    pub t: f64,
    /// Index into `Scene::materials`.
    pub material: usize,
    pub surface: Surface,
}

/// Which primitive produced a hit.
///
/// The variants carry what each primitive kind needs to answer texture
/// queries later in shading: meshes their face, spheres their index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    MeshFace { mesh: usize, face: usize },
    Triangle { index: usize },
    Sphere { index: usize },
}

impl Surface {
    /// Texture index of the primitive that produced the hit, if any.
    pub fn texture<'s>(&self, scene: &'s Scene) -> Option<&'s Texture> {
        let index = match *self {
            Surface::MeshFace { mesh, .. } => scene.meshes[mesh].texture,
            Surface::Triangle { index } => scene.triangles[index].texture,
            Surface::Sphere { index } => scene.spheres[index].texture,
        }?;
        Some(&scene.textures[index])
    }

    /// Texture-space coordinates at the hit.
    ///
    /// Triangles re-derive (beta, gamma) from the ray and interpolate the
    /// vertex UVs. Spheres transform the hit point into their local frame
    /// and map spherical angles to (U, V).
    pub fn uv(&self, scene: &Scene, ray: &Ray, point: Vec3) -> Vec2 {
        match *self {
            Surface::MeshFace { mesh, face } => face_uv(ray, &scene.meshes[mesh].faces[face]),
            Surface::Triangle { index } => face_uv(ray, &scene.triangles[index].face),
            Surface::Sphere { index } => {
                let sphere = &scene.spheres[index];
                let basis = Mat4::from_cols(
                    Vec4::new(sphere.u.x, sphere.v.x, sphere.w.x, 0.0),
                    Vec4::new(sphere.u.y, sphere.v.y, sphere.w.y, 0.0),
                    Vec4::new(sphere.u.z, sphere.v.z, sphere.w.z, 0.0),
                    Vec4::W,
                );
                let to_local = basis * Mat4::from_translation(-sphere.center);
                let local = to_local.transform_point3(point);

                let theta = (local.y / sphere.radius).clamp(-1.0, 1.0).acos();
                let phi = local.z.atan2(local.x);
                Vec2::new((PI - phi) / (2.0 * PI), theta / PI)
            }
        }
    }
}

fn face_uv(ray: &Ray, face: &helios_core::Face) -> Vec2 {
    match barycentrics(ray, face) {
        Some((_, beta, gamma)) => {
            face.v0.uv * (1.0 - beta - gamma) + face.v1.uv * beta + face.v2.uv * gamma
        }
        None => face.v0.uv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_core::{Face, Sphere, Triangle, Vertex};

    fn uv_triangle() -> Face {
        Face::new(
            Vertex::new(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.0, 1.0)),
        )
    }

    #[test]
    fn test_triangle_uv_interpolation() {
        let mut scene = Scene::default();
        scene.triangles.push(Triangle {
            face: uv_triangle(),
            material: 0,
            texture: None,
        });

        let ray = Ray::new(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let surface = Surface::Triangle { index: 0 };
        let uv = surface.uv(&scene, &ray, Vec3::new(0.25, 0.25, 0.0));
        assert!((uv - Vec2::new(0.25, 0.25)).length() < 1e-12);
    }

    #[test]
    fn test_triangle_uv_vertices() {
        let mut scene = Scene::default();
        scene.triangles.push(Triangle {
            face: uv_triangle(),
            material: 0,
            texture: None,
        });
        let surface = Surface::Triangle { index: 0 };

        // A ray through v1 lands on uv1
        let ray = Ray::new(Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let uv = surface.uv(&scene, &ray, Vec3::new(1.0, 0.0, 0.0));
        assert!((uv - Vec2::new(1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_sphere_uv_poles_and_equator() {
        let mut scene = Scene::default();
        scene.spheres.push(Sphere::new(Vec3::ZERO, 1.0, 0, None));
        let surface = Surface::Sphere { index: 0 };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));

        // North pole of the v axis: theta = 0
        let uv = surface.uv(&scene, &ray, Vec3::new(0.0, 1.0, 0.0));
        assert!(uv.y.abs() < 1e-12);

        // South pole: theta = pi
        let uv = surface.uv(&scene, &ray, Vec3::new(0.0, -1.0, 0.0));
        assert!((uv.y - 1.0).abs() < 1e-12);

        // On the equator along +x: phi = 0, so U = 1/2
        let uv = surface.uv(&scene, &ray, Vec3::new(1.0, 0.0, 0.0));
        assert!((uv.x - 0.5).abs() < 1e-12);
        assert!((uv.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_uv_translated_center() {
        let mut scene = Scene::default();
        scene.spheres.push(Sphere::new(Vec3::new(3.0, 2.0, 1.0), 2.0, 0, None));
        let surface = Surface::Sphere { index: 0 };
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        // Same local point as the unit sphere's +y pole
        let uv = surface.uv(&scene, &ray, Vec3::new(3.0, 4.0, 1.0));
        assert!(uv.y.abs() < 1e-12);
    }

    #[test]
    fn test_surface_texture_lookup() {
        use helios_core::{DecalMode, FilterMode, Texture, WrapMode};

        let mut scene = Scene::default();
        scene.textures.push(Texture {
            image: vec![9, 9, 9],
            width: 1,
            height: 1,
            wrap: WrapMode::Repeat,
            filter: FilterMode::Nearest,
            decal: DecalMode::ReplaceKd,
        });
        scene.spheres.push(Sphere::new(Vec3::ZERO, 1.0, 0, Some(0)));
        scene.triangles.push(Triangle {
            face: uv_triangle(),
            material: 0,
            texture: None,
        });

        assert!(Surface::Sphere { index: 0 }.texture(&scene).is_some());
        assert!(Surface::Triangle { index: 0 }.texture(&scene).is_none());
    }
}
