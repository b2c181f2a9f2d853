//! The scene aggregate: cameras, materials, lights, and geometry.
//!
//! A `Scene` is fully constructed by the loader before rendering starts
//! and is shared immutably by every render worker.

use helios_math::{Ray, Vec3};

use crate::mesh::{Mesh, Sphere, Triangle};
use crate::texture::Texture;

/// Surface reflectances and the mirror coefficient.
#[derive(Debug, Clone)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Any nonzero component enables mirror reflection.
    pub mirror: Vec3,
    pub phong_exponent: f64,
}

/// A point light with radiant intensity per channel.
#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Vec3,
}

/// A pinhole camera with a precomputed image-plane frame.
///
/// The frame is derived once from the look-at style description in the
/// scene file; ray generation is then two multiply-adds per pixel.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Top-left corner of the image plane.
    pub top_left: Vec3,
    /// Half a pixel's extent along the image row direction.
    pub half_right: Vec3,
    /// Half a pixel's extent down the image column direction.
    pub half_down: Vec3,
    pub image_width: usize,
    pub image_height: usize,
    /// Output file name declared in the scene.
    pub image_name: String,
}

impl Camera {
    /// Derive the image-plane frame from a look-at description.
    ///
    /// `near_plane` is (left, right, bottom, top) on the plane
    /// `near_distance` along the gaze direction. The up vector is
    /// re-orthogonalized against the gaze.
    #[allow(clippy::too_many_arguments)]
    pub fn from_view(
        position: Vec3,
        gaze: Vec3,
        up: Vec3,
        near_plane: [f64; 4],
        near_distance: f64,
        image_width: usize,
        image_height: usize,
        image_name: String,
    ) -> Self {
        let [left, right, bottom, top] = near_plane;
        let forward = gaze.normalize();
        let right_axis = forward.cross(up).normalize();
        let up_axis = right_axis.cross(forward);

        let center = position + forward * near_distance;
        let top_left = center + right_axis * left + up_axis * top;
        let half_right = right_axis * ((right - left) / (2.0 * image_width as f64));
        let half_down = up_axis * ((bottom - top) / (2.0 * image_height as f64));

        Self {
            position,
            top_left,
            half_right,
            half_down,
            image_width,
            image_height,
            image_name,
        }
    }

    /// Primary ray through the center of pixel (row, col).
    ///
    /// The direction is left unnormalized; everything downstream is
    /// scale-invariant in it.
    pub fn primary_ray(&self, row: usize, col: usize) -> Ray {
        let pixel = self.top_left
            + self.half_right * (2 * col + 1) as f64
            + self.half_down * (2 * row + 1) as f64;
        Ray::new(self.position, pixel - self.position)
    }
}

/// The immutable scene consumed by the renderer.
#[derive(Debug, Clone)]
pub struct Scene {
    pub cameras: Vec<Camera>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub meshes: Vec<Mesh>,
    pub triangles: Vec<Triangle>,
    pub spheres: Vec<Sphere>,
    pub point_lights: Vec<PointLight>,
    /// Emitted verbatim (clipped) for rays that miss everything; 0..255 scale.
    pub background_color: Vec3,
    /// Componentwise multiplier for material ambient reflectance.
    pub ambient_light: Vec3,
    /// Offset along the surface normal for shadow and mirror ray origins.
    pub shadow_ray_epsilon: f64,
    /// Mirror bounce budget; 0 disables reflection.
    pub max_recursion_depth: i32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            cameras: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            meshes: Vec::new(),
            triangles: Vec::new(),
            spheres: Vec::new(),
            point_lights: Vec::new(),
            background_color: Vec3::ZERO,
            ambient_light: Vec3::ZERO,
            shadow_ray_epsilon: 1e-3,
            max_recursion_depth: 0,
        }
    }
}

impl Scene {
    /// Total face count across all meshes, for load-time statistics.
    pub fn total_face_count(&self) -> usize {
        self.meshes.iter().map(Mesh::face_count).sum()
    }
}
