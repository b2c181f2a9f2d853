//! Blinn-Phong shading with shadows and mirror recursion.

use helios_core::{DecalMode, Material, PointLight, Scene, Texture};
use helios_math::{Ray, Vec2, Vec3};

use crate::hit::Hit;
use crate::intersect::closest_hit;
use crate::sampler;

/// One shaded pixel, R,G,B.
pub type Rgb = [u8; 3];

/// Trace `ray` into the scene and return its shaded color.
///
/// `depth` is the remaining mirror-bounce budget; a call below zero
/// yields black, so a scene with recursion depth D performs at most
/// D + 1 shading passes per primary ray. Rays that escape the scene
/// produce the background color, clipped verbatim.
pub fn shade(scene: &Scene, ray: &Ray, depth: i32) -> Rgb {
    if depth < 0 {
        return [0, 0, 0];
    }
    let Some(hit) = closest_hit(ray, scene) else {
        return clip(scene.background_color);
    };
    let material = &scene.materials[hit.material];

    let mut color = material.ambient * scene.ambient_light;

    // A replace_all texture is emitted unlit, on the 0..255 scale
    if let Some((texture, uv)) = surface_texture(scene, ray, &hit) {
        if texture.decal == DecalMode::ReplaceAll {
            color += sampler::sample(texture, uv);
        }
    }

    for light in &scene.point_lights {
        if occluded(scene, &hit, light) {
            continue;
        }
        color += specular(ray, &hit, material, light);
        color += diffuse(scene, ray, &hit, material, light);
    }

    if material.mirror != Vec3::ZERO {
        let to_source = (ray.origin - hit.point).normalize();
        let reflected = Ray::new(
            hit.point + hit.normal * scene.shadow_ray_epsilon,
            hit.normal * 2.0 * hit.normal.dot(to_source) - to_source,
        );
        let bounce = shade(scene, &reflected, depth - 1);
        color += material.mirror
            * Vec3::new(bounce[0] as f64, bounce[1] as f64, bounce[2] as f64);
    }

    clip(color)
}

/// Round and clip an accumulated color to one byte per channel.
fn clip(color: Vec3) -> Rgb {
    let clip_channel = |x: f64| x.round().clamp(0.0, 255.0) as u8;
    [
        clip_channel(color.x),
        clip_channel(color.y),
        clip_channel(color.z),
    ]
}

/// The hit surface's texture and UV, if it has one.
fn surface_texture<'s>(scene: &'s Scene, ray: &Ray, hit: &Hit) -> Option<(&'s Texture, Vec2)> {
    let texture = hit.surface.texture(scene)?;
    Some((texture, hit.surface.uv(scene, ray, hit.point)))
}

/// Whether `light` is blocked before reaching the hit point.
///
/// The shadow ray starts epsilon along the normal; the blocker must be
/// strictly nearer to the shaded point than the light is.
fn occluded(scene: &Scene, hit: &Hit, light: &PointLight) -> bool {
    let to_light = light.position - hit.point;
    let shadow_ray = Ray::new(hit.point + hit.normal * scene.shadow_ray_epsilon, to_light);
    match closest_hit(&shadow_ray, scene) {
        Some(blocker) => (blocker.point - hit.point).length_squared() < to_light.length_squared(),
        None => false,
    }
}

/// Blinn-Phong specular term with half-vector form.
fn specular(ray: &Ray, hit: &Hit, material: &Material, light: &PointLight) -> Vec3 {
    let to_source = (ray.origin - hit.point).normalize();
    let to_light = light.position - hit.point;
    let distance_squared = to_light.length_squared();
    let half = (to_source + to_light.normalize()).normalize();

    // The base is clamped so non-integer exponents stay defined
    let s = half.dot(hit.normal).max(0.0).powf(material.phong_exponent);
    material.specular * s * light.intensity / distance_squared
}

/// Diffuse term, with the coefficient modulated by the surface texture.
fn diffuse(scene: &Scene, ray: &Ray, hit: &Hit, material: &Material, light: &PointLight) -> Vec3 {
    let kd = match surface_texture(scene, ray, hit) {
        Some((texture, uv)) => match texture.decal {
            // Already emitted unlit; no diffuse response
            DecalMode::ReplaceAll => return Vec3::ZERO,
            DecalMode::ReplaceKd => sampler::sample(texture, uv) / 255.0,
            DecalMode::BlendKd => (sampler::sample(texture, uv) / 255.0 + material.diffuse) / 2.0,
        },
        None => material.diffuse,
    };

    let to_light = light.position - hit.point;
    let distance_squared = to_light.length_squared();
    let cosine = to_light.normalize().dot(hit.normal).max(0.0);
    kd * cosine * light.intensity / distance_squared
}
