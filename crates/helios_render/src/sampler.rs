//! Texture sampling: UV addressing and texel filtering.

use helios_core::{FilterMode, Texture, WrapMode};
use helios_math::{Vec2, Vec3};

/// Sample `texture` at `uv`, returning a color with channels in 0..255.
///
/// Repeat wrapping takes the true fractional part so tiling stays
/// continuous for negative coordinates; clamp pins UV to [0, 1]. The UV
/// is then scaled to pixel coordinates and rounded; bilinear filtering
/// blends the rounded address with its +1 neighbors, which the texel
/// accessor clamps back inside the image at the borders.
pub fn sample(texture: &Texture, uv: Vec2) -> Vec3 {
    let (u, v) = match texture.wrap {
        WrapMode::Repeat => (uv.x - uv.x.floor(), uv.y - uv.y.floor()),
        WrapMode::Clamp => (uv.x.clamp(0.0, 1.0), uv.y.clamp(0.0, 1.0)),
    };

    let x = u * texture.width as f64;
    let y = v * texture.height as f64;
    let px = x.round();
    let py = y.round();

    match texture.filter {
        FilterMode::Nearest => texture.texel(px as i64, py as i64),
        FilterMode::Bilinear => {
            let dx = x - px;
            let dy = y - py;
            let (px, py) = (px as i64, py as i64);
            texture.texel(px, py) * ((1.0 - dx) * (1.0 - dy))
                + texture.texel(px + 1, py) * (dx * (1.0 - dy))
                + texture.texel(px, py + 1) * ((1.0 - dx) * dy)
                + texture.texel(px + 1, py + 1) * (dx * dy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helios_core::DecalMode;

    fn texture(width: usize, height: usize, wrap: WrapMode, filter: FilterMode) -> Texture {
        // Channel pattern: R = 10*x, G = 10*y, B = 0
        let mut image = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                image.extend_from_slice(&[(10 * x) as u8, (10 * y) as u8, 0]);
            }
        }
        Texture {
            image,
            width,
            height,
            wrap,
            filter,
            decal: DecalMode::ReplaceKd,
        }
    }

    #[test]
    fn test_nearest_rounds_to_pixel() {
        let tex = texture(4, 4, WrapMode::Clamp, FilterMode::Nearest);
        // U = 0.3 scales to x = 1.2, rounding to pixel 1
        let color = sample(&tex, Vec2::new(0.3, 0.0));
        assert_eq!(color, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_repeat_wraps_fractional_part() {
        let tex = texture(4, 4, WrapMode::Repeat, FilterMode::Nearest);
        let base = sample(&tex, Vec2::new(0.3, 0.55));
        assert_eq!(sample(&tex, Vec2::new(2.3, 1.55)), base);
        // Negative UV keeps tiling continuous: -0.7 wraps to 0.3
        assert_eq!(sample(&tex, Vec2::new(-0.7, -1.45)), base);
    }

    #[test]
    fn test_clamp_pins_uv_to_unit_interval() {
        let tex = texture(4, 4, WrapMode::Clamp, FilterMode::Nearest);
        assert_eq!(sample(&tex, Vec2::new(7.0, 0.0)), sample(&tex, Vec2::new(1.0, 0.0)));
        assert_eq!(sample(&tex, Vec2::new(-3.0, 0.0)), sample(&tex, Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn test_bilinear_blends_neighbors() {
        let tex = texture(4, 4, WrapMode::Clamp, FilterMode::Bilinear);
        // U = 0.375 scales to x = 1.5, rounding to 2 with dx = -0.5:
        // the blend of columns 2 and 3 with weights 1.5 and -0.5 lands
        // between the two texel rows of the gradient
        let color = sample(&tex, Vec2::new(0.375, 0.0));
        let expected = 1.5 * 20.0 - 0.5 * 30.0;
        assert!((color.x - expected).abs() < 1e-9);
        assert_eq!(color.y, 0.0);
    }

    #[test]
    fn test_bilinear_at_exact_pixel() {
        let tex = texture(4, 4, WrapMode::Clamp, FilterMode::Bilinear);
        // x = 2.0 exactly: dx = 0 and the blend collapses to one texel
        let color = sample(&tex, Vec2::new(0.5, 0.0));
        assert_eq!(color, Vec3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn test_bilinear_border_neighbors_clamp() {
        let tex = texture(4, 4, WrapMode::Clamp, FilterMode::Bilinear);
        // U = V = 1 addresses pixel (4, 4); every neighbor clamps to (3, 3)
        let color = sample(&tex, Vec2::new(1.0, 1.0));
        assert_eq!(color, Vec3::new(30.0, 30.0, 0.0));
    }

    #[test]
    fn test_sampling_is_idempotent() {
        let tex = texture(8, 8, WrapMode::Repeat, FilterMode::Bilinear);
        let uv = Vec2::new(0.123, 4.567);
        assert_eq!(sample(&tex, uv), sample(&tex, uv));
    }
}
