//! Texture images and their sampling parameters.
//!
//! Textures are decoded to 8-bit RGB at load time and stored as a flat
//! row-major byte array. How a texture is addressed, filtered, and
//! blended into the shading result is fixed per texture by the three
//! enums below; the renderer's sampler interprets them.

use std::path::Path;

use helios_math::Vec3;
use thiserror::Error;

/// Errors that can occur while loading texture images or parsing their
/// sampling parameters.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("texture {id}: unknown {field} value '{value}'")]
    UnknownMode {
        id: usize,
        field: &'static str,
        value: String,
    },
}

/// How UV coordinates outside [0, 1] are mapped back into the image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    Clamp,
}

impl WrapMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "repeat" => Some(WrapMode::Repeat),
            "clamp" => Some(WrapMode::Clamp),
            _ => None,
        }
    }
}

/// Texel filtering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Bilinear,
}

impl FilterMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "nearest" => Some(FilterMode::Nearest),
            "bilinear" => Some(FilterMode::Bilinear),
            _ => None,
        }
    }
}

/// How the sampled color combines with the material's diffuse term.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecalMode {
    /// Sampled color (scaled to 0..1) replaces the diffuse coefficient.
    ReplaceKd,
    /// Average of the sampled color (0..1) and the diffuse coefficient.
    BlendKd,
    /// Sampled color is emitted unlit; no diffuse contribution.
    ReplaceAll,
}

impl DecalMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "replace_kd" => Some(DecalMode::ReplaceKd),
            "blend_kd" => Some(DecalMode::BlendKd),
            "replace_all" => Some(DecalMode::ReplaceAll),
            _ => None,
        }
    }
}

/// A loaded texture with pixel data.
#[derive(Debug, Clone)]
pub struct Texture {
    /// Pixel data as H*W*3 bytes, row-major, R,G,B per pixel.
    pub image: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub wrap: WrapMode,
    pub filter: FilterMode,
    pub decal: DecalMode,
}

impl Texture {
    /// Load a texture image from disk, decoding to 8-bit RGB.
    pub fn from_file(
        path: &Path,
        wrap: WrapMode,
        filter: FilterMode,
        decal: DecalMode,
    ) -> Result<Self, TextureError> {
        let image = image::open(path)?.to_rgb8();
        let (width, height) = image.dimensions();

        log::debug!("loaded texture {} ({}x{})", path.display(), width, height);

        Ok(Self {
            image: image.into_raw(),
            width: width as usize,
            height: height as usize,
            wrap,
            filter,
            decal,
        })
    }

    /// Fetch the texel at integer coordinates, clamped to the image.
    ///
    /// Filtering rounds UV to pixel addresses and reads up to one texel
    /// past the address, so out-of-range coordinates silently clamp to
    /// the border.
    pub fn texel(&self, x: i64, y: i64) -> Vec3 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let i = 3 * (y * self.width + x);
        Vec3::new(
            self.image[i] as f64,
            self.image[i + 1] as f64,
            self.image[i + 2] as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Texture {
        // Row 0: red, green; row 1: blue, white
        Texture {
            image: vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
            width: 2,
            height: 2,
            wrap: WrapMode::Repeat,
            filter: FilterMode::Nearest,
            decal: DecalMode::ReplaceKd,
        }
    }

    #[test]
    fn test_texel_lookup() {
        let tex = two_by_two();
        assert_eq!(tex.texel(0, 0), Vec3::new(255.0, 0.0, 0.0));
        assert_eq!(tex.texel(1, 0), Vec3::new(0.0, 255.0, 0.0));
        assert_eq!(tex.texel(0, 1), Vec3::new(0.0, 0.0, 255.0));
        assert_eq!(tex.texel(1, 1), Vec3::new(255.0, 255.0, 255.0));
    }

    #[test]
    fn test_texel_clamps_to_border() {
        let tex = two_by_two();
        assert_eq!(tex.texel(2, 0), tex.texel(1, 0));
        assert_eq!(tex.texel(0, 5), tex.texel(0, 1));
        assert_eq!(tex.texel(-1, -1), tex.texel(0, 0));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(WrapMode::parse("repeat"), Some(WrapMode::Repeat));
        assert_eq!(WrapMode::parse("clamp"), Some(WrapMode::Clamp));
        assert_eq!(WrapMode::parse("mirror"), None);

        assert_eq!(FilterMode::parse("nearest"), Some(FilterMode::Nearest));
        assert_eq!(FilterMode::parse("bilinear"), Some(FilterMode::Bilinear));
        assert_eq!(FilterMode::parse("cubic"), None);

        assert_eq!(DecalMode::parse("replace_kd"), Some(DecalMode::ReplaceKd));
        assert_eq!(DecalMode::parse("blend_kd"), Some(DecalMode::BlendKd));
        assert_eq!(DecalMode::parse("replace_all"), Some(DecalMode::ReplaceAll));
        assert_eq!(DecalMode::parse("modulate"), None);
    }

    #[test]
    fn test_unknown_mode_error_names_texture_and_field() {
        let err = TextureError::UnknownMode {
            id: 2,
            field: "DecalMode",
            value: "modulate".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("texture 2"));
        assert!(message.contains("DecalMode"));
        assert!(message.contains("modulate"));
    }
}
