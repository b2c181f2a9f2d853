//! XML scene loading.
//!
//! Reads a scene description, resolves the file's 1-based material and
//! texture ids into plain indices, derives each camera's image-plane
//! frame, decodes texture images, and builds every mesh's BVH. The
//! renderer receives a [`Scene`] with nothing left to validate.

pub mod xml;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use helios_math::{Vec2, Vec3};
use thiserror::Error;

use crate::mesh::{Face, Mesh, Sphere, Triangle, Vertex};
use crate::scene::{Camera, Material, PointLight, Scene};
use crate::texture::{DecalMode, FilterMode, Texture, TextureError, WrapMode};
use xml::{Element, XmlError};

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    #[error("texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("root element must be <Scene>, found <{0}>")]
    BadRoot(String),

    #[error("missing <{element}> in <{parent}>")]
    MissingElement { parent: String, element: String },

    #[error("invalid value '{value}' in <{element}>")]
    InvalidValue { element: String, value: String },

    #[error("<{element}> holds {found} values, expected {expected}")]
    WrongArity {
        element: String,
        expected: usize,
        found: usize,
    },

    #[error("{kind} id {id} out of range (scene has {count})")]
    BadReference {
        kind: &'static str,
        id: usize,
        count: usize,
    },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a scene from an XML file.
///
/// Texture image paths resolve relative to the scene file's directory.
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<Scene> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let scene = parse_scene(&content, base_dir)?;

    log::info!(
        "loaded {}: {} meshes ({} faces), {} triangles, {} spheres, {} lights, {} cameras",
        path.display(),
        scene.meshes.len(),
        scene.total_face_count(),
        scene.triangles.len(),
        scene.spheres.len(),
        scene.point_lights.len(),
        scene.cameras.len(),
    );

    Ok(scene)
}

/// Build a scene from XML text; texture paths resolve against `base_dir`.
pub fn parse_scene(content: &str, base_dir: &Path) -> LoadResult<Scene> {
    let root = xml::parse(content)?;
    if root.name != "Scene" {
        return Err(LoadError::BadRoot(root.name));
    }

    let mut scene = Scene::default();
    if let Some(element) = root.child("BackgroundColor") {
        scene.background_color = vec3_text(element)?;
    }
    if let Some(element) = root.child("ShadowRayEpsilon") {
        scene.shadow_ray_epsilon = scalar(element)?;
    }
    if let Some(element) = root.child("MaxRecursionDepth") {
        scene.max_recursion_depth = scalar(element)?;
    }

    if let Some(cameras) = root.child("Cameras") {
        for element in cameras.children_named("Camera") {
            scene.cameras.push(parse_camera(element)?);
        }
    }

    if let Some(lights) = root.child("Lights") {
        if let Some(element) = lights.child("AmbientLight") {
            scene.ambient_light = vec3_text(element)?;
        }
        for element in lights.children_named("PointLight") {
            scene.point_lights.push(PointLight {
                position: vec3_text(required(element, "Position")?)?,
                intensity: vec3_text(required(element, "Intensity")?)?,
            });
        }
    }

    if let Some(materials) = root.child("Materials") {
        for element in materials.children_named("Material") {
            scene.materials.push(parse_material(element)?);
        }
    }

    if let Some(textures) = root.child("Textures") {
        for (index, element) in textures.children_named("Texture").enumerate() {
            scene.textures.push(parse_texture(element, index + 1, base_dir)?);
        }
    }

    let positions = match root.child("VertexData") {
        Some(element) => vec3_list(element)?,
        None => Vec::new(),
    };
    let tex_coords = match root.child("TexCoordData") {
        Some(element) => vec2_list(element)?,
        None => Vec::new(),
    };

    // Scene-file vertex references are 1-based; UVs pad with zero when
    // TexCoordData is absent or short.
    let vertex_at = |id: usize| -> LoadResult<Vertex> {
        let index = id
            .checked_sub(1)
            .filter(|&index| index < positions.len())
            .ok_or(LoadError::BadReference {
                kind: "vertex",
                id,
                count: positions.len(),
            })?;
        let uv = tex_coords.get(index).copied().unwrap_or(Vec2::ZERO);
        Ok(Vertex::new(positions[index], uv))
    };

    if let Some(objects) = root.child("Objects") {
        for element in objects.children_named("Mesh") {
            let material = material_ref(element, scene.materials.len())?;
            let texture = texture_ref(element, scene.textures.len())?;
            let indices: Vec<usize> = values(required(element, "Faces")?)?;
            if indices.len() % 3 != 0 {
                return Err(LoadError::WrongArity {
                    element: "Faces".to_string(),
                    expected: (indices.len() / 3 + 1) * 3,
                    found: indices.len(),
                });
            }
            let mut faces = Vec::with_capacity(indices.len() / 3);
            for triple in indices.chunks_exact(3) {
                faces.push(Face::new(
                    vertex_at(triple[0])?,
                    vertex_at(triple[1])?,
                    vertex_at(triple[2])?,
                ));
            }
            scene.meshes.push(Mesh::new(faces, material, texture));
        }

        for element in objects.children_named("Triangle") {
            let material = material_ref(element, scene.materials.len())?;
            let texture = texture_ref(element, scene.textures.len())?;
            let indices: Vec<usize> = values(required(element, "Indices")?)?;
            if indices.len() != 3 {
                return Err(LoadError::WrongArity {
                    element: "Indices".to_string(),
                    expected: 3,
                    found: indices.len(),
                });
            }
            scene.triangles.push(Triangle {
                face: Face::new(vertex_at(indices[0])?, vertex_at(indices[1])?, vertex_at(indices[2])?),
                material,
                texture,
            });
        }

        for element in objects.children_named("Sphere") {
            let material = material_ref(element, scene.materials.len())?;
            let texture = texture_ref(element, scene.textures.len())?;
            let center_id: usize = scalar(required(element, "Center")?)?;
            scene.spheres.push(Sphere::new(
                vertex_at(center_id)?.position,
                scalar(required(element, "Radius")?)?,
                material,
                texture,
            ));
        }
    }

    Ok(scene)
}

fn parse_camera(element: &Element) -> LoadResult<Camera> {
    let near_plane: Vec<f64> = values(required(element, "NearPlane")?)?;
    if near_plane.len() != 4 {
        return Err(LoadError::WrongArity {
            element: "NearPlane".to_string(),
            expected: 4,
            found: near_plane.len(),
        });
    }
    let resolution: Vec<usize> = values(required(element, "ImageResolution")?)?;
    if resolution.len() != 2 {
        return Err(LoadError::WrongArity {
            element: "ImageResolution".to_string(),
            expected: 2,
            found: resolution.len(),
        });
    }

    Ok(Camera::from_view(
        vec3_text(required(element, "Position")?)?,
        vec3_text(required(element, "Gaze")?)?,
        vec3_text(required(element, "Up")?)?,
        [near_plane[0], near_plane[1], near_plane[2], near_plane[3]],
        scalar(required(element, "NearDistance")?)?,
        resolution[0],
        resolution[1],
        required(element, "ImageName")?.text.trim().to_string(),
    ))
}

fn parse_material(element: &Element) -> LoadResult<Material> {
    Ok(Material {
        ambient: vec3_text(required(element, "AmbientReflectance")?)?,
        diffuse: vec3_text(required(element, "DiffuseReflectance")?)?,
        specular: vec3_text(required(element, "SpecularReflectance")?)?,
        mirror: match element.child("MirrorReflectance") {
            Some(child) => vec3_text(child)?,
            None => Vec3::ZERO,
        },
        phong_exponent: match element.child("PhongExponent") {
            Some(child) => scalar(child)?,
            None => 1.0,
        },
    })
}

fn parse_texture(element: &Element, id: usize, base_dir: &Path) -> LoadResult<Texture> {
    let wrap = texture_mode(element, id, "Appearance", WrapMode::parse, WrapMode::Repeat)?;
    let filter = texture_mode(element, id, "Interpolation", FilterMode::parse, FilterMode::Nearest)?;
    let decal = texture_mode(element, id, "DecalMode", DecalMode::parse, DecalMode::ReplaceKd)?;

    let image_name = required(element, "ImageName")?.text.trim().to_string();
    let texture = Texture::from_file(&base_dir.join(image_name), wrap, filter, decal)?;
    Ok(texture)
}

/// Parse one of a texture's mode fields, defaulting when the element is
/// absent and failing on unrecognized values.
fn texture_mode<T>(
    element: &Element,
    id: usize,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
    default: T,
) -> LoadResult<T> {
    match element.child(field) {
        None => Ok(default),
        Some(child) => {
            let value = child.text.trim();
            parse(value).ok_or_else(|| {
                TextureError::UnknownMode {
                    id,
                    field,
                    value: value.to_string(),
                }
                .into()
            })
        }
    }
}

fn material_ref(element: &Element, count: usize) -> LoadResult<usize> {
    let id: usize = scalar(required(element, "Material")?)?;
    id.checked_sub(1)
        .filter(|&index| index < count)
        .ok_or(LoadError::BadReference {
            kind: "material",
            id,
            count,
        })
}

fn texture_ref(element: &Element, count: usize) -> LoadResult<Option<usize>> {
    let Some(child) = element.child("Texture") else {
        return Ok(None);
    };
    let id: usize = scalar(child)?;
    id.checked_sub(1)
        .filter(|&index| index < count)
        .map(Some)
        .ok_or(LoadError::BadReference {
            kind: "texture",
            id,
            count,
        })
}

fn required<'a>(parent: &'a Element, name: &str) -> LoadResult<&'a Element> {
    parent.child(name).ok_or_else(|| LoadError::MissingElement {
        parent: parent.name.clone(),
        element: name.to_string(),
    })
}

/// Whitespace-separated values of an element's text content.
fn values<T: FromStr>(element: &Element) -> LoadResult<Vec<T>> {
    element
        .text
        .split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| LoadError::InvalidValue {
                element: element.name.clone(),
                value: token.to_string(),
            })
        })
        .collect()
}

/// An element whose text content is exactly one value.
fn scalar<T: FromStr>(element: &Element) -> LoadResult<T> {
    let parsed: Vec<T> = values(element)?;
    match <[T; 1]>::try_from(parsed) {
        Ok([value]) => Ok(value),
        Err(parsed) => Err(LoadError::WrongArity {
            element: element.name.clone(),
            expected: 1,
            found: parsed.len(),
        }),
    }
}

fn vec3_text(element: &Element) -> LoadResult<Vec3> {
    let parsed: Vec<f64> = values(element)?;
    match parsed.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(LoadError::WrongArity {
            element: element.name.clone(),
            expected: 3,
            found: parsed.len(),
        }),
    }
}

fn vec3_list(element: &Element) -> LoadResult<Vec<Vec3>> {
    let parsed: Vec<f64> = values(element)?;
    if parsed.len() % 3 != 0 {
        return Err(LoadError::WrongArity {
            element: element.name.clone(),
            expected: (parsed.len() / 3 + 1) * 3,
            found: parsed.len(),
        });
    }
    Ok(parsed
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

fn vec2_list(element: &Element) -> LoadResult<Vec<Vec2>> {
    let parsed: Vec<f64> = values(element)?;
    if parsed.len() % 2 != 0 {
        return Err(LoadError::WrongArity {
            element: element.name.clone(),
            expected: (parsed.len() / 2 + 1) * 2,
            found: parsed.len(),
        });
    }
    Ok(parsed
        .chunks_exact(2)
        .map(|c| Vec2::new(c[0], c[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_SCENE: &str = r#"
        <Scene>
            <BackgroundColor>25 25 25</BackgroundColor>
            <ShadowRayEpsilon>1e-4</ShadowRayEpsilon>
            <MaxRecursionDepth>3</MaxRecursionDepth>
            <Cameras>
                <Camera id="1">
                    <Position>0 0 5</Position>
                    <Gaze>0 0 -1</Gaze>
                    <Up>0 1 0</Up>
                    <NearPlane>-1 1 -1 1</NearPlane>
                    <NearDistance>1</NearDistance>
                    <ImageResolution>64 48</ImageResolution>
                    <ImageName>simple.ppm</ImageName>
                </Camera>
            </Cameras>
            <Lights>
                <AmbientLight>10 10 10</AmbientLight>
                <PointLight id="1">
                    <Position>5 5 5</Position>
                    <Intensity>1000 1000 1000</Intensity>
                </PointLight>
            </Lights>
            <Materials>
                <Material id="1">
                    <AmbientReflectance>1 1 1</AmbientReflectance>
                    <DiffuseReflectance>0.8 0.2 0.2</DiffuseReflectance>
                    <SpecularReflectance>0.5 0.5 0.5</SpecularReflectance>
                    <MirrorReflectance>0 0 0</MirrorReflectance>
                    <PhongExponent>10</PhongExponent>
                </Material>
            </Materials>
            <VertexData>
                0 0 0
                1 0 0
                0 1 0
                0 0 -2
            </VertexData>
            <Objects>
                <Mesh id="1">
                    <Material>1</Material>
                    <Faces>
                        1 2 3
                    </Faces>
                </Mesh>
                <Triangle id="1">
                    <Material>1</Material>
                    <Indices>1 2 3</Indices>
                </Triangle>
                <Sphere id="1">
                    <Material>1</Material>
                    <Center>4</Center>
                    <Radius>0.5</Radius>
                </Sphere>
            </Objects>
        </Scene>
    "#;

    fn parse_simple() -> Scene {
        parse_scene(SIMPLE_SCENE, Path::new(".")).unwrap()
    }

    #[test]
    fn test_parse_scene_globals() {
        let scene = parse_simple();
        assert_eq!(scene.background_color, Vec3::splat(25.0));
        assert_eq!(scene.shadow_ray_epsilon, 1e-4);
        assert_eq!(scene.max_recursion_depth, 3);
        assert_eq!(scene.ambient_light, Vec3::splat(10.0));
    }

    #[test]
    fn test_parse_scene_camera() {
        let scene = parse_simple();
        let camera = &scene.cameras[0];
        assert_eq!(camera.image_width, 64);
        assert_eq!(camera.image_height, 48);
        assert_eq!(camera.image_name, "simple.ppm");
        assert!((camera.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-12);
    }

    #[test]
    fn test_parse_scene_objects() {
        let scene = parse_simple();
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.meshes[0].face_count(), 1);
        assert_eq!(scene.meshes[0].material, 0);
        assert!(scene.meshes[0].texture.is_none());
        assert!(scene.meshes[0].bvh.is_some());

        assert_eq!(scene.triangles.len(), 1);
        let face = &scene.triangles[0].face;
        assert!((face.normal - Vec3::Z).length() < 1e-12);

        assert_eq!(scene.spheres.len(), 1);
        assert_eq!(scene.spheres[0].center, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(scene.spheres[0].radius, 0.5);
    }

    #[test]
    fn test_parse_scene_light() {
        let scene = parse_simple();
        assert_eq!(scene.point_lights.len(), 1);
        assert_eq!(scene.point_lights[0].position, Vec3::splat(5.0));
        assert_eq!(scene.point_lights[0].intensity, Vec3::splat(1000.0));
    }

    #[test]
    fn test_bad_root_element() {
        let err = parse_scene("<World></World>", Path::new(".")).unwrap_err();
        assert!(matches!(err, LoadError::BadRoot(name) if name == "World"));
    }

    #[test]
    fn test_material_reference_out_of_range() {
        let content = r#"
            <Scene>
                <VertexData>0 0 0 1 0 0 0 1 0</VertexData>
                <Objects>
                    <Triangle><Material>2</Material><Indices>1 2 3</Indices></Triangle>
                </Objects>
            </Scene>
        "#;
        let err = parse_scene(content, Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::BadReference { kind: "material", id: 2, count: 0 }
        ));
    }

    #[test]
    fn test_vertex_reference_out_of_range() {
        let content = r#"
            <Scene>
                <Materials>
                    <Material>
                        <AmbientReflectance>0 0 0</AmbientReflectance>
                        <DiffuseReflectance>0 0 0</DiffuseReflectance>
                        <SpecularReflectance>0 0 0</SpecularReflectance>
                    </Material>
                </Materials>
                <VertexData>0 0 0</VertexData>
                <Objects>
                    <Triangle><Material>1</Material><Indices>1 2 3</Indices></Triangle>
                </Objects>
            </Scene>
        "#;
        let err = parse_scene(content, Path::new(".")).unwrap_err();
        assert!(matches!(err, LoadError::BadReference { kind: "vertex", id: 2, .. }));
    }

    #[test]
    fn test_missing_required_element() {
        let content = r#"
            <Scene>
                <Cameras><Camera><Position>0 0 0</Position></Camera></Cameras>
            </Scene>
        "#;
        let err = parse_scene(content, Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingElement { element, .. } if element == "NearPlane"
        ));
    }

    #[test]
    fn test_invalid_number() {
        let content = "<Scene><BackgroundColor>0 zero 0</BackgroundColor></Scene>";
        let err = parse_scene(content, Path::new(".")).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { value, .. } if value == "zero"));
    }

    #[test]
    fn test_wrong_arity() {
        let content = "<Scene><BackgroundColor>0 0</BackgroundColor></Scene>";
        let err = parse_scene(content, Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::WrongArity { expected: 3, found: 2, .. }
        ));
    }

    #[test]
    fn test_unknown_texture_mode() {
        let content = r#"
            <Scene>
                <Textures>
                    <Texture id="1">
                        <ImageName>missing.png</ImageName>
                        <DecalMode>modulate</DecalMode>
                    </Texture>
                </Textures>
            </Scene>
        "#;
        let err = parse_scene(content, Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Texture(TextureError::UnknownMode { id: 1, field: "DecalMode", .. })
        ));
    }
}
