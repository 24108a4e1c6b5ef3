//! Typed scene description decoded from a glTF document.
//!
//! Every field is optional in the source document; absent fields keep the
//! defaults documented on each type. Cross references are indices into the
//! sibling vectors of [`Model`].

use std::path::PathBuf;

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Decoded asset graph. Created by one load call, emptied by [`Model::dispose`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Model {
    /// Directory external URIs were resolved against.
    pub root: PathBuf,
    pub asset: AssetInfo,
    /// Index of the scene to show by default (`scene`).
    pub default_scene: Option<usize>,
    pub scenes: Vec<Scene>,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub samplers: Vec<Sampler>,
    pub images: Vec<Image>,
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub accessors: Vec<Accessor>,
}

impl Model {
    /// Releases every owned array and resets the model to its empty state.
    ///
    /// Calling this on an already disposed model is a no-op.
    pub fn dispose(&mut self) {
        if !self.is_empty() {
            log::debug!("disposing model loaded from {}", self.root.display());
        }
        *self = Model::default();
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
            && self.nodes.is_empty()
            && self.meshes.is_empty()
            && self.materials.is_empty()
            && self.textures.is_empty()
            && self.samplers.is_empty()
            && self.images.is_empty()
            && self.buffers.is_empty()
            && self.buffer_views.is_empty()
            && self.accessors.is_empty()
    }

    /// Bytes covered by a buffer view, if the view and its buffer resolve.
    pub fn buffer_view_bytes(&self, view: usize) -> Option<&[u8]> {
        let view = self.buffer_views.get(view)?;
        let buffer = self.buffers.get(view.buffer?)?;
        let end = view.byte_offset.checked_add(view.byte_length)?;
        buffer.data.get(view.byte_offset..end)
    }

    /// Bytes spanned by an accessor's elements, stride included.
    pub fn accessor_bytes(&self, accessor: usize) -> Option<&[u8]> {
        let accessor = self.accessors.get(accessor)?;
        let view_index = accessor.buffer_view?;
        let view = self.buffer_views.get(view_index)?;
        let bytes = self.buffer_view_bytes(view_index)?;
        if accessor.count == 0 {
            return Some(&bytes[..0]);
        }
        let element = accessor.element_size();
        let stride = view
            .byte_stride
            .map(|s| s as usize)
            .filter(|s| *s > 0)
            .unwrap_or(element);
        let span = stride
            .checked_mul(accessor.count - 1)?
            .checked_add(element)?;
        let end = accessor.byte_offset.checked_add(span)?;
        bytes.get(accessor.byte_offset..end)
    }

    /// Root nodes of the default scene, or of the first scene when none is set.
    pub fn scene_roots(&self) -> &[usize] {
        self.default_scene
            .and_then(|index| self.scenes.get(index))
            .or_else(|| self.scenes.first())
            .map(|scene| scene.nodes.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetInfo {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub camera: Option<usize>,
    pub children: Vec<usize>,
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default = "default_rotation")]
    pub rotation: Quat,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default = "default_matrix")]
    pub matrix: Mat4,
    pub has_matrix: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: None,
            mesh: None,
            skin: None,
            camera: None,
            children: Vec::new(),
            translation: Vec3::ZERO,
            rotation: default_rotation(),
            scale: default_scale(),
            matrix: default_matrix(),
            has_matrix: false,
        }
    }
}

impl Node {
    /// Local transform: the explicit matrix when given, otherwise T * R * S.
    pub fn local_transform(&self) -> Mat4 {
        if self.has_matrix {
            self.matrix
        } else {
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
        }
    }
}

fn default_rotation() -> Quat {
    Quat::IDENTITY
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_matrix() -> Mat4 {
    Mat4::IDENTITY
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Primitive {
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    #[serde(default)]
    pub mode: PrimitiveMode,
}

impl Primitive {
    pub fn attribute(&self, semantic: &AttributeSemantic) -> Option<usize> {
        self.attributes
            .iter()
            .find(|attribute| &attribute.semantic == semantic)
            .map(|attribute| attribute.accessor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub semantic: AttributeSemantic,
    pub accessor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeSemantic {
    Position,
    Normal,
    Tangent,
    TexCoord(u32),
    Color(u32),
    Joints(u32),
    Weights(u32),
    Custom(String),
}

impl AttributeSemantic {
    pub fn parse(name: &str) -> Self {
        let indexed = |prefix: &str| {
            name.strip_prefix(prefix)
                .and_then(|set| set.parse::<u32>().ok())
        };
        match name {
            "POSITION" => Self::Position,
            "NORMAL" => Self::Normal,
            "TANGENT" => Self::Tangent,
            _ => {
                if let Some(set) = indexed("TEXCOORD_") {
                    Self::TexCoord(set)
                } else if let Some(set) = indexed("COLOR_") {
                    Self::Color(set)
                } else if let Some(set) = indexed("JOINTS_") {
                    Self::Joints(set)
                } else if let Some(set) = indexed("WEIGHTS_") {
                    Self::Weights(set)
                } else {
                    Self::Custom(name.to_string())
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Points,
            1 => Self::Lines,
            2 => Self::LineLoop,
            3 => Self::LineStrip,
            4 => Self::Triangles,
            5 => Self::TriangleStrip,
            6 => Self::TriangleFan,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    /// Anything other than `OPAQUE` or `MASK` is treated as blended.
    pub fn parse(text: &str) -> Self {
        match text {
            "OPAQUE" => Self::Opaque,
            "MASK" => Self::Mask,
            _ => Self::Blend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub index: usize,
    #[serde(default)]
    pub tex_coord: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub base_color_factor: Vec4,
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureInfo>,
    pub normal_texture: Option<TextureInfo>,
    pub normal_scale: f32,
    pub occlusion_texture: Option<TextureInfo>,
    pub occlusion_strength: f32,
    pub emissive_texture: Option<TextureInfo>,
    pub emissive_factor: Vec3,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            base_color_factor: Vec4::ONE,
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            normal_texture: None,
            normal_scale: 1.0,
            occlusion_texture: None,
            occlusion_strength: 1.0,
            emissive_texture: None,
            emissive_factor: Vec3::ZERO,
            double_sided: false,
        }
    }
}

impl Material {
    pub fn is_transparent(&self) -> bool {
        self.alpha_mode != AlphaMode::Opaque
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Texture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub sampler: Option<usize>,
    pub source: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagFilter {
    Nearest,
    Linear,
}

impl MagFilter {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            9728 => Some(Self::Nearest),
            9729 => Some(Self::Linear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl MinFilter {
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            9728 => Self::Nearest,
            9729 => Self::Linear,
            9984 => Self::NearestMipmapNearest,
            9985 => Self::LinearMipmapNearest,
            9986 => Self::NearestMipmapLinear,
            9987 => Self::LinearMipmapLinear,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

impl WrapMode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            33071 => Some(Self::ClampToEdge),
            33648 => Some(Self::MirroredRepeat),
            10497 => Some(Self::Repeat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sampler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mag_filter: Option<MagFilter>,
    pub min_filter: Option<MinFilter>,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub buffer_view: Option<usize>,
    /// True when the bytes came from a data URI or a buffer view.
    pub embedded: bool,
    #[serde(skip)]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Buffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub byte_length: usize,
    #[serde(skip)]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BufferView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub buffer: Option<usize>,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<u32>,
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    #[default]
    F32,
}

impl ComponentType {
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            5120 => Self::I8,
            5121 => Self::U8,
            5122 => Self::I16,
            5123 => Self::U16,
            5125 => Self::U32,
            5126 => Self::F32,
            _ => return None,
        })
    }

    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessorType {
    #[default]
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    pub fn parse(text: &str) -> Option<Self> {
        Some(match text {
            "SCALAR" => Self::Scalar,
            "VEC2" => Self::Vec2,
            "VEC3" => Self::Vec3,
            "VEC4" => Self::Vec4,
            "MAT2" => Self::Mat2,
            "MAT3" => Self::Mat3,
            "MAT4" => Self::Mat4,
            _ => return None,
        })
    }

    pub fn component_count(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Accessor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub count: usize,
    pub component_type: ComponentType,
    #[serde(rename = "type")]
    pub kind: AccessorType,
    pub normalized: bool,
    pub min: Vec<f32>,
    pub max: Vec<f32>,
}

impl Accessor {
    /// Size of one element in bytes, ignoring matrix column padding.
    pub fn element_size(&self) -> usize {
        self.component_type.size() * self.kind.component_count()
    }
}
