//! Walks a parsed [`Document`] into a [`Model`] and resolves buffer and
//! image payloads.
//!
//! Both entry points share [`decode`]; they differ only in where the JSON
//! text and the optional embedded buffer bytes come from.

use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec3, Vec4};
use log::{debug, info, warn};

use crate::container::{self, GlbContainer};
use crate::data_uri::{self, DataUri};
use crate::error::{Error, Resource, Result};
use crate::json::{Document, ObjectRef};
use crate::model::{
    Accessor, AccessorType, AlphaMode, AssetInfo, Attribute, AttributeSemantic, Buffer,
    BufferView, ComponentType, Image, MagFilter, Material, Mesh, MinFilter, Model, Node,
    Primitive, PrimitiveMode, Sampler, Scene, Texture, TextureInfo, WrapMode,
};

/// What to do when one buffer or image payload cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadErrorPolicy {
    /// Fail the whole load.
    #[default]
    Abort,
    /// Log a warning and leave the payload empty.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub on_payload_error: PayloadErrorPolicy,
}

impl LoadOptions {
    pub fn skip_bad_payloads() -> Self {
        Self {
            on_payload_error: PayloadErrorPolicy::Skip,
        }
    }
}

/// Loads a text glTF file, resolving external URIs under `root`.
pub fn load_gltf(root: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<Model> {
    load_gltf_with_options(root, path, &LoadOptions::default())
}

pub fn load_gltf_with_options(
    root: impl AsRef<Path>,
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Model> {
    let path = path.as_ref();
    let data = container::read_file(path)?;
    let model = load_gltf_from_str(&String::from_utf8_lossy(&data), root, options)?;
    log_summary(path, &model);
    Ok(model)
}

/// Decodes glTF text held in memory.
pub fn load_gltf_from_str(
    json: &str,
    root: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Model> {
    decode(json, None, root.as_ref(), options)
}

/// Loads a binary container. External URIs resolve next to the file.
pub fn load_glb(path: impl AsRef<Path>) -> Result<Model> {
    load_glb_with_options(path, &LoadOptions::default())
}

pub fn load_glb_with_options(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Model> {
    let path = path.as_ref();
    let container = GlbContainer::open(path)?;
    let model = load_glb_from_container(container, container::parent_dir(path), options)?;
    log_summary(path, &model);
    Ok(model)
}

/// Decodes a binary container held in memory.
pub fn load_glb_from_bytes(
    data: &[u8],
    root: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Model> {
    load_glb_from_container(GlbContainer::from_bytes(data)?, root, options)
}

fn load_glb_from_container(
    container: GlbContainer,
    root: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<Model> {
    let (json, bin) = container.into_parts();
    decode(&String::from_utf8_lossy(&json), bin, root.as_ref(), options)
}

/// Shared decoder behind every entry point.
pub fn decode(
    json: &str,
    embedded: Option<Vec<u8>>,
    root: &Path,
    options: &LoadOptions,
) -> Result<Model> {
    let document = Document::parse(json)?;
    let mut model = walk(&document, root.to_path_buf());

    if let Some(bin) = embedded {
        attach_embedded_buffer(&mut model, bin)?;
    }

    resolve_buffers(&mut model, options)?;
    resolve_images(&mut model, options)?;
    Ok(model)
}

fn log_summary(path: &Path, model: &Model) {
    info!(
        "loaded {}: {} scenes, {} nodes, {} meshes, {} materials, {} buffers, {} images",
        path.display(),
        model.scenes.len(),
        model.nodes.len(),
        model.meshes.len(),
        model.materials.len(),
        model.buffers.len(),
        model.images.len()
    );
}

/// Builds the structural part of the model. Payloads are resolved later.
pub fn walk(document: &Document, root: PathBuf) -> Model {
    let doc = document.root();
    let model = Model {
        root,
        asset: load_asset(doc),
        default_scene: index(doc, "scene"),
        scenes: load_array(doc, "scenes", load_scene),
        nodes: load_array(doc, "nodes", load_node),
        materials: load_array(doc, "materials", load_material),
        meshes: load_array(doc, "meshes", load_mesh),
        textures: load_array(doc, "textures", load_texture),
        samplers: load_array(doc, "samplers", load_sampler),
        images: load_array(doc, "images", load_image),
        buffers: load_array(doc, "buffers", load_buffer),
        buffer_views: load_array(doc, "bufferViews", load_buffer_view),
        accessors: load_array(doc, "accessors", load_accessor),
    };
    debug!(
        "walked document: {} accessors, {} buffer views, {} textures, {} samplers",
        model.accessors.len(),
        model.buffer_views.len(),
        model.textures.len(),
        model.samplers.len()
    );
    model
}

/// Allocates one entity per element of the top-level array `key`; an absent
/// key yields an empty vector.
fn load_array<T>(doc: ObjectRef<'_>, key: &str, load: fn(ObjectRef<'_>) -> T) -> Vec<T> {
    let Some(array) = nested(doc, key) else {
        return Vec::new();
    };
    let mut items = Vec::with_capacity(array.len());
    for member in array.members() {
        // Non-object elements read as an entity with every default.
        let element = member
            .as_object()
            .unwrap_or_else(|| array.document().sentinel());
        items.push(load(element));
    }
    items
}

fn load_asset(doc: ObjectRef<'_>) -> AssetInfo {
    let asset = doc.get("asset");
    AssetInfo {
        version: text(asset, "version").unwrap_or_default(),
        generator: text(asset, "generator"),
        min_version: text(asset, "minVersion"),
    }
}

fn load_scene(scene: ObjectRef<'_>) -> Scene {
    Scene {
        name: text(scene, "name"),
        nodes: indices(scene, "nodes"),
    }
}

fn load_node(node: ObjectRef<'_>) -> Node {
    let mut out = Node {
        name: text(node, "name"),
        mesh: index(node, "mesh"),
        skin: index(node, "skin"),
        camera: index(node, "camera"),
        children: indices(node, "children"),
        ..Node::default()
    };

    let translation = floats(node, "translation");
    out.translation = Vec3::from_array(overlay(out.translation.to_array(), &translation));

    let rotation = floats(node, "rotation");
    out.rotation = Quat::from_array(overlay(out.rotation.to_array(), &rotation));

    let scale = floats(node, "scale");
    out.scale = Vec3::from_array(overlay(out.scale.to_array(), &scale));

    if node.exists("matrix") {
        out.has_matrix = true;
        let matrix = floats(node, "matrix");
        out.matrix = Mat4::from_cols_array(&overlay(out.matrix.to_cols_array(), &matrix));
    }
    out
}

fn load_mesh(mesh: ObjectRef<'_>) -> Mesh {
    let primitives = match nested(mesh, "primitives") {
        Some(primitives) => primitives
            .members()
            .filter_map(|member| member.as_object())
            .map(load_primitive)
            .collect(),
        None => Vec::new(),
    };
    Mesh {
        name: text(mesh, "name"),
        primitives,
    }
}

fn load_primitive(primitive: ObjectRef<'_>) -> Primitive {
    let attributes = nested(primitive, "attributes")
        .map(|attributes| {
            attributes
                .members()
                .filter_map(|member| {
                    let Some(accessor) = member.as_index() else {
                        warn!(
                            "dropping attribute {} with non-index accessor {:?}",
                            member.name(),
                            member.text()
                        );
                        return None;
                    };
                    Some(Attribute {
                        semantic: AttributeSemantic::parse(member.name()),
                        accessor,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let mode = match primitive.member("mode") {
        Some(member) => PrimitiveMode::from_code(member.as_i32()).unwrap_or_else(|| {
            warn!("unknown primitive mode {}, using triangles", member.text());
            PrimitiveMode::default()
        }),
        None => PrimitiveMode::default(),
    };

    Primitive {
        attributes,
        indices: index(primitive, "indices"),
        material: index(primitive, "material"),
        mode,
    }
}

fn load_material(material: ObjectRef<'_>) -> Material {
    let defaults = Material::default();
    let pbr = material.get("pbrMetallicRoughness");
    let normal = material.get("normalTexture");
    let occlusion = material.get("occlusionTexture");

    Material {
        name: text(material, "name"),
        alpha_mode: text(material, "alphaMode")
            .map(|mode| AlphaMode::parse(&mode))
            .unwrap_or(defaults.alpha_mode),
        alpha_cutoff: float(material, "alphaCutoff", defaults.alpha_cutoff),
        base_color_factor: Vec4::from_array(overlay(
            defaults.base_color_factor.to_array(),
            &floats(pbr, "baseColorFactor"),
        )),
        base_color_texture: texture_info(pbr, "baseColorTexture"),
        metallic_factor: float(pbr, "metallicFactor", defaults.metallic_factor),
        roughness_factor: float(pbr, "roughnessFactor", defaults.roughness_factor),
        metallic_roughness_texture: texture_info(pbr, "metallicRoughnessTexture"),
        normal_texture: texture_info(material, "normalTexture"),
        normal_scale: float(normal, "scale", defaults.normal_scale),
        occlusion_texture: texture_info(material, "occlusionTexture"),
        occlusion_strength: float(occlusion, "strength", defaults.occlusion_strength),
        emissive_texture: texture_info(material, "emissiveTexture"),
        emissive_factor: Vec3::from_array(overlay(
            defaults.emissive_factor.to_array(),
            &floats(material, "emissiveFactor"),
        )),
        double_sided: material
            .member("doubleSided")
            .map(|m| m.as_bool())
            .unwrap_or(defaults.double_sided),
    }
}

fn load_texture(texture: ObjectRef<'_>) -> Texture {
    Texture {
        name: text(texture, "name"),
        sampler: index(texture, "sampler"),
        source: index(texture, "source"),
    }
}

fn load_sampler(sampler: ObjectRef<'_>) -> Sampler {
    let code = |key: &str| sampler.member(key).map(|m| m.as_u32());
    let wrap = |key: &str| match code(key) {
        Some(value) => WrapMode::from_code(value).unwrap_or_else(|| {
            warn!("unknown sampler {key} {value}, using repeat");
            WrapMode::default()
        }),
        None => WrapMode::default(),
    };

    Sampler {
        name: text(sampler, "name"),
        mag_filter: code("magFilter").and_then(|value| {
            let filter = MagFilter::from_code(value);
            if filter.is_none() {
                warn!("unknown sampler magFilter {value}");
            }
            filter
        }),
        min_filter: code("minFilter").and_then(|value| {
            let filter = MinFilter::from_code(value);
            if filter.is_none() {
                warn!("unknown sampler minFilter {value}");
            }
            filter
        }),
        wrap_s: wrap("wrapS"),
        wrap_t: wrap("wrapT"),
    }
}

fn load_image(image: ObjectRef<'_>) -> Image {
    Image {
        name: text(image, "name"),
        uri: text(image, "uri"),
        mime_type: text(image, "mimeType"),
        buffer_view: index(image, "bufferView"),
        ..Image::default()
    }
}

fn load_buffer(buffer: ObjectRef<'_>) -> Buffer {
    Buffer {
        name: text(buffer, "name"),
        uri: text(buffer, "uri"),
        byte_length: index(buffer, "byteLength").unwrap_or(0),
        ..Buffer::default()
    }
}

fn load_buffer_view(view: ObjectRef<'_>) -> BufferView {
    BufferView {
        name: text(view, "name"),
        buffer: index(view, "buffer"),
        byte_offset: index(view, "byteOffset").unwrap_or(0),
        byte_length: index(view, "byteLength").unwrap_or(0),
        byte_stride: view.member("byteStride").map(|m| m.as_u32()),
        target: view.member("target").map(|m| m.as_u32()),
    }
}

fn load_accessor(accessor: ObjectRef<'_>) -> Accessor {
    let component_type = match accessor.member("componentType") {
        Some(member) => ComponentType::from_code(member.as_u32()).unwrap_or_else(|| {
            warn!("unknown accessor componentType {}", member.text());
            ComponentType::default()
        }),
        None => ComponentType::default(),
    };
    let kind = match text(accessor, "type") {
        Some(name) => AccessorType::parse(&name).unwrap_or_else(|| {
            warn!("unknown accessor type {name}");
            AccessorType::default()
        }),
        None => AccessorType::default(),
    };

    Accessor {
        name: text(accessor, "name"),
        buffer_view: index(accessor, "bufferView"),
        byte_offset: index(accessor, "byteOffset").unwrap_or(0),
        count: index(accessor, "count").unwrap_or(0),
        component_type,
        kind,
        normalized: accessor
            .member("normalized")
            .map(|m| m.as_bool())
            .unwrap_or(false),
        min: floats(accessor, "min"),
        max: floats(accessor, "max"),
    }
}

fn text(object: ObjectRef<'_>, key: &str) -> Option<String> {
    object.member(key).map(|m| m.text().to_string())
}

fn index(object: ObjectRef<'_>, key: &str) -> Option<usize> {
    object.member(key).and_then(|m| m.as_index())
}

fn float(object: ObjectRef<'_>, key: &str, default: f32) -> f32 {
    object.member(key).map(|m| m.as_f32()).unwrap_or(default)
}

/// Nested object or array under `key`. Scalars read as absent.
fn nested<'a>(object: ObjectRef<'a>, key: &str) -> Option<ObjectRef<'a>> {
    let member = object.member(key)?;
    let value = member.as_object();
    if value.is_none() {
        warn!("expected an array or object for {key}, found {:?}", member.text());
    }
    value
}

fn indices(object: ObjectRef<'_>, key: &str) -> Vec<usize> {
    let Some(list) = nested(object, key) else {
        return Vec::new();
    };
    list.members()
        .enumerate()
        .filter_map(|(position, m)| {
            let index = m.as_index();
            if index.is_none() {
                warn!("dropping {key}[{position}]: {:?} is not an index", m.text());
            }
            index
        })
        .collect()
}

fn floats(object: ObjectRef<'_>, key: &str) -> Vec<f32> {
    nested(object, key)
        .map(|list| list.members().map(|m| m.as_f32()).collect())
        .unwrap_or_default()
}

fn texture_info(object: ObjectRef<'_>, key: &str) -> Option<TextureInfo> {
    let info = object.get(key);
    Some(TextureInfo {
        index: index(info, "index")?,
        tex_coord: info.member("texCoord").map(|m| m.as_u32()).unwrap_or(0),
    })
}

/// Writes `values` over the leading components of `base`.
fn overlay<const N: usize>(mut base: [f32; N], values: &[f32]) -> [f32; N] {
    for (slot, value) in base.iter_mut().zip(values) {
        *slot = *value;
    }
    base
}

/// Copies the container's binary chunk into buffer 0.
fn attach_embedded_buffer(model: &mut Model, bin: Vec<u8>) -> Result<()> {
    let Some(buffer) = model.buffers.first_mut() else {
        warn!("container has a BIN chunk but the document declares no buffers");
        return Ok(());
    };
    let expected = buffer.byte_length;
    // Chunks are padded to 4-byte alignment.
    if bin.len() < expected || bin.len() - expected >= 4 {
        return Err(Error::MalformedContainer(format!(
            "BIN chunk is {} bytes but buffer 0 declares byteLength {expected}",
            bin.len()
        )));
    }
    let mut bin = bin;
    bin.truncate(expected);
    buffer.data = bin;
    Ok(())
}

fn apply_policy(
    options: &LoadOptions,
    resource: Resource,
    result: Result<()>,
) -> Result<()> {
    match (result, options.on_payload_error) {
        (Ok(()), _) => Ok(()),
        (Err(err), PayloadErrorPolicy::Abort) => Err(Error::payload(resource, err)),
        (Err(err), PayloadErrorPolicy::Skip) => {
            warn!("skipping {resource}: {}", describe(&err));
            Ok(())
        }
    }
}

fn describe(err: &Error) -> String {
    match err {
        Error::DecodeFailure(source) => format!("{err}: {source}"),
        other => other.to_string(),
    }
}

fn resolve_buffers(model: &mut Model, options: &LoadOptions) -> Result<()> {
    let root = model.root.clone();
    for (i, buffer) in model.buffers.iter_mut().enumerate() {
        let result = resolve_buffer(buffer, &root);
        apply_policy(options, Resource::Buffer(i), result)?;
    }
    Ok(())
}

fn resolve_buffer(buffer: &mut Buffer, root: &Path) -> Result<()> {
    if !buffer.data.is_empty() {
        return Ok(());
    }
    let Some(uri) = buffer.uri.as_deref() else {
        return Ok(());
    };
    buffer.data = if data_uri::is_data_uri(uri) {
        data_uri::decode_sized(uri, buffer.byte_length)?
    } else {
        container::read_file(&root.join(uri))?
    };
    Ok(())
}

fn resolve_images(model: &mut Model, options: &LoadOptions) -> Result<()> {
    for i in 0..model.images.len() {
        let result = resolve_image(model, i);
        apply_policy(options, Resource::Image(i), result)?;
    }
    Ok(())
}

fn resolve_image(model: &mut Model, index: usize) -> Result<()> {
    let resource = Resource::Image(index);
    let image = &model.images[index];

    if let Some(view) = image.buffer_view {
        let bytes = model
            .buffer_view_bytes(view)
            .ok_or_else(|| Error::InvalidReference {
                resource,
                message: format!("buffer view {view} does not resolve to loaded buffer bytes"),
            })?
            .to_vec();
        let image = &mut model.images[index];
        image.data = bytes;
        image.embedded = true;
        return Ok(());
    }

    let Some(uri) = image.uri.as_deref() else {
        return Ok(());
    };
    let (data, embedded, mime_type) = match DataUri::parse(uri) {
        Some(data_uri) => (data_uri.decode()?, true, data_uri.mime_type),
        None => (container::read_file(&model.root.join(uri))?, false, None),
    };

    let image = &mut model.images[index];
    image.data = data;
    image.embedded = embedded;
    if image.mime_type.is_none() {
        image.mime_type = mime_type.map(str::to_string);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_str(json: &str) -> Result<Model> {
        decode(json, None, Path::new(""), &LoadOptions::default())
    }

    #[test]
    fn absent_arrays_stay_empty() {
        let model = decode_str(r#"{"asset":{"version":"2.0"}}"#).unwrap();
        assert_eq!(model.asset.version, "2.0");
        assert!(model.is_empty());
        assert_eq!(model.default_scene, None);
    }

    #[test]
    fn scalar_in_place_of_an_array_reads_as_absent() {
        let model = decode_str(
            r#"{"buffers":1,"nodes":7,"scenes":[{"nodes":3}],
                "meshes":[{"primitives":0},{"primitives":[{"attributes":2}]}],
                "accessors":[{"min":3,"max":"x"}]}"#,
        )
        .unwrap();
        assert!(model.buffers.is_empty());
        assert!(model.nodes.is_empty());
        assert!(model.scenes[0].nodes.is_empty());
        assert!(model.meshes[0].primitives.is_empty());
        assert!(model.meshes[1].primitives[0].attributes.is_empty());
        assert!(model.accessors[0].min.is_empty());
        assert!(model.accessors[0].max.is_empty());
    }

    #[test]
    fn non_index_entries_are_dropped_from_index_lists() {
        let model = decode_str(
            r#"{"nodes":[{"children":[1,-1,2,"3"]}],
                "meshes":[{"primitives":[{"attributes":{"POSITION":0,"NORMAL":-2}}]}]}"#,
        )
        .unwrap();
        assert_eq!(model.nodes[0].children, vec![1, 2]);
        let attributes = &model.meshes[0].primitives[0].attributes;
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].semantic, AttributeSemantic::Position);
    }

    #[test]
    fn node_transform_components_overlay_defaults() {
        let model = decode_str(
            r#"{"nodes":[{"translation":[1,2,3],"rotation":[0,0,0.7071068,0.7071068],"scale":[2]}]}"#,
        )
        .unwrap();
        let node = &model.nodes[0];
        assert_eq!(node.translation, Vec3::new(1.0, 2.0, 3.0));
        assert!((node.rotation.z - 0.707_106_8).abs() < 1e-6);
        assert_eq!(node.scale, Vec3::new(2.0, 1.0, 1.0));
        assert!(!node.has_matrix);
    }

    #[test]
    fn node_matrix_is_column_major() {
        let model = decode_str(
            r#"{"nodes":[{"matrix":[1,0,0,0,0,1,0,0,0,0,1,0,5,6,7,1]}]}"#,
        )
        .unwrap();
        let node = &model.nodes[0];
        assert!(node.has_matrix);
        assert_eq!(node.local_transform().w_axis, Vec4::new(5.0, 6.0, 7.0, 1.0));
    }

    #[test]
    fn material_reads_nested_factors_and_textures() {
        let model = decode_str(
            r#"{"materials":[{
                "name":"Skin",
                "alphaMode":"MASK",
                "pbrMetallicRoughness":{
                    "baseColorFactor":[0.5,0.25,1,0.75],
                    "baseColorTexture":{"index":2,"texCoord":1},
                    "metallicFactor":0.0
                },
                "normalTexture":{"index":3,"scale":0.5},
                "occlusionTexture":{"index":4,"strength":0.25},
                "emissiveFactor":[1,0.5,0],
                "doubleSided":true
            }]}"#,
        )
        .unwrap();
        let material = &model.materials[0];
        assert_eq!(material.name.as_deref(), Some("Skin"));
        assert_eq!(material.alpha_mode, AlphaMode::Mask);
        assert!(material.is_transparent());
        assert_eq!(material.base_color_factor, Vec4::new(0.5, 0.25, 1.0, 0.75));
        assert_eq!(
            material.base_color_texture,
            Some(TextureInfo {
                index: 2,
                tex_coord: 1
            })
        );
        assert_eq!(material.metallic_factor, 0.0);
        assert_eq!(material.roughness_factor, 1.0);
        assert_eq!(material.normal_scale, 0.5);
        assert_eq!(material.occlusion_strength, 0.25);
        assert_eq!(material.emissive_factor, Vec3::new(1.0, 0.5, 0.0));
        assert!(material.double_sided);
    }

    #[test]
    fn missing_alpha_mode_is_opaque() {
        let model = decode_str(r#"{"materials":[{"name":"Plain"}]}"#).unwrap();
        assert_eq!(model.materials[0].alpha_mode, AlphaMode::Opaque);
        assert!(!model.materials[0].is_transparent());
        assert!(model.materials[0].base_color_texture.is_none());
    }

    #[test]
    fn primitives_keep_every_attribute_in_order() {
        let model = decode_str(
            r#"{"meshes":[{"name":"Quad","primitives":[{
                "attributes":{"NORMAL":1,"POSITION":0,"TEXCOORD_0":2,"COLOR_0":3},
                "indices":4,"material":0,"mode":1
            }]}]}"#,
        )
        .unwrap();
        let primitive = &model.meshes[0].primitives[0];
        let semantics: Vec<_> = primitive.attributes.iter().map(|a| a.semantic.clone()).collect();
        assert_eq!(
            semantics,
            vec![
                AttributeSemantic::Normal,
                AttributeSemantic::Position,
                AttributeSemantic::TexCoord(0),
                AttributeSemantic::Color(0)
            ]
        );
        assert_eq!(primitive.attribute(&AttributeSemantic::Position), Some(0));
        assert_eq!(primitive.indices, Some(4));
        assert_eq!(primitive.material, Some(0));
        assert_eq!(primitive.mode, PrimitiveMode::Lines);
    }

    #[test]
    fn accessor_fields_and_bounds() {
        let model = decode_str(
            r#"{"accessors":[{"bufferView":0,"byteOffset":12,"count":3,"componentType":5123,
                "type":"VEC3","normalized":true,"min":[-1,-2,-3],"max":[1,2,3]}]}"#,
        )
        .unwrap();
        let accessor = &model.accessors[0];
        assert_eq!(accessor.buffer_view, Some(0));
        assert_eq!(accessor.byte_offset, 12);
        assert_eq!(accessor.count, 3);
        assert_eq!(accessor.component_type, ComponentType::U16);
        assert_eq!(accessor.kind, AccessorType::Vec3);
        assert!(accessor.normalized);
        assert_eq!(accessor.min, vec![-1.0, -2.0, -3.0]);
        assert_eq!(accessor.max, vec![1.0, 2.0, 3.0]);
        assert_eq!(accessor.element_size(), 6);
    }

    #[test]
    fn sampler_codes_map_to_enums() {
        let model = decode_str(
            r#"{"samplers":[{"magFilter":9729,"minFilter":9987,"wrapS":33071},{"wrapT":1}]}"#,
        )
        .unwrap();
        assert_eq!(model.samplers[0].mag_filter, Some(MagFilter::Linear));
        assert_eq!(model.samplers[0].min_filter, Some(MinFilter::LinearMipmapLinear));
        assert_eq!(model.samplers[0].wrap_s, WrapMode::ClampToEdge);
        assert_eq!(model.samplers[0].wrap_t, WrapMode::Repeat);
        assert_eq!(model.samplers[1].wrap_t, WrapMode::Repeat);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let model = decode_str(
            r#"{"extensionsUsed":["KHR_x"],"textures":[{"source":1,"sampler":0,"extras":{"a":[1]}}]}"#,
        )
        .unwrap();
        assert_eq!(model.textures[0].source, Some(1));
        assert_eq!(model.textures[0].sampler, Some(0));
    }

    #[test]
    fn image_slices_buffer_view_bytes() {
        let model = decode_str(
            r#"{"buffers":[{"byteLength":6,"uri":"data:application/octet-stream;base64,Zm9vYmFy"}],
                "bufferViews":[{"buffer":0,"byteOffset":2,"byteLength":3}],
                "images":[{"bufferView":0,"mimeType":"image/png"}]}"#,
        )
        .unwrap();
        assert_eq!(model.images[0].data, b"oba");
        assert!(model.images[0].embedded);
    }

    #[test]
    fn image_data_uri_is_size_free() {
        let model = decode_str(r#"{"images":[{"uri":"data:image/png;base64,Zm9vYmFy"}]}"#).unwrap();
        assert_eq!(model.images[0].data, b"foobar");
        assert_eq!(model.images[0].mime_type.as_deref(), Some("image/png"));
        assert!(model.images[0].embedded);
    }

    #[test]
    fn dangling_buffer_view_is_invalid_reference() {
        let err = decode_str(r#"{"images":[{"bufferView":3}]}"#).unwrap_err();
        assert!(matches!(
            err.root(),
            Error::InvalidReference {
                resource: Resource::Image(0),
                ..
            }
        ));
    }

    #[test]
    fn embedded_chunk_fills_buffer_zero() {
        let model = decode(
            r#"{"buffers":[{"byteLength":5}]}"#,
            Some(vec![1, 2, 3, 4, 5, 0, 0, 0]),
            Path::new(""),
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(model.buffers[0].data, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn embedded_chunk_with_wrong_length_is_malformed() {
        let err = decode(
            r#"{"buffers":[{"byteLength":16}]}"#,
            Some(vec![0; 8]),
            Path::new(""),
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedContainer(_)));
    }
}
