//! glTF 2.0 decoding without a general purpose JSON library.
//!
//! The crate turns a `.gltf` text document or a `.glb` binary container
//! into a plain [`Model`]: typed scenes, nodes, meshes, materials, textures,
//! samplers, images, buffers, buffer views and accessors, with buffer and
//! image bytes already resolved from the embedded chunk, inline data URIs or
//! sibling files. Rendering and GPU upload are left to the caller.

pub mod container;
pub mod data_uri;
pub mod error;
pub mod json;
pub mod loader;
pub mod model;

pub use container::GlbContainer;
pub use data_uri::{DataUri, DataUriError};
pub use error::{Error, Resource, Result};
pub use json::Document;
pub use loader::{
    load_glb, load_glb_from_bytes, load_glb_with_options, load_gltf, load_gltf_from_str,
    load_gltf_with_options, LoadOptions, PayloadErrorPolicy,
};
pub use model::{
    Accessor, AccessorType, AlphaMode, Attribute, AttributeSemantic, Buffer, BufferView,
    ComponentType, Image, Material, Mesh, Model, Node, Primitive, Sampler, Scene, Texture,
};
