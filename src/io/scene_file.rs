//! TOML scene descriptions: a node hierarchy over OBJ mesh sources, with
//! cameras and lights bound to nodes by name.
//!
//! ```toml
//! [[meshes]]
//! name = "cube"
//! path = "cube.obj"
//!
//! [[cameras]]
//! name = "rig"
//! position = [0.0, 0.0, 5.0]
//!
//! [[lights]]
//! name = "lamp"
//! type = "spot"
//! direction = [0.0, -1.0, 0.0]
//!
//! [root]
//! name = "world"
//!
//! [[root.children]]
//! name = "box"
//! translation = [1.0, 0.0, 0.0]
//! rotation = [0.0, 45.0, 0.0]
//! meshes = ["cube"]
//! ```

use crate::core::math::transform::TransformFactory;
use crate::error::{SceneError, SceneResult};
use crate::io::config::{CameraConfig, LightConfig};
use crate::io::obj_loader::load_obj;
use crate::scene::graph::{Scene, SceneNode};
use crate::scene::material::{MaterialParams, MaterialTable};
use crate::scene::mesh::Mesh;
use log::info;
use nalgebra::{Matrix4, Vector3};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::ops::Range;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub meshes: Vec<MeshSource>,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
    #[serde(default)]
    pub lights: Vec<LightConfig>,
    pub root: NodeDescription,
}

/// An OBJ file whose meshes nodes can attach by `name`.
#[derive(Debug, Deserialize)]
pub struct MeshSource {
    pub name: String,
    /// Relative to the scene file.
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct NodeDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Euler angles in degrees, applied X, then Y, then Z.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// Row-major local matrix; replaces translation/rotation/scale when given.
    #[serde(default)]
    pub matrix: Option<[[f32; 4]; 4]>,
    #[serde(default)]
    pub meshes: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl NodeDescription {
    pub fn local_transform(&self) -> Matrix4<f32> {
        if let Some(m) = self.matrix {
            return Matrix4::from_fn(|r, c| m[r][c]);
        }
        TransformFactory::translation(&Vector3::from(self.translation))
            * TransformFactory::rotation_xyz_degrees(&Vector3::from(self.rotation))
            * TransformFactory::scaling_nonuniform(&Vector3::from(self.scale))
    }
}

pub fn parse_scene_description(path: &Path, content: &str) -> SceneResult<SceneDescription> {
    toml::from_str(content).map_err(|e| SceneError::SceneDescription {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Reads a scene description and every OBJ it references.
pub fn load_scene_file(path: &Path, texture_dir: Option<&Path>) -> SceneResult<Scene> {
    if !path.exists() {
        return Err(SceneError::FileNotFound(path.to_path_buf()));
    }
    info!("Loading scene description: {:?}", path);

    let content = fs::read_to_string(path)?;
    let description = parse_scene_description(path, &content)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));

    let mut meshes: Vec<Mesh> = Vec::new();
    let mut materials: Vec<MaterialParams> = Vec::new();
    let mut sources: HashMap<&str, Range<usize>> = HashMap::new();

    for source in &description.meshes {
        let model = load_obj(&base_dir.join(&source.path), texture_dir)?;
        let material_offset = materials.len();
        let start = meshes.len();

        meshes.extend(model.meshes.into_iter().map(|mut mesh| {
            mesh.material_index = mesh.material_index.map(|i| i + material_offset);
            mesh
        }));
        materials.extend(model.materials);
        sources.insert(source.name.as_str(), start..meshes.len());
    }

    let root = build_node(&description.root, &sources)?;
    let cameras = description.cameras.iter().map(CameraConfig::to_record).collect();
    let lights = description.lights.iter().map(LightConfig::to_params).collect();

    Ok(Scene::new(
        root,
        meshes,
        MaterialTable::new(materials),
        lights,
        cameras,
    ))
}

fn build_node(
    description: &NodeDescription,
    sources: &HashMap<&str, Range<usize>>,
) -> SceneResult<SceneNode> {
    let mut node = SceneNode::new(&description.name, description.local_transform());

    for source_name in &description.meshes {
        let range = sources
            .get(source_name.as_str())
            .ok_or_else(|| SceneError::UnknownMeshSource {
                node: description.name.clone(),
                source_name: source_name.clone(),
            })?;
        node.meshes.extend(range.clone());
    }

    node.children = description
        .children
        .iter()
        .map(|child| build_node(child, sources))
        .collect::<SceneResult<Vec<_>>>()?;

    Ok(node)
}
