use crate::error::{SceneError, SceneResult};
use crate::io::obj_loader::load_obj;
use crate::io::scene_file::load_scene_file;
use crate::scene::graph::{Scene, SceneNode};
use crate::scene::material::MaterialTable;
use log::info;
use nalgebra::Matrix4;
use std::path::Path;

/// Imports a scene by file extension: `.obj` models or `.toml` scene descriptions.
pub fn import_scene(path: &Path, texture_dir: Option<&Path>) -> SceneResult<Scene> {
    if !path.exists() {
        return Err(SceneError::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let scene = match extension.as_deref() {
        Some("obj") => import_obj(path, texture_dir)?,
        Some("toml") => load_scene_file(path, texture_dir)?,
        _ => return Err(SceneError::UnsupportedFormat(path.to_path_buf())),
    };

    let summary = scene.summary();
    info!(
        "Imported {:?}: {} nodes, {} meshes, {} materials, {} lights, {} cameras",
        path, summary.nodes, summary.meshes, summary.materials, summary.lights, summary.cameras
    );
    Ok(scene)
}

/// An OBJ file becomes a root node (named after the file) with one child per
/// OBJ object. OBJ carries no cameras or lights.
fn import_obj(path: &Path, texture_dir: Option<&Path>) -> SceneResult<Scene> {
    let model = load_obj(path, texture_dir)?;

    let root_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("root");
    let mut root = SceneNode::new(root_name, Matrix4::identity());
    root.children = model
        .meshes
        .iter()
        .enumerate()
        .map(|(i, mesh)| SceneNode::new(&mesh.name, Matrix4::identity()).with_meshes(vec![i]))
        .collect();

    Ok(Scene::new(
        root,
        model.meshes,
        MaterialTable::new(model.materials),
        Vec::new(),
        Vec::new(),
    ))
}
