use crate::error::{SceneError, SceneResult};
use crate::scene::material::MaterialParams;
use crate::scene::mesh::Mesh;
use crate::scene::texture::Texture;
use log::{debug, info, warn};
use nalgebra::{Point3, Vector2, Vector3, Vector4};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Meshes and materials read from one OBJ file (plus its MTL library).
///
/// Mesh material indices refer to positions in `materials`.
#[derive(Debug, Default)]
pub struct ObjModel {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<MaterialParams>,
}

/// Loads an OBJ file, triangulated with a single index per vertex.
///
/// A missing or broken MTL library only loses the materials. Textures are
/// looked up next to the OBJ file, or by file name in `texture_dir` if given;
/// a texture that fails to load leaves its material untextured.
pub fn load_obj(path: &Path, texture_dir: Option<&Path>) -> SceneResult<ObjModel> {
    if !path.exists() {
        return Err(SceneError::FileNotFound(path.to_path_buf()));
    }

    info!("Loading OBJ file: {:?}", path);

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };

    let (models, materials) =
        tobj::load_obj(path, &load_options).map_err(|e| SceneError::ObjLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let materials = materials.unwrap_or_else(|e| {
        warn!("No usable MTL for {:?}: {}", path, e);
        Vec::new()
    });

    let model_dir = path.parent().unwrap_or(Path::new("."));
    let mut textures = TextureCache::default();
    let materials: Vec<MaterialParams> = materials
        .iter()
        .map(|m| convert_material(m, model_dir, texture_dir, &mut textures))
        .collect();

    let meshes: Vec<Mesh> = models
        .iter()
        .enumerate()
        .map(|(i, model)| {
            let name = if model.name.is_empty() {
                format!("mesh_{i}")
            } else {
                model.name.clone()
            };
            convert_mesh(name, &model.mesh, materials.len())
        })
        .collect();

    info!(
        "OBJ loaded: {} meshes, {} materials, {} triangles",
        meshes.len(),
        materials.len(),
        meshes.iter().map(Mesh::num_faces).sum::<usize>()
    );

    Ok(ObjModel { meshes, materials })
}

fn convert_mesh(name: String, mesh: &tobj::Mesh, material_count: usize) -> Mesh {
    let positions: Vec<Point3<f32>> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Point3::new(p[0], p[1], p[2]))
        .collect();
    let normals: Vec<Vector3<f32>> = mesh
        .normals
        .chunks_exact(3)
        .map(|n| Vector3::new(n[0], n[1], n[2]))
        .collect();
    let texcoords: Vec<Vector2<f32>> = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| Vector2::new(t[0], t[1]))
        .collect();

    if normals.is_empty() {
        warn!("Mesh '{}' has no normals; it will be lit by ambient light only", name);
    }
    if texcoords.is_empty() {
        debug!("Mesh '{}' has no texture coordinates", name);
    }

    let faces = mesh
        .indices
        .chunks_exact(3)
        .map(|f| [f[0], f[1], f[2]])
        .collect();

    let material_index = mesh.material_id.filter(|&id| id < material_count);

    Mesh {
        name,
        positions: (!positions.is_empty()).then_some(positions),
        normals: (!normals.is_empty()).then_some(normals),
        texcoords: (!texcoords.is_empty()).then_some(texcoords),
        faces,
        material_index,
    }
}

fn convert_material(
    material: &tobj::Material,
    model_dir: &Path,
    texture_dir: Option<&Path>,
    textures: &mut TextureCache,
) -> MaterialParams {
    let color = |c: Option<[f32; 3]>| {
        let [r, g, b] = c.unwrap_or([0.0; 3]);
        Vector4::new(r, g, b, 1.0)
    };

    let emission = color(material.emissive);

    let texture = material
        .diffuse_texture
        .as_deref()
        .filter(|t| !t.is_empty())
        .and_then(|t| textures.get(resolve_texture_path(t, model_dir, texture_dir)));

    MaterialParams {
        name: material.name.clone(),
        ambient: color(material.ambient),
        diffuse: color(material.diffuse),
        specular: color(material.specular),
        emission,
        shininess: material.shininess.unwrap_or(0.0),
        texture,
    }
}

/// Where to look for a material's texture file.
pub fn resolve_texture_path(name: &str, model_dir: &Path, texture_dir: Option<&Path>) -> PathBuf {
    // MTL files written on Windows use backslashes.
    let normalized = name.replace('\\', "/");
    match texture_dir {
        Some(dir) => {
            let file_name = Path::new(&normalized)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&normalized));
            dir.join(file_name)
        }
        None => model_dir.join(normalized),
    }
}

/// Loads each texture file once; failures are remembered as `None`.
#[derive(Default)]
struct TextureCache {
    loaded: HashMap<PathBuf, Option<Arc<Texture>>>,
}

impl TextureCache {
    fn get(&mut self, path: PathBuf) -> Option<Arc<Texture>> {
        self.loaded
            .entry(path)
            .or_insert_with_key(|path| match Texture::load(path) {
                Ok(texture) => Some(Arc::new(texture)),
                Err(e) => {
                    warn!("Texture {:?} unavailable, material stays untextured: {}", path, e);
                    None
                }
            })
            .clone()
    }
}
