use crate::scene::texture::Texture;
use nalgebra::Vector4;
use std::sync::Arc;

/// Surface reflectance and emission used by the lighting model.
#[derive(Debug, Clone)]
pub struct MaterialParams {
    pub name: String,
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    pub emission: Vector4<f32>,
    pub shininess: f32,
    /// Diffuse texture, `None` when the material has none or it failed to load.
    pub texture: Option<Arc<Texture>>,
}

impl MaterialParams {
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            ambient: Vector4::new(0.2, 0.2, 0.2, 1.0),
            diffuse: Vector4::new(0.8, 0.8, 0.8, 1.0),
            specular: Vector4::new(0.0, 0.0, 0.0, 1.0),
            emission: Vector4::new(0.0, 0.0, 0.0, 1.0),
            shininess: 0.0,
            texture: None,
        }
    }
}

/// Per-material parameters, filled once when the scene is imported.
///
/// Indexed by a mesh's material index. Meshes without a material, or with an
/// index past the end, use the fallback entry.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    entries: Vec<MaterialParams>,
    fallback: MaterialParams,
}

impl MaterialTable {
    pub fn new(entries: Vec<MaterialParams>) -> Self {
        Self {
            entries,
            fallback: MaterialParams::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: Option<usize>) -> &MaterialParams {
        index
            .and_then(|i| self.entries.get(i))
            .unwrap_or(&self.fallback)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialParams> {
        self.entries.iter()
    }

    pub fn textured_count(&self) -> usize {
        self.entries.iter().filter(|m| m.has_texture()).count()
    }
}
