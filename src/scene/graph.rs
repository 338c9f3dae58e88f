use crate::core::math::transform::accumulate;
use crate::scene::camera::CameraRecord;
use crate::scene::light::LightParams;
use crate::scene::material::MaterialTable;
use crate::scene::mesh::{Mesh, MeshBuffers};
use log::debug;
use nalgebra::Matrix4;
use std::fmt::{self, Write};

/// A node of the scene hierarchy.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Depth-first pre-order position, assigned when the scene is built.
    pub index: usize,
    pub name: String,
    pub transform: Matrix4<f32>,
    pub children: Vec<SceneNode>,
    /// Indices into [`Scene::meshes`].
    pub meshes: Vec<usize>,
}

impl SceneNode {
    pub fn new(name: &str, transform: Matrix4<f32>) -> Self {
        Self {
            index: 0,
            name: name.to_string(),
            transform,
            children: Vec::new(),
            meshes: Vec::new(),
        }
    }

    pub fn with_meshes(mut self, meshes: Vec<usize>) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first pre-order walk carrying the accumulated transform.
    ///
    /// `visit` receives each node with `parent * node.transform`, and its
    /// children are walked with that same matrix.
    pub fn walk<F>(&self, parent: &Matrix4<f32>, visit: &mut F)
    where
        F: FnMut(&SceneNode, &Matrix4<f32>),
    {
        let world = accumulate(parent, &self.transform);
        visit(self, &world);
        for child in &self.children {
            child.walk(&world, visit);
        }
    }

    /// First node in pre-order whose name equals `name`.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    fn assign_indices(&mut self, next: &mut usize) {
        self.index = *next;
        *next += 1;
        for child in &mut self.children {
            child.assign_indices(next);
        }
    }
}

/// An imported scene: hierarchy, geometry, materials, lights and cameras.
///
/// `buffers[i]` belongs to `meshes[i]` for the whole lifetime of the scene;
/// it is `None` for a mesh with nothing to draw.
#[derive(Debug, Clone)]
pub struct Scene {
    pub root: SceneNode,
    pub meshes: Vec<Mesh>,
    pub materials: MaterialTable,
    pub lights: Vec<LightParams>,
    pub cameras: Vec<CameraRecord>,
    pub buffers: Vec<Option<MeshBuffers>>,
    node_count: usize,
}

/// Element counts reported by `sceneview info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSummary {
    pub nodes: usize,
    pub meshes: usize,
    pub triangles: usize,
    pub materials: usize,
    pub textured_materials: usize,
    pub lights: usize,
    pub cameras: usize,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes:     {}", self.nodes)?;
        writeln!(f, "Meshes:    {} ({} triangles)", self.meshes, self.triangles)?;
        writeln!(
            f,
            "Materials: {} ({} textured)",
            self.materials, self.textured_materials
        )?;
        writeln!(f, "Lights:    {}", self.lights)?;
        write!(f, "Cameras:   {}", self.cameras)
    }
}

impl Scene {
    /// Numbers the nodes in pre-order and builds every mesh's buffers once.
    pub fn new(
        mut root: SceneNode,
        meshes: Vec<Mesh>,
        materials: MaterialTable,
        lights: Vec<LightParams>,
        cameras: Vec<CameraRecord>,
    ) -> Self {
        let mut node_count = 0;
        root.assign_indices(&mut node_count);

        let buffers = meshes
            .iter()
            .map(|mesh| {
                let buffers = mesh.build_buffers();
                if buffers.is_none() {
                    debug!("Mesh '{}' has no drawable geometry", mesh.name);
                }
                buffers
            })
            .collect();

        Self {
            root,
            meshes,
            materials,
            lights,
            cameras,
            buffers,
            node_count,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            nodes: self.node_count,
            meshes: self.meshes.len(),
            triangles: self.meshes.iter().map(Mesh::num_faces).sum(),
            materials: self.materials.len(),
            textured_materials: self.materials.textured_count(),
            lights: self.lights.len(),
            cameras: self.cameras.len(),
        }
    }

    /// Indented node tree, one line per node with its attached mesh names.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, &self.root, 0);
        out
    }

    fn write_node(&self, out: &mut String, node: &SceneNode, depth: usize) {
        let name = if node.name.is_empty() {
            "<unnamed>"
        } else {
            node.name.as_str()
        };
        let _ = write!(out, "{:indent$}{}", "", name, indent = depth * 2);
        if !node.meshes.is_empty() {
            let names: Vec<&str> = node
                .meshes
                .iter()
                .map(|&i| self.meshes.get(i).map_or("?", |m| m.name.as_str()))
                .collect();
            let _ = write!(out, " [{}]", names.join(", "));
        }
        out.push('\n');
        for child in &node.children {
            self.write_node(out, child, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform::{TransformFactory, transform_point};
    use nalgebra::{Point3, Vector3};

    fn translate(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        TransformFactory::translation(&Vector3::new(x, y, z))
    }

    fn sample_scene() -> Scene {
        let root = SceneNode::new("root", Matrix4::identity())
            .with_child(
                SceneNode::new("arm", translate(1.0, 0.0, 0.0))
                    .with_child(SceneNode::new("hand", translate(0.0, 2.0, 0.0)).with_meshes(vec![0])),
            )
            .with_child(SceneNode::new("hand", Matrix4::identity()));
        Scene::new(
            root,
            vec![Mesh::quad("palm", None)],
            MaterialTable::default(),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn test_pre_order_indices() {
        let scene = sample_scene();
        let mut order = Vec::new();
        scene
            .root
            .walk(&Matrix4::identity(), &mut |node, _| order.push((node.index, node.name.clone())));
        let names: Vec<_> = order.iter().map(|(_, n)| n.as_str()).collect();
        assert_eq!(names, ["root", "arm", "hand", "hand"]);
        assert!(order.iter().enumerate().all(|(i, (idx, _))| i == *idx));
        assert_eq!(scene.node_count(), 4);
    }

    #[test]
    fn test_walk_accumulates_root_to_leaf() {
        let scene = sample_scene();
        let mut leaf_world = None;
        scene.root.walk(&Matrix4::identity(), &mut |node, world| {
            if node.index == 2 {
                leaf_world = Some(*world);
            }
        });
        let p = transform_point(&leaf_world.unwrap(), &Point3::origin());
        assert_eq!(p, Point3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_find_returns_first_match() {
        let scene = sample_scene();
        assert_eq!(scene.root.find("hand").map(|n| n.index), Some(2));
        assert!(scene.root.find("leg").is_none());
    }

    #[test]
    fn test_summary_and_tree() {
        let scene = sample_scene();
        let summary = scene.summary();
        assert_eq!(summary.nodes, 4);
        assert_eq!(summary.meshes, 1);
        assert_eq!(summary.triangles, 2);
        assert_eq!(scene.tree(), "root\n  arm\n    hand [palm]\n  hand\n");
        assert!(scene.buffers[0].is_some());
    }
}
