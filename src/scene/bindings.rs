use crate::scene::graph::SceneNode;
use log::{debug, warn};
use nalgebra::Matrix4;

/// Camera and light to node associations, resolved once when the scene is loaded.
///
/// Each camera or light binds to the first node, in depth-first pre-order,
/// whose name equals its own. Later nodes with the same name are ignored.
#[derive(Debug, Clone, Default)]
pub struct SceneBindings {
    camera_nodes: Vec<Option<usize>>,
    lights_by_node: Vec<Vec<usize>>,
}

impl SceneBindings {
    pub fn resolve<'a, C, L>(root: &SceneNode, node_count: usize, cameras: C, lights: L) -> Self
    where
        C: IntoIterator<Item = &'a str>,
        L: IntoIterator<Item = &'a str>,
    {
        let mut names = Vec::with_capacity(node_count);
        root.walk(&Matrix4::identity(), &mut |node, _| names.push(node.name.clone()));

        let bind = |kind: &str, name: &str| -> Option<usize> {
            let Some(index) = root.find(name).map(|node| node.index) else {
                debug!("No node named '{name}' for {kind}; keeping its own pose");
                return None;
            };
            let matches = names.iter().filter(|n| n.as_str() == name).count();
            if matches > 1 {
                warn!("{matches} nodes are named '{name}'; {kind} binds to the first (node {index})");
            }
            Some(index)
        };

        let camera_nodes = cameras.into_iter().map(|n| bind("camera", n)).collect();

        let mut lights_by_node = vec![Vec::new(); node_count];
        for (slot, name) in lights.into_iter().enumerate() {
            if let Some(node) = bind("light", name)
                && let Some(bound) = lights_by_node.get_mut(node)
            {
                bound.push(slot);
            }
        }

        Self {
            camera_nodes,
            lights_by_node,
        }
    }

    /// Node driving camera `camera`, if any.
    pub fn camera_node(&self, camera: usize) -> Option<usize> {
        self.camera_nodes.get(camera).copied().flatten()
    }

    /// Light slots driven by node `node`.
    pub fn lights_at(&self, node: usize) -> &[usize] {
        self.lights_by_node.get(node).map_or(&[], Vec::as_slice)
    }

    pub fn bound_light_count(&self) -> usize {
        self.lights_by_node.iter().map(Vec::len).sum()
    }
}
