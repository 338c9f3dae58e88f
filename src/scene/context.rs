use crate::scene::bindings::SceneBindings;
use crate::scene::camera::{CameraRecord, FrameCamera};
use crate::scene::graph::Scene;
use crate::scene::light::{LightParams, LightTable};
use log::{info, warn};

/// Values used when the scene does not supply its own.
#[derive(Debug, Clone)]
pub struct SceneDefaults {
    pub camera: CameraRecord,
    pub lights: Vec<LightParams>,
    /// Index of the scene camera to look through.
    pub active_camera: usize,
}

impl Default for SceneDefaults {
    fn default() -> Self {
        Self {
            camera: CameraRecord::default(),
            lights: LightParams::defaults(),
            active_camera: 0,
        }
    }
}

/// Everything the three per-frame passes read and write.
pub struct RenderContext {
    pub scene: Scene,
    pub lights: LightTable,
    pub bindings: SceneBindings,
    pub frame: FrameCamera,
    pub default_camera: CameraRecord,
    pub active_camera: Option<usize>,
    pub aspect_ratio: f32,
}

impl RenderContext {
    pub fn new(scene: Scene, defaults: SceneDefaults, aspect_ratio: f32) -> Self {
        let lights = LightTable::from_imported(&scene.lights, &defaults.lights);
        let bindings = SceneBindings::resolve(
            &scene.root,
            scene.node_count(),
            scene.cameras.iter().map(|c| c.name.as_str()),
            lights.iter().map(|l| l.name.as_str()),
        );

        let active_camera = match scene.cameras.len() {
            0 => None,
            n if defaults.active_camera < n => Some(defaults.active_camera),
            n => {
                warn!(
                    "Camera index {} out of range ({} cameras), using camera 0",
                    defaults.active_camera, n
                );
                Some(0)
            }
        };

        if scene.lights.is_empty() {
            info!("Scene has no lights, using {} default lights", lights.len());
        }

        let frame = defaults
            .camera
            .resolve(&nalgebra::Matrix4::identity(), aspect_ratio);

        Self {
            scene,
            lights,
            bindings,
            frame,
            default_camera: defaults.camera,
            active_camera,
            aspect_ratio,
        }
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::graph::SceneNode;
    use crate::scene::material::MaterialTable;
    use nalgebra::Matrix4;

    fn scene_with_cameras(count: usize) -> Scene {
        let cameras = (0..count)
            .map(|i| CameraRecord {
                name: format!("cam{i}"),
                ..Default::default()
            })
            .collect();
        Scene::new(
            SceneNode::new("root", Matrix4::identity()),
            Vec::new(),
            MaterialTable::default(),
            Vec::new(),
            cameras,
        )
    }

    #[test]
    fn test_active_camera_selection() {
        let ctx = RenderContext::new(scene_with_cameras(0), SceneDefaults::default(), 1.0);
        assert_eq!(ctx.active_camera, None);

        let defaults = SceneDefaults {
            active_camera: 1,
            ..Default::default()
        };
        let ctx = RenderContext::new(scene_with_cameras(2), defaults.clone(), 1.0);
        assert_eq!(ctx.active_camera, Some(1));

        let ctx = RenderContext::new(scene_with_cameras(1), defaults, 1.0);
        assert_eq!(ctx.active_camera, Some(0));
    }

    #[test]
    fn test_default_lights_fill_empty_scene() {
        let ctx = RenderContext::new(scene_with_cameras(0), SceneDefaults::default(), 1.0);
        assert_eq!(ctx.lights.len(), 2);
    }

    #[test]
    fn test_viewport_aspect() {
        let mut ctx = RenderContext::new(scene_with_cameras(0), SceneDefaults::default(), 1.0);
        ctx.set_viewport(600, 400);
        assert!((ctx.aspect_ratio - 1.5).abs() < 1e-6);
        ctx.set_viewport(0, 400);
        assert!((ctx.aspect_ratio - 1.5).abs() < 1e-6);
    }
}
