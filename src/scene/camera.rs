use crate::core::math::transform::{TransformFactory, transform_direction, transform_point};
use log::warn;
use nalgebra::{Matrix4, Point3, Vector3};

/// A camera as imported, in the local space of the node it is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRecord {
    pub name: String,
    pub position: Point3<f32>,
    pub look_at: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraRecord {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            position: Point3::new(0.0, 3.0, 3.0),
            look_at: Point3::origin(),
            up: Vector3::y(),
            fov_y: 60.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraRecord {
    /// Resolves the camera under the world transform of its node.
    ///
    /// Position and look-at are transformed as points, the up vector as a
    /// direction and then renormalized.
    pub fn resolve(&self, world: &Matrix4<f32>, aspect_ratio: f32) -> FrameCamera {
        let eye = transform_point(world, &self.position);
        let target = transform_point(world, &self.look_at);
        let up = transform_direction(world, &self.up)
            .try_normalize(1e-8)
            .unwrap_or_else(|| {
                warn!("Camera '{}' has a degenerate up vector, using +Y", self.name);
                Vector3::y()
            });

        FrameCamera {
            eye,
            view: TransformFactory::view(&eye, &target, &up),
            projection: TransformFactory::perspective(aspect_ratio, self.fov_y, self.near, self.far),
        }
    }
}

/// Camera state shared by the mesh pass for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCamera {
    pub eye: Point3<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl FrameCamera {
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_default_camera_matches_factory() {
        let camera = CameraRecord::default();
        let frame = camera.resolve(&Matrix4::identity(), 1.5);

        assert_eq!(frame.eye, Point3::new(0.0, 3.0, 3.0));
        let expected_view =
            TransformFactory::view(&Point3::new(0.0, 3.0, 3.0), &Point3::origin(), &Vector3::y());
        let expected_proj = TransformFactory::perspective(1.5, 60.0_f32.to_radians(), 0.1, 1000.0);
        assert!((frame.view - expected_view).norm() < EPSILON);
        assert!((frame.projection - expected_proj).norm() < EPSILON);
    }

    #[test]
    fn test_node_transform_moves_camera() {
        let camera = CameraRecord {
            position: Point3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        let world = TransformFactory::translation(&Vector3::new(2.0, 0.0, 0.0));
        let frame = camera.resolve(&world, 1.0);
        assert!((frame.eye - Point3::new(2.0, 0.0, 5.0)).norm() < EPSILON);
    }

    #[test]
    fn test_up_is_renormalized() {
        let camera = CameraRecord {
            position: Point3::new(0.0, 0.0, 5.0),
            ..Default::default()
        };
        let world = TransformFactory::scaling(3.0);
        let frame = camera.resolve(&world, 1.0);
        // Scaling the whole camera rig keeps the view orthonormal.
        let rot = frame.view.fixed_view::<3, 3>(0, 0).into_owned();
        assert!((rot * rot.transpose() - nalgebra::Matrix3::identity()).norm() < 1e-4);
    }
}
