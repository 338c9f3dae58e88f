use nalgebra::{Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// One entry of a mesh's vertex buffer. Missing attributes are zero.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub texcoord: Vector2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }
}

/// Values blended with barycentric weights between the vertex and fragment stage.
pub trait Interpolatable:
    Copy + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

impl<T> Interpolatable for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> + Send + Sync {}

/// A vertex/fragment program pair. Per-draw uniforms are fields of the implementor.
pub trait Shader: Send + Sync {
    type Varying: Interpolatable;

    /// Clip-space position and the varying to interpolate.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Linear RGB of one fragment.
    fn fragment(&self, varying: Self::Varying) -> Vector3<f32>;
}
