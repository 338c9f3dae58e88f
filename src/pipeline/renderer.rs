use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{CullMode, Rasterizer};
use crate::pipeline::shaders::phong::PhongShader;
use crate::scene::light::LightParams;
use crate::scene::material::MaterialParams;
use crate::scene::mesh::MeshBuffers;
use log::trace;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Primitive assembly mode. Imported meshes are always triangulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
}

/// One indexed draw, with everything the shader stage needs bound.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub node: usize,
    pub mesh: usize,
    pub model: Matrix4<f32>,
    pub mvp: Matrix4<f32>,
    pub normal_matrix: Matrix3<f32>,
    pub eye: Point3<f32>,
    pub material: &'a MaterialParams,
    pub has_texture: bool,
    pub lights: &'a [LightParams],
    pub buffers: &'a MeshBuffers,
    pub topology: Topology,
    pub index_count: usize,
}

/// Receiver of the draws issued by the mesh pass.
pub trait DrawTarget {
    fn draw(&mut self, call: &DrawCall<'_>);
}

/// The software renderer: a rasterizer and the framebuffer it draws into.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    /// sample_count: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
        }
    }

    pub fn with_cull_mode(mut self, mode: CullMode) -> Self {
        self.rasterizer.set_cull_mode(mode);
        self
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height
    }

    /// Reallocates the framebuffer if the size changed.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.framebuffer.width || height != self.framebuffer.height {
            self.framebuffer = FrameBuffer::new(width, height, self.framebuffer.sample_count);
        }
    }

    pub fn clear(&mut self, color: Vector3<f32>) {
        self.framebuffer.clear(color);
    }

    /// Runs the vertex stage over the first `index_count` indices and rasterizes
    /// each complete triangle.
    pub fn draw_indexed<S: Shader>(&mut self, buffers: &MeshBuffers, index_count: usize, shader: &S) {
        let count = index_count.min(buffers.indices.len());
        for chunk in buffers.indices[..count].chunks_exact(3) {
            let (Some(v0), Some(v1), Some(v2)) = (
                buffers.vertices.get(chunk[0] as usize),
                buffers.vertices.get(chunk[1] as usize),
                buffers.vertices.get(chunk[2] as usize),
            ) else {
                continue;
            };

            let (pos0, var0) = shader.vertex(v0);
            let (pos1, var1) = shader.vertex(v1);
            let (pos2, var2) = shader.vertex(v2);

            self.rasterizer.rasterize_triangle(
                &mut self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
            );
        }
    }
}

impl DrawTarget for Renderer {
    fn draw(&mut self, call: &DrawCall<'_>) {
        trace!(
            "Draw node {} mesh {}: {} indices",
            call.node, call.mesh, call.index_count
        );
        let mut shader = PhongShader::new(
            call.mvp,
            call.model,
            call.normal_matrix,
            call.eye,
            call.material,
            call.lights,
        );
        shader.has_texture = call.has_texture;
        match call.topology {
            Topology::Triangles => self.draw_indexed(call.buffers, call.index_count, &shader),
        }
    }
}

/// Owned copy of a [`DrawCall`]'s state, without the borrowed buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub node: usize,
    pub mesh: usize,
    pub model: Matrix4<f32>,
    pub mvp: Matrix4<f32>,
    pub normal_matrix: Matrix3<f32>,
    pub eye: Point3<f32>,
    pub material: String,
    pub has_texture: bool,
    pub light_count: usize,
    pub topology: Topology,
    pub index_count: usize,
}

/// A draw target that only records what it was asked to draw.
#[derive(Debug, Default)]
pub struct DrawRecorder {
    pub draws: Vec<RecordedDraw>,
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_indices(&self) -> usize {
        self.draws.iter().map(|d| d.index_count).sum()
    }
}

impl DrawTarget for DrawRecorder {
    fn draw(&mut self, call: &DrawCall<'_>) {
        self.draws.push(RecordedDraw {
            node: call.node,
            mesh: call.mesh,
            model: call.model,
            mvp: call.mvp,
            normal_matrix: call.normal_matrix,
            eye: call.eye,
            material: call.material.name.clone(),
            has_texture: call.has_texture,
            light_count: call.lights.len(),
            topology: call.topology,
            index_count: call.index_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh::Mesh;
    use nalgebra::Vector4;

    #[test]
    fn test_renderer_draws_lit_quad() {
        let buffers = Mesh::quad("quad", None).build_buffers().unwrap();
        let material = MaterialParams {
            emission: Vector4::new(0.0, 1.0, 0.0, 1.0),
            ..Default::default()
        };
        let call = DrawCall {
            node: 0,
            mesh: 0,
            model: Matrix4::new_scaling(2.0),
            mvp: Matrix4::new_nonuniform_scaling(&Vector3::new(4.0, 4.0, 1.0)),
            normal_matrix: Matrix3::identity(),
            eye: Point3::new(0.0, 0.0, 1.0),
            material: &material,
            has_texture: false,
            lights: &[],
            buffers: &buffers,
            topology: Topology::Triangles,
            index_count: 6,
        };

        let mut renderer = Renderer::new(8, 8, 1);
        renderer.clear(Vector3::zeros());
        renderer.draw(&call);

        assert_eq!(renderer.framebuffer.get_pixel(4, 4), Some(Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_index_count_limits_draw() {
        let buffers = Mesh::quad("quad", None).build_buffers().unwrap();
        let material = MaterialParams {
            emission: Vector4::new(1.0, 1.0, 1.0, 1.0),
            ..Default::default()
        };
        let mut renderer = Renderer::new(8, 8, 1);
        renderer.clear(Vector3::zeros());
        let shader = PhongShader::new(
            Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 2.0, 1.0)),
            Matrix4::identity(),
            Matrix3::identity(),
            Point3::new(0.0, 0.0, 1.0),
            &material,
            &[],
        );

        // Only the first triangle (lower right half of the quad).
        renderer.draw_indexed(&buffers, 3, &shader);
        assert_eq!(renderer.framebuffer.get_pixel(6, 6), Some(Vector3::new(1.0, 1.0, 1.0)));
        assert_eq!(renderer.framebuffer.get_pixel(1, 1), Some(Vector3::zeros()));
    }

    #[test]
    fn test_resize_reallocates() {
        let mut renderer = Renderer::new(4, 4, 2);
        renderer.resize(10, 6);
        assert_eq!((renderer.width(), renderer.height()), (10, 6));
        assert_eq!(renderer.framebuffer.buffer_width, 20);
    }
}
