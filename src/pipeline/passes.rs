//! The three depth-first traversals run every frame: camera, light, mesh.

use crate::core::math::transform::normal_matrix;
use crate::pipeline::renderer::{DrawCall, DrawTarget, Topology};
use crate::scene::camera::FrameCamera;
use crate::scene::context::RenderContext;
use log::debug;
use nalgebra::Matrix4;

/// Resolves the active camera into `ctx.frame`.
///
/// Without scene cameras the configured default camera is used and the graph
/// is not walked. A camera whose name matches no node is resolved in its own
/// local space.
pub fn camera_pass(ctx: &mut RenderContext) -> FrameCamera {
    let aspect = ctx.aspect_ratio;
    let active = ctx
        .active_camera
        .and_then(|i| ctx.scene.cameras.get(i).map(|record| (i, record)));
    let frame = match active {
        // No scene cameras: the configured default, in world space
        None => ctx.default_camera.resolve(&Matrix4::identity(), aspect),
        Some((camera_index, record)) => {
            // 1. World transform of the bound node, if any
            let mut world = Matrix4::identity();
            if let Some(target) = ctx.bindings.camera_node(camera_index) {
                ctx.scene.root.walk(&Matrix4::identity(), &mut |node, acc| {
                    if node.index == target {
                        world = *acc;
                    }
                });
            }
            // 2. Eye, view and projection under that transform
            record.resolve(&world, aspect)
        }
    };
    ctx.frame = frame;
    frame
}

/// Moves every bound light slot to its node's world pose.
///
/// Unbound slots keep their load-time pose.
pub fn light_pass(ctx: &mut RenderContext) {
    if ctx.bindings.bound_light_count() == 0 {
        return;
    }
    // Split borrows: the graph is read while the light table is written
    let RenderContext {
        scene,
        lights,
        bindings,
        ..
    } = ctx;
    scene.root.walk(&Matrix4::identity(), &mut |node, world| {
        for &slot in bindings.lights_at(node.index) {
            lights.set_pose(slot, world);
        }
    });
}

/// Issues one indexed triangle draw per mesh attached to each node.
///
/// The walk is seeded with `user_transform`, so it moves every mesh but never
/// the cameras or lights. Returns the number of draws issued.
pub fn mesh_pass<T: DrawTarget>(
    ctx: &RenderContext,
    user_transform: &Matrix4<f32>,
    target: &mut T,
) -> usize {
    let frame = &ctx.frame;
    let view_projection = frame.view_projection();
    let mut issued = 0;

    ctx.scene.root.walk(user_transform, &mut |node, model| {
        if node.meshes.is_empty() {
            return;
        }

        // 1. Per-node matrices, shared by all of its meshes
        let mvp = view_projection * model;
        let normal_matrix = normal_matrix(model);

        // 2. One draw per attached mesh
        for &mesh_index in &node.meshes {
            let (Some(mesh), Some(Some(buffers))) =
                (ctx.scene.meshes.get(mesh_index), ctx.scene.buffers.get(mesh_index))
            else {
                debug!(
                    "Node '{}' skips mesh {}: nothing to draw",
                    node.name, mesh_index
                );
                continue;
            };

            // Faces dropped while building the buffers leave the draw short.
            if buffers.triangle_count() != mesh.num_faces() {
                debug!(
                    "Mesh '{}' requests {} indices but its buffer holds {}",
                    mesh.name,
                    mesh.index_count(),
                    buffers.indices.len()
                );
            }

            let material = ctx.scene.materials.get(mesh.material_index);
            target.draw(&DrawCall {
                node: node.index,
                mesh: mesh_index,
                model: *model,
                mvp,
                normal_matrix,
                eye: frame.eye,
                material,
                has_texture: material.has_texture(),
                lights: ctx.lights.as_slice(),
                buffers,
                topology: Topology::Triangles,
                index_count: mesh.index_count(),
            });
            issued += 1;
        }
    });

    issued
}

/// Runs camera, light and mesh passes in order.
pub fn render_frame<T: DrawTarget>(
    ctx: &mut RenderContext,
    user_transform: &Matrix4<f32>,
    target: &mut T,
) -> usize {
    camera_pass(ctx);
    light_pass(ctx);
    mesh_pass(ctx, user_transform, target)
}
