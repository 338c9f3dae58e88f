use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::{Interpolatable, Shader};
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

/// Draws triangles onto a [`FrameBuffer`].
pub struct Rasterizer {
    pub cull_mode: CullMode,
    pub wireframe: bool,
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

impl CullMode {
    /// Parses the config spelling ("back", "front", "none"); anything else culls back faces.
    pub fn from_name(name: &str) -> Self {
        match name {
            "front" => CullMode::Front,
            "none" => CullMode::None,
            _ => CullMode::Back,
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

type ClipVertex<V> = (Vector4<f32>, V);

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::Back,
            wireframe: false,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Rasterize one triangle given clip-space coordinates and varyings.
    ///
    /// The triangle is clipped against the six frustum planes in homogeneous clip
    /// space (Sutherland–Hodgman), then fan-triangulated.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        // 1. Two vertex lists, swapped after each plane
        let mut current_poly: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        let mut clip_buffer: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);

        for i in 0..3 {
            current_poly.push((clip_coords[i], varyings[i]));
        }

        // 2. Clip planes as (axis, sign): sign * P[axis] <= P.w
        let planes = [
            (0, 1.0),  // right
            (0, -1.0), // left
            (1, 1.0),  // top
            (1, -1.0), // bottom
            (2, 1.0),  // far
            (2, -1.0), // near
        ];

        // 3. Clip against each plane in turn
        for &(axis, sign) in &planes {
            if current_poly.is_empty() {
                return;
            }
            clip_polygon_against_plane(&current_poly, &mut clip_buffer, axis, sign);
            std::mem::swap(&mut current_poly, &mut clip_buffer);
        }

        if current_poly.len() < 3 {
            return;
        }

        // 4. The result is convex; fan it out from the first vertex
        let v0 = current_poly[0];
        for i in 1..(current_poly.len() - 1) {
            let v1 = current_poly[i];
            let v2 = current_poly[i + 1];
            self.rasterize_triangle_clipped(
                framebuffer,
                shader,
                &[v0.0, v1.0, v2.0],
                &[v0.1, v1.1, v2.1],
            );
        }
    }

    /// Perspective division, viewport transform, culling and per-pixel shading
    /// of a triangle already inside the frustum.
    fn rasterize_triangle_clipped<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        // 1. Perspective division and viewport transform
        let mut screen_coords = [Point2::origin(); 3];
        let mut w_values = [0.0; 3];

        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            w_values[i] = clip_coords[i].w;
            screen_coords[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        // 2. Culling. Screen Y points down, so counter-clockwise triangles have negative area here.
        let v0 = screen_coords[0];
        let v1 = screen_coords[1];
        let v2 = screen_coords[2];
        let edge1 = v1 - v0;
        let edge2 = v2 - v1;
        let signed_area = edge1.x * edge2.y - edge1.y * edge2.x;

        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        // 3. Bounding box, scissored to the buffer
        let (min_x, min_y, max_x, max_y) = compute_bounding_box(&screen_coords);
        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = (max_x.min(framebuffer.buffer_width as i32 - 1)) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = (max_y.min(framebuffer.buffer_height as i32 - 1)) as usize;
        let wireframe = self.wireframe;

        // 4. Scan rows in parallel; each worker owns its row
        framebuffer
            .rows_mut()
            .skip(start_y)
            .take(end_y - start_y + 1)
            .for_each(|mut row| {
                let y = row.y;
                for x in start_x..=end_x {
                    let pixel_center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);

                    let Some(bary) = barycentric_coordinates(
                        pixel_center,
                        screen_coords[0],
                        screen_coords[1],
                        screen_coords[2],
                    ) else {
                        continue;
                    };

                    if !is_inside_triangle(bary) {
                        continue;
                    }

                    // Wireframe keeps only pixels near an edge
                    if wireframe {
                        let threshold = 0.02;
                        if bary.x > threshold && bary.y > threshold && bary.z > threshold {
                            continue;
                        }
                    }

                    let Some(corrected) =
                        perspective_correct_barycentric(bary, w_values[0], w_values[1], w_values[2])
                    else {
                        continue;
                    };

                    // Depth is interpolated in clip space, then mapped to [0, 1]
                    let z_clip = corrected.x * clip_coords[0].z
                        + corrected.y * clip_coords[1].z
                        + corrected.z * clip_coords[2].z;
                    let w_clip = corrected.x * w_values[0]
                        + corrected.y * w_values[1]
                        + corrected.z * w_values[2];
                    let depth = (z_clip / w_clip) * 0.5 + 0.5;

                    if row.depth_test_and_update(x, depth) {
                        let varying = varyings[0] * corrected.x
                            + varyings[1] * corrected.y
                            + varyings[2] * corrected.z;
                        row.set_pixel(x, shader.fragment(varying));
                    }
                }
            });
    }
}

/// Clips a polygon against one plane, writing into `output` (cleared first).
fn clip_polygon_against_plane<V: Interpolatable>(
    input: &[ClipVertex<V>],
    output: &mut Vec<ClipVertex<V>>,
    axis: usize,
    sign: f32,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let is_inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;

    let mut prev = last;
    let mut prev_inside = is_inside(&prev.0);

    for curr in input {
        let curr_inside = is_inside(&curr.0);

        if curr_inside {
            // OUT -> IN: intersection, then current
            if !prev_inside && let Some(inter) = intersect_edge_plane(prev, *curr, axis, sign) {
                output.push(inter);
            }
            output.push(*curr);
        } else if prev_inside && let Some(inter) = intersect_edge_plane(prev, *curr, axis, sign) {
            // IN -> OUT: intersection only
            output.push(inter);
        }

        prev = *curr;
        prev_inside = curr_inside;
    }
}

/// Intersection of segment a-b with the plane `sign * P[axis] = P.w`,
/// interpolating both position and varying.
#[inline(always)]
fn intersect_edge_plane<V: Interpolatable>(
    a: ClipVertex<V>,
    b: ClipVertex<V>,
    axis: usize,
    sign: f32,
) -> Option<ClipVertex<V>> {
    let ac = a.0[axis];
    let bc = b.0[axis];
    let aw = a.0.w;
    let bw = b.0.w;

    // t = (a.w - sign * a[axis]) / (sign * (b[axis] - a[axis]) - (b.w - a.w))
    let denom = sign * (bc - ac) - (bw - aw);
    if denom.abs() < 1e-9 {
        return None;
    }

    let t = (aw - sign * ac) / denom;
    if !t.is_finite() {
        return None;
    }

    let pos = a.0 + (b.0 - a.0) * t;
    let vary = a.1 * (1.0 - t) + b.1 * t;
    Some((pos, vary))
}

fn compute_bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
    (min_x, min_y, max_x, max_y)
}
