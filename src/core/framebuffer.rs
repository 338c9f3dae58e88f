use crate::core::color::pack_argb;
use nalgebra::Vector3;
use rayon::prelude::*;

/// Represents a 2D buffer containing color and depth information.
///
/// Internally the buffer is `sample_count` times larger on each axis (SSAA).
/// Parallel rasterization works row by row: every worker receives a disjoint
/// [`RowMut`], so no locking is needed.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    color: Vec<Vector3<f32>>,
    depth: Vec<f32>,
}

/// Mutable view of one scanline of the supersampled buffer.
pub struct RowMut<'a> {
    pub y: usize,
    color: &'a mut [Vector3<f32>],
    depth: &'a mut [f32],
}

impl RowMut<'_> {
    /// Depth test and update. Returns true if the new depth is closer.
    #[inline]
    pub fn depth_test_and_update(&mut self, x: usize, new_depth: f32) -> bool {
        match self.depth.get_mut(x) {
            Some(current) if new_depth < *current => {
                *current = new_depth;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, color: Vector3<f32>) {
        if let Some(pixel) = self.color.get_mut(x) {
            *pixel = color;
        }
    }
}

impl FrameBuffer {
    /// sample_count: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color: vec![Vector3::zeros(); size],
            depth: vec![f32::INFINITY; size],
        }
    }

    /// Resets every sample to `color` and the depth buffer to infinity.
    pub fn clear(&mut self, color: Vector3<f32>) {
        self.color.par_iter_mut().for_each(|c| *c = color);
        self.depth.par_iter_mut().for_each(|d| *d = f32::INFINITY);
    }

    /// Parallel iterator over scanlines of the supersampled buffer.
    pub fn rows_mut(&mut self) -> impl IndexedParallelIterator<Item = RowMut<'_>> + '_ {
        // Zero-width buffers have no rows.
        let w = self.buffer_width.max(1);
        self.color
            .par_chunks_mut(w)
            .zip(self.depth.par_chunks_mut(w))
            .enumerate()
            .map(|(y, (color, depth))| RowMut { y, color, depth })
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    /// Depth of a single sample, in buffer coordinates.
    pub fn sample_depth(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.buffer_width && y < self.buffer_height {
            Some(self.depth[self.index(x, y)])
        } else {
            None
        }
    }

    /// Resolved (box-filtered) color of an output pixel.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector3<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }

        if self.sample_count == 1 {
            return Some(self.color[self.index(x, y)]);
        }

        let mut sum_color = Vector3::zeros();
        let start_x = x * self.sample_count;
        let start_y = y * self.sample_count;

        for dy in 0..self.sample_count {
            for dx in 0..self.sample_count {
                sum_color += self.color[self.index(start_x + dx, start_y + dy)];
            }
        }

        let samples = (self.sample_count * self.sample_count) as f32;
        Some(sum_color / samples)
    }

    /// Resolves the buffer into packed 0RGB pixels (`out.len() == width * height`).
    pub fn resolve_into(&self, out: &mut [u32]) {
        if self.width == 0 {
            return;
        }
        out.par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = self.get_pixel(x, y).map(|c| pack_argb(&c)).unwrap_or(0);
                }
            });
    }
}
