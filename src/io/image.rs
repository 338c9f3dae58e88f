use crate::core::color::{average_gray, unpack_rgb};
use crate::error::{SceneError, SceneResult};
use image::{GrayImage, ImageBuffer, Rgb, RgbImage};
use log::info;
use rayon::prelude::*;
use std::path::Path;

/// Converts a packed 0RGB buffer (as shown in the window) into an RGB image.
pub fn buffer_to_image(buffer: &[u32], width: usize, height: usize) -> RgbImage {
    let mut img_buf = ImageBuffer::new(width as u32, height as u32);
    for (x, y, pixel) in img_buf.enumerate_pixels_mut() {
        let idx = (y as usize) * width + (x as usize);
        let color = buffer.get(idx).copied().unwrap_or(0);
        *pixel = Rgb(unpack_rgb(color));
    }
    img_buf
}

/// Saves a packed 0RGB buffer to an image file; the format follows the extension.
pub fn save_buffer_to_image(
    buffer: &[u32],
    width: usize,
    height: usize,
    path: &Path,
) -> SceneResult<()> {
    buffer_to_image(buffer, width, height).save(path)?;
    info!("Saved {}x{} image to {:?}", width, height, path);
    Ok(())
}

/// Unweighted grayscale: each output pixel is the integer mean of R, G and B.
/// Rows are converted in parallel.
pub fn to_grayscale(rgb: &RgbImage) -> GrayImage {
    let (width, height) = rgb.dimensions();
    let mut gray = GrayImage::new(width, height);
    if width == 0 {
        return gray;
    }

    let src_row = width as usize * 3;
    gray.par_chunks_mut(width as usize)
        .zip(rgb.as_raw().par_chunks(src_row))
        .for_each(|(dst, src)| {
            for (out, px) in dst.iter_mut().zip(src.chunks_exact(3)) {
                *out = average_gray(px[0], px[1], px[2]);
            }
        });
    gray
}

/// Reads `input`, writes its grayscale version to `output`, returns the image size.
pub fn convert_to_grayscale(input: &Path, output: &Path) -> SceneResult<(u32, u32)> {
    if !input.exists() {
        return Err(SceneError::FileNotFound(input.to_path_buf()));
    }
    let rgb = image::open(input)?.to_rgb8();
    let gray = to_grayscale(&rgb);
    gray.save(output)?;
    info!(
        "Converted {:?} to grayscale {:?} ({}x{})",
        input,
        output,
        gray.width(),
        gray.height()
    );
    Ok(gray.dimensions())
}
