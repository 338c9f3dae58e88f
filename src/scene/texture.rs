use crate::error::{SceneError, SceneResult};
use image::{DynamicImage, GenericImageView};
use log::info;
use nalgebra::Vector3;
use std::path::Path;
use std::sync::Arc;

/// A diffuse texture map sampled with repeat wrapping.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: Arc<DynamicImage>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(SceneError::FileNotFound(path_ref.to_path_buf()));
        }
        let img = image::open(path_ref)?;
        info!(
            "Loaded texture: {:?} ({}x{})",
            path_ref,
            img.width(),
            img.height()
        );
        Ok(Self::from_image(img))
    }

    pub fn from_image(img: DynamicImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            image: Arc::new(img),
        }
    }

    /// Bilinear sample at (u, v). V runs bottom to top, as in OBJ texture coordinates.
    pub fn sample(&self, u: f32, v: f32) -> Vector3<f32> {
        if self.width == 0 || self.height == 0 {
            return Vector3::new(1.0, 1.0, 1.0);
        }

        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        // Pixel centers sit at +0.5.
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5;

        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let wx = x - x.floor();
        let wy = y - y.floor();

        let c00 = self.get_pixel_wrapped(x0, y0);
        let c10 = self.get_pixel_wrapped(x0 + 1, y0);
        let c01 = self.get_pixel_wrapped(x0, y0 + 1);
        let c11 = self.get_pixel_wrapped(x0 + 1, y0 + 1);

        let top = c00 * (1.0 - wx) + c10 * wx;
        let bottom = c01 * (1.0 - wx) + c11 * wx;
        top * (1.0 - wy) + bottom * wy
    }

    fn get_pixel_wrapped(&self, x: i32, y: i32) -> Vector3<f32> {
        let x = x.rem_euclid(self.width as i32) as u32;
        let y = y.rem_euclid(self.height as i32) as u32;
        let pixel = self.image.get_pixel(x, y);
        Vector3::new(
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_uniform_texture_samples_its_color() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let tex = Texture::from_image(DynamicImage::ImageRgba8(img));
        for (u, v) in [(0.0, 0.0), (0.5, 0.5), (1.7, -0.3)] {
            let c = tex.sample(u, v);
            assert!((c - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
        }
    }

    #[test]
    fn test_v_axis_is_flipped() {
        // Top row white, bottom row black.
        let mut img = RgbaImage::from_pixel(1, 2, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        let tex = Texture::from_image(DynamicImage::ImageRgba8(img));

        // v = 0.75 is the center of the top texel.
        assert!((tex.sample(0.5, 0.75).x - 1.0).abs() < 1e-5);
        assert!(tex.sample(0.5, 0.25).x.abs() < 1e-5);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = Texture::load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, SceneError::FileNotFound(_)));
    }
}
