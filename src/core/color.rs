use nalgebra::{Vector3, Vector4};

/// Packs a linear [0, 1] RGB color into a 0RGB `u32` as expected by the window buffer.
pub fn pack_argb(color: &Vector3<f32>) -> u32 {
    let r = (color.x.clamp(0.0, 1.0) * 255.0) as u32;
    let g = (color.y.clamp(0.0, 1.0) * 255.0) as u32;
    let b = (color.z.clamp(0.0, 1.0) * 255.0) as u32;
    (255 << 24) | (r << 16) | (g << 8) | b
}

/// Splits a packed 0RGB value back into its 8-bit channels.
pub fn unpack_rgb(color: u32) -> [u8; 3] {
    [
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    ]
}

/// Unweighted gray level: integer mean of the three channels.
#[inline]
pub fn average_gray(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 + g as u32 + b as u32) / 3) as u8
}

/// Drops the alpha component of an RGBA material color.
#[inline]
pub fn rgb(color: &Vector4<f32>) -> Vector3<f32> {
    color.xyz()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_and_unpack() {
        let packed = pack_argb(&Vector3::new(1.0, 0.0, 0.5));
        assert_eq!(packed >> 24, 255);
        assert_eq!(unpack_rgb(packed), [255, 0, 127]);
    }

    #[test]
    fn test_pack_clamps_out_of_range() {
        let packed = pack_argb(&Vector3::new(2.0, -1.0, 1.0));
        assert_eq!(unpack_rgb(packed), [255, 0, 255]);
    }

    #[test]
    fn test_average_gray_truncates() {
        assert_eq!(average_gray(255, 255, 255), 255);
        assert_eq!(average_gray(10, 20, 31), 20);
        assert_eq!(average_gray(0, 0, 2), 0);
    }
}
