use image::DynamicImage;
use imageproc::filter::gaussian_blur_f32;

use crate::error::PostError;

/// Gaussian blur with `radius` used as sigma. Zero radius is a no-op.
pub fn apply(img: DynamicImage, radius: f32) -> Result<DynamicImage, PostError> {
    if !radius.is_finite() {
        return Err(PostError::FilterFailure(format!(
            "blur radius {radius} is not finite"
        )));
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(PostError::FilterFailure("blur stage got an empty image".into()));
    }
    if radius < 0.001 {
        return Ok(img);
    }

    let rgba = img.to_rgba8();
    Ok(DynamicImage::ImageRgba8(gaussian_blur_f32(&rgba, radius)))
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgba};

    use crate::error::PostError;

    use super::apply;

    fn edge() -> DynamicImage {
        let mut buf = ImageBuffer::from_pixel(8, 2, Rgba([220u8, 220, 220, 255]));
        for x in 0..4 {
            for y in 0..2 {
                buf.put_pixel(x, y, Rgba([20, 20, 20, 255]));
            }
        }
        DynamicImage::ImageRgba8(buf)
    }

    #[test]
    fn zero_radius_is_identity() {
        let img = edge();
        let out = apply(img.clone(), 0.0).unwrap();
        assert_eq!(img.to_rgba8(), out.to_rgba8());
    }

    #[test]
    fn negative_radius_is_identity() {
        let img = edge();
        let out = apply(img.clone(), -3.0).unwrap();
        assert_eq!(img.to_rgba8(), out.to_rgba8());
    }

    #[test]
    fn positive_radius_softens_the_edge() {
        let out = apply(edge(), 2.0).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (8, 2));
        let dark_side = out.get_pixel(3, 0)[0];
        assert!(dark_side > 20);
    }

    #[test]
    fn infinite_radius_fails() {
        assert!(matches!(
            apply(edge(), f32::INFINITY),
            Err(PostError::FilterFailure(_))
        ));
    }
}
