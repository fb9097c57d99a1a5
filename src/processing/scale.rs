use image::imageops::FilterType;

use crate::error::PostError;
use crate::state::{ScaledImage, SourceImage};

/// Pixel size of the working copy for a viewport measured in points.
pub fn target_size(view_width: f32, view_height: f32, pixel_density: f32) -> (u32, u32) {
    let px = |points: f32| {
        let v = (points * pixel_density).round();
        if v.is_finite() && v >= 1.0 { v as u32 } else { 1 }
    };
    (px(view_width), px(view_height))
}

/// Resample `src` to exactly `width` x `height`.
///
/// The caller decides the aspect ratio through the target it passes; no
/// letterboxing or cropping happens here.
pub fn scale(src: &SourceImage, width: u32, height: u32) -> Result<ScaledImage, PostError> {
    if src.width() == 0 || src.height() == 0 {
        return Err(PostError::DecodeFailure("source image is empty".into()));
    }
    let (width, height) = (width.max(1), height.max(1));
    if (width, height) == (src.width(), src.height()) {
        return Ok(ScaledImage::new(src.image().clone()));
    }
    let resized = src.image().resize_exact(width, height, FilterType::Triangle);
    Ok(ScaledImage::new(resized))
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgba};

    use crate::error::PostError;
    use crate::state::SourceImage;

    use super::{scale, target_size};

    fn source(w: u32, h: u32) -> SourceImage {
        SourceImage::new(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            w,
            h,
            Rgba([90, 90, 90, 255]),
        )))
    }

    #[test]
    fn target_size_applies_pixel_density() {
        assert_eq!(target_size(320.0, 240.0, 2.0), (640, 480));
        assert_eq!(target_size(100.4, 50.6, 1.0), (100, 51));
    }

    #[test]
    fn target_size_never_collapses_to_zero() {
        assert_eq!(target_size(0.0, f32::NAN, 2.0), (1, 1));
    }

    #[test]
    fn scale_hits_requested_size_exactly() {
        let out = scale(&source(400, 300), 100, 50).unwrap();
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn empty_source_fails_to_scale() {
        let empty = SourceImage::new(DynamicImage::new_rgba8(0, 0));
        assert!(matches!(
            scale(&empty, 10, 10),
            Err(PostError::DecodeFailure(_))
        ));
    }
}
