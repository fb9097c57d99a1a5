use image::DynamicImage;
use rayon::prelude::*;

use crate::error::PostError;
use crate::state::FilterParameters;

/// Applies brightness, contrast, saturation, and vibrance in one pass.
///
/// Per pixel: saturation mixes with Rec. 709 luma, vibrance scales chroma
/// by how muted the pixel already is, brightness is added, and contrast
/// pivots around mid-gray. Parameters are not range-checked; results are
/// clamped per channel.
pub fn apply(img: &DynamicImage, params: &FilterParameters) -> Result<DynamicImage, PostError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(PostError::FilterFailure("color stage got an empty image".into()));
    }
    let FilterParameters {
        brightness,
        contrast,
        saturation,
        vibrance,
        ..
    } = *params;
    if ![brightness, contrast, saturation, vibrance]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(PostError::FilterFailure(format!(
            "non-finite color parameters {params:?}"
        )));
    }
    if brightness.abs() < 0.001
        && (contrast - 1.0).abs() < 0.001
        && (saturation - 1.0).abs() < 0.001
        && vibrance.abs() < 0.001
    {
        return Ok(img.clone());
    }

    let mut rgba = img.to_rgba8();
    rgba.par_chunks_exact_mut(4).for_each(|px| {
        let mut rgb = [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
        ];

        mix_with_luma(&mut rgb, saturation);

        if vibrance.abs() >= 0.001 {
            let max = rgb[0].max(rgb[1].max(rgb[2]));
            let min = rgb[0].min(rgb[1].min(rgb[2]));
            let chroma = (max - min).clamp(0.0, 1.0);
            mix_with_luma(&mut rgb, 1.0 + vibrance * (1.0 - chroma));
        }

        for (c, v) in rgb.iter().enumerate() {
            let out = ((v + brightness) - 0.5) * contrast + 0.5;
            px[c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    });

    Ok(DynamicImage::ImageRgba8(rgba))
}

fn mix_with_luma(rgb: &mut [f32; 3], amount: f32) {
    let luma = 0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2];
    for v in rgb.iter_mut() {
        *v = luma + (*v - luma) * amount;
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgba};

    use crate::error::PostError;
    use crate::state::FilterParameters;

    use super::apply;

    fn one_pixel(rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            1,
            1,
            Rgba([rgb[0], rgb[1], rgb[2], 255]),
        ))
    }

    fn pixel_rgb(img: &DynamicImage) -> [u8; 3] {
        let p = img.to_rgba8().get_pixel(0, 0).0;
        [p[0], p[1], p[2]]
    }

    fn spread(rgb: [u8; 3]) -> i32 {
        let max = *rgb.iter().max().unwrap() as i32;
        let min = *rgb.iter().min().unwrap() as i32;
        max - min
    }

    fn gradient() -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(16, 8, |x, y| {
            Rgba([(x * 16) as u8, (y * 32) as u8, ((x + y) * 8) as u8, 200])
        }))
    }

    #[test]
    fn positive_brightness_lifts_gray() {
        let params = FilterParameters {
            brightness: 0.2,
            ..Default::default()
        };
        let out = apply(&one_pixel([100, 100, 100]), &params).unwrap();
        assert!(pixel_rgb(&out)[0] > 100);
    }

    #[test]
    fn higher_contrast_pushes_darks_down() {
        let params = FilterParameters {
            contrast: 2.0,
            ..Default::default()
        };
        let out = apply(&one_pixel([60, 60, 60]), &params).unwrap();
        assert!(pixel_rgb(&out)[0] < 60);
    }

    #[test]
    fn zero_saturation_yields_gray() {
        let params = FilterParameters {
            saturation: 0.0,
            ..Default::default()
        };
        let out = apply(&one_pixel([200, 40, 40]), &params).unwrap();
        assert!(spread(pixel_rgb(&out)) <= 1);
    }

    #[test]
    fn vibrance_boosts_muted_colors_more_than_vivid_ones() {
        let params = FilterParameters {
            vibrance: 1.0,
            ..Default::default()
        };
        let muted = [140, 120, 110];
        let vivid = [230, 30, 30];
        let muted_gain = spread(pixel_rgb(&apply(&one_pixel(muted), &params).unwrap())) as f32
            / spread(muted) as f32;
        let vivid_gain = spread(pixel_rgb(&apply(&one_pixel(vivid), &params).unwrap())) as f32
            / spread(vivid) as f32;
        assert!(muted_gain > vivid_gain);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let params = FilterParameters {
            brightness: -0.3,
            contrast: 1.7,
            saturation: 0.4,
            blur_radius: 0.0,
            vibrance: 0.25,
        };
        let img = gradient();
        let a = apply(&img, &params).unwrap();
        let b = apply(&img, &params).unwrap();
        assert_eq!(a.to_rgba8(), b.to_rgba8());
    }

    #[test]
    fn alpha_and_dimensions_survive() {
        let params = FilterParameters {
            contrast: 3.0,
            ..Default::default()
        };
        let out = apply(&gradient(), &params).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (16, 8));
        assert!(out.pixels().all(|p| p[3] == 200));
    }

    #[test]
    fn out_of_range_values_are_clamped_not_rejected() {
        let params = FilterParameters {
            brightness: 10.0,
            ..Default::default()
        };
        let out = apply(&one_pixel([10, 10, 10]), &params).unwrap();
        assert_eq!(pixel_rgb(&out), [255, 255, 255]);
    }

    #[test]
    fn non_finite_parameter_is_a_filter_failure() {
        let params = FilterParameters {
            contrast: f32::NAN,
            ..Default::default()
        };
        let err = apply(&one_pixel([1, 2, 3]), &params).unwrap_err();
        assert!(matches!(err, PostError::FilterFailure(_)));
    }
}
