use std::io::Cursor;
use std::path::Path;

use image::DynamicImage;

use crate::error::PostError;
use crate::state::SourceImage;

static SUPPORTED_IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Returns `true` if the path has an extension the decoder understands.
pub fn is_supported_image(path: &Path) -> bool {
    let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
        return false;
    };
    SUPPORTED_IMAGE_EXTS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
}

pub fn supported_extensions() -> &'static [&'static str] {
    SUPPORTED_IMAGE_EXTS
}

/// Decode picked bytes into an upright source image.
pub fn decode(bytes: &[u8]) -> Result<SourceImage, PostError> {
    let img = image::load_from_memory(bytes).map_err(|e| PostError::DecodeFailure(e.to_string()))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(PostError::DecodeFailure("image has no pixels".into()));
    }
    let oriented = match read_orientation(bytes) {
        Some(tag) => apply_orientation(img, tag),
        None => img,
    };
    Ok(SourceImage::new(oriented))
}

/// Reads the EXIF orientation tag (1..=8), if the container carries one.
fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)
}

fn apply_orientation(img: DynamicImage, tag: u32) -> DynamicImage {
    match tag {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}
