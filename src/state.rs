use std::ops::RangeInclusive;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Slider values for the live filter preview.
pub struct FilterParameters {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub blur_radius: f32,
    pub vibrance: f32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            blur_radius: 0.0,
            vibrance: 0.0,
        }
    }
}

/// One adjustable control on the edit screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Brightness,
    Contrast,
    Saturation,
    BlurRadius,
    Vibrance,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::Brightness,
        FilterKind::Contrast,
        FilterKind::Saturation,
        FilterKind::BlurRadius,
        FilterKind::Vibrance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Brightness => "Brightness",
            FilterKind::Contrast => "Contrast",
            FilterKind::Saturation => "Saturation",
            FilterKind::BlurRadius => "Blur",
            FilterKind::Vibrance => "Vibrance",
        }
    }

    /// Declared slider range. Values outside it are not rejected.
    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            FilterKind::Brightness => -1.0..=1.0,
            FilterKind::Contrast => 0.25..=4.0,
            FilterKind::Saturation => 0.0..=2.0,
            FilterKind::BlurRadius => 0.0..=50.0,
            FilterKind::Vibrance => -1.0..=1.0,
        }
    }
}

impl FilterParameters {
    pub fn get(&self, kind: FilterKind) -> f32 {
        match kind {
            FilterKind::Brightness => self.brightness,
            FilterKind::Contrast => self.contrast,
            FilterKind::Saturation => self.saturation,
            FilterKind::BlurRadius => self.blur_radius,
            FilterKind::Vibrance => self.vibrance,
        }
    }

    pub fn set(&mut self, kind: FilterKind, value: f32) {
        let field = match kind {
            FilterKind::Brightness => &mut self.brightness,
            FilterKind::Contrast => &mut self.contrast,
            FilterKind::Saturation => &mut self.saturation,
            FilterKind::BlurRadius => &mut self.blur_radius,
            FilterKind::Vibrance => &mut self.vibrance,
        };
        *field = value;
    }
}

/// Height over width, the ratio the display surface is sized with.
pub fn aspect_ratio(img: &DynamicImage) -> f32 {
    if img.width() == 0 {
        return 1.0;
    }
    img.height() as f32 / img.width() as f32
}

/// The photo as picked, after orientation is applied.
#[derive(Debug, Clone)]
pub struct SourceImage(DynamicImage);

/// Working copy sized to the display viewport.
#[derive(Debug, Clone)]
pub struct ScaledImage(DynamicImage);

/// Filter output currently on screen.
#[derive(Debug, Clone)]
pub struct RenderedPreview(DynamicImage);

macro_rules! bitmap_newtype {
    ($name:ident) => {
        impl $name {
            pub fn new(img: DynamicImage) -> Self {
                Self(img)
            }

            pub fn image(&self) -> &DynamicImage {
                &self.0
            }

            pub fn width(&self) -> u32 {
                self.0.width()
            }

            pub fn height(&self) -> u32 {
                self.0.height()
            }

            pub fn aspect_ratio(&self) -> f32 {
                aspect_ratio(&self.0)
            }
        }
    };
}

bitmap_newtype!(SourceImage);
bitmap_newtype!(ScaledImage);
bitmap_newtype!(RenderedPreview);

/// Kind of media attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
}

/// A post ready to hand to the post-creation backend.
#[derive(Debug, Clone)]
pub struct Post {
    pub title: String,
    pub media_bytes: Vec<u8>,
    pub content_kind: ContentKind,
    pub aspect_ratio: f32,
}
