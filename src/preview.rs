use tracing::{info, warn};

use crate::decode;
use crate::error::PostError;
use crate::processing::{pipeline, scale};
use crate::state::{FilterKind, FilterParameters, RenderedPreview, ScaledImage, SourceImage};

/// Display area for the preview, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_density: f32,
}

impl Viewport {
    fn fit(&mut self, aspect_ratio: f32) {
        self.height = self.width * aspect_ratio;
    }
}

struct Loaded {
    source: SourceImage,
    scaled: ScaledImage,
    displayed: RenderedPreview,
}

enum State {
    Empty,
    Loaded(Loaded),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Empty,
    Loaded,
}

/// Owns the picked photo and its live, filtered preview.
pub struct PreviewController {
    state: State,
    params: FilterParameters,
    viewport: Viewport,
    /// Bumped whenever the displayed bitmap is replaced.
    revision: u64,
}

impl PreviewController {
    pub fn new(viewport_width: f32, pixel_density: f32, params: FilterParameters) -> Self {
        let mut viewport = Viewport {
            width: viewport_width,
            height: 0.0,
            pixel_density,
        };
        viewport.fit(1.0);
        Self {
            state: State::Empty,
            params,
            viewport,
            revision: 0,
        }
    }

    pub fn state(&self) -> PreviewState {
        match self.state {
            State::Empty => PreviewState::Empty,
            State::Loaded(_) => PreviewState::Loaded,
        }
    }

    pub fn screen_title(&self) -> &'static str {
        match self.state {
            State::Empty => "New Post",
            State::Loaded(_) => "Edit Photo",
        }
    }

    pub fn parameters(&self) -> &FilterParameters {
        &self.params
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn source(&self) -> Option<&SourceImage> {
        match &self.state {
            State::Loaded(l) => Some(&l.source),
            State::Empty => None,
        }
    }

    pub fn scaled(&self) -> Option<&ScaledImage> {
        match &self.state {
            State::Loaded(l) => Some(&l.scaled),
            State::Empty => None,
        }
    }

    pub fn displayed(&self) -> Option<&RenderedPreview> {
        match &self.state {
            State::Loaded(l) => Some(&l.displayed),
            State::Empty => None,
        }
    }

    /// Replace the current photo with freshly picked bytes.
    ///
    /// Decode and scale failures are logged and leave the screen as it was.
    pub fn select_image(&mut self, bytes: &[u8]) {
        match self.try_select_image(bytes) {
            Ok(()) => {}
            Err(err) => warn!(%err, "ignoring picked image"),
        }
    }

    fn try_select_image(&mut self, bytes: &[u8]) -> Result<(), PostError> {
        let source = decode::decode(bytes)?;
        let mut viewport = self.viewport;
        viewport.fit(source.aspect_ratio());
        let scaled = scale_for(&source, viewport)?;
        let displayed = match pipeline::apply(&scaled, &self.params) {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!(%err, "filtering new image failed; showing it unfiltered");
                RenderedPreview::new(scaled.image().clone())
            }
        };
        info!(
            width = source.width(),
            height = source.height(),
            scaled_width = scaled.width(),
            scaled_height = scaled.height(),
            "loaded image"
        );
        self.viewport = viewport;
        self.state = State::Loaded(Loaded {
            source,
            scaled,
            displayed,
        });
        self.revision += 1;
        Ok(())
    }

    pub fn set_parameter(&mut self, kind: FilterKind, value: f32) {
        self.params.set(kind, value);
        self.refresh();
    }

    pub fn set_parameters(&mut self, params: FilterParameters) {
        self.params = params;
        self.refresh();
    }

    /// Track a resized display area; rescales the working copy if loaded.
    pub fn set_viewport(&mut self, width: f32, pixel_density: f32) {
        if (width - self.viewport.width).abs() < 0.5
            && (pixel_density - self.viewport.pixel_density).abs() < f32::EPSILON
        {
            return;
        }
        self.viewport.width = width;
        self.viewport.pixel_density = pixel_density;

        let State::Loaded(loaded) = &mut self.state else {
            self.viewport.fit(1.0);
            return;
        };
        self.viewport.fit(loaded.source.aspect_ratio());
        match scale_for(&loaded.source, self.viewport) {
            Ok(scaled) => loaded.scaled = scaled,
            Err(err) => {
                warn!(%err, "rescaling for new viewport failed");
                return;
            }
        }
        self.refresh();
    }

    /// Re-render from the scaled copy. On failure the previous preview stays.
    fn refresh(&mut self) {
        let State::Loaded(loaded) = &mut self.state else {
            return;
        };
        match pipeline::apply(&loaded.scaled, &self.params) {
            Ok(rendered) => {
                self.viewport.fit(rendered.aspect_ratio());
                loaded.displayed = rendered;
                self.revision += 1;
            }
            Err(err) => warn!(%err, "keeping previous preview"),
        }
    }
}

fn scale_for(source: &SourceImage, viewport: Viewport) -> Result<ScaledImage, PostError> {
    let (w, h) = scale::target_size(viewport.width, viewport.height, viewport.pixel_density);
    scale::scale(source, w, h)
}
