use std::time::Instant;

use crate::error::PostError;
use crate::state::{FilterParameters, RenderedPreview, ScaledImage};

use super::{blur, color};

/// Runs the color stage then the blur stage over `scaled`.
///
/// Nothing is cached between calls; every invocation starts again from
/// the scaled working copy, which is only borrowed.
pub fn apply(scaled: &ScaledImage, params: &FilterParameters) -> Result<RenderedPreview, PostError> {
    let started = Instant::now();
    let colored = color::apply(scaled.image(), params)?;
    let blurred = blur::apply(colored, params.blur_radius)?;
    tracing::debug!(
        width = scaled.width(),
        height = scaled.height(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "rendered preview"
    );
    Ok(RenderedPreview::new(blurred))
}
