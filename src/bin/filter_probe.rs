use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

#[path = "../decode.rs"]
mod decode;
#[path = "../error.rs"]
mod error;
#[path = "../processing/mod.rs"]
mod processing;
#[path = "../state.rs"]
mod state;

/// Display size the probe scales to, in pixels.
const PROBE_WIDTH: f32 = 1170.0;

fn list_images(dir: &Path, limit: usize) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read_dir failed for {}", dir.display()))?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && decode::is_supported_image(p))
        .collect();
    files.sort();
    files.truncate(limit);
    Ok(files)
}

fn median_ms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    }
}

/// One slider sweep: each control nudged once, as a user would.
fn sweep() -> Vec<state::FilterParameters> {
    let base = state::FilterParameters::default();
    state::FilterKind::ALL
        .iter()
        .map(|&kind| {
            let mut p = base;
            let range = kind.range();
            p.set(kind, range.start() + (range.end() - range.start()) * 0.6);
            p
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args();
    let _bin = args.next();
    let dir = args
        .next()
        .map(PathBuf::from)
        .context("usage: filter_probe <image-dir> [count]")?;
    let count = args
        .next()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(20);

    let files = list_images(&dir, count)?;
    if files.is_empty() {
        anyhow::bail!("No images found in {}", dir.display());
    }
    eprintln!("Using {} images from {}", files.len(), dir.display());

    let params = sweep();
    let mut scale_samples = Vec::with_capacity(files.len());
    let mut slider_samples = Vec::with_capacity(files.len() * params.len());
    for path in &files {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let source = decode::decode(&bytes)
            .with_context(|| format!("decode failed for {}", path.display()))?;

        let t0 = Instant::now();
        let (w, h) = processing::scale::target_size(
            PROBE_WIDTH,
            PROBE_WIDTH * source.aspect_ratio(),
            1.0,
        );
        let scaled = processing::scale::scale(&source, w, h)?;
        scale_samples.push(t0.elapsed().as_secs_f64() * 1000.0);

        for p in &params {
            let t0 = Instant::now();
            processing::pipeline::apply(&scaled, p)?;
            slider_samples.push(t0.elapsed().as_secs_f64() * 1000.0);
        }
    }

    println!("METRIC file_count={}", files.len());
    println!("METRIC scale_ms_median={:.2}", median_ms(&scale_samples));
    println!("METRIC slider_ms_median={:.2}", median_ms(&slider_samples));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{median_ms, sweep};

    #[test]
    fn median_of_even_sample_averages_middle_pair() {
        assert_eq!(median_ms(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median_ms(&[]), 0.0);
    }

    #[test]
    fn sweep_moves_one_control_per_step() {
        let steps = sweep();
        assert_eq!(steps.len(), 5);
        assert!(steps[3].blur_radius > 0.0);
        assert_eq!(steps[3].brightness, 0.0);
    }
}
