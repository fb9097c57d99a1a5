use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::state::{ContentKind, Post};
use crate::submit::PostSink;

/// JSON record written next to each post's image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostManifest {
    pub title: String,
    pub content_kind: ContentKind,
    pub aspect_ratio: f32,
    pub media_file: String,
    pub media_len: usize,
    pub created_at_ms: u64,
}

/// Stores posts as files in a local directory.
pub struct Outbox {
    dir: PathBuf,
}

impl Outbox {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photopost")
            .join("outbox")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `post` and returns the manifest path.
    pub fn store(&self, post: &Post) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create_dir_all {}", self.dir.display()))?;

        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        let stem = unique_stem(&self.dir, &slug(&post.title), created_at_ms);
        let media_file = format!("{stem}.jpg");
        let media_path = self.dir.join(&media_file);
        std::fs::write(&media_path, &post.media_bytes)
            .with_context(|| format!("write {}", media_path.display()))?;

        let manifest = PostManifest {
            title: post.title.clone(),
            content_kind: post.content_kind,
            aspect_ratio: post.aspect_ratio,
            media_file,
            media_len: post.media_bytes.len(),
            created_at_ms,
        };
        let manifest_path = self.dir.join(format!("{stem}.json"));
        let json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(&manifest_path, json)
            .with_context(|| format!("write {}", manifest_path.display()))?;
        Ok(manifest_path)
    }
}

impl PostSink for Outbox {
    fn create_post(&self, post: &Post) -> anyhow::Result<()> {
        let path = self.store(post)?;
        tracing::info!(manifest = %path.display(), "post stored");
        Ok(())
    }
}

fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "post".to_string()
    } else {
        trimmed.chars().take(48).collect()
    }
}

fn unique_stem(dir: &Path, slug: &str, millis: u64) -> String {
    let base = format!("{slug}-{millis}");
    if !dir.join(format!("{base}.json")).exists() {
        return base;
    }
    for n in 2..10000 {
        let candidate = format!("{base}-{n}");
        if !dir.join(format!("{candidate}.json")).exists() {
            return candidate;
        }
    }
    format!("{base}-final")
}
