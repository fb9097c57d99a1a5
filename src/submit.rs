use std::io::Cursor;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use anyhow::Context;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use tracing::{info, warn};

use crate::error::{MissingField, PostError};
use crate::state::{ContentKind, Post, RenderedPreview};

/// JPEG quality for submitted photos; preview-grade is enough.
pub const DEFAULT_JPEG_QUALITY: u8 = 10;

/// Backend that turns a finished post into a published one.
pub trait PostSink: Send + Sync {
    fn create_post(&self, post: &Post) -> anyhow::Result<()>;
}

/// A submission running on a worker thread.
///
/// Poll it from the UI thread; the result arrives exactly once.
pub struct PendingPost {
    rx: mpsc::Receiver<Result<(), PostError>>,
}

impl PendingPost {
    /// Non-blocking check; `None` while the backend is still working.
    pub fn poll(&self) -> Option<Result<(), PostError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(PostError::SubmissionError(
                anyhow::anyhow!("post worker exited without a result"),
            ))),
        }
    }

    /// Block until the backend reports back or `timeout` passes.
    pub fn wait(self, timeout: Duration) -> Result<(), PostError> {
        self.rx.recv_timeout(timeout).unwrap_or_else(|e| {
            Err(PostError::SubmissionError(anyhow::anyhow!(
                "no result from post worker: {e}"
            )))
        })
    }
}

pub struct PostSubmitter {
    sink: Arc<dyn PostSink>,
    jpeg_quality: u8,
}

impl PostSubmitter {
    pub fn new(sink: Arc<dyn PostSink>, jpeg_quality: u8) -> Self {
        Self {
            sink,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Validate, encode, and hand the post to the sink on a worker thread.
    ///
    /// Validation failures return immediately and never reach the sink.
    pub fn submit(
        &self,
        displayed: Option<&RenderedPreview>,
        title: &str,
    ) -> Result<PendingPost, PostError> {
        let title = title.trim();
        let mut missing = Vec::new();
        if displayed.is_none() {
            missing.push(MissingField::Image);
        }
        if title.is_empty() {
            missing.push(MissingField::Title);
        }
        let Some(displayed) = displayed.filter(|_| missing.is_empty()) else {
            return Err(PostError::ValidationError { missing });
        };

        let media_bytes = encode_jpeg(displayed, self.jpeg_quality)
            .map_err(|e| PostError::SubmissionError(e.context("encoding post image")))?;
        let post = Post {
            title: title.to_string(),
            media_bytes,
            content_kind: ContentKind::Image,
            aspect_ratio: displayed.aspect_ratio(),
        };
        info!(
            title = %post.title,
            bytes = post.media_bytes.len(),
            aspect_ratio = post.aspect_ratio,
            "submitting post"
        );

        let (tx, rx) = mpsc::sync_channel(1);
        let sink = Arc::clone(&self.sink);
        std::thread::spawn(move || {
            let result = sink.create_post(&post).map_err(|e| {
                warn!(error = %format!("{e:#}"), "post creation failed");
                PostError::SubmissionError(e)
            });
            let _ = tx.send(result);
        });
        Ok(PendingPost { rx })
    }
}

fn encode_jpeg(img: &RenderedPreview, quality: u8) -> anyhow::Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.image().to_rgb8());
    rgb.write_with_encoder(encoder).context("jpeg encode failed")?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use image::{DynamicImage, ImageBuffer, Rgba};

    use crate::error::{MissingField, PostError};
    use crate::state::{ContentKind, Post, RenderedPreview};

    use super::{DEFAULT_JPEG_QUALITY, PostSink, PostSubmitter};

    #[derive(Default)]
    struct RecordingSink {
        posts: Mutex<Vec<Post>>,
        fail: bool,
    }

    impl PostSink for RecordingSink {
        fn create_post(&self, post: &Post) -> anyhow::Result<()> {
            self.posts.lock().unwrap().push(post.clone());
            if self.fail {
                anyhow::bail!("server said no");
            }
            Ok(())
        }
    }

    fn preview(w: u32, h: u32) -> RenderedPreview {
        RenderedPreview::new(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            w,
            h,
            Rgba([200, 120, 40, 255]),
        )))
    }

    fn submitter(sink: &Arc<RecordingSink>) -> PostSubmitter {
        PostSubmitter::new(sink.clone(), DEFAULT_JPEG_QUALITY)
    }

    #[test]
    fn empty_title_is_rejected_without_calling_sink() {
        let sink = Arc::new(RecordingSink::default());
        let img = preview(8, 6);
        let err = submitter(&sink).submit(Some(&img), "").err().unwrap();
        match err {
            PostError::ValidationError { missing } => {
                assert_eq!(missing, vec![MissingField::Title]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(sink.posts.lock().unwrap().is_empty());
    }

    #[test]
    fn whitespace_title_and_no_image_lists_both_fields() {
        let sink = Arc::new(RecordingSink::default());
        let err = submitter(&sink).submit(None, "   ").err().unwrap();
        assert!(matches!(
            err,
            PostError::ValidationError { ref missing }
                if missing == &vec![MissingField::Image, MissingField::Title]
        ));
        assert!(sink.posts.lock().unwrap().is_empty());
    }

    #[test]
    fn valid_post_reaches_sink_with_image_kind_and_ratio() {
        let sink = Arc::new(RecordingSink::default());
        let img = preview(40, 30);
        let pending = submitter(&sink).submit(Some(&img), "Sunset").unwrap();
        pending.wait(Duration::from_secs(5)).unwrap();

        let posts = sink.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.title, "Sunset");
        assert_eq!(post.content_kind, ContentKind::Image);
        assert!(!post.media_bytes.is_empty());
        assert_eq!(&post.media_bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(post.aspect_ratio, 0.75);
    }

    #[test]
    fn sink_failure_becomes_submission_error() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let img = preview(4, 4);
        let pending = submitter(&sink).submit(Some(&img), "Sunset").unwrap();
        let err = pending.wait(Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, PostError::SubmissionError(_)));
        assert_eq!(err.alert().unwrap().message, "Unable to create post. Try again.");
    }

    #[test]
    fn poll_eventually_yields_the_result_once() {
        let sink = Arc::new(RecordingSink::default());
        let img = preview(4, 4);
        let pending = submitter(&sink).submit(Some(&img), "Sunset").unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let result = loop {
            if let Some(r) = pending.poll() {
                break r;
            }
            assert!(std::time::Instant::now() < deadline, "post never completed");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert!(result.is_ok());
    }
}
