use std::fmt;

use thiserror::Error;

/// Why the photo library refused access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The user declined (or never granted) access.
    Denied,
    /// Device policy forbids access regardless of the user's choice.
    Restricted,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Denied => f.write_str(
                "In order to access the photo library, you must allow this application access to it.",
            ),
            Denial::Restricted => f.write_str(
                "Unable to access the photo library. Your device's restrictions do not allow access.",
            ),
        }
    }
}

/// A field the user still has to fill in before posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Image,
    Title,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingField::Image => f.write_str("photo"),
            MissingField::Title => f.write_str("caption"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PostError {
    #[error("The photo library is unavailable")]
    PhotoLibraryUnavailable,
    #[error("{0}")]
    AuthorizationDenied(Denial),
    #[error("image could not be decoded: {0}")]
    DecodeFailure(String),
    #[error("filter produced no output: {0}")]
    FilterFailure(String),
    #[error(
        "Make sure that you add a photo and a caption before posting (missing {}).",
        join_fields(.missing)
    )]
    ValidationError { missing: Vec<MissingField> },
    #[error("Unable to create post. Try again.")]
    SubmissionError(#[source] anyhow::Error),
}

/// Title and message for a blocking informational alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl PostError {
    /// Returns the alert shown to the user, or `None` for kinds that are
    /// absorbed locally (decode and filter failures).
    pub fn alert(&self) -> Option<Alert> {
        let title = match self {
            PostError::DecodeFailure(_) | PostError::FilterFailure(_) => return None,
            PostError::ValidationError { .. } => "Uh-oh",
            _ => "Error",
        };
        Some(Alert {
            title: title.to_string(),
            message: self.to_string(),
        })
    }
}

fn join_fields(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}
