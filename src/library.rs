use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use crate::decode;
use crate::error::{Denial, PostError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    NotDetermined,
    Denied,
    Restricted,
}

/// Raw bytes of a photo the user chose.
#[derive(Debug, Clone)]
pub struct PickedImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum PickOutcome {
    Picked(PickedImage),
    Cancelled,
}

/// Where photos come from.
pub trait PhotoLibrary {
    fn is_available(&self) -> bool;

    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask for access; only called while the status is `NotDetermined`.
    fn request_authorization(&mut self) -> AuthorizationStatus;

    /// Present the picker and block until the user chooses or cancels.
    fn pick_image(&mut self) -> anyhow::Result<PickOutcome>;
}

/// Checks access and, only when allowed, asks the library for a photo.
///
/// Returns `Ok(None)` when the user cancels the picker.
pub fn choose_image(library: &mut dyn PhotoLibrary) -> Result<Option<PickedImage>, PostError> {
    if !library.is_available() {
        return Err(PostError::PhotoLibraryUnavailable);
    }

    match library.authorization_status() {
        AuthorizationStatus::Authorized => {}
        AuthorizationStatus::NotDetermined => {
            let granted = library.request_authorization();
            if granted != AuthorizationStatus::Authorized {
                warn!(?granted, "user did not authorize access to the photo library");
                return Err(PostError::AuthorizationDenied(Denial::Denied));
            }
        }
        AuthorizationStatus::Denied => return Err(PostError::AuthorizationDenied(Denial::Denied)),
        AuthorizationStatus::Restricted => {
            return Err(PostError::AuthorizationDenied(Denial::Restricted));
        }
    }

    match library
        .pick_image()
        .map_err(|e| PostError::DecodeFailure(format!("{e:#}")))?
    {
        PickOutcome::Picked(picked) => {
            info!(name = %picked.name, bytes = picked.bytes.len(), "picked image");
            Ok(Some(picked))
        }
        PickOutcome::Cancelled => Ok(None),
    }
}

/// Photos in a local directory, chosen through the native file dialog.
pub struct SystemPhotoLibrary {
    dir: PathBuf,
}

impl SystemPhotoLibrary {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn probe(&self) -> AuthorizationStatus {
        match std::fs::read_dir(&self.dir) {
            Ok(_) => AuthorizationStatus::Authorized,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                AuthorizationStatus::Denied
            }
            Err(_) => AuthorizationStatus::NotDetermined,
        }
    }
}

impl PhotoLibrary for SystemPhotoLibrary {
    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.probe()
    }

    fn request_authorization(&mut self) -> AuthorizationStatus {
        match self.probe() {
            AuthorizationStatus::Authorized => AuthorizationStatus::Authorized,
            _ => AuthorizationStatus::Denied,
        }
    }

    fn pick_image(&mut self) -> anyhow::Result<PickOutcome> {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Choose Image")
            .set_directory(&self.dir)
            .add_filter("Images", decode::supported_extensions())
            .pick_file()
        else {
            return Ok(PickOutcome::Cancelled);
        };
        if !decode::is_supported_image(&path) {
            anyhow::bail!("{} is not a supported image", path.display());
        }
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        Ok(PickOutcome::Picked(PickedImage { name, bytes }))
    }
}
