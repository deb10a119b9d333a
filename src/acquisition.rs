use crate::model::CapturedImage;
use crate::ReceiptError;
use async_trait::async_trait;
use log::{debug, info};
use std::path::PathBuf;

/// Where the user asked the image to come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    Camera,
    Gallery,
}

/// Result of asking the host platform for an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    Selected(CapturedImage),
    /// The user backed out of the picker
    Cancelled,
    /// Camera or media library access was refused
    PermissionDenied,
}

/// Host capability that produces receipt images
#[async_trait]
pub trait ImageAcquirer: Send + Sync {
    async fn capture_from_camera(&self) -> Result<Acquisition, ReceiptError>;

    async fn select_from_gallery(&self) -> Result<Acquisition, ReceiptError>;

    async fn acquire(&self, origin: ImageOrigin) -> Result<Acquisition, ReceiptError> {
        match origin {
            ImageOrigin::Camera => self.capture_from_camera().await,
            ImageOrigin::Gallery => self.select_from_gallery().await,
        }
    }
}

/// Acquires images from the local filesystem.
///
/// The "gallery" is a single file chosen up front; there is no camera.
#[derive(Debug, Clone, Default)]
pub struct FileAcquirer {
    path: Option<PathBuf>,
}

impl FileAcquirer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileAcquirer {
            path: Some(path.into()),
        }
    }

    /// An acquirer with nothing to pick, which behaves like a dismissed picker
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageAcquirer for FileAcquirer {
    async fn capture_from_camera(&self) -> Result<Acquisition, ReceiptError> {
        info!("No camera available on this host");
        Ok(Acquisition::PermissionDenied)
    }

    async fn select_from_gallery(&self) -> Result<Acquisition, ReceiptError> {
        let Some(path) = &self.path else {
            return Ok(Acquisition::Cancelled);
        };

        let bytes = tokio::fs::read(path).await?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());

        Ok(Acquisition::Selected(CapturedImage::from_bytes(
            path.to_string_lossy(),
            &bytes,
        )))
    }
}
