use log::warn;

pub const SELECT_IMAGE_FIRST: &str = "Please select an image first";
pub const PERMISSIONS_REQUIRED: &str =
    "This app needs camera and media library permissions to work properly.";

/// Category of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Analysis requested without an image
    Validation,
    /// Camera or gallery access refused
    Permission,
    /// The picker itself failed
    Acquisition,
    /// The analysis finished with an error result
    Analysis,
}

/// A blocking alert shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn validation() -> Self {
        Notice {
            kind: NoticeKind::Validation,
            title: "Error".to_string(),
            message: SELECT_IMAGE_FIRST.to_string(),
        }
    }

    pub fn permission_denied() -> Self {
        Notice {
            kind: NoticeKind::Permission,
            title: "Permissions Required".to_string(),
            message: PERMISSIONS_REQUIRED.to_string(),
        }
    }

    pub fn acquisition_failed(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Acquisition,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    pub fn analysis_error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Analysis,
            title: "Analysis Error".to_string(),
            message: message.into(),
        }
    }
}

/// Surface that displays notices to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        warn!("{}: {}", notice.title, notice.message);
    }
}
