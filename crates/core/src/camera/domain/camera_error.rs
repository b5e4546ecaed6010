use thiserror::Error;

/// Why camera access was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionKind {
    /// The user or the OS denied access to the device.
    NotAllowed,
    /// No capture device matched the request.
    NotFound,
}

impl std::fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionKind::NotAllowed => write!(f, "NotAllowedError"),
            PermissionKind::NotFound => write!(f, "NotFoundError"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CameraError {
    /// Access could not be obtained. Recovered by the loop: logged, no retry.
    #[error("camera permission error ({kind}): {message}")]
    Permission {
        kind: PermissionKind,
        message: String,
    },
    /// The stream was open but a frame could not be read or decoded.
    #[error("failed to capture frame: {0}")]
    Capture(String),
    #[error("camera stream is not open")]
    NotOpen,
}

impl CameraError {
    pub fn not_allowed(message: impl Into<String>) -> Self {
        CameraError::Permission {
            kind: PermissionKind::NotAllowed,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CameraError::Permission {
            kind: PermissionKind::NotFound,
            message: message.into(),
        }
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, CameraError::Permission { .. })
    }
}
