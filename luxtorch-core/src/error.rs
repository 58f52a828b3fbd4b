//! Error types for torch and sensor access.

use std::path::PathBuf;

/// Errors that can occur when driving the torch or reading sensors.
///
/// None of these are fatal to the screen: the controller turns them into
/// [`Notice`](crate::Notice)s and disables the affected feature.
#[derive(Debug, thiserror::Error)]
pub enum TorchError {
    /// No torch (camera flash LED) was found on this device.
    #[error("No camera torch found")]
    NoTorch,

    /// No light or proximity sensor was found on this device.
    #[error("Device does not support sensors")]
    NoSensors,

    /// Access to the torch was denied.
    #[error("Permission denied for torch control")]
    PermissionDenied,

    /// The torch rejected a state change.
    #[error("Error controlling flash: {0}")]
    TorchControl(String),

    /// A sysfs attribute held something other than a number.
    #[error("Invalid reading {value:?} in {}", .path.display())]
    InvalidReading {
        /// The attribute that was read.
        path: PathBuf,
        /// The raw contents.
        value: String,
    },

    /// An I/O error occurred while talking to sysfs.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TorchError {
    /// Map an I/O error, turning `EACCES`/`EPERM` into [`TorchError::PermissionDenied`].
    pub(crate) fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => TorchError::PermissionDenied,
            _ => TorchError::Io(err),
        }
    }
}
