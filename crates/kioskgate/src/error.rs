//! Unified error type for kioskgate.

use kioskgate_directory::DirectoryError;
use kioskgate_reader::ReaderError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// Only startup can fail with this type. Once the kiosk is running, card
/// rejections and directory failures are handled inside the user manager
/// and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum KioskError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The directory client could not be built from the configuration.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The reader could not be opened, attached or switched on. There is
    /// no kiosk without it.
    #[error("reader unavailable: {0}")]
    HardwareFatal(#[from] ReaderError),
}

impl KioskError {
    /// Process exit code for this error.
    ///
    /// Reader failures exit with 2 so a supervisor can tell a missing device
    /// from a bad configuration, which exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::HardwareFatal(_) => 2,
            Self::Config(_) | Self::Directory(_) => 1,
        }
    }
}
