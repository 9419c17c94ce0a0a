use std::time::Duration;

/// Errors reported by an RFID reader.
///
/// `OpenFailed` and `AttachTimeout` happen during startup and are fatal to
/// the kiosk: without a reader there is nothing to gate. `Command` and
/// `NotAttached` happen at runtime and are logged and survived.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The device (or its driver) could not be opened.
    #[error("reader open failed: {0}")]
    OpenFailed(String),

    /// No device attached within the startup window.
    #[error("no reader attached within {0:?}")]
    AttachTimeout(Duration),

    /// The device rejected a command (antenna, LED).
    #[error("reader command failed (code {code}): {message}")]
    Command { code: i32, message: String },

    /// A command was issued while no device is attached.
    #[error("reader is not attached")]
    NotAttached,
}
