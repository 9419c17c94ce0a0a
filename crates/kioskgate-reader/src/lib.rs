//! RFID reader abstraction for kioskgate.
//!
//! Provides the [`Reader`] trait (the control surface the kiosk drives),
//! the [`ReaderEvent`] enum (what the hardware reports), and
//! [`EventSink`], the hand-off that carries events from the driver's thread
//! into the kiosk's async task without ever blocking the driver.
//!
//! No vendor driver lives here. [`SimulatedReader`] stands in for one in
//! tests and in the stdin-driven binary.
//!
//! # How it fits in the stack
//!
//! ```text
//! driver thread ──emit()──→ EventSink ──channel──→ user manager task
//!       ↑                                              │
//!       └────── set_led_on / set_antenna_on ───────────┘
//! ```

mod error;
mod simulated;
mod sink;

pub use error::ReaderError;
pub use simulated::SimulatedReader;
pub use sink::{EventReceiver, EventSink, event_channel};

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// How long startup waits for a device to attach.
pub const DEFAULT_ATTACH_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// ReaderEvent
// ---------------------------------------------------------------------------

/// Something the reader hardware reported.
///
/// Tag identifiers are the reader's hex rendering of the card ID
/// (`"023af76c"`), passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    /// A device attached.
    Attach { serial: u32 },

    /// A device detached.
    Detach { serial: u32 },

    /// The device reported an asynchronous error.
    Error { code: i32, message: String },

    /// A card entered the antenna field.
    TagGained(String),

    /// A card left the antenna field.
    TagLost(String),

    /// A digital output changed state.
    OutputChanged { index: u8, state: bool },
}

impl fmt::Display for ReaderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attach { serial } => write!(f, "attach({serial})"),
            Self::Detach { serial } => write!(f, "detach({serial})"),
            Self::Error { code, message } => {
                write!(f, "error({code}: {message})")
            }
            Self::TagGained(tag) => write!(f, "tag-gained({tag})"),
            Self::TagLost(tag) => write!(f, "tag-lost({tag})"),
            Self::OutputChanged { index, state } => {
                write!(f, "output-changed({index}={state})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DeviceInfo
// ---------------------------------------------------------------------------

/// Identity and state of an attached reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub serial: u32,
    pub version: u32,
    /// Number of digital outputs on the device.
    pub outputs: u32,
    pub antenna_on: bool,
    pub led_on: bool,
}

impl DeviceInfo {
    /// Logs the device as a small table, one line per row.
    pub fn log_table(&self) {
        let rule = "|------------|----------------------------------|--------------|------------|";
        tracing::info!("{rule}");
        tracing::info!(
            "|- Attached -|-              Type              -|- Serial No. -|-  Version -|"
        );
        tracing::info!("{rule}");
        tracing::info!(
            "|- {:>8} -|- {:>30} -|- {:>10} -|- {:>8} -|",
            true,
            self.name,
            self.serial,
            self.version
        );
        tracing::info!("{rule}");
        tracing::info!(
            outputs = self.outputs,
            antenna_on = self.antenna_on,
            led_on = self.led_on,
            "reader status"
        );
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Control surface of an RFID reader.
///
/// The lifecycle is `open` → `wait_for_attach` → (commands) → `close`.
/// Events flow the other way, through the [`EventSink`] handed to `open`.
///
/// Commands are synchronous and cheap (a USB control transfer); the kiosk
/// calls them from its own task.
pub trait Reader: Send + Sync + 'static {
    /// Opens the device and registers `sink` for its events.
    fn open(&self, sink: EventSink) -> Result<(), ReaderError>;

    /// Waits until a device is attached, up to `timeout`.
    ///
    /// # Errors
    /// [`ReaderError::AttachTimeout`] if nothing attached in time.
    fn wait_for_attach(
        &self,
        timeout: Duration,
    ) -> impl Future<Output = Result<DeviceInfo, ReaderError>> + Send;

    /// Switches the antenna (card detection) on or off.
    fn set_antenna_on(&self, on: bool) -> Result<(), ReaderError>;

    /// Switches the onboard LED on or off.
    fn set_led_on(&self, on: bool) -> Result<(), ReaderError>;

    /// Releases the device. Default: nothing to release.
    fn close(&self) -> Result<(), ReaderError> {
        Ok(())
    }
}
