//! # kioskgate
//!
//! An RFID-gated kiosk display.
//!
//! A card held to the reader is looked up in a remote employee directory.
//! If exactly one employee holds it, that employee is logged on and the
//! display is routed to the screen for their role. Everything else (no
//! match, several matches, a directory that is down or silent) leaves the
//! kiosk idle and ready for the next card.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kioskgate::prelude::*;
//!
//! # async fn run() -> Result<(), KioskError> {
//! let config = KioskConfig::load("kioskgate.ini")?;
//! let directory = HttpDirectory::new(
//!     &config.network.server_fqdn,
//!     &config.software.license_key,
//! )?;
//!
//! let handle = KioskBuilder::new()
//!     .config(&config)
//!     .build(SimulatedReader::new(), directory, TracingDisplay)
//!     .start()
//!     .await?;
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod kiosk;
mod manager;

pub use config::{
    ConfigError, ENV_PREFIX, KioskConfig, NetworkConfig, ReaderConfig, SoftwareConfig,
};
pub use error::KioskError;
pub use kiosk::{DEFAULT_EVENT_BUFFER, Kiosk, KioskBuilder, KioskHandle};
pub use manager::KioskStatus;

/// Re-exports for building and driving a kiosk.
pub mod prelude {
    pub use crate::{Kiosk, KioskBuilder, KioskConfig, KioskError, KioskHandle, KioskStatus};
    pub use kioskgate_directory::{
        Directory, DirectoryResponse, Employee, HttpDirectory, LookupCompletion, PendingLookup,
    };
    pub use kioskgate_reader::{Reader, ReaderError, ReaderEvent, SimulatedReader};
    pub use kioskgate_router::{KioskDisplay, RouteRule, ScreenSelector, TracingDisplay};
    pub use kioskgate_session::{
        Phase, Rejection, ValidationError, ValidationOutcome, ValidatorConfig,
    };
}
