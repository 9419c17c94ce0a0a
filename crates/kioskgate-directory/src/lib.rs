//! Employee directory client for kioskgate.
//!
//! This crate is the kiosk's only window onto the remote employee
//! directory:
//!
//! - **Types** ([`Employee`], [`DirectoryResponse`]): the records the
//!   directory returns, and how a payload is checked before anyone trusts it.
//! - **Lookups** ([`Directory`] trait, [`PendingLookup`]): one request per
//!   tag, resolved by exactly one [`LookupCompletion`].
//! - **HTTP** ([`HttpDirectory`]): the production implementation that talks
//!   to `/api/1.0/employees/`.
//!
//! # Architecture
//!
//! ```text
//! Session layer (validate a tag) → Directory (lookup) → HTTP (GET employees)
//! ```
//!
//! The directory layer never decides whether a card is *valid*. It reports
//! what the server said (or that the server could not be reached) and the
//! session layer turns that into an outcome.

mod directory;
mod error;
mod http;
mod pending;
mod types;

pub use directory::Directory;
pub use error::{DirectoryError, PayloadError};
pub use http::{EMPLOYEES_PATH, HttpDirectory, REQUEST_TIMEOUT};
pub use pending::{LookupCompleter, LookupCompletion, PendingLookup};
pub use types::{DirectoryResponse, Employee};
