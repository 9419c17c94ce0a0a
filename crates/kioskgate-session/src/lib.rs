//! Card validation and session gating for kioskgate.
//!
//! This crate decides who is logged on to the kiosk:
//!
//! 1. **Non-reentrancy** ([`FlightFlag`]): at most one lookup at a time.
//! 2. **Validation** ([`Validator`]): one bounded directory lookup per card,
//!    resolved into exactly one [`ValidationOutcome`].
//! 3. **Gating** ([`SessionGate`]): the Idle / Validating / Authenticated
//!    state machine that turns tag events and outcomes into "current
//!    employee".
//!
//! # How it fits in the stack
//!
//! ```text
//! Kiosk (above)      ← drives the gate from reader events, routes screens
//!     ↕
//! Session (this crate) ← validation, in-flight guard, session state
//!     ↕
//! Directory (below)  ← employee lookups
//! ```

mod error;
mod flight;
mod gate;
mod outcome;
mod validation;

pub use error::SessionError;
pub use flight::{FlightFlag, FlightGuard};
pub use gate::{Admission, Phase, SessionGate, SessionState};
pub use outcome::{Rejection, ValidationError, ValidationOutcome};
pub use validation::{VALIDATION_CEILING, Validation, Validator, ValidatorConfig};
