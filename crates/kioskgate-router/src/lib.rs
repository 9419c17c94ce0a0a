//! Screen navigation for kioskgate.
//!
//! Once a card is accepted, the kiosk has to decide which screen to show.
//! That decision depends only on the employee's role codes and is made by
//! [`NavigationRouter`] against an ordered list of [`RouteRule`]s. The
//! result is pushed to whatever renders the screens through the
//! [`KioskDisplay`] trait.
//!
//! # Key types
//!
//! - [`ScreenSelector`]: which screen to show
//! - [`RouteRule`]: "role N goes to screen S"
//! - [`NavigationRouter`]: applies the rules to an employee
//! - [`KioskDisplay`]: the UI collaborator ([`TracingDisplay`] logs only)

mod display;
mod router;
mod screen;

pub use display::{KioskDisplay, TracingDisplay};
pub use router::{NavigationRouter, RouteRule};
pub use screen::ScreenSelector;
