//! The UI collaborator.

use crate::ScreenSelector;

/// Whatever renders the kiosk's screens.
///
/// The kiosk only ever tells the display two things: which screen to make
/// current, and which tag to show on it. Both calls come from the user
/// manager task and must return quickly; a display that needs to do real
/// work should hand the request to its own UI thread.
pub trait KioskDisplay: Send + Sync + 'static {
    /// Makes `screen` the active screen.
    fn set_current_screen(&self, screen: ScreenSelector);

    /// Shows `tag` on the active screen.
    fn set_screen_tag(&self, tag: &str);
}

/// A display that only logs. Used by the headless binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDisplay;

impl KioskDisplay for TracingDisplay {
    fn set_current_screen(&self, screen: ScreenSelector) {
        tracing::info!(%screen, "display: current screen changed");
    }

    fn set_screen_tag(&self, tag: &str) {
        tracing::info!(%tag, "display: screen tag set");
    }
}
