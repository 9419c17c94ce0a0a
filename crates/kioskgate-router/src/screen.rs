//! The screens a kiosk can show.

/// Target screen for the kiosk display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenSelector {
    Screen0,
    Screen1,
    Screen2,
}

impl ScreenSelector {
    /// Zero-based index of the screen, as screen managers number them.
    pub fn index(self) -> usize {
        match self {
            Self::Screen0 => 0,
            Self::Screen1 => 1,
            Self::Screen2 => 2,
        }
    }
}

impl std::fmt::Display for ScreenSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "screen{}", self.index())
    }
}
