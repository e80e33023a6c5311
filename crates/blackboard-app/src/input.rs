//! Platform-neutral input types.

/// Mouse/pen button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl, or Cmd on macOS.
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

/// Active tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Select,
    Pen,
    Pan,
}
