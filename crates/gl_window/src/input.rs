//! Typed payloads handed to key and mouse callbacks

/// A key message payload wrapping the platform's virtual-key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyInfo {
    /// Platform virtual-key code
    pub key: u32,
}

impl KeyInfo {
    /// Wrap a raw key code
    pub const fn new(key: u32) -> Self {
        Self { key }
    }

    /// True if this is the given virtual-key code
    pub const fn is(self, key: u32) -> bool {
        self.key == key
    }
}

/// Common virtual-key codes
///
/// Letters and digits use their ASCII uppercase values, as on Win32.
pub mod keys {
    /// Backspace
    pub const BACK: u32 = 0x08;
    /// Tab
    pub const TAB: u32 = 0x09;
    /// Enter
    pub const ENTER: u32 = 0x0D;
    /// Shift
    pub const SHIFT: u32 = 0x10;
    /// Control
    pub const CONTROL: u32 = 0x11;
    /// Escape
    pub const ESCAPE: u32 = 0x1B;
    /// Space bar
    pub const SPACE: u32 = 0x20;
    /// Left arrow
    pub const LEFT: u32 = 0x25;
    /// Up arrow
    pub const UP: u32 = 0x26;
    /// Right arrow
    pub const RIGHT: u32 = 0x27;
    /// Down arrow
    pub const DOWN: u32 = 0x28;
    /// F1; F2..F12 follow consecutively
    pub const F1: u32 = 0x70;

    /// Key code of an ASCII letter or digit
    pub const fn ascii(c: char) -> u32 {
        (c.to_ascii_uppercase()) as u32
    }
}

/// Mouse button associated with a mouse message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Movement, or no button involved
    #[default]
    None,
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// A mouse message payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseInfo {
    /// Horizontal position in client-area pixels
    pub x: i32,
    /// Vertical position in client-area pixels
    pub y: i32,
    /// `x` divided by the window width at delivery time
    pub norm_x: f64,
    /// `y` divided by the window height at delivery time
    pub norm_y: f64,
    /// Button the message refers to
    pub button: MouseButton,
}

impl MouseInfo {
    /// Build a payload, normalizing against the given window size
    ///
    /// A zero dimension (minimized window) yields a non-finite normalized value.
    pub fn new(x: i32, y: i32, size: (u32, u32), button: MouseButton) -> Self {
        Self {
            x,
            y,
            norm_x: f64::from(x) / f64::from(size.0),
            norm_y: f64::from(y) / f64::from(size.1),
            button,
        }
    }
}
