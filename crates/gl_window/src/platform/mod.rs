//! The OS and graphics-driver services a window is built on
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │     Application Code            │
//! └─────────────┬───────────────────┘
//!               │ Uses
//!         ┌─────▼─────┐
//!         │  Window   │ ← Lifecycle, draw trigger (window.rs)
//!         └─────┬─────┘
//!               │ Calls into
//!      ┌────────▼────────┐
//!      │ Platform trait  │ ← Native services (this module)
//!      └────────┬────────┘
//!               │ Implemented by
//!   ┌───────────▼───────────┐
//!   │ win32::Win32Platform  │ ← Win32 + WGL
//!   │ headless::Headless…   │ ← Scripted, for tests and non-Windows hosts
//!   └───────────────────────┘
//! ```
//!
//! Messages flow the other way: the platform translates each native message
//! into a [`Message`](crate::message::Message), finds the owning window's sink
//! by handle, and forwards it.

use std::fmt;

use crate::context::ContextRequest;
use crate::message::SharedSink;

pub mod headless;
#[cfg(windows)]
pub mod win32;

pub use headless::{HeadlessPlatform, HeadlessProbe, Op};
#[cfg(windows)]
pub use win32::Win32Platform;

/// A failed native call, with the OS error code if one was available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OsError {
    /// Raw OS error code; 0 when the call did not set one
    pub code: u32,
}

impl OsError {
    /// Wrap a raw OS error code
    pub const fn new(code: u32) -> Self {
        Self { code }
    }
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "os error {}", self.code)
    }
}

impl std::error::Error for OsError {}

/// Result of a native call
pub type OsResult<T> = Result<T, OsError>;

/// Everything the platform needs to create the native window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    /// Title bar text
    pub title: String,
    /// Requested client-area width
    pub width: u32,
    /// Requested client-area height
    pub height: u32,
    /// Borderless popup instead of an overlapped window
    pub fullscreen: bool,
}

/// Outcome of draining at most one pending message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pump {
    /// Nothing was pending
    Empty,
    /// One message was dispatched to its window
    Dispatched,
    /// The quit message was drained
    Quit,
}

/// Native windowing and GL context services
///
/// Every method maps onto one OS or driver call. Handles are plain `Copy`
/// values; ownership is tracked by the window, not by the platform.
pub trait Platform {
    /// Registered window class
    type Class: Copy + fmt::Debug;
    /// Native window handle
    type Window: Copy + fmt::Debug;
    /// Device context of a window
    type Device: Copy + fmt::Debug;
    /// OpenGL rendering context
    type Context: Copy + fmt::Debug;

    /// Register the window class all windows are created from
    fn register_class(&mut self) -> OsResult<Self::Class>;

    /// Unregister a class previously returned by `register_class`
    fn unregister_class(&mut self, class: Self::Class) -> OsResult<()>;

    /// Switch the display to the given mode
    fn enable_fullscreen(&mut self, width: u32, height: u32, bits: u8) -> OsResult<()>;

    /// Switch back to the desktop display mode
    fn restore_display_mode(&mut self) -> OsResult<()>;

    /// Show or hide the mouse cursor
    fn show_cursor(&mut self, visible: bool);

    /// Create the native window and register `sink` as its message receiver
    fn create_window(
        &mut self,
        class: Self::Class,
        spec: &WindowSpec,
        sink: SharedSink,
    ) -> OsResult<Self::Window>;

    /// Destroy the native window and drop its sink registration
    fn destroy_window(&mut self, window: Self::Window) -> OsResult<()>;

    /// Show the window, bring it to the foreground and give it keyboard focus
    fn show_window(&mut self, window: Self::Window);

    /// Acquire the window's device context
    fn device_context(&mut self, window: Self::Window) -> OsResult<Self::Device>;

    /// Release a device context acquired with `device_context`
    fn release_device_context(&mut self, window: Self::Window, device: Self::Device) -> OsResult<()>;

    /// Find the pixel format closest to a double-buffered RGBA format of `bits`
    fn choose_pixel_format(&mut self, device: Self::Device, bits: u8) -> OsResult<i32>;

    /// Apply a pixel format returned by `choose_pixel_format`
    fn set_pixel_format(&mut self, device: Self::Device, format: i32, bits: u8) -> OsResult<()>;

    /// Create a baseline rendering context for the device
    fn create_context(&mut self, device: Self::Device) -> OsResult<Self::Context>;

    /// Create a context of a specific version and profile
    ///
    /// Requires a current baseline context. Returns `None` when the driver
    /// cannot provide it; the default implementation never can.
    fn create_profile_context(
        &mut self,
        _device: Self::Device,
        _request: &ContextRequest,
    ) -> Option<Self::Context> {
        None
    }

    /// Make `current` the calling thread's current context, or clear it with `None`
    fn make_current(&mut self, current: Option<(Self::Device, Self::Context)>) -> OsResult<()>;

    /// Delete a rendering context
    fn delete_context(&mut self, context: Self::Context) -> OsResult<()>;

    /// Drain at most one pending message without blocking
    fn pump(&mut self) -> Pump;

    /// Post the quit message to this thread's queue
    fn post_quit(&mut self);

    /// Present the back buffer
    fn swap_buffers(&mut self, device: Self::Device) -> OsResult<()>;

    /// Driver error state; 0 means no error
    fn gl_error(&mut self) -> u32;
}
