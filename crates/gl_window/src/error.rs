//! Error types for window creation, teardown and drawing
//!
//! Every acquisition step and every release step has its own variant so a
//! caller can tell exactly which native call failed. Teardown errors are
//! collected rather than propagated from `Drop`; see [`TeardownErrors`].

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::platform::OsError;

/// Failures raised while constructing a window
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// Parameters were rejected before any resource was acquired
    #[error("invalid window parameters: {0}")]
    InvalidParameters(String),

    #[error("failed to register the window class: {0}")]
    RegisterClass(OsError),

    #[error("window creation error: {0}")]
    CreateWindow(OsError),

    #[error("can't create a GL device context: {0}")]
    DeviceContext(OsError),

    #[error("can't find a suitable pixel format: {0}")]
    ChoosePixelFormat(OsError),

    #[error("can't set the pixel format: {0}")]
    SetPixelFormat(OsError),

    #[error("can't create a GL rendering context: {0}")]
    CreateContext(OsError),

    #[error("can't activate the GL rendering context: {0}")]
    ActivateContext(OsError),
}

/// Failures raised by a single teardown step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestroyError {
    #[error("restoring the desktop display mode failed: {0}")]
    RestoreDisplayMode(OsError),

    #[error("release of DC and RC failed: {0}")]
    DeactivateContext(OsError),

    #[error("release rendering context failed: {0}")]
    DeleteContext(OsError),

    #[error("release device context failed: {0}")]
    ReleaseDeviceContext(OsError),

    #[error("could not release the window handle: {0}")]
    DestroyWindow(OsError),

    #[error("could not unregister the window class: {0}")]
    UnregisterClass(OsError),
}

/// Non-zero driver error code observed after a draw
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("OpenGL error occurred: {code}")]
pub struct GraphicsError {
    /// Raw value returned by the driver's error query
    pub code: u32,
}

/// Every error collected during a best-effort teardown, in release order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownErrors(pub Vec<DestroyError>);

impl TeardownErrors {
    /// True when teardown completed cleanly
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failed steps
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate the failed steps in the order they were attempted
    pub fn iter(&self) -> std::slice::Iter<'_, DestroyError> {
        self.0.iter()
    }
}

impl fmt::Display for TeardownErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} teardown step(s) failed", self.0.len())?;
        for error in &self.0 {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TeardownErrors {}

/// Umbrella error for callers that do not care which stage failed
#[derive(Error, Debug)]
pub enum WindowError {
    #[error(transparent)]
    Create(#[from] CreateError),

    #[error(transparent)]
    Teardown(#[from] TeardownErrors),

    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias used across the crate
pub type WindowResult<T> = Result<T, WindowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teardown_errors_display_lists_each_step() {
        let errors = TeardownErrors(vec![
            DestroyError::DeleteContext(OsError::new(5)),
            DestroyError::UnregisterClass(OsError::new(1412)),
        ]);

        let text = errors.to_string();
        assert!(text.starts_with("2 teardown step(s) failed"));
        assert!(text.contains("release rendering context failed"));
        assert!(text.contains("could not unregister the window class"));
    }

    #[test]
    fn test_graphics_error_carries_code() {
        let error = GraphicsError { code: 0x0502 };
        assert_eq!(error.to_string(), "OpenGL error occurred: 1282");
    }

    #[test]
    fn test_window_error_from_create() {
        let error: WindowError = CreateError::CreateWindow(OsError::new(8)).into();
        assert!(matches!(error, WindowError::Create(CreateError::CreateWindow(_))));
    }
}
