//! # GL Window
//!
//! A single native window with a current OpenGL context, for programs that
//! want to draw with raw GL calls and nothing else in the way.
//!
//! ## Features
//!
//! - **Ordered Lifecycle**: Class, window, device context, pixel format and GL
//!   context are acquired in order and released in reverse, even on failure
//! - **Callback Routing**: Draw, resize, keyboard, activation and mouse
//!   callbacks through a per-window dispatch table
//! - **Profile Contexts**: Optional versioned core or compatibility context
//!   with fallback to the baseline context
//! - **Headless Platform**: Scripted platform for tests and non-Windows hosts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gl_window::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     gl_window::logging::init();
//!
//!     let params = WindowParams::new("Hello").with_size(640, 480);
//!     let mut window = Window::new(&params, HeadlessPlatform::new())?;
//!     window.on_draw(|| { /* GL calls */ });
//!     window.on_key_down(|key| gl_window::logging::info!("key {}", key.key));
//!
//!     while window.process() {
//!         window.display()?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod context;
pub mod error;
pub mod input;
pub mod logging;
pub mod message;
pub mod platform;
pub mod resource;
pub mod router;
pub mod window;


pub use config::{Config, ConfigError, WindowParams};
pub use context::{ContextProfile, ContextRequest};
pub use error::{CreateError, DestroyError, GraphicsError, TeardownErrors, WindowError, WindowResult};
pub use input::{keys, KeyInfo, MouseButton, MouseInfo};
pub use router::KeyRouting;
pub use window::Window;

#[cfg(windows)]
pub use window::NativeWindow;

/// Common imports for window users
pub mod prelude {
    pub use crate::{
        config::{Config, WindowParams},
        context::ContextRequest,
        error::{CreateError, GraphicsError, WindowError, WindowResult},
        input::{keys, KeyInfo, MouseButton, MouseInfo},
        platform::{HeadlessPlatform, Platform},
        router::KeyRouting,
        window::Window,
    };

    #[cfg(windows)]
    pub use crate::{platform::Win32Platform, window::NativeWindow};
}
