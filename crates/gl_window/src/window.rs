//! The OpenGL window: lifecycle manager and frame-draw trigger
//!
//! # Lifecycle
//!
//! Construction acquires, in order: the window class, the native window, its
//! device context, a pixel format and a baseline GL context, which is made
//! current on the calling thread. An optional context creator may then replace
//! the baseline; if its context cannot be activated the baseline stays.
//!
//! Teardown releases in exactly the reverse order. It is best-effort: every
//! step runs even when an earlier one failed. [`Window::destroy`] returns the
//! collected failures; dropping the window logs them instead.
//!
//! # Threading
//!
//! A window and its callbacks live on the thread that created it. The shared
//! state is reference-counted without atomics, so `Window` is neither `Send`
//! nor `Sync`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::WindowParams;
use crate::context::ContextRequest;
use crate::error::{CreateError, DestroyError, GraphicsError, TeardownErrors};
use crate::input::{KeyInfo, MouseInfo};
use crate::message::SharedSink;
use crate::platform::{Platform, Pump, WindowSpec};
use crate::resource::{Owned, Teardown};
use crate::router::{DispatchTable, WindowState};

/// A native window with a current OpenGL context
pub struct Window<P: Platform> {
    platform: P,
    state: Rc<RefCell<WindowState>>,
    class: Owned<P::Class>,
    window: Owned<P::Window>,
    device: Owned<P::Device>,
    context: Owned<P::Context>,
    fullscreen: bool,
    check_gl_errors: bool,
}

impl<P: Platform> Window<P> {
    /// Create a window with the baseline GL context
    pub fn new(params: &WindowParams, platform: P) -> Result<Self, CreateError> {
        Self::build(params, platform, None::<fn(&mut P, P::Device) -> Option<P::Context>>)
    }

    /// Create a window and try to switch to a context of the requested version and profile
    ///
    /// Falls back to the baseline context if the platform cannot create or
    /// activate the requested one.
    pub fn with_profile(
        params: &WindowParams,
        platform: P,
        request: ContextRequest,
    ) -> Result<Self, CreateError> {
        Self::with_context_creator(params, platform, move |platform, device| {
            platform.create_profile_context(device, &request)
        })
    }

    /// Create a window and let `creator` supply the context to use
    ///
    /// `creator` runs with the baseline context current. Returning `None`, or a
    /// context that fails to activate, keeps the baseline.
    pub fn with_context_creator<F>(
        params: &WindowParams,
        platform: P,
        creator: F,
    ) -> Result<Self, CreateError>
    where
        F: FnOnce(&mut P, P::Device) -> Option<P::Context>,
    {
        Self::build(params, platform, Some(creator))
    }

    fn build<F>(params: &WindowParams, platform: P, creator: Option<F>) -> Result<Self, CreateError>
    where
        F: FnOnce(&mut P, P::Device) -> Option<P::Context>,
    {
        params.validate().map_err(CreateError::InvalidParameters)?;

        log::info!(
            "Creating window \"{}\" ({}x{}, {} bits{})",
            params.title,
            params.width,
            params.height,
            params.bits,
            if params.fullscreen { ", fullscreen" } else { "" }
        );

        let state = WindowState::new(
            params.width,
            params.height,
            DispatchTable::standard(params.key_routing),
        );
        let mut window = Self {
            platform,
            state: Rc::new(RefCell::new(state)),
            class: Owned::null(),
            window: Owned::null(),
            device: Owned::null(),
            context: Owned::null(),
            fullscreen: false,
            check_gl_errors: params.check_gl_errors,
        };

        match window.acquire(params, creator) {
            Ok(()) => {
                log::info!("Window created successfully");
                Ok(window)
            }
            Err(error) => {
                log::error!("Window creation failed: {error}");
                window.teardown().finish_logged("Cleanup after failed window creation");
                Err(error)
            }
        }
    }

    fn acquire<F>(&mut self, params: &WindowParams, creator: Option<F>) -> Result<(), CreateError>
    where
        F: FnOnce(&mut P, P::Device) -> Option<P::Context>,
    {
        let class = self
            .platform
            .register_class()
            .map_err(CreateError::RegisterClass)?;
        self.class = Owned::new(class);
        log::debug!("Registered window class");

        if params.fullscreen {
            self.fullscreen = true;
            if let Err(error) =
                self.platform
                    .enable_fullscreen(params.width, params.height, params.bits)
            {
                log::warn!("Switching the display mode failed ({error}), keeping the current mode");
            }
            self.platform.show_cursor(false);
        }

        let spec = WindowSpec {
            title: params.title.clone(),
            width: params.width,
            height: params.height,
            fullscreen: params.fullscreen,
        };
        let sink: SharedSink = self.state.clone();
        let handle = self
            .platform
            .create_window(class, &spec, sink)
            .map_err(CreateError::CreateWindow)?;
        self.window = Owned::new(handle);
        log::debug!("Created native window {handle:?}");

        let device = self
            .platform
            .device_context(handle)
            .map_err(CreateError::DeviceContext)?;
        self.device = Owned::new(device);

        let format = self
            .platform
            .choose_pixel_format(device, params.bits)
            .map_err(CreateError::ChoosePixelFormat)?;
        self.platform
            .set_pixel_format(device, format, params.bits)
            .map_err(CreateError::SetPixelFormat)?;
        log::debug!("Pixel format {format} set");

        let baseline = self
            .platform
            .create_context(device)
            .map_err(CreateError::CreateContext)?;
        self.context = Owned::new(baseline);
        self.platform
            .make_current(Some((device, baseline)))
            .map_err(CreateError::ActivateContext)?;
        log::debug!("Baseline GL context {baseline:?} is current");

        if let Some(creator) = creator {
            self.install_requested_context(device, baseline, creator)?;
        }

        self.platform.show_window(handle);
        Ok(())
    }

    fn install_requested_context<F>(
        &mut self,
        device: P::Device,
        baseline: P::Context,
        creator: F,
    ) -> Result<(), CreateError>
    where
        F: FnOnce(&mut P, P::Device) -> Option<P::Context>,
    {
        let Some(requested) = creator(&mut self.platform, device) else {
            log::warn!("Requested GL context unavailable, keeping the baseline context");
            return Ok(());
        };

        match self.platform.make_current(Some((device, requested))) {
            Ok(()) => {
                if let Some(baseline) = self.context.replace(requested) {
                    if let Err(error) = self.platform.delete_context(baseline) {
                        log::warn!("Deleting the baseline context failed: {error}");
                    }
                }
                log::debug!("Switched to requested GL context {requested:?}");
                Ok(())
            }
            Err(error) => {
                log::warn!(
                    "Requested GL context failed to activate ({error}), falling back to the baseline context"
                );
                if let Err(error) = self.platform.delete_context(requested) {
                    log::warn!("Deleting the rejected context failed: {error}");
                }
                self.platform
                    .make_current(Some((device, baseline)))
                    .map_err(CreateError::ActivateContext)
            }
        }
    }

    /// Release everything still owned, in reverse acquisition order
    fn teardown(&mut self) -> Teardown {
        let mut teardown = Teardown::new();
        let platform = &mut self.platform;

        if std::mem::take(&mut self.fullscreen) {
            teardown.step(|| {
                platform
                    .restore_display_mode()
                    .map_err(DestroyError::RestoreDisplayMode)
            });
            platform.show_cursor(true);
        }

        if let Some(context) = self.context.take() {
            teardown.step(|| platform.make_current(None).map_err(DestroyError::DeactivateContext));
            teardown.step(|| {
                platform
                    .delete_context(context)
                    .map_err(DestroyError::DeleteContext)
            });
        }

        if let Some(window) = self.window.get() {
            teardown.release(&mut self.device, |device| {
                platform
                    .release_device_context(window, device)
                    .map_err(DestroyError::ReleaseDeviceContext)
            });
        }
        teardown.release(&mut self.window, |window| {
            platform
                .destroy_window(window)
                .map_err(DestroyError::DestroyWindow)
        });
        teardown.release(&mut self.class, |class| {
            platform
                .unregister_class(class)
                .map_err(DestroyError::UnregisterClass)
        });

        teardown
    }

    /// Tear the window down now, returning every failed release step
    pub fn destroy(mut self) -> Result<(), TeardownErrors> {
        log::info!("Destroying window");
        self.teardown().finish()
    }

    /// Draw one frame: run the draw callback, check the driver, present
    ///
    /// A non-zero driver error code fails the frame and skips the buffer swap.
    pub fn display(&mut self) -> Result<(), GraphicsError> {
        // Out of the slot while it runs, so messages sent from inside it can still be routed
        let draw = self.state.borrow_mut().callbacks.draw.take();
        if let Some(mut draw) = draw {
            draw();
            self.state.borrow_mut().callbacks.draw = Some(draw);
        }

        if self.check_gl_errors {
            let code = self.platform.gl_error();
            if code != 0 {
                return Err(GraphicsError { code });
            }
        }

        if let Some(device) = self.device.get() {
            if let Err(error) = self.platform.swap_buffers(device) {
                log::warn!("Buffer swap failed: {error}");
            }
        }
        Ok(())
    }

    /// Drain at most one pending message; false once the quit message is seen
    pub fn process(&mut self) -> bool {
        match self.platform.pump() {
            Pump::Quit => {
                log::debug!("Quit message received");
                false
            }
            Pump::Empty | Pump::Dispatched => true,
        }
    }

    /// Draw and pump until the quit message arrives
    pub fn run(&mut self) -> Result<(), GraphicsError> {
        loop {
            self.display()?;
            if !self.process() {
                return Ok(());
            }
        }
    }

    /// Ask the message loop to terminate
    pub fn close(&mut self) {
        log::info!("Window close requested");
        self.platform.post_quit();
    }

    /// Whether the window is active (not minimized)
    pub fn active(&self) -> bool {
        self.state.borrow().active()
    }

    /// Client-area width as of the last resize
    pub fn size_x(&self) -> u32 {
        self.state.borrow().size().0
    }

    /// Client-area height as of the last resize
    pub fn size_y(&self) -> u32 {
        self.state.borrow().size().1
    }

    /// Client-area size as of the last resize
    pub fn size(&self) -> (u32, u32) {
        self.state.borrow().size()
    }

    /// Whether the window was created fullscreen and has not been torn down
    pub const fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Whether `display()` checks the driver error state
    pub const fn check_gl_errors(&self) -> bool {
        self.check_gl_errors
    }

    /// Enable or disable the driver error check in `display()`
    pub fn set_check_gl_errors(&mut self, enabled: bool) {
        self.check_gl_errors = enabled;
    }

    /// Device and GL context, present together or not at all
    pub fn surface(&self) -> Option<(P::Device, P::Context)> {
        self.device.get().zip(self.context.get())
    }

    /// Native window handle
    pub fn native_handle(&self) -> Option<P::Window> {
        self.window.get()
    }

    /// The platform this window was built on
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// Adjust this window's message routing
    pub fn customize_dispatch(&mut self, customize: impl FnOnce(&mut DispatchTable)) {
        customize(self.state.borrow_mut().table_mut());
    }

    /// Set the draw callback, run once per `display()`
    pub fn on_draw(&mut self, callback: impl FnMut() + 'static) {
        self.state.borrow_mut().callbacks.draw = Some(Box::new(callback));
    }

    /// Set the resize callback, called with the new client size
    pub fn on_resize(&mut self, callback: impl FnMut(u32, u32) + 'static) {
        self.state.borrow_mut().callbacks.resize = Some(Box::new(callback));
    }

    /// Set the key-down callback
    pub fn on_key_down(&mut self, callback: impl FnMut(KeyInfo) + 'static) {
        self.state.borrow_mut().callbacks.key_down = Some(Box::new(callback));
    }

    /// Set the key-up callback
    pub fn on_key_up(&mut self, callback: impl FnMut(KeyInfo) + 'static) {
        self.state.borrow_mut().callbacks.key_up = Some(Box::new(callback));
    }

    /// Set the activation callback, called with the new active flag
    pub fn on_activate(&mut self, callback: impl FnMut(bool) + 'static) {
        self.state.borrow_mut().callbacks.activate = Some(Box::new(callback));
    }

    /// Set the mouse-move callback
    pub fn on_mouse_move(&mut self, callback: impl FnMut(MouseInfo) + 'static) {
        self.state.borrow_mut().callbacks.mouse_move = Some(Box::new(callback));
    }

    /// Set the mouse-button-up callback
    pub fn on_mouse_up(&mut self, callback: impl FnMut(MouseInfo) + 'static) {
        self.state.borrow_mut().callbacks.mouse_up = Some(Box::new(callback));
    }

    /// Set the mouse-button-down callback
    pub fn on_mouse_down(&mut self, callback: impl FnMut(MouseInfo) + 'static) {
        self.state.borrow_mut().callbacks.mouse_down = Some(Box::new(callback));
    }

    /// Empty every callback slot
    pub fn clear_callbacks(&mut self) {
        self.state.borrow_mut().callbacks = crate::router::Callbacks::default();
    }
}

impl<P: Platform> Drop for Window<P> {
    fn drop(&mut self) {
        self.teardown().finish_logged("Window teardown");
    }
}

#[cfg(windows)]
impl Window<crate::platform::Win32Platform> {
    /// Open a native Win32 window
    pub fn open(params: &WindowParams) -> Result<Self, CreateError> {
        Self::new(params, crate::platform::Win32Platform::new())
    }
}

/// Window on the native platform of this host
#[cfg(windows)]
pub type NativeWindow = Window<crate::platform::Win32Platform>;
