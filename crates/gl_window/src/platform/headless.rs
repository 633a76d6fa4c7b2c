//! Scripted in-memory platform
//!
//! `HeadlessPlatform` never opens a window. It hands out numbered handles,
//! delivers messages pushed through a [`HeadlessProbe`], records every call it
//! receives and fails any operation on request. The lifecycle and routing
//! protocol behave exactly as on a native platform, which makes it the test
//! double for the window and a stand-in on hosts without a native backend.
//!
//! Like Win32, creating a window synchronously delivers `Create` and `Resize`,
//! and showing it delivers `Activate`.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::{OsError, OsResult, Platform, Pump, WindowSpec};
use crate::context::ContextRequest;
use crate::message::{self, Dispatch, Message, SharedSink};

/// Registered class handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub u32);

/// Window handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// Device context handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

/// Rendering context handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u32);

/// Platform operations, as recorded in the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    RegisterClass,
    UnregisterClass,
    EnableFullscreen,
    RestoreDisplayMode,
    ShowCursor,
    CreateWindow,
    DestroyWindow,
    ShowWindow,
    DeviceContext,
    ReleaseDeviceContext,
    ChoosePixelFormat,
    SetPixelFormat,
    CreateContext,
    CreateProfileContext,
    MakeCurrent,
    DeleteContext,
    PostQuit,
    SwapBuffers,
}

#[derive(Debug, Clone, Copy)]
struct Failure {
    code: u32,
    remaining_successes: usize,
}

struct Inner {
    next_id: u32,
    calls: Vec<Op>,
    failures: HashMap<Op, Failure>,
    queue: VecDeque<Message>,
    sinks: Vec<(WindowId, SharedSink)>,
    classes: Vec<ClassId>,
    devices: Vec<DeviceId>,
    contexts: Vec<ContextId>,
    profile_contexts: Vec<ContextId>,
    current: Option<(DeviceId, ContextId)>,
    supports_profiles: bool,
    reject_profile_activation: bool,
    gl_error: u32,
    swaps: usize,
    defaulted: Vec<Message>,
    cursor_visible: bool,
    display_mode_changed: bool,
    last_spec: Option<WindowSpec>,
}

impl Inner {
    fn new() -> Self {
        Self {
            next_id: 1,
            calls: Vec::new(),
            failures: HashMap::new(),
            queue: VecDeque::new(),
            sinks: Vec::new(),
            classes: Vec::new(),
            devices: Vec::new(),
            contexts: Vec::new(),
            profile_contexts: Vec::new(),
            current: None,
            supports_profiles: true,
            reject_profile_activation: false,
            gl_error: 0,
            swaps: 0,
            defaulted: Vec::new(),
            cursor_visible: true,
            display_mode_changed: false,
            last_spec: None,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record a call and decide whether it fails
    fn call(&mut self, op: Op) -> OsResult<()> {
        self.calls.push(op);
        match self.failures.get_mut(&op) {
            Some(failure) if failure.remaining_successes > 0 => {
                failure.remaining_successes -= 1;
                Ok(())
            }
            Some(failure) => Err(OsError::new(failure.code)),
            None => Ok(()),
        }
    }

    fn sink_for(&self, window: WindowId) -> Option<SharedSink> {
        self.sinks
            .iter()
            .find(|(id, _)| *id == window)
            .map(|(_, sink)| sink.clone())
    }

    fn latest_sink(&self) -> Option<SharedSink> {
        self.sinks.last().map(|(_, sink)| sink.clone())
    }
}

/// In-memory [`Platform`] implementation
pub struct HeadlessPlatform {
    inner: Rc<RefCell<Inner>>,
}

impl HeadlessPlatform {
    /// Create a platform with no failures scheduled
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner::new())),
        }
    }

    /// A probe sharing this platform's state
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            inner: self.inner.clone(),
        }
    }

    /// Forward a message to a sink without holding the platform state
    fn deliver(&self, sink: Option<SharedSink>, message: Message) -> Dispatch {
        let dispatch = sink.map_or(Dispatch::Default, |sink| message::forward(&sink, &message));
        match dispatch {
            Dispatch::Handled => {}
            Dispatch::Default => self.inner.borrow_mut().defaulted.push(message),
            Dispatch::RequestQuit => {
                let mut inner = self.inner.borrow_mut();
                inner.calls.push(Op::PostQuit);
                inner.queue.push_back(Message::Quit);
            }
        }
        dispatch
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    type Class = ClassId;
    type Window = WindowId;
    type Device = DeviceId;
    type Context = ContextId;

    fn register_class(&mut self) -> OsResult<ClassId> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::RegisterClass)?;
        let class = ClassId(inner.next_id());
        inner.classes.push(class);
        Ok(class)
    }

    fn unregister_class(&mut self, class: ClassId) -> OsResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::UnregisterClass)?;
        inner.classes.retain(|c| *c != class);
        Ok(())
    }

    fn enable_fullscreen(&mut self, _width: u32, _height: u32, _bits: u8) -> OsResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::EnableFullscreen)?;
        inner.display_mode_changed = true;
        Ok(())
    }

    fn restore_display_mode(&mut self) -> OsResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::RestoreDisplayMode)?;
        inner.display_mode_changed = false;
        Ok(())
    }

    fn show_cursor(&mut self, visible: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Op::ShowCursor);
        inner.cursor_visible = visible;
    }

    fn create_window(
        &mut self,
        _class: ClassId,
        spec: &WindowSpec,
        sink: SharedSink,
    ) -> OsResult<WindowId> {
        let window = {
            let mut inner = self.inner.borrow_mut();
            inner.call(Op::CreateWindow)?;
            let window = WindowId(inner.next_id());
            inner.sinks.push((window, sink.clone()));
            inner.last_spec = Some(spec.clone());
            window
        };

        self.deliver(Some(sink.clone()), Message::Create);
        self.deliver(
            Some(sink),
            Message::Resize {
                width: spec.width,
                height: spec.height,
            },
        );
        Ok(window)
    }

    fn destroy_window(&mut self, window: WindowId) -> OsResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::DestroyWindow)?;
        inner.sinks.retain(|(id, _)| *id != window);
        Ok(())
    }

    fn show_window(&mut self, window: WindowId) {
        let sink = {
            let mut inner = self.inner.borrow_mut();
            inner.calls.push(Op::ShowWindow);
            inner.sink_for(window)
        };
        self.deliver(sink, Message::Activate { minimized: false });
    }

    fn device_context(&mut self, _window: WindowId) -> OsResult<DeviceId> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::DeviceContext)?;
        let device = DeviceId(inner.next_id());
        inner.devices.push(device);
        Ok(device)
    }

    fn release_device_context(&mut self, _window: WindowId, device: DeviceId) -> OsResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::ReleaseDeviceContext)?;
        inner.devices.retain(|d| *d != device);
        Ok(())
    }

    fn choose_pixel_format(&mut self, _device: DeviceId, _bits: u8) -> OsResult<i32> {
        self.inner.borrow_mut().call(Op::ChoosePixelFormat)?;
        Ok(1)
    }

    fn set_pixel_format(&mut self, _device: DeviceId, _format: i32, _bits: u8) -> OsResult<()> {
        self.inner.borrow_mut().call(Op::SetPixelFormat)
    }

    fn create_context(&mut self, _device: DeviceId) -> OsResult<ContextId> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::CreateContext)?;
        let context = ContextId(inner.next_id());
        inner.contexts.push(context);
        Ok(context)
    }

    fn create_profile_context(
        &mut self,
        _device: DeviceId,
        _request: &ContextRequest,
    ) -> Option<ContextId> {
        let mut inner = self.inner.borrow_mut();
        if inner.call(Op::CreateProfileContext).is_err() || !inner.supports_profiles {
            return None;
        }
        let context = ContextId(inner.next_id());
        inner.contexts.push(context);
        inner.profile_contexts.push(context);
        Some(context)
    }

    fn make_current(&mut self, current: Option<(DeviceId, ContextId)>) -> OsResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::MakeCurrent)?;
        if let Some((_, context)) = current {
            let unknown = !inner.contexts.contains(&context);
            let rejected =
                inner.reject_profile_activation && inner.profile_contexts.contains(&context);
            if unknown || rejected {
                return Err(OsError::new(2000));
            }
        }
        inner.current = current;
        Ok(())
    }

    fn delete_context(&mut self, context: ContextId) -> OsResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::DeleteContext)?;
        inner.contexts.retain(|c| *c != context);
        if inner.current.map(|(_, c)| c) == Some(context) {
            inner.current = None;
        }
        Ok(())
    }

    fn pump(&mut self) -> Pump {
        let (message, sink) = {
            let mut inner = self.inner.borrow_mut();
            match inner.queue.pop_front() {
                None => return Pump::Empty,
                Some(Message::Quit) => return Pump::Quit,
                Some(message) => (message, inner.latest_sink()),
            }
        };
        self.deliver(sink, message);
        Pump::Dispatched
    }

    fn post_quit(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(Op::PostQuit);
        inner.queue.push_back(Message::Quit);
    }

    fn swap_buffers(&mut self, _device: DeviceId) -> OsResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.call(Op::SwapBuffers)?;
        inner.swaps += 1;
        Ok(())
    }

    fn gl_error(&mut self) -> u32 {
        std::mem::take(&mut self.inner.borrow_mut().gl_error)
    }
}

/// Test-side view of a [`HeadlessPlatform`]
///
/// Stays usable after the platform has been moved into a window.
#[derive(Clone)]
pub struct HeadlessProbe {
    inner: Rc<RefCell<Inner>>,
}

impl HeadlessProbe {
    /// Queue a message for the most recently created window
    pub fn push(&self, message: Message) {
        self.inner.borrow_mut().queue.push_back(message);
    }

    /// Queue several messages in order
    pub fn push_all(&self, messages: impl IntoIterator<Item = Message>) {
        self.inner.borrow_mut().queue.extend(messages);
    }

    /// Number of messages still queued
    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Make every call of `op` fail with error code 1
    pub fn fail(&self, op: Op) {
        self.fail_with(op, 1);
    }

    /// Make every call of `op` fail with the given error code
    pub fn fail_with(&self, op: Op, code: u32) {
        self.fail_after(op, 0, code);
    }

    /// Let `successes` calls of `op` through, then fail every later call
    pub fn fail_after(&self, op: Op, successes: usize, code: u32) {
        self.inner.borrow_mut().failures.insert(
            op,
            Failure {
                code,
                remaining_successes: successes,
            },
        );
    }

    /// Set the driver error returned by the next error query
    pub fn set_gl_error(&self, code: u32) {
        self.inner.borrow_mut().gl_error = code;
    }

    /// Whether `create_profile_context` can produce a context
    pub fn set_profile_support(&self, supported: bool) {
        self.inner.borrow_mut().supports_profiles = supported;
    }

    /// Profile contexts are created but refuse to become current
    pub fn reject_profile_activation(&self) {
        self.inner.borrow_mut().reject_profile_activation = true;
    }

    /// Every recorded call, in order
    pub fn calls(&self) -> Vec<Op> {
        self.inner.borrow().calls.clone()
    }

    /// Number of recorded calls of `op`
    pub fn count(&self, op: Op) -> usize {
        self.inner.borrow().calls.iter().filter(|c| **c == op).count()
    }

    /// Number of successful buffer swaps
    pub fn swap_count(&self) -> usize {
        self.inner.borrow().swaps
    }

    /// Messages that were left to default handling
    pub fn defaulted(&self) -> Vec<Message> {
        self.inner.borrow().defaulted.clone()
    }

    /// Context current on the thread
    pub fn current_context(&self) -> Option<ContextId> {
        self.inner.borrow().current.map(|(_, c)| c)
    }

    /// Contexts created and not yet deleted
    pub fn live_contexts(&self) -> Vec<ContextId> {
        self.inner.borrow().contexts.clone()
    }

    /// True if the context came from `create_profile_context`
    pub fn is_profile_context(&self, context: ContextId) -> bool {
        self.inner.borrow().profile_contexts.contains(&context)
    }

    /// Device contexts acquired and not yet released
    pub fn live_devices(&self) -> usize {
        self.inner.borrow().devices.len()
    }

    /// Windows created and not yet destroyed
    pub fn live_windows(&self) -> usize {
        self.inner.borrow().sinks.len()
    }

    /// Classes registered and not yet unregistered
    pub fn registered_classes(&self) -> usize {
        self.inner.borrow().classes.len()
    }

    /// Whether the display is currently switched away from the desktop mode
    pub fn display_mode_changed(&self) -> bool {
        self.inner.borrow().display_mode_changed
    }

    /// Whether the cursor is visible
    pub fn cursor_visible(&self) -> bool {
        self.inner.borrow().cursor_visible
    }

    /// Parameters of the most recently created window
    pub fn last_spec(&self) -> Option<WindowSpec> {
        self.inner.borrow().last_spec.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageSink;

    struct Recorder {
        seen: Vec<Message>,
        answer: Dispatch,
    }

    impl MessageSink for Recorder {
        fn handle(&mut self, message: &Message) -> Dispatch {
            self.seen.push(*message);
            self.answer
        }
    }

    fn spec() -> WindowSpec {
        WindowSpec {
            title: "headless".to_string(),
            width: 320,
            height: 200,
            fullscreen: false,
        }
    }

    #[test]
    fn test_create_window_delivers_create_and_resize() {
        let mut platform = HeadlessPlatform::new();
        let recorder = Rc::new(RefCell::new(Recorder { seen: Vec::new(), answer: Dispatch::Handled }));
        let class = platform.register_class().unwrap();

        platform.create_window(class, &spec(), recorder.clone()).unwrap();

        assert_eq!(
            recorder.borrow().seen,
            vec![Message::Create, Message::Resize { width: 320, height: 200 }]
        );
    }

    #[test]
    fn test_pump_drains_one_message() {
        let mut platform = HeadlessPlatform::new();
        let probe = platform.probe();
        let recorder = Rc::new(RefCell::new(Recorder { seen: Vec::new(), answer: Dispatch::Default }));
        let class = platform.register_class().unwrap();
        platform.create_window(class, &spec(), recorder.clone()).unwrap();

        probe.push_all([Message::KeyDown(1), Message::KeyUp(1)]);

        assert_eq!(platform.pump(), Pump::Dispatched);
        assert_eq!(probe.pending(), 1);
        assert!(probe.defaulted().contains(&Message::KeyDown(1)));
        assert_eq!(platform.pump(), Pump::Dispatched);
        assert_eq!(platform.pump(), Pump::Empty);
    }

    #[test]
    fn test_request_quit_queues_quit() {
        let mut platform = HeadlessPlatform::new();
        let probe = platform.probe();
        let recorder = Rc::new(RefCell::new(Recorder { seen: Vec::new(), answer: Dispatch::RequestQuit }));
        let class = platform.register_class().unwrap();
        platform.create_window(class, &spec(), recorder).unwrap();
        // Create and Resize already asked for quit twice
        assert_eq!(probe.count(Op::PostQuit), 2);

        assert_eq!(platform.pump(), Pump::Quit);
    }

    #[test]
    fn test_failure_injection_after_successes() {
        let mut platform = HeadlessPlatform::new();
        let probe = platform.probe();
        probe.fail_after(Op::RegisterClass, 1, 1410);

        assert!(platform.register_class().is_ok());
        assert_eq!(platform.register_class().unwrap_err(), OsError::new(1410));
        assert_eq!(probe.count(Op::RegisterClass), 2);
        assert_eq!(probe.registered_classes(), 1);
    }

    #[test]
    fn test_gl_error_clears_on_read() {
        let mut platform = HeadlessPlatform::new();
        platform.probe().set_gl_error(0x0500);
        assert_eq!(platform.gl_error(), 0x0500);
        assert_eq!(platform.gl_error(), 0);
    }

    #[test]
    fn test_make_current_rejects_unknown_context() {
        let mut platform = HeadlessPlatform::new();
        assert!(platform.make_current(Some((DeviceId(1), ContextId(99)))).is_err());
        assert!(platform.make_current(None).is_ok());
    }
}
