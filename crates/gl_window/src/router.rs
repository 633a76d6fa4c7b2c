//! Event router: per-window state, callback slots and the dispatch table
//!
//! Each window owns one [`WindowState`]. The platform forwards native messages
//! to it through [`MessageSink`]; the state looks the message kind up in its
//! own [`DispatchTable`] and runs the matching handler. Handlers update the
//! active flag or size where the message calls for it, then invoke the user's
//! callback if one is set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::{KeyInfo, MouseButton, MouseInfo};
use crate::message::{Dispatch, Message, MessageKind, MessageSink};

/// How key messages are mapped onto the key callback slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRouting {
    /// Key-down invokes `on_key_down`, key-up invokes `on_key_up`
    #[default]
    Direct,
    /// Key-down invokes `on_key_up` and key-up invokes `on_key_down`
    ///
    /// Kept for programs written against the earlier, swapped dispatch.
    Swapped,
}

/// Callback slots; an empty slot is a no-op
#[derive(Default)]
pub struct Callbacks {
    pub(crate) draw: Option<Box<dyn FnMut()>>,
    pub(crate) resize: Option<Box<dyn FnMut(u32, u32)>>,
    pub(crate) key_down: Option<Box<dyn FnMut(KeyInfo)>>,
    pub(crate) key_up: Option<Box<dyn FnMut(KeyInfo)>>,
    pub(crate) activate: Option<Box<dyn FnMut(bool)>>,
    pub(crate) mouse_move: Option<Box<dyn FnMut(MouseInfo)>>,
    pub(crate) mouse_up: Option<Box<dyn FnMut(MouseInfo)>>,
    pub(crate) mouse_down: Option<Box<dyn FnMut(MouseInfo)>>,
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("draw", &self.draw.is_some())
            .field("resize", &self.resize.is_some())
            .field("key_down", &self.key_down.is_some())
            .field("key_up", &self.key_up.is_some())
            .field("activate", &self.activate.is_some())
            .field("mouse_move", &self.mouse_move.is_some())
            .field("mouse_up", &self.mouse_up.is_some())
            .field("mouse_down", &self.mouse_down.is_some())
            .finish()
    }
}

/// Handler for one message kind
pub type Handler = fn(&mut WindowState, &Message) -> Dispatch;

/// Per-instance mapping from message kind to handler
#[derive(Clone)]
pub struct DispatchTable {
    handlers: HashMap<MessageKind, Handler>,
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl DispatchTable {
    /// Empty table; every message gets default handling
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The standard table for an OpenGL window
    pub fn standard(routing: KeyRouting) -> Self {
        let mut table = Self::empty();
        table.insert(MessageKind::Create, on_create);
        table.insert(MessageKind::Activate, on_activate);
        table.insert(MessageKind::Close, on_close);
        table.insert(MessageKind::MouseDown, on_mouse_down);
        table.insert(MessageKind::MouseUp, on_mouse_up);
        table.insert(MessageKind::MouseMove, on_mouse_move);
        table.insert(MessageKind::Resize, on_resize);

        match routing {
            KeyRouting::Direct => {
                table.insert(MessageKind::KeyDown, to_key_down_slot);
                table.insert(MessageKind::KeyUp, to_key_up_slot);
            }
            KeyRouting::Swapped => {
                table.insert(MessageKind::KeyDown, to_key_up_slot);
                table.insert(MessageKind::KeyUp, to_key_down_slot);
            }
        }

        table
    }

    /// Install or replace the handler for a kind
    pub fn insert(&mut self, kind: MessageKind, handler: Handler) {
        self.handlers.insert(kind, handler);
    }

    /// Remove the handler for a kind, returning it to default handling
    pub fn remove(&mut self, kind: MessageKind) -> Option<Handler> {
        self.handlers.remove(&kind)
    }

    /// Handler for a kind, if any
    pub fn get(&self, kind: MessageKind) -> Option<Handler> {
        self.handlers.get(&kind).copied()
    }

    /// True if the kind is routed rather than defaulted
    pub fn handles(&self, kind: MessageKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}

/// State shared between a window and the platform's message forwarding
#[derive(Debug)]
pub struct WindowState {
    active: bool,
    width: u32,
    height: u32,
    pub(crate) callbacks: Callbacks,
    table: DispatchTable,
}

impl WindowState {
    /// New state for a window of the given size, starting active
    pub fn new(width: u32, height: u32, table: DispatchTable) -> Self {
        Self {
            active: true,
            width,
            height,
            callbacks: Callbacks::default(),
            table,
        }
    }

    /// Whether the window is active (not minimized)
    pub const fn active(&self) -> bool {
        self.active
    }

    /// Size as of the last resize message
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Mutable access to the dispatch table
    pub fn table_mut(&mut self) -> &mut DispatchTable {
        &mut self.table
    }

    fn mouse_info(&self, x: i32, y: i32, button: MouseButton) -> MouseInfo {
        MouseInfo::new(x, y, self.size(), button)
    }
}

impl MessageSink for WindowState {
    fn handle(&mut self, message: &Message) -> Dispatch {
        match self.table.get(message.kind()) {
            Some(handler) => {
                log::trace!("Routing {message:?}");
                handler(self, message)
            }
            None => Dispatch::Default,
        }
    }
}

fn on_create(_state: &mut WindowState, _message: &Message) -> Dispatch {
    Dispatch::Handled
}

fn on_activate(state: &mut WindowState, message: &Message) -> Dispatch {
    if let Message::Activate { minimized } = *message {
        state.active = !minimized;
        let active = state.active;
        if let Some(callback) = state.callbacks.activate.as_mut() {
            callback(active);
        }
    }
    Dispatch::Handled
}

fn on_close(_state: &mut WindowState, _message: &Message) -> Dispatch {
    Dispatch::RequestQuit
}

fn key_code(message: &Message) -> Option<KeyInfo> {
    match *message {
        Message::KeyDown(key) | Message::KeyUp(key) => Some(KeyInfo::new(key)),
        _ => None,
    }
}

fn to_key_down_slot(state: &mut WindowState, message: &Message) -> Dispatch {
    if let (Some(info), Some(callback)) = (key_code(message), state.callbacks.key_down.as_mut()) {
        callback(info);
    }
    Dispatch::Handled
}

fn to_key_up_slot(state: &mut WindowState, message: &Message) -> Dispatch {
    if let (Some(info), Some(callback)) = (key_code(message), state.callbacks.key_up.as_mut()) {
        callback(info);
    }
    Dispatch::Handled
}

fn on_mouse_down(state: &mut WindowState, message: &Message) -> Dispatch {
    if let Message::MouseDown { button, x, y } = *message {
        let info = state.mouse_info(x, y, button);
        if let Some(callback) = state.callbacks.mouse_down.as_mut() {
            callback(info);
        }
    }
    Dispatch::Handled
}

fn on_mouse_up(state: &mut WindowState, message: &Message) -> Dispatch {
    if let Message::MouseUp { button, x, y } = *message {
        let info = state.mouse_info(x, y, button);
        if let Some(callback) = state.callbacks.mouse_up.as_mut() {
            callback(info);
        }
    }
    Dispatch::Handled
}

fn on_mouse_move(state: &mut WindowState, message: &Message) -> Dispatch {
    if let Message::MouseMove { x, y } = *message {
        let info = state.mouse_info(x, y, MouseButton::None);
        if let Some(callback) = state.callbacks.mouse_move.as_mut() {
            callback(info);
        }
    }
    Dispatch::Handled
}

fn on_resize(state: &mut WindowState, message: &Message) -> Dispatch {
    if let Message::Resize { width, height } = *message {
        state.width = width;
        state.height = height;
        if let Some(callback) = state.callbacks.resize.as_mut() {
            callback(width, height);
        }
    }
    Dispatch::Handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn state(routing: KeyRouting) -> WindowState {
        WindowState::new(800, 600, DispatchTable::standard(routing))
    }

    #[test]
    fn test_unrouted_kinds_default() {
        let mut state = state(KeyRouting::Direct);
        assert_eq!(state.handle(&Message::SysCommand(0xF140)), Dispatch::Default);
        assert_eq!(state.handle(&Message::Other(0x0020)), Dispatch::Default);
        assert_eq!(state.handle(&Message::Quit), Dispatch::Default);
    }

    #[test]
    fn test_close_requests_quit() {
        let mut state = state(KeyRouting::Direct);
        assert_eq!(state.handle(&Message::Close), Dispatch::RequestQuit);
    }

    #[test]
    fn test_create_is_acknowledged() {
        let mut state = state(KeyRouting::Direct);
        assert_eq!(state.handle(&Message::Create), Dispatch::Handled);
    }

    #[test]
    fn test_resize_updates_size_before_callback() {
        let mut state = state(KeyRouting::Direct);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        state.callbacks.resize = Some(Box::new(move |w, h| sink.borrow_mut().push((w, h))));

        let dispatch = state.handle(&Message::Resize { width: 1024, height: 768 });

        assert_eq!(dispatch, Dispatch::Handled);
        assert_eq!(state.size(), (1024, 768));
        assert_eq!(*seen.borrow(), vec![(1024, 768)]);
    }

    #[test]
    fn test_activate_tracks_minimized_state() {
        let mut state = state(KeyRouting::Direct);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        state.callbacks.activate = Some(Box::new(move |active| sink.borrow_mut().push(active)));

        state.handle(&Message::Activate { minimized: true });
        assert!(!state.active());
        state.handle(&Message::Activate { minimized: false });
        assert!(state.active());

        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[test]
    fn test_direct_key_routing() {
        let mut state = state(KeyRouting::Direct);
        let log = Rc::new(RefCell::new(Vec::new()));
        let down = log.clone();
        let up = log.clone();
        state.callbacks.key_down = Some(Box::new(move |k| down.borrow_mut().push(("down", k.key))));
        state.callbacks.key_up = Some(Box::new(move |k| up.borrow_mut().push(("up", k.key))));

        state.handle(&Message::KeyDown(0x41));
        state.handle(&Message::KeyUp(0x41));

        assert_eq!(*log.borrow(), vec![("down", 0x41), ("up", 0x41)]);
    }

    #[test]
    fn test_swapped_key_routing() {
        let mut state = state(KeyRouting::Swapped);
        let log = Rc::new(RefCell::new(Vec::new()));
        let down = log.clone();
        let up = log.clone();
        state.callbacks.key_down = Some(Box::new(move |k| down.borrow_mut().push(("down", k.key))));
        state.callbacks.key_up = Some(Box::new(move |k| up.borrow_mut().push(("up", k.key))));

        state.handle(&Message::KeyDown(0x41));
        state.handle(&Message::KeyUp(0x42));

        assert_eq!(*log.borrow(), vec![("up", 0x41), ("down", 0x42)]);
    }

    #[test]
    fn test_mouse_messages_use_current_size() {
        let mut state = state(KeyRouting::Direct);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let down = seen.clone();
        let moved = seen.clone();
        state.callbacks.mouse_down = Some(Box::new(move |m| down.borrow_mut().push(m)));
        state.callbacks.mouse_move = Some(Box::new(move |m| moved.borrow_mut().push(m)));

        state.handle(&Message::MouseDown { button: MouseButton::Right, x: 400, y: 300 });
        state.handle(&Message::Resize { width: 200, height: 100 });
        state.handle(&Message::MouseMove { x: 50, y: 50 });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].button, MouseButton::Right);
        approx::assert_relative_eq!(seen[0].norm_x, 0.5);
        approx::assert_relative_eq!(seen[0].norm_y, 0.5);
        assert_eq!(seen[1].button, MouseButton::None);
        approx::assert_relative_eq!(seen[1].norm_x, 0.25);
        approx::assert_relative_eq!(seen[1].norm_y, 0.5);
    }

    #[test]
    fn test_empty_slots_are_noops() {
        let mut state = state(KeyRouting::Direct);
        assert_eq!(state.handle(&Message::KeyDown(1)), Dispatch::Handled);
        assert_eq!(
            state.handle(&Message::MouseUp { button: MouseButton::Middle, x: 0, y: 0 }),
            Dispatch::Handled
        );
    }

    #[test]
    fn test_table_entries_can_be_removed() {
        let mut state = state(KeyRouting::Direct);
        assert!(state.table_mut().remove(MessageKind::MouseMove).is_some());
        assert_eq!(state.handle(&Message::MouseMove { x: 1, y: 1 }), Dispatch::Default);
    }
}
