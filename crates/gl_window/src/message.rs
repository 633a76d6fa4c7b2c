//! Platform-neutral window messages
//!
//! The platform layer translates native messages into [`Message`] values and
//! forwards them to the owning window's [`MessageSink`]. The sink answers with
//! a [`Dispatch`] telling the platform what to do next.

use std::cell::RefCell;
use std::rc::Rc;

use crate::input::MouseButton;

/// One OS-delivered window message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// The window was just created
    Create,
    /// The window was activated or deactivated
    Activate {
        /// Minimized state reported alongside the activation change
        minimized: bool,
    },
    /// A system menu command; always left to default handling
    SysCommand(u32),
    /// The user asked to close the window
    Close,
    /// A key was pressed
    KeyDown(u32),
    /// A key was released
    KeyUp(u32),
    /// A mouse button was pressed
    MouseDown {
        /// Button that was pressed
        button: MouseButton,
        /// Client-area x coordinate
        x: i32,
        /// Client-area y coordinate
        y: i32,
    },
    /// A mouse button was released
    MouseUp {
        /// Button that was released
        button: MouseButton,
        /// Client-area x coordinate
        x: i32,
        /// Client-area y coordinate
        y: i32,
    },
    /// The pointer moved over the client area
    MouseMove {
        /// Client-area x coordinate
        x: i32,
        /// Client-area y coordinate
        y: i32,
    },
    /// The client area was resized
    Resize {
        /// New client-area width
        width: u32,
        /// New client-area height
        height: u32,
    },
    /// The message loop should terminate; consumed by the pump, never routed
    Quit,
    /// Any other native message, identified by its raw code
    Other(u32),
}

/// Discriminant of a [`Message`], used as the dispatch table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// See [`Message::Create`]
    Create,
    /// See [`Message::Activate`]
    Activate,
    /// See [`Message::SysCommand`]
    SysCommand,
    /// See [`Message::Close`]
    Close,
    /// See [`Message::KeyDown`]
    KeyDown,
    /// See [`Message::KeyUp`]
    KeyUp,
    /// See [`Message::MouseDown`]
    MouseDown,
    /// See [`Message::MouseUp`]
    MouseUp,
    /// See [`Message::MouseMove`]
    MouseMove,
    /// See [`Message::Resize`]
    Resize,
    /// See [`Message::Quit`]
    Quit,
    /// See [`Message::Other`]
    Other,
}

impl Message {
    /// Kind of this message
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Create => MessageKind::Create,
            Self::Activate { .. } => MessageKind::Activate,
            Self::SysCommand(_) => MessageKind::SysCommand,
            Self::Close => MessageKind::Close,
            Self::KeyDown(_) => MessageKind::KeyDown,
            Self::KeyUp(_) => MessageKind::KeyUp,
            Self::MouseDown { .. } => MessageKind::MouseDown,
            Self::MouseUp { .. } => MessageKind::MouseUp,
            Self::MouseMove { .. } => MessageKind::MouseMove,
            Self::Resize { .. } => MessageKind::Resize,
            Self::Quit => MessageKind::Quit,
            Self::Other(_) => MessageKind::Other,
        }
    }
}

/// What the platform should do after a sink handled a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Fully handled; return to the OS without default processing
    Handled,
    /// Not handled; pass the message to the default OS handler unchanged
    Default,
    /// Handled, and the message loop should be asked to terminate
    RequestQuit,
}

/// Receiver of messages for one window instance
pub trait MessageSink {
    /// Handle one message synchronously
    fn handle(&mut self, message: &Message) -> Dispatch;
}

/// Sink shared between a window and the platform's handle registry
pub type SharedSink = Rc<RefCell<dyn MessageSink>>;

/// Forward a message to a shared sink
///
/// A message that arrives while the sink is already borrowed (a native call
/// made from inside a callback that re-enters the window procedure) gets
/// default handling.
pub fn forward(sink: &SharedSink, message: &Message) -> Dispatch {
    match sink.try_borrow_mut() {
        Ok(mut sink) => sink.handle(message),
        Err(_) => {
            log::debug!("Re-entrant {:?} message left to default handling", message.kind());
            Dispatch::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        seen: usize,
    }

    impl MessageSink for Counter {
        fn handle(&mut self, _message: &Message) -> Dispatch {
            self.seen += 1;
            Dispatch::Handled
        }
    }

    #[test]
    fn test_kind_ignores_payload() {
        assert_eq!(Message::KeyDown(1).kind(), Message::KeyDown(99).kind());
        assert_eq!(
            Message::Resize { width: 1, height: 2 }.kind(),
            MessageKind::Resize
        );
        assert_ne!(Message::KeyDown(1).kind(), Message::KeyUp(1).kind());
    }

    #[test]
    fn test_forward_reaches_sink() {
        let counter = Rc::new(RefCell::new(Counter { seen: 0 }));
        let sink: SharedSink = counter.clone();

        assert_eq!(forward(&sink, &Message::Close), Dispatch::Handled);
        assert_eq!(counter.borrow().seen, 1);
    }

    #[test]
    fn test_forward_while_borrowed_defaults() {
        let counter = Rc::new(RefCell::new(Counter { seen: 0 }));
        let sink: SharedSink = counter.clone();

        let _guard = counter.borrow_mut();
        assert_eq!(forward(&sink, &Message::Close), Dispatch::Default);
    }
}
