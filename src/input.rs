//! Input model: listener bindings and the closed set of events the controller
//! reacts to.
//!
//! A [`Binding`] names one listener the host must keep registered: where it
//! listens ([`Scope`]) and for what ([`ListenerKind`]). The host turns every
//! DOM event it receives on a binding into a [`NavEvent`] carrying the same
//! scope, so the controller can drop events for listeners it no longer wants
//! (hover in mobile layout, anything after teardown).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::markup::NodeId;
use crate::position::Viewport;

/// Where a listener is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Window,
    Document,
    Node(NodeId),
}

/// What a listener listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerKind {
    PointerEnter,
    PointerLeave,
    Click,
    KeyDown,
    Submit,
    Resize,
    Scroll,
    VisibilityChange,
}

impl ListenerKind {
    /// DOM event type to register for this kind.
    #[must_use]
    pub fn dom_event(self) -> &'static str {
        match self {
            Self::PointerEnter => "mouseenter",
            Self::PointerLeave => "mouseleave",
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::Submit => "submit",
            Self::Resize => "resize",
            Self::Scroll => "scroll",
            Self::VisibilityChange => "visibilitychange",
        }
    }

    /// Pointer hover listeners, only bound in desktop layout.
    #[must_use]
    pub fn is_hover(self) -> bool {
        matches!(self, Self::PointerEnter | Self::PointerLeave)
    }
}

/// One listener registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Binding {
    pub scope: Scope,
    pub kind: ListenerKind,
}

impl Binding {
    #[must_use]
    pub fn node(node: NodeId, kind: ListenerKind) -> Self {
        Self { scope: Scope::Node(node), kind }
    }

    #[must_use]
    pub fn document(kind: ListenerKind) -> Self {
        Self { scope: Scope::Document, kind }
    }

    #[must_use]
    pub fn window(kind: ListenerKind) -> Self {
        Self { scope: Scope::Window, kind }
    }
}

/// A keyboard key, simplified to what the navbar handles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    ArrowDown,
    ArrowUp,
    Tab,
    /// Any other key, with the name the browser reported.
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` value, including legacy names.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "Tab" => Self::Tab,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Event payloads.
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    PointerEnter,
    PointerLeave,
    /// `target` is the innermost scanned node under the click, if any.
    Click { target: Option<NodeId> },
    KeyDown { target: Option<NodeId>, key: Key, shift: bool },
    /// Form submit with the current query input value.
    Submit { query: String },
    Resize(Viewport),
    Scroll { y: f64 },
    VisibilityChange { hidden: bool },
}

impl EventKind {
    #[must_use]
    pub fn listener(&self) -> ListenerKind {
        match self {
            Self::PointerEnter => ListenerKind::PointerEnter,
            Self::PointerLeave => ListenerKind::PointerLeave,
            Self::Click { .. } => ListenerKind::Click,
            Self::KeyDown { .. } => ListenerKind::KeyDown,
            Self::Submit { .. } => ListenerKind::Submit,
            Self::Resize(_) => ListenerKind::Resize,
            Self::Scroll { .. } => ListenerKind::Scroll,
            Self::VisibilityChange { .. } => ListenerKind::VisibilityChange,
        }
    }
}

/// An event delivered through one binding.
#[derive(Clone, Debug, PartialEq)]
pub struct NavEvent {
    pub scope: Scope,
    pub kind: EventKind,
}

impl NavEvent {
    #[must_use]
    pub fn new(scope: Scope, kind: EventKind) -> Self {
        Self { scope, kind }
    }

    #[must_use]
    pub fn binding(&self) -> Binding {
        Binding { scope: self.scope, kind: self.kind.listener() }
    }
}
