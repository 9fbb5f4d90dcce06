//! Input types and the pointer/keyboard state machine vocabulary.
//!
//! The host translates DOM events into these types; [`MindMap`](crate::map::MindMap)
//! drives the state machine. Key and wheel mapping are pure functions so they
//! can be tested without a map.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::config::MapConfig;
use crate::geometry::{Rect, Vec2};
use crate::graph::NodeId;

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

impl Modifiers {
    /// Build from the boolean flags a DOM event carries.
    pub fn from_flags(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Self {
        let mut mods = Self::empty();
        mods.set(Self::SHIFT, shift);
        mods.set(Self::CTRL, ctrl);
        mods.set(Self::ALT, alt);
        mods.set(Self::META, meta);
        mods
    }

    /// Ctrl on most platforms, Cmd on macOS.
    #[inline]
    pub fn command(self) -> bool {
        self.intersects(Self::CTRL | Self::META)
    }
}

/// Pointer button identity, from `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
}

impl PointerButton {
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(Self::Primary),
            1 => Some(Self::Auxiliary),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// A pointer event in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub button: PointerButton,
    /// Offset relative to the surface's top-left corner.
    pub position: Vec2,
    /// Movement since the previous pointer event.
    pub movement: Vec2,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn new(button: PointerButton, position: Vec2) -> Self {
        Self {
            button,
            position,
            movement: Vec2::ZERO,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub delta_y: f64,
    pub modifiers: Modifiers,
}

/// Keys the map reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    Delete,
    Backspace,
    Escape,
    Char(char),
    Other,
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            "Escape" | "Esc" => Self::Escape,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

/// What a key press asks the map to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    InsertSibling,
    InsertChild,
    DeleteSelected,
    ClearSelection,
    Copy,
    Cut,
    Paste,
    Noop,
}

pub fn action_for_key(key: Key, modifiers: Modifiers) -> KeyAction {
    if modifiers.command() {
        return match key {
            Key::Char(c) => match c.to_ascii_lowercase() {
                'c' => KeyAction::Copy,
                'x' => KeyAction::Cut,
                'v' => KeyAction::Paste,
                _ => KeyAction::Noop,
            },
            Key::Enter => KeyAction::InsertChild,
            _ => KeyAction::Noop,
        };
    }

    match key {
        Key::Enter if modifiers.intersects(Modifiers::SHIFT | Modifiers::ALT) => KeyAction::InsertChild,
        Key::Enter => KeyAction::InsertSibling,
        Key::Tab => KeyAction::InsertChild,
        Key::Delete | Key::Backspace => KeyAction::DeleteSelected,
        Key::Escape => KeyAction::ClearSelection,
        _ => KeyAction::Noop,
    }
}

/// What a wheel notch asks the viewport to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelAction {
    /// Change the scale by this step.
    Zoom(f64),
    /// Move the view vertically by this many pixels.
    Scroll(f64),
}

/// Ctrl/Cmd + wheel zooms by a fixed step per notch; a plain wheel scrolls.
pub fn action_for_wheel(input: WheelInput, config: &MapConfig) -> WheelAction {
    if input.modifiers.command() {
        let step = if input.delta_y > 0.0 {
            -config.zoom_step
        } else {
            config.zoom_step
        };
        WheelAction::Zoom(step)
    } else {
        WheelAction::Scroll(-input.delta_y * config.scroll_sensitivity)
    }
}

/// Pointer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Primary button held on empty canvas.
    PanDragging,
    /// Primary button held on a node.
    NodeDragging {
        node: NodeId,
        /// Last pointer position, in model space.
        pointer: Vec2,
        /// Node currently under the pointer, if it would accept the drop.
        drop_target: Option<NodeId>,
    },
    /// Secondary button held. Reserved; no gesture is bound to it yet.
    AltDragging,
}

impl InteractionState {
    pub fn is_dragging(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn dragged_node(&self) -> Option<NodeId> {
        match self {
            Self::NodeDragging { node, .. } => Some(*node),
            _ => None,
        }
    }
}

/// Request for the host to open an inline text editor over a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub node: NodeId,
    pub text: String,
    /// Node box in surface pixels.
    pub rect: Rect,
    /// CSS font shorthand at the current scale.
    pub font: String,
}

/// Outcome of an input event, for the host's event listener.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventResponse {
    /// The host should call `preventDefault()` on the event.
    pub prevent_default: bool,
    pub edit: Option<EditRequest>,
}

impl EventResponse {
    pub const IGNORED: Self = Self {
        prevent_default: false,
        edit: None,
    };

    pub const HANDLED: Self = Self {
        prevent_default: true,
        edit: None,
    };

    pub fn edit(request: EditRequest) -> Self {
        Self {
            prevent_default: true,
            edit: Some(request),
        }
    }
}
