use crate::dom::NodeId;
use crate::ui::keybindings::Key;

/// Host input delivered to the viewer. Coordinates are client pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { key: Key, shift: bool },
    /// Any mouse press; marks the last interaction as pointer-driven.
    MouseDown,
    PointerDown { target: NodeId, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerCancel,
    Click { target: NodeId },
}

impl InputEvent {
    /// Unmodified key press by `KeyboardEvent.key` name.
    pub fn key(name: &str) -> Self {
        Self::KeyDown {
            key: Key::from_name(name),
            shift: false,
        }
    }

    pub fn shift_key(name: &str) -> Self {
        Self::KeyDown {
            key: Key::from_name(name),
            shift: true,
        }
    }
}
