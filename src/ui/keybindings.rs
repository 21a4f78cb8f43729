// Keybindings for the lightbox viewer
// Keys are only handled while the viewer is open.
//
// Keybindings:
// - Escape: Close viewer
// - Left / Backspace: Previous slide
// - Right / Space: Next slide
// - Down: Hide interface
// - Up: Show interface
// - + / =: Zoom in
// - -: Zoom out
// - i: Toggle info panel
// - Tab / Shift+Tab: Cycle focus through visible controls

/// A key as reported by the host, named like `KeyboardEvent.key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Backspace,
    Space,
    Tab,
    Char(char),
    Other(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Self::Escape,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Backspace" => Self::Backspace,
            " " | "Spacebar" => Self::Space,
            "Tab" => Self::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other(other.to_string()),
                }
            }
        }
    }

    /// Tab and the arrow keys mark the last interaction as keyboard-driven.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::Tab | Self::ArrowLeft | Self::ArrowRight | Self::ArrowUp | Self::ArrowDown
        )
    }
}

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Close,
    Prev,
    Next,
    ToggleInfo,
    ZoomIn,
    ZoomOut,
    HideInterface,
    ShowInterface,
    FocusNext,
    FocusPrev,
}

pub fn action_for_key(key: &Key, shift: bool) -> Option<ViewerAction> {
    let action = match key {
        Key::Tab if shift => ViewerAction::FocusPrev,
        Key::Tab => ViewerAction::FocusNext,
        Key::Escape => ViewerAction::Close,
        Key::ArrowLeft | Key::Backspace => ViewerAction::Prev,
        Key::ArrowRight | Key::Space => ViewerAction::Next,
        Key::Char('i') => ViewerAction::ToggleInfo,
        Key::Char('+') | Key::Char('=') => ViewerAction::ZoomIn,
        Key::Char('-') => ViewerAction::ZoomOut,
        Key::ArrowDown => ViewerAction::HideInterface,
        Key::ArrowUp => ViewerAction::ShowInterface,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from_name(" "), Key::Space);
        assert_eq!(Key::from_name("i"), Key::Char('i'));
        assert_eq!(Key::from_name("F5"), Key::Other("F5".into()));
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(
            action_for_key(&Key::ArrowLeft, false),
            Some(ViewerAction::Prev)
        );
        assert_eq!(
            action_for_key(&Key::Backspace, false),
            Some(ViewerAction::Prev)
        );
        assert_eq!(action_for_key(&Key::Space, false), Some(ViewerAction::Next));
        for name in [" ", "Spacebar"] {
            assert_eq!(
                action_for_key(&Key::from_name(name), false),
                Some(ViewerAction::Next)
            );
        }
        assert_eq!(action_for_key(&Key::Escape, false), Some(ViewerAction::Close));
    }

    #[test]
    fn test_zoom_and_panel_keys() {
        assert_eq!(
            action_for_key(&Key::Char('='), false),
            Some(ViewerAction::ZoomIn)
        );
        assert_eq!(
            action_for_key(&Key::Char('-'), false),
            Some(ViewerAction::ZoomOut)
        );
        assert_eq!(
            action_for_key(&Key::Char('i'), false),
            Some(ViewerAction::ToggleInfo)
        );
        assert_eq!(action_for_key(&Key::Char('I'), false), None);
    }

    #[test]
    fn test_tab_direction() {
        assert_eq!(action_for_key(&Key::Tab, false), Some(ViewerAction::FocusNext));
        assert_eq!(action_for_key(&Key::Tab, true), Some(ViewerAction::FocusPrev));
        assert!(Key::Tab.is_navigation());
        assert!(!Key::Escape.is_navigation());
    }
}
