pub mod event;
pub mod focus;
pub mod gesture;
pub mod icons;
pub mod info;
pub mod keybindings;
pub mod options;
pub mod viewer;
pub mod zoom;

pub use event::InputEvent;
pub use keybindings::{action_for_key, Key, ViewerAction};
pub use options::{ViewerOptions, ViewerOptionsUpdate};
pub use viewer::{Direction, SlotId, Viewer, ViewerSource, ViewerState};
pub use zoom::ZoomState;
