pub mod document;
pub mod frame;
pub mod html;

pub use document::{Content, Document, NodeId};
pub use frame::FrameGate;
pub use html::{escape_attr, escape_text, inner_html, to_html};
