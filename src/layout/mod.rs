pub mod justified;
pub mod layout_cache;
pub mod mosaic;
pub mod options;

pub use justified::{JustifiedLayout, RowBreak, Tile};
pub use layout_cache::LayoutCache;
pub use mosaic::{MediaSource, Mosaic};
pub use options::{Breakpoint, LayoutOptions, LayoutOptionsUpdate};
