pub mod media_item;
pub mod row_model;

pub use media_item::*;
pub use row_model::*;
