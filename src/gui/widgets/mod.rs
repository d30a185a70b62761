mod grid_selection;
mod title_field;

pub use grid_selection::{CellPos, CellRect, Direction, GridSelection};
pub use title_field::{TitleError, TitleField};
