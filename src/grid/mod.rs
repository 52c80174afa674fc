mod geometry;
mod note;
mod store;

pub use geometry::{
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_ROWS, GridGeometry, ROW_TOLERANCE,
    TRIGGER_WINDOW,
};
pub use note::{BlockId, NoteBlock, ParsePitchError, PitchClass, Placement, Position};
pub use store::{PaletteSlot, PlacementStore};
