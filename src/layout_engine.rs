pub mod engine;
pub mod focus;
pub mod placement;
pub mod stacking;

pub use engine::{WorkspaceEngine, WorkspaceEvent};
pub use focus::{FocusMemory, focused_rect};
pub use placement::place_details_block;
pub use stacking::next_z;
