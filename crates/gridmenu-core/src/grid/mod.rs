mod capacity;
mod slot;
mod slots;

pub use capacity::{Capacity, MAX_ROWS};
pub use slot::{Slot, GRID_WIDTH};
pub use slots::Slots;
