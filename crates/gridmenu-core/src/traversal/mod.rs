mod direction;
mod iterator;

pub use direction::Direction;
pub use iterator::SlotIterator;
