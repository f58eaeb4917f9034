pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod item;
pub mod messages;
pub mod traversal;

pub use config::{ConfigPaths, MenuSettings};
pub use data::DataRegistry;
pub use error::GridError;
pub use grid::{Capacity, Slot, Slots, GRID_WIDTH, MAX_ROWS};
pub use item::Item;
pub use messages::{ClickEvent, ClickKind, DragEvent, HostEvent, SurfaceId, SurfaceKind, ViewerId};
pub use traversal::{Direction, SlotIterator};
