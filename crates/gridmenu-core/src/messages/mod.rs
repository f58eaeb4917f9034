mod events;
mod ids;

pub use events::{ClickEvent, ClickKind, DragEvent, HostEvent};
pub use ids::{SurfaceId, SurfaceKind, ViewerId};
