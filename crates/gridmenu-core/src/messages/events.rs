use crate::grid::{Slot, Slots};

use super::{SurfaceId, ViewerId};

/// How a cell was clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClickKind {
    #[default]
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    Middle,
    Double,
    /// Number key pressed while hovering a cell
    NumberKey(u8),
    Drop,
}

impl ClickKind {
    /// Parse from string (for shell commands)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" | "l" => Some(Self::Left),
            "right" | "r" => Some(Self::Right),
            "shift-left" | "shift_left" => Some(Self::ShiftLeft),
            "shift-right" | "shift_right" => Some(Self::ShiftRight),
            "middle" | "m" => Some(Self::Middle),
            "double" => Some(Self::Double),
            "drop" => Some(Self::Drop),
            other => other
                .strip_prefix("key")
                .and_then(|n| n.parse().ok())
                .map(Self::NumberKey),
        }
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, Self::ShiftLeft | Self::ShiftRight)
    }
}

/// A click delivered by the host
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub viewer: ViewerId,
    pub surface: SurfaceId,
    /// Clicked cell, `None` for clicks outside the grid
    pub slot: Option<Slot>,
    pub kind: ClickKind,
    cancelled: bool,
}

impl ClickEvent {
    pub fn new(viewer: ViewerId, surface: SurfaceId, slot: Option<Slot>, kind: ClickKind) -> Self {
        Self {
            viewer,
            surface,
            slot,
            kind,
            cancelled: false,
        }
    }

    /// Stop the host from applying its default behaviour
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A drag spanning one or more cells
#[derive(Debug, Clone)]
pub struct DragEvent {
    pub viewer: ViewerId,
    pub surface: SurfaceId,
    pub slots: Slots,
    cancelled: bool,
}

impl DragEvent {
    pub fn new(viewer: ViewerId, surface: SurfaceId, slots: Slots) -> Self {
        Self {
            viewer,
            surface,
            slots,
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Input events FROM the host TO the registry
#[derive(Debug, Clone)]
pub enum HostEvent {
    Click(ClickEvent),
    Drag(DragEvent),
    /// The host finished showing a surface
    Open { viewer: ViewerId, surface: SurfaceId },
    /// The host closed a surface (player action or forced)
    Close { viewer: ViewerId, surface: SurfaceId },
}

impl HostEvent {
    pub fn viewer(&self) -> &ViewerId {
        match self {
            HostEvent::Click(e) => &e.viewer,
            HostEvent::Drag(e) => &e.viewer,
            HostEvent::Open { viewer, .. } | HostEvent::Close { viewer, .. } => viewer,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        match self {
            HostEvent::Click(e) => e.surface,
            HostEvent::Drag(e) => e.surface,
            HostEvent::Open { surface, .. } | HostEvent::Close { surface, .. } => *surface,
        }
    }
}
