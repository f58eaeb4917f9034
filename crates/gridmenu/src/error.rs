use compact_str::CompactString;
use gridmenu_core::{GridError, SurfaceId};
use thiserror::Error;

/// Errors raised by menus, views and paginations
#[derive(Debug, Error)]
pub enum MenuError {
    /// Grid geometry or content write rejected
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Navigation target has no page
    #[error("page {0} does not exist")]
    InvalidPage(i64),

    /// Navigation attempted before the pagination was opened for anyone
    #[error("pagination has no current viewer")]
    NoViewer,

    #[error("view is not open")]
    NotOpen,

    /// The host reports a different surface than the one the view rendered to
    #[error("view surface {expected} is not the viewer's active surface")]
    Desynchronized { expected: SurfaceId },

    #[error("precondition failed: {0}")]
    Precondition(&'static str),

    #[error("no menu registered as '{0}'")]
    UnknownMenu(CompactString),

    #[error("automatic pagination has no page creator")]
    MissingPageCreator,

    /// Page content does not leave room for what the page must hold
    #[error("page {page} holds {actual} cells but only {allowed} are allowed")]
    ContentOverflow {
        page: usize,
        actual: usize,
        allowed: usize,
    },

    #[error("surface error: {0}")]
    Surface(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] serde_json::Error),
}

impl MenuError {
    /// Errors callers are expected to handle and report to the viewer
    pub fn is_navigation(&self) -> bool {
        matches!(self, MenuError::InvalidPage(_) | MenuError::NoViewer)
    }

    /// Errors caused by an invalid menu or page definition
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            MenuError::Grid(_) | MenuError::MissingPageCreator | MenuError::ContentOverflow { .. }
        )
    }
}

pub type Result<T, E = MenuError> = std::result::Result<T, E>;
