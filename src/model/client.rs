use std::fmt;

use strum::Display;

use crate::model::WindowId;
use crate::sys::screen::DesktopKey;
use crate::sys::window::{ClientId, Handle};

/// Every window the host reported, whether the layout tiles it or not.
pub struct Client {
    pub id: ClientId,
    pub handle: Handle,
    pub desktop: DesktopKey,
    /// Width the user last chose for this window. Survives untiling so the
    /// window comes back at the same width.
    pub preferred_width: i32,
    pub state: ClientState,
}

impl Client {
    pub fn new(id: ClientId, handle: Handle, desktop: DesktopKey) -> Self {
        let preferred_width = handle.frame().width;
        Self {
            id,
            handle,
            desktop,
            preferred_width,
            state: ClientState::Floating,
        }
    }

    pub fn tiled_window(&self) -> Option<WindowId> {
        match self.state {
            ClientState::Tiled { window } => Some(window),
            _ => None,
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("desktop", &self.desktop)
            .field("preferred_width", &self.preferred_width)
            .field("state", &self.state)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Floating,
    Docked,
    Tiled { window: WindowId },
    /// Minimized while tiled; comes back tiled when unminimized.
    TiledMinimized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ClientStateKind {
    Floating,
    Docked,
    Tiled,
    TiledMinimized,
}

impl ClientState {
    pub fn kind(&self) -> ClientStateKind {
        match self {
            ClientState::Floating => ClientStateKind::Floating,
            ClientState::Docked => ClientStateKind::Docked,
            ClientState::Tiled { .. } => ClientStateKind::Tiled,
            ClientState::TiledMinimized => ClientStateKind::TiledMinimized,
        }
    }
}

impl ClientStateKind {
    /// Allowed transitions. Anything not listed is rejected.
    pub fn can_enter(self, to: ClientStateKind) -> bool {
        use ClientStateKind::*;
        matches!(
            (self, to),
            (Floating, Tiled)
                | (Floating, Docked)
                | (Tiled, Floating)
                | (Tiled, TiledMinimized)
                | (TiledMinimized, Tiled)
                | (TiledMinimized, Floating)
                | (Docked, Floating)
        )
    }
}
