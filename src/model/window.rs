use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::ColumnId;
use crate::sys::geometry::{Rect, Size};
use crate::sys::window::{ClientId, Handle, StackingFlags};

/// Offset applied to a window that leaves tiling so it does not sit exactly
/// where the column was.
pub const UNTILE_OFFSET: i32 = 20;

/// State of a window from before it was tiled, restored when it floats again.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FloatingSnapshot {
    pub size: Size,
    pub stacking: StackingFlags,
    pub opacity: f64,
    pub skip_switcher: bool,
    pub maximized: bool,
}

/// How much of a [`FloatingSnapshot`] goes back onto the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Restore {
    /// Caps the restored height.
    pub max_height: Option<i32>,
    pub stacking: bool,
    /// Re-maximize a window that was maximized before it was tiled.
    pub maximized: bool,
}

impl FloatingSnapshot {
    pub fn capture(handle: &Handle) -> Self {
        Self {
            size: handle.frame().size(),
            stacking: handle.stacking(),
            opacity: handle.opacity(),
            skip_switcher: handle.skip_switcher(),
            maximized: handle.is_maximized(),
        }
    }

    /// Puts the window back to its floating size next to where it was tiled.
    pub fn restore(&self, handle: &Handle, restore: Restore) {
        handle.set_shaded(false);
        handle.set_opacity(self.opacity);
        handle.set_skip_switcher(self.skip_switcher);
        if restore.stacking {
            handle.set_stacking(self.stacking);
        }
        if restore.maximized && self.maximized {
            handle.set_maximized(true);
            return;
        }
        let frame = handle.frame();
        let height = match restore.max_height {
            Some(max) => self.size.height.min(max),
            None => self.size.height,
        };
        handle.set_frame(Rect::new(
            frame.x + UNTILE_OFFSET,
            frame.y + UNTILE_OFFSET,
            self.size.width,
            height,
        ));
    }
}

/// A tiled window. Owned by the layout arena and linked into exactly one
/// column.
#[derive(Debug)]
pub struct Window {
    pub client: ClientId,
    pub column: ColumnId,
    pub handle: Handle,
    pub height: i32,
    pub floating: FloatingSnapshot,
    /// Set while the host moves or resizes the window interactively.
    pub skip_arrange: bool,
}

impl Window {
    pub fn new(client: ClientId, column: ColumnId, handle: Handle) -> Self {
        let floating = FloatingSnapshot::capture(&handle);
        Self {
            client,
            column,
            height: floating.size.height,
            handle,
            floating,
            skip_arrange: false,
        }
    }

    pub fn arrange(&self, frame: Rect) {
        if self.skip_arrange {
            trace!(client = ?self.client, "skipping arrange during interactive operation");
            return;
        }
        if self.handle.frame() != frame {
            trace!(client = ?self.client, ?frame, "set_frame");
            self.handle.set_frame(frame);
        }
    }

    pub fn is_focused(&self) -> bool { self.handle.is_focused() }
}
