//! Capability interface for a single host window.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Rect, Size};
use crate::sys::screen::DesktopKey;

/// Opaque identifier the host assigns to a window.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ClientId({})", self.0) }
}

bitflags! {
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StackingFlags: u8 {
        const KEEP_ABOVE = 1 << 0;
        const KEEP_BELOW = 1 << 1;
    }
}

/// Operations the layout core needs from a host window.
///
/// Handles are shared between the client table and the tiled window that
/// wraps them, so every method takes `&self`; implementations use interior
/// mutability or forward to the host.
pub trait WindowHandle: fmt::Debug {
    fn frame(&self) -> Rect;
    fn set_frame(&self, frame: Rect);
    fn min_size(&self) -> Size;

    /// Whether the host can collapse the window to its title bar.
    fn can_shade(&self) -> bool;
    fn set_shaded(&self, shaded: bool);

    fn focus(&self);
    fn is_focused(&self) -> bool;

    fn stacking(&self) -> StackingFlags;
    fn set_stacking(&self, flags: StackingFlags);

    /// 0.0 (transparent) to 1.0 (opaque).
    fn opacity(&self) -> f64;
    fn set_opacity(&self, opacity: f64);

    /// Whether the window is left out of the task switcher.
    fn skip_switcher(&self) -> bool;
    fn set_skip_switcher(&self, skip: bool);

    fn is_maximized(&self) -> bool;
    fn set_maximized(&self, maximized: bool);

    fn is_resizable(&self) -> bool;
    fn is_dock(&self) -> bool { false }

    /// Moves the window to another output/desktop pair.
    fn set_desktop(&self, desktop: DesktopKey);

    fn class(&self) -> String { String::new() }
    fn caption(&self) -> String { String::new() }
}

pub type Handle = Rc<dyn WindowHandle>;

/// Resolves the handle for a window the host announced by id.
pub trait WindowLookup {
    fn handle(&self, id: ClientId) -> Option<Handle>;
}
