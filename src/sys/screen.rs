use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;

/// One grid per (output, virtual desktop) pair.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DesktopKey {
    pub output: u32,
    pub desktop: u32,
}

impl DesktopKey {
    pub const fn new(output: u32, desktop: u32) -> Self { Self { output, desktop } }
}

impl fmt::Debug for DesktopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Desktop({}:{})", self.output, self.desktop)
    }
}

impl fmt::Display for DesktopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}:{}", self.output, self.desktop) }
}

/// Reports where windows may be placed on a desktop. The result can change at
/// any time (resolution changes, panels appearing), so callers re-query it
/// before every arrangement.
pub trait AreaProvider {
    fn placement_area(&self, key: DesktopKey) -> Rect;
}
