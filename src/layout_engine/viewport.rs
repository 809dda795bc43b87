use serde::Serialize;

use super::range::XRange;
use super::utils::{compute_tiling_area, round_half};
use crate::common::config::GapSettings;
use crate::sys::geometry::Rect;

/// Scroll position over a grid plus the screen area it is shown in.
#[derive(Serialize, Debug, Clone)]
pub struct Viewport {
    scroll_x: i32,
    #[serde(skip)]
    dirty: bool,
    #[serde(skip)]
    dirty_scroll: bool,
    #[serde(skip)]
    dirty_area: bool,
    area: Rect,
    tiling_area: Rect,
}

impl Viewport {
    pub fn new(area: Rect, gaps: &GapSettings) -> Self {
        Self {
            scroll_x: 0,
            dirty: true,
            dirty_scroll: true,
            dirty_area: false,
            area,
            tiling_area: compute_tiling_area(area, gaps),
        }
    }

    pub fn scroll_x(&self) -> i32 { self.scroll_x }

    /// Placement area reported by the host.
    pub fn area(&self) -> Rect { self.area }

    /// Placement area minus the outer gaps.
    pub fn tiling_area(&self) -> Rect { self.tiling_area }

    pub fn width(&self) -> i32 { self.tiling_area.width }

    pub fn visible_range(&self) -> XRange { self.visible_range_at(self.scroll_x) }

    pub fn visible_range_at(&self, scroll_x: i32) -> XRange { XRange::new(scroll_x, self.width()) }

    pub fn is_dirty(&self) -> bool { self.dirty }

    pub fn is_scroll_dirty(&self) -> bool { self.dirty_scroll }

    pub fn mark_changed(&mut self) {
        self.dirty = true;
        self.dirty_scroll = true;
    }

    /// Forces the next [`update_area`](Self::update_area) to re-apply the
    /// area even if the host reports the same rectangle.
    pub fn mark_area_dirty(&mut self) {
        self.dirty_area = true;
        self.mark_changed();
    }

    /// Returns true if the tiling area was recomputed.
    pub fn update_area(&mut self, area: Rect, gaps: &GapSettings) -> bool {
        if area == self.area && !self.dirty_area {
            return false;
        }
        self.area = area;
        self.tiling_area = compute_tiling_area(area, gaps);
        self.dirty_area = false;
        self.mark_changed();
        true
    }

    pub fn set_scroll_x(&mut self, scroll_x: i32) {
        if scroll_x != self.scroll_x {
            self.scroll_x = scroll_x;
            self.dirty = true;
        }
        self.dirty_scroll = false;
    }

    pub fn clear_dirty(&mut self) { self.dirty = false; }
}

/// Clamp that keeps the grid edges on screen. A grid narrower than the
/// viewport is centered.
pub fn clamp_edges(scroll_x: i32, grid_width: i32, view_width: i32) -> i32 {
    let max = grid_width - view_width;
    if max < 0 {
        return round_half(max);
    }
    scroll_x.clamp(0, max)
}

/// Clamp that lets the first and last column reach the center of the
/// viewport.
pub fn clamp_centered(scroll_x: i32, first_width: i32, last_width: i32, grid_width: i32, view_width: i32) -> i32 {
    let min = round_half(first_width - view_width);
    let max = round_half(2 * grid_width - last_width - view_width);
    scroll_x.min(max).max(min)
}
