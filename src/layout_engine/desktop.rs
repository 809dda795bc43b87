//! Scrolling over a grid: clamping, following focus, overscroll and width
//! equalization.

use tracing::{debug, trace};

use super::fill_space::{Constraint, fill_space};
use super::grid::Grid;
use super::range::XRange;
use super::state::LayoutState;
use super::utils::round_half;
use super::viewport::{Viewport, clamp_centered, clamp_edges};
use crate::common::config::ScrollMode;
use crate::model::{ColumnId, DesktopId};
use crate::sys::geometry::Rect;
use crate::sys::screen::DesktopKey;

/// One grid shown through one viewport.
#[derive(Debug)]
pub struct Desktop {
    pub key: DesktopKey,
    pub grid: Grid,
    pub viewport: Viewport,
}

impl LayoutState {
    pub fn create_desktop(&mut self, key: DesktopKey, area: Rect) -> DesktopId {
        let desktop = self.desktops.insert(Desktop {
            key,
            grid: Grid::default(),
            viewport: Viewport::new(area, &self.options.gaps),
        });
        debug!(?key, ?desktop, ?area, "desktop created");
        desktop
    }

    /// Drops a desktop whose grid has already been emptied.
    pub fn remove_desktop(&mut self, desktop: DesktopId) {
        assert!(self.desktops[desktop].grid.is_empty(), "{desktop:?} still has columns");
        let removed = self.desktops.remove(desktop);
        debug!(key = ?removed.map(|d| d.key), "desktop removed");
    }

    pub fn mark_changed(&mut self, desktop: DesktopId) { self.desktops[desktop].viewport.mark_changed(); }

    pub fn clamp_scroll_x(&self, desktop: DesktopId, scroll_x: i32) -> i32 {
        let d = &self.desktops[desktop];
        let grid_width = self.grid_width(desktop);
        let view_width = d.viewport.width();
        match (self.options.scroll_mode, d.grid.first_column(), d.grid.last_column()) {
            (ScrollMode::Centered, Some(first), Some(last)) => clamp_centered(
                scroll_x,
                self.columns[first].width(),
                self.columns[last].width(),
                grid_width,
                view_width,
            ),
            _ => clamp_edges(scroll_x, grid_width, view_width),
        }
    }

    /// Sets the scroll position, clamped unless `force`.
    pub fn set_scroll(&mut self, desktop: DesktopId, scroll_x: i32, force: bool) {
        let scroll_x = if force { scroll_x } else { self.clamp_scroll_x(desktop, scroll_x) };
        trace!(?desktop, scroll_x, force, "set scroll");
        self.desktops[desktop].viewport.set_scroll_x(scroll_x);
    }

    pub fn adjust_scroll(&mut self, desktop: DesktopId, delta: i32, force: bool) {
        let scroll_x = self.desktops[desktop].viewport.scroll_x() + delta;
        self.set_scroll(desktop, scroll_x, force);
    }

    /// Re-clamps the current position, dropping any overscroll.
    pub fn remove_overscroll(&mut self, desktop: DesktopId) {
        let scroll_x = self.desktops[desktop].viewport.scroll_x();
        self.set_scroll(desktop, scroll_x, false);
    }

    /// Scrolls just far enough to show `range`, plus the configured
    /// overscroll in the direction of travel.
    pub fn scroll_into_view(&mut self, desktop: DesktopId, range: XRange) {
        let viewport = &self.desktops[desktop].viewport;
        let visible = viewport.visible_range();
        let width = viewport.width();

        let (target, scroll_left) = if range.left < visible.left {
            (range.left, true)
        } else if range.right > visible.right {
            (range.right - width, false)
        } else {
            let scroll_x = self.clamp_scroll_x(desktop, visible.left);
            self.set_scroll(desktop, scroll_x, true);
            return;
        };

        let overscroll = self.target_overscroll(desktop, target, scroll_left);
        let scroll_x = self.clamp_scroll_x(desktop, target + overscroll);
        self.set_scroll(desktop, scroll_x, true);
    }

    /// Overscroll never exceeds half of the space left empty by the columns
    /// fully visible at `target`.
    fn target_overscroll(&self, desktop: DesktopId, target: i32, scroll_left: bool) -> i32 {
        let overscroll = self.options.overscroll;
        if overscroll == 0 {
            return 0;
        }
        let viewport = &self.desktops[desktop].viewport;
        let used = self.visible_columns_width(desktop, viewport.visible_range_at(target), true);
        let remaining = viewport.width() - used;
        let overscroll = overscroll.min(round_half(remaining));
        if scroll_left { -overscroll } else { overscroll }
    }

    /// Moves the viewport so its center lines up with the center of `range`.
    pub fn scroll_center_range(&mut self, desktop: DesktopId, range: XRange) {
        let viewport = &self.desktops[desktop].viewport;
        let doubled_delta =
            range.left + range.right - 2 * viewport.scroll_x() - viewport.width();
        self.adjust_scroll(desktop, round_half(doubled_delta), false);
    }

    /// Centers `column` together with as many neighbors as fit on screen.
    pub fn scroll_center_visible(&mut self, desktop: DesktopId, column: ColumnId) {
        let range = self.grouped_range(desktop, column);
        self.scroll_center_range(desktop, range);
    }

    /// Grows a range around `column` one neighbor at a time, picking the side
    /// whose outer edge is nearer the current visible center.
    fn grouped_range(&self, desktop: DesktopId, column: ColumnId) -> XRange {
        let d = &self.desktops[desktop];
        let gap = self.options.gap_h();
        let visible = d.viewport.visible_range();
        let doubled_center = (visible.left + visible.right) as i64;
        let fits = |candidate: ColumnId, width: i32| {
            width + gap + self.columns[candidate].width() <= visible.width()
        };

        let (mut left, mut right) = (column, column);
        let mut width = self.columns[column].width();
        let mut left_candidate = d.grid.prev_column(left).filter(|&c| fits(c, width));
        let mut right_candidate = d.grid.next_column(right).filter(|&c| fits(c, width));
        while left_candidate.is_some() || right_candidate.is_some() {
            let distance = |edge: Option<i32>| {
                edge.map_or(i64::MAX, |edge| (2 * edge as i64 - doubled_center).abs())
            };
            let to_left = distance(left_candidate.map(|c| self.columns[c].left()));
            let to_right = distance(right_candidate.map(|c| self.columns[c].right()));
            if to_left < to_right
                && let Some(candidate) = left_candidate
            {
                left = candidate;
                width += self.columns[candidate].width() + gap;
            } else if let Some(candidate) = right_candidate {
                right = candidate;
                width += self.columns[candidate].width() + gap;
            }
            left_candidate = d.grid.prev_column(left).filter(|&c| fits(c, width));
            right_candidate = d.grid.next_column(right).filter(|&c| fits(c, width));
        }
        XRange::between(self.columns[left].left(), self.columns[right].right())
    }

    /// Brings `column` on screen the way the scroll mode wants, unless it is
    /// already fully visible and nothing moved since the last scroll.
    pub fn scroll_to_column(&mut self, desktop: DesktopId, column: ColumnId) {
        let viewport = &self.desktops[desktop].viewport;
        let visible = self.columns[column].is_visible(viewport.visible_range(), true);
        if !viewport.is_scroll_dirty() && visible {
            return;
        }
        let range = self.columns[column].range();
        match self.options.scroll_mode {
            ScrollMode::Lazy => self.scroll_into_view(desktop, range),
            ScrollMode::Centered => self.scroll_center_range(desktop, range),
            ScrollMode::Grouped => self.scroll_center_visible(desktop, column),
        }
    }

    /// Follows the grid's focused column; without one only re-clamps.
    pub fn auto_adjust_scroll(&mut self, desktop: DesktopId) {
        let grid = &self.desktops[desktop].grid;
        if grid.is_user_resizing() {
            return;
        }
        match grid.last_focused_column() {
            Some(column) => self.scroll_to_column(desktop, column),
            None => self.remove_overscroll(desktop),
        }
    }

    /// Splits the viewport width between the fully visible columns, giving
    /// columns with a large minimum width what they need first, then centers
    /// on them.
    pub fn equalize_visible_columns_widths(&mut self, desktop: DesktopId) {
        let viewport = &self.desktops[desktop].viewport;
        let view_width = viewport.width();
        let visible = self.visible_columns(desktop, viewport.visible_range(), true);
        let (Some(&first), Some(&last)) = (visible.first(), visible.last()) else {
            return;
        };

        let budget = view_width - (visible.len() as i32 - 1) * self.options.gap_h();
        let constraints: Vec<Constraint> = visible
            .iter()
            .map(|&column| Constraint::new(self.column_min_width(column), view_width))
            .collect();
        let widths = fill_space(budget, &constraints);
        debug!(?desktop, ?widths, "equalize visible columns");
        for (&column, width) in visible.iter().zip(widths) {
            self.set_column_width(column, width, true);
        }

        let range = XRange::between(self.columns[first].left(), self.columns[last].right());
        self.scroll_center_range(desktop, range);
    }

    /// Writes geometry for a desktop if anything changed since the last call.
    /// `area` is the host's current placement area for it.
    pub fn arrange_desktop(&mut self, desktop: DesktopId, area: Rect) {
        let gaps = self.options.gaps.clone();
        if self.desktops[desktop].viewport.update_area(area, &gaps) {
            debug!(?desktop, ?area, "placement area changed");
            self.on_screen_size_changed(desktop);
        }
        if self.desktops[desktop].viewport.is_scroll_dirty() {
            self.auto_adjust_scroll(desktop);
        }
        let viewport = &self.desktops[desktop].viewport;
        if !viewport.is_dirty() {
            return;
        }
        let origin_x = viewport.tiling_area().x - viewport.scroll_x();
        self.arrange_grid(desktop, origin_x);
        self.desktops[desktop].viewport.clear_dirty();
    }
}
