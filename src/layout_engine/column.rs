use tracing::{debug, trace};

use super::fill_space::{Constraint, fill_space};
use super::list::{Iter, OrderedList};
use super::range::XRange;
use super::state::LayoutState;
use crate::model::{ColumnId, DesktopId, Window, WindowId};
use crate::sys::geometry::Rect;
use crate::sys::window::ClientId;

/// No column gets narrower than this, whatever its windows report.
pub const MIN_COLUMN_WIDTH: i32 = 40;

/// A vertical stack of windows sharing one width.
#[derive(Debug)]
pub struct Column {
    pub(crate) desktop: DesktopId,
    /// Left edge in grid coordinates.
    pub(crate) grid_x: i32,
    width: i32,
    windows: OrderedList<WindowId>,
    stacked: bool,
    focus_taker: Option<WindowId>,
}

impl Column {
    pub fn new(desktop: DesktopId, stacked: bool) -> Self {
        Self {
            desktop,
            grid_x: 0,
            width: 0,
            windows: OrderedList::new(),
            stacked,
            focus_taker: None,
        }
    }

    pub fn width(&self) -> i32 { self.width }

    pub fn left(&self) -> i32 { self.grid_x }

    pub fn right(&self) -> i32 { self.grid_x + self.width }

    pub fn range(&self) -> XRange { XRange::new(self.grid_x, self.width) }

    pub fn len(&self) -> usize { self.windows.len() }

    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    pub fn iter(&self) -> Iter<'_, WindowId> { self.windows.iter() }

    pub fn contains(&self, window: WindowId) -> bool { self.windows.contains(window) }

    pub fn first_window(&self) -> Option<WindowId> { self.windows.first() }

    pub fn last_window(&self) -> Option<WindowId> { self.windows.last() }

    pub fn window_above(&self, window: WindowId) -> Option<WindowId> { self.windows.prev(window) }

    pub fn window_below(&self, window: WindowId) -> Option<WindowId> { self.windows.next(window) }

    pub fn is_stacked(&self) -> bool { self.stacked }

    /// The last focused window, if it is still in this column.
    pub fn focus_taker(&self) -> Option<WindowId> {
        self.focus_taker.filter(|&window| self.windows.contains(window))
    }

    pub fn is_visible(&self, range: XRange, fully: bool) -> bool {
        if fully { range.contains(self.range()) } else { range.overlaps(self.range()) }
    }
}

impl LayoutState {
    pub fn column_min_width(&self, column: ColumnId) -> i32 {
        self.columns[column]
            .iter()
            .map(|window| self.windows[window].handle.min_size().width)
            .fold(MIN_COLUMN_WIDTH, i32::max)
    }

    pub fn column_max_width(&self, column: ColumnId) -> i32 {
        self.desktops[self.desktop_of(column)].viewport.tiling_area().width
    }

    /// Clamps `width` to the column bounds and applies it. With
    /// `set_preferred` the width is also remembered by every member client.
    pub fn set_column_width(&mut self, column: ColumnId, width: i32, set_preferred: bool) {
        let width = width.min(self.column_max_width(column)).max(self.column_min_width(column));
        if width == self.columns[column].width {
            return;
        }
        debug!(?column, width, set_preferred, "column width");
        self.columns[column].width = width;
        if set_preferred {
            for client in self.column_clients(column) {
                if let Some(client) = self.clients.get_mut(&client) {
                    client.preferred_width = width;
                }
            }
        }
        self.on_column_width_changed(column);
    }

    pub fn adjust_column_width(&mut self, column: ColumnId, delta: i32, set_preferred: bool) {
        let width = self.columns[column].width + delta;
        self.set_column_width(column, width, set_preferred);
    }

    /// Picks the member preferred width closest to the current width and
    /// re-applies it, clamped to the current bounds.
    pub fn update_column_width(&mut self, column: ColumnId) {
        let current = self.columns[column].width;
        let closest = self
            .column_clients(column)
            .into_iter()
            .filter_map(|client| self.clients.get(&client).map(|c| c.preferred_width))
            .min_by_key(|preferred| (preferred - current).abs())
            .unwrap_or(current);
        self.set_column_width(column, closest, false);
    }

    /// Creates a tiled window for `client` and links it into `column`.
    pub fn insert_window(&mut self, column: ColumnId, client: ClientId, at_bottom: bool) -> WindowId {
        let handle = self.clients[&client].handle.clone();
        let window = self.windows.insert(Window::new(client, column, handle));
        self.add_window(column, window, at_bottom);
        window
    }

    pub fn add_window(&mut self, column: ColumnId, window: WindowId, at_bottom: bool) {
        let col = &mut self.columns[column];
        if at_bottom {
            col.windows.insert_end(window);
        } else {
            col.windows.insert_start(window);
        }
        let first = col.width == 0;
        self.windows[window].column = column;
        debug!(?window, ?column, at_bottom, "window added to column");

        if first {
            let client = self.windows[window].client;
            let preferred = self.clients.get(&client).map_or(0, |c| c.preferred_width);
            self.set_column_width(column, preferred, false);
        }
        self.resize_windows(column);

        if self.windows[window].is_focused() {
            self.on_window_focused(window);
        }
        self.mark_changed(self.desktop_of(column));
    }

    /// Unlinks `window` from its column. The column is destroyed if that was
    /// its last window; otherwise the neighbor above (or below) can take focus.
    pub fn remove_window(&mut self, window: WindowId, pass_focus: bool) {
        let column = self.column_of(window);
        let desktop = self.desktop_of(column);
        let col = &mut self.columns[column];
        let last_window = col.len() == 1;
        let to_focus = col.window_above(window).or_else(|| col.window_below(window));
        col.windows.remove(window);
        if col.focus_taker == Some(window) {
            col.focus_taker = to_focus;
        }
        debug!(?window, ?column, last_window, "window removed from column");

        if last_window {
            self.remove_column(column, pass_focus);
        } else {
            self.resize_windows(column);
            if pass_focus && let Some(to_focus) = to_focus {
                self.focus_window(to_focus);
            }
        }
        self.mark_changed(desktop);
    }

    /// Moves a window into another column, at the bottom.
    pub fn move_window_to_column(&mut self, window: WindowId, target: ColumnId) {
        if self.column_of(window) == target {
            return;
        }
        self.remove_window(window, false);
        self.add_window(target, window, true);
    }

    pub fn move_window_up(&mut self, window: WindowId) {
        let column = self.column_of(window);
        self.columns[column].windows.move_back(window);
        self.mark_changed(self.desktop_of(column));
    }

    pub fn move_window_down(&mut self, window: WindowId) {
        let column = self.column_of(window);
        self.columns[column].windows.move_forward(window);
        self.mark_changed(self.desktop_of(column));
    }

    /// Splits the tiling height between the windows of a column. Heights
    /// plus the vertical gaps add up to the tiling height exactly.
    pub fn resize_windows(&mut self, column: ColumnId) {
        let n = self.columns[column].len();
        if n == 0 {
            return;
        }
        if n == 1 {
            self.columns[column].stacked = self.options.stack_by_default;
        }
        let desktop = self.desktop_of(column);
        let tiling_height = self.desktops[desktop].viewport.tiling_area().height;
        let available = tiling_height - (n as i32 - 1) * self.options.gap_v();
        let heights = fill_space(available, &vec![Constraint::UNBOUNDED; n]);
        let windows: Vec<WindowId> = self.columns[column].iter().collect();
        for (window, height) in windows.into_iter().zip(heights) {
            self.windows[window].height = height;
        }
        self.mark_changed(desktop);
    }

    /// Moves the border between `window` and its neighbor above (`top`) or
    /// below by `delta`.
    pub fn adjust_window_height(&mut self, window: WindowId, delta: i32, top: bool) {
        let column = self.column_of(window);
        let col = &self.columns[column];
        let other = if top { col.window_above(window) } else { col.window_below(window) };
        let Some(other) = other else { return };
        self.windows[window].height += delta;
        self.windows[other].height -= delta;
        self.mark_changed(self.desktop_of(column));
    }

    pub fn toggle_stacked(&mut self, column: ColumnId) {
        let col = &mut self.columns[column];
        if col.len() < 2 {
            return;
        }
        col.stacked = !col.stacked;
        debug!(?column, stacked = col.stacked, "toggle stacked");
        self.mark_changed(self.desktop_of(column));
    }

    fn can_stack(&self, column: ColumnId) -> bool {
        self.columns[column].iter().all(|window| self.windows[window].handle.can_shade())
    }

    /// Dims the column unless it is fully inside the visible range.
    fn apply_opacity(&self, column: ColumnId) {
        let dimmed = self.options.off_screen_opacity;
        if dimmed >= 100 {
            return;
        }
        let col = &self.columns[column];
        let visible = self.desktops[col.desktop].viewport.visible_range();
        let opacity = if col.is_visible(visible, true) { 1.0 } else { f64::from(dimmed) / 100.0 };
        for window in col.iter() {
            self.windows[window].handle.set_opacity(opacity);
        }
    }

    /// Writes frames for every window of the column with its left edge at
    /// screen coordinate `x`.
    pub fn arrange_column(&self, column: ColumnId, x: i32) {
        self.apply_opacity(column);
        let col = &self.columns[column];
        if col.stacked && col.len() >= 2 && self.can_stack(column) {
            self.arrange_stacked(column, x, col.focus_taker());
            return;
        }
        let tiling = self.desktops[col.desktop].viewport.tiling_area();
        let mut y = tiling.y;
        for window_id in col.iter() {
            let window = &self.windows[window_id];
            window.handle.set_shaded(false);
            window.arrange(Rect::new(x, y, col.width, window.height));
            y += window.height + self.options.gap_v();
        }
    }

    /// Shades every window but `expanded`, which takes the remaining height.
    /// Without a focus taker the whole column is shaded.
    fn arrange_stacked(&self, column: ColumnId, x: i32, expanded: Option<WindowId>) {
        let col = &self.columns[column];
        let tiling = self.desktops[col.desktop].viewport.tiling_area();
        let gap = self.options.gap_v();

        let mut collapsed_height = 0;
        for window_id in col.iter() {
            let handle = &self.windows[window_id].handle;
            let collapse = Some(window_id) != expanded;
            handle.set_shaded(collapse);
            if collapse {
                collapsed_height = handle.frame().height;
            }
        }
        let n_collapsed = col.len() as i32 - 1;
        let expanded_height = tiling.height - n_collapsed * (collapsed_height + gap);
        trace!(?column, collapsed_height, expanded_height, "arrange stacked");

        let mut y = tiling.y;
        for window_id in col.iter() {
            let window = &self.windows[window_id];
            if Some(window_id) == expanded {
                window.arrange(Rect::new(x, y, col.width, expanded_height));
                y += expanded_height;
            } else {
                window.arrange(Rect::new(x, y, col.width, window.height));
                y += collapsed_height;
            }
            y += gap;
        }
    }

    /// Focuses the last focused window of the column, or its first one.
    pub fn focus_column(&mut self, column: ColumnId) {
        let col = &self.columns[column];
        if let Some(window) = col.focus_taker().or_else(|| col.first_window()) {
            self.focus_window(window);
        }
    }

    pub fn on_window_focused(&mut self, window: WindowId) {
        let column = self.column_of(window);
        self.columns[column].focus_taker = Some(window);
        self.on_column_focused(column);
    }

    pub(crate) fn column_clients(&self, column: ColumnId) -> Vec<ClientId> {
        self.columns[column].iter().map(|window| self.windows[window].client).collect()
    }
}
