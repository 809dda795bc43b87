use tracing::debug;

use super::column::Column;
use super::list::{Iter, OrderedList};
use super::range::XRange;
use super::state::LayoutState;
use crate::model::{ColumnId, DesktopId};

/// Left-to-right sequence of columns on one desktop.
#[derive(Debug, Default)]
pub struct Grid {
    columns: OrderedList<ColumnId>,
    last_focused: Option<ColumnId>,
    user_resize: bool,
}

impl Grid {
    pub fn iter(&self) -> Iter<'_, ColumnId> { self.columns.iter() }

    pub fn len(&self) -> usize { self.columns.len() }

    pub fn is_empty(&self) -> bool { self.columns.is_empty() }

    pub fn contains(&self, column: ColumnId) -> bool { self.columns.contains(column) }

    pub fn first_column(&self) -> Option<ColumnId> { self.columns.first() }

    pub fn last_column(&self) -> Option<ColumnId> { self.columns.last() }

    pub fn prev_column(&self, column: ColumnId) -> Option<ColumnId> { self.columns.prev(column) }

    pub fn next_column(&self, column: ColumnId) -> Option<ColumnId> { self.columns.next(column) }

    pub fn column_at_index(&self, index: usize) -> Option<ColumnId> { self.columns.get(index) }

    pub fn column_index(&self, column: ColumnId) -> Option<usize> { self.columns.index_of(column) }

    pub fn last_focused_column(&self) -> Option<ColumnId> {
        self.last_focused.filter(|&column| self.columns.contains(column))
    }

    pub fn is_user_resizing(&self) -> bool { self.user_resize }
}

impl LayoutState {
    /// Creates an empty column right of `left` (`None` = at the start). The
    /// caller must add a window before the next arrange.
    pub fn create_column(&mut self, desktop: DesktopId, left: Option<ColumnId>) -> ColumnId {
        let column = self.columns.insert(Column::new(desktop, self.options.stack_by_default));
        self.add_column(desktop, column, left);
        column
    }

    pub fn add_column(&mut self, desktop: DesktopId, column: ColumnId, left: Option<ColumnId>) {
        self.columns[column].desktop = desktop;
        self.desktops[desktop].grid.columns.insert_after(column, left);
        debug!(?column, ?left, ?desktop, "column added");
        self.columns_changed(desktop);
    }

    pub fn add_column_before(&mut self, desktop: DesktopId, column: ColumnId, right: Option<ColumnId>) {
        self.columns[column].desktop = desktop;
        self.desktops[desktop].grid.columns.insert_before(column, right);
        self.columns_changed(desktop);
    }

    /// Drops an emptied column from its grid and the arena. With `pass_focus`
    /// a neighbor column takes over focus if this one had it.
    pub fn remove_column(&mut self, column: ColumnId, pass_focus: bool) {
        assert!(self.columns[column].is_empty(), "{column:?} still has windows");
        let to_focus = self.detach_column(column);
        self.columns.remove(column);
        if pass_focus && let Some(to_focus) = to_focus {
            self.focus_column(to_focus);
        }
    }

    /// Unlinks a column from its grid without destroying it. Returns the
    /// neighbor that inherits the grid's focus, if the column had it.
    fn detach_column(&mut self, column: ColumnId) -> Option<ColumnId> {
        let desktop = self.desktop_of(column);
        let grid = &mut self.desktops[desktop].grid;
        let was_focused = grid.last_focused == Some(column);
        let to_focus = if was_focused {
            grid.prev_column(column).or_else(|| grid.next_column(column))
        } else {
            None
        };
        grid.columns.remove(column);
        if was_focused {
            grid.last_focused = to_focus;
        }
        debug!(?column, ?desktop, "column removed");
        self.columns_changed(desktop);
        to_focus
    }

    /// Repositions a column right of `left` within its grid.
    pub fn move_column(&mut self, column: ColumnId, left: Option<ColumnId>) {
        if left == Some(column) {
            return;
        }
        let desktop = self.desktop_of(column);
        let grid = &mut self.desktops[desktop].grid;
        grid.columns.remove(column);
        grid.columns.insert_after(column, left);
        self.columns_changed(desktop);
    }

    pub fn move_column_left(&mut self, column: ColumnId) {
        let desktop = self.desktop_of(column);
        self.desktops[desktop].grid.columns.move_back(column);
        self.columns_changed(desktop);
    }

    pub fn move_column_right(&mut self, column: ColumnId) {
        let desktop = self.desktop_of(column);
        self.desktops[desktop].grid.columns.move_forward(column);
        self.columns_changed(desktop);
    }

    /// Moves a column into another desktop's grid, right of `left`.
    pub fn move_column_to_desktop(&mut self, column: ColumnId, target: DesktopId, left: Option<ColumnId>) {
        if self.desktop_of(column) == target {
            self.move_column(column, left);
            return;
        }
        self.detach_column(column);
        self.add_column(target, column, left);
        self.adopt_column(column);
    }

    /// Detaches `column` and every column right of it, in order.
    pub fn split_off(&mut self, column: ColumnId) -> Vec<ColumnId> {
        let desktop = self.desktop_of(column);
        let grid = &mut self.desktops[desktop].grid;
        let mut tail = Vec::new();
        let mut cursor = Some(column);
        while let Some(current) = cursor {
            cursor = grid.next_column(current);
            tail.push(current);
        }
        if grid.last_focused.is_some_and(|focused| tail.contains(&focused)) {
            grid.last_focused = grid.prev_column(column);
        }
        for &current in &tail {
            grid.columns.remove(current);
        }
        debug!(?desktop, moved = tail.len(), "split off grid tail");
        self.columns_changed(desktop);
        tail
    }

    /// Appends detached columns to the end of a grid, keeping their order.
    pub fn append_columns(&mut self, desktop: DesktopId, columns: Vec<ColumnId>) {
        for column in columns {
            self.columns[column].desktop = desktop;
            self.desktops[desktop].grid.columns.insert_end(column);
            self.adopt_column(column);
        }
        self.columns_changed(desktop);
    }

    /// Moves `column` and everything right of it to the end of `target`.
    pub fn evacuate_tail(&mut self, column: ColumnId, target: DesktopId) {
        if self.desktop_of(column) == target {
            return;
        }
        let tail = self.split_off(column);
        self.append_columns(target, tail);
    }

    pub fn evacuate_all(&mut self, from: DesktopId, target: DesktopId) {
        if let Some(first) = self.desktops[from].grid.first_column() {
            self.evacuate_tail(first, target);
        }
    }

    /// Brings a column that just changed desktops in line with its new grid.
    fn adopt_column(&mut self, column: ColumnId) {
        let key = self.desktops[self.desktop_of(column)].key;
        for client in self.column_clients(column) {
            if let Some(client) = self.clients.get_mut(&client) {
                client.desktop = key;
                client.handle.set_desktop(key);
            }
        }
        self.update_column_width(column);
        self.resize_windows(column);
    }

    pub fn grid_width(&self, desktop: DesktopId) -> i32 {
        let grid = &self.desktops[desktop].grid;
        if grid.is_empty() {
            return 0;
        }
        let widths: i32 = grid.iter().map(|column| self.columns[column].width()).sum();
        widths + (grid.len() as i32 - 1) * self.options.gap_h()
    }

    /// Columns intersecting `range`, or fully inside it when `fully`.
    pub fn visible_columns(&self, desktop: DesktopId, range: XRange, fully: bool) -> Vec<ColumnId> {
        self.desktops[desktop]
            .grid
            .iter()
            .filter(|&column| self.columns[column].is_visible(range, fully))
            .collect()
    }

    pub fn visible_columns_width(&self, desktop: DesktopId, range: XRange, fully: bool) -> i32 {
        let visible = self.visible_columns(desktop, range, fully);
        if visible.is_empty() {
            return 0;
        }
        let widths: i32 = visible.iter().map(|&column| self.columns[column].width()).sum();
        widths + (visible.len() as i32 - 1) * self.options.gap_h()
    }

    fn update_grid_x(&mut self, desktop: DesktopId) {
        let gap = self.options.gap_h();
        let mut x = 0;
        for column in self.desktops[desktop].grid.iter() {
            let col = &mut self.columns[column];
            col.grid_x = x;
            x += col.width() + gap;
        }
    }

    pub(crate) fn columns_changed(&mut self, desktop: DesktopId) {
        self.update_grid_x(desktop);
        self.mark_changed(desktop);
    }

    pub(crate) fn on_column_width_changed(&mut self, column: ColumnId) {
        self.columns_changed(self.desktop_of(column));
    }

    pub(crate) fn on_column_focused(&mut self, column: ColumnId) {
        let desktop = self.desktop_of(column);
        self.desktops[desktop].grid.last_focused = Some(column);
        self.mark_changed(desktop);
    }

    /// Re-applies widths and heights after the tiling area changed.
    pub(crate) fn on_screen_size_changed(&mut self, desktop: DesktopId) {
        let columns: Vec<ColumnId> = self.desktops[desktop].grid.iter().collect();
        for column in columns {
            self.update_column_width(column);
            self.resize_windows(column);
        }
    }

    pub fn on_user_resize_started(&mut self, desktop: DesktopId) {
        self.desktops[desktop].grid.user_resize = true;
    }

    pub fn on_user_resize_finished(&mut self, desktop: DesktopId) {
        self.desktops[desktop].grid.user_resize = false;
        self.mark_changed(desktop);
        self.auto_adjust_scroll(desktop);
    }

    /// Lays every column out with the grid origin at screen coordinate
    /// `origin_x`.
    pub fn arrange_grid(&mut self, desktop: DesktopId, origin_x: i32) {
        self.update_grid_x(desktop);
        for column in self.desktops[desktop].grid.iter() {
            self.arrange_column(column, origin_x + self.columns[column].left());
        }
    }
}
