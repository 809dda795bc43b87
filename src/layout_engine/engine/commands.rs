use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::LayoutEngine;
use crate::model::{ColumnId, DesktopId};
use crate::sys::screen::DesktopKey;

/// User actions. Commands about "the focused window" or "the focused column"
/// do nothing unless the host's active window is tiled. Column indices are
/// zero based; desktop numbers refer to the current output.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCommand {
    FocusLeft,
    FocusRight,
    FocusUp,
    FocusDown,
    FocusStart,
    FocusEnd,
    FocusColumn(usize),

    WindowMoveLeft,
    WindowMoveRight,
    WindowMoveUp,
    WindowMoveDown,
    WindowMoveStart,
    WindowMoveEnd,
    WindowMoveToColumn(usize),
    WindowMoveToDesktop(u32),
    WindowToggleFloating,

    ColumnMoveLeft,
    ColumnMoveRight,
    ColumnMoveStart,
    ColumnMoveEnd,
    ColumnMoveToColumn(usize),
    ColumnMoveToDesktop(u32),
    /// Moves the focused column and every column right of it.
    TailMoveToDesktop(u32),
    ColumnToggleStacked,
    ColumnWidthIncrease,
    ColumnWidthDecrease,
    CyclePresetWidths,
    CyclePresetWidthsReverse,
    ColumnsWidthEqualize,

    GridScrollLeft,
    GridScrollRight,
    /// Scrolls to the column left of the leftmost fully visible one.
    GridScrollLeftColumn,
    GridScrollRightColumn,
    GridScrollStart,
    GridScrollEnd,
    GridScrollFocused,
}

impl LayoutEngine {
    pub fn handle_command(&mut self, command: &LayoutCommand) {
        info!(?command, "layout command");
        use LayoutCommand::*;
        match *command {
            FocusLeft => self.focus_sideways(false),
            FocusRight => self.focus_sideways(true),
            FocusUp => self.focus_vertical(false),
            FocusDown => self.focus_vertical(true),
            FocusStart => self.focus_edge(false),
            FocusEnd => self.focus_edge(true),
            FocusColumn(index) => self.focus_column_at(index),

            WindowMoveLeft => self.move_window_sideways(false),
            WindowMoveRight => self.move_window_sideways(true),
            WindowMoveUp => self.move_window_vertical(false),
            WindowMoveDown => self.move_window_vertical(true),
            WindowMoveStart => self.move_window_to_edge(false),
            WindowMoveEnd => self.move_window_to_edge(true),
            WindowMoveToColumn(index) => self.move_window_to_column_at(index),
            WindowMoveToDesktop(number) => self.move_window_to_desktop(number),
            WindowToggleFloating => {
                let active = self.state.clients.values().find(|c| c.handle.is_focused()).map(|c| c.id);
                if let Some(id) = active {
                    self.toggle_floating(id);
                }
            }

            ColumnMoveLeft => self.move_column_sideways(false),
            ColumnMoveRight => self.move_column_sideways(true),
            ColumnMoveStart => self.move_column_to_edge(false),
            ColumnMoveEnd => self.move_column_to_edge(true),
            ColumnMoveToColumn(index) => self.move_column_to_index(index),
            ColumnMoveToDesktop(number) => self.move_column_to_desktop(number, false),
            TailMoveToDesktop(number) => self.move_column_to_desktop(number, true),
            ColumnToggleStacked => {
                if let Some((_, column, _)) = self.focused_column() {
                    self.state.toggle_stacked(column);
                }
            }
            ColumnWidthIncrease => self.step_column_width(true),
            ColumnWidthDecrease => self.step_column_width(false),
            CyclePresetWidths => self.cycle_preset_width(true),
            CyclePresetWidthsReverse => self.cycle_preset_width(false),
            ColumnsWidthEqualize => {
                let desktop = self.current_desktop_id();
                self.state.equalize_visible_columns_widths(desktop);
            }

            GridScrollLeft => self.scroll_by(-self.behavior.scroll_step),
            GridScrollRight => self.scroll_by(self.behavior.scroll_step),
            GridScrollLeftColumn => self.scroll_past_visible(false),
            GridScrollRightColumn => self.scroll_past_visible(true),
            GridScrollStart => self.scroll_to_edge(false),
            GridScrollEnd => self.scroll_to_edge(true),
            GridScrollFocused => {
                if let Some((_, column, desktop)) = self.focused_column() {
                    let range = self.state.column(column).range();
                    self.state.scroll_center_range(desktop, range);
                }
            }
        }
    }

    fn neighbor_column(&self, desktop: DesktopId, column: ColumnId, right: bool) -> Option<ColumnId> {
        let grid = &self.state.desktop(desktop).grid;
        if right { grid.next_column(column) } else { grid.prev_column(column) }
    }

    fn edge_column(&self, desktop: DesktopId, end: bool) -> Option<ColumnId> {
        let grid = &self.state.desktop(desktop).grid;
        if end { grid.last_column() } else { grid.first_column() }
    }

    fn focus_sideways(&mut self, right: bool) {
        let Some((_, column, desktop)) = self.focused_column() else { return };
        if let Some(neighbor) = self.neighbor_column(desktop, column, right) {
            self.state.focus_column(neighbor);
        }
    }

    fn focus_vertical(&mut self, down: bool) {
        let Some((window, column, _)) = self.focused_column() else { return };
        let col = self.state.column(column);
        let target = if down { col.window_below(window) } else { col.window_above(window) };
        if let Some(target) = target {
            self.state.focus_window(target);
        }
    }

    fn focus_edge(&mut self, end: bool) {
        let desktop = self.current_desktop_id();
        if let Some(column) = self.edge_column(desktop, end) {
            self.state.focus_column(column);
        }
    }

    fn focus_column_at(&mut self, index: usize) {
        let desktop = self.current_desktop_id();
        if let Some(column) = self.state.desktop(desktop).grid.column_at_index(index) {
            self.state.focus_column(column);
        }
    }

    /// A window alone in its column joins the neighbor column; a window
    /// sharing its column gets a new column on that side.
    fn move_window_sideways(&mut self, right: bool) {
        let Some((window, column, desktop)) = self.focused_column() else { return };
        if self.state.column(column).len() == 1 {
            let Some(neighbor) = self.neighbor_column(desktop, column, right) else { return };
            self.state.move_window_to_column(window, neighbor);
            self.state.auto_adjust_scroll(desktop);
        } else {
            let left = if right { Some(column) } else { self.state.desktop(desktop).grid.prev_column(column) };
            let target = self.state.create_column(desktop, left);
            self.state.move_window_to_column(window, target);
        }
    }

    fn move_window_vertical(&mut self, down: bool) {
        let Some((window, ..)) = self.focused_column() else { return };
        if down {
            self.state.move_window_down(window);
        } else {
            self.state.move_window_up(window);
        }
    }

    fn move_window_to_edge(&mut self, end: bool) {
        let Some((window, _, desktop)) = self.focused_column() else { return };
        let left = if end { self.state.desktop(desktop).grid.last_column() } else { None };
        let target = self.state.create_column(desktop, left);
        self.state.move_window_to_column(window, target);
    }

    fn move_window_to_column_at(&mut self, index: usize) {
        let Some((window, _, desktop)) = self.focused_column() else { return };
        let Some(target) = self.state.desktop(desktop).grid.column_at_index(index) else { return };
        self.state.move_window_to_column(window, target);
        self.state.auto_adjust_scroll(desktop);
    }

    fn move_window_to_desktop(&mut self, number: u32) {
        let Some((window, ..)) = self.focused_column() else { return };
        let key = DesktopKey::new(self.current.output, number);
        let client = self.state.window(window).client;
        self.state.window(window).handle.set_desktop(key);
        self.window_desktop_changed(client, key);
    }

    fn move_column_sideways(&mut self, right: bool) {
        let Some((_, column, _)) = self.focused_column() else { return };
        if right {
            self.state.move_column_right(column);
        } else {
            self.state.move_column_left(column);
        }
    }

    fn move_column_to_edge(&mut self, end: bool) {
        let Some((_, column, desktop)) = self.focused_column() else { return };
        let left = if end { self.state.desktop(desktop).grid.last_column() } else { None };
        self.state.move_column(column, left);
    }

    /// Puts the focused column where the column at `index` is now.
    fn move_column_to_index(&mut self, index: usize) {
        let Some((_, column, desktop)) = self.focused_column() else { return };
        let grid = &self.state.desktop(desktop).grid;
        let Some(target) = grid.column_at_index(index).filter(|&target| target != column) else { return };
        let left = if grid.column_index(target) > grid.column_index(column) {
            Some(target)
        } else {
            grid.prev_column(target)
        };
        self.state.move_column(column, left);
    }

    fn move_column_to_desktop(&mut self, number: u32, with_tail: bool) {
        let Some((_, column, desktop)) = self.focused_column() else { return };
        let key = DesktopKey::new(self.current.output, number);
        let target = self.desktop_id(key);
        if target == desktop {
            return;
        }
        debug!(?key, with_tail, "moving column to desktop");
        if with_tail {
            self.state.evacuate_tail(column, target);
        } else {
            let left = self.state.desktop(target).grid.last_column();
            self.state.move_column_to_desktop(column, target, left);
        }
    }

    fn step_column_width(&mut self, grow: bool) {
        let Some((_, column, _)) = self.focused_column() else { return };
        let step = if grow { self.behavior.resize_step } else { -self.behavior.resize_step };
        let width = self.state.column(column).width() + step;
        self.resize_focused_column(column, width);
    }

    fn cycle_preset_width(&mut self, forward: bool) {
        let Some((_, column, _)) = self.focused_column() else { return };
        let Some(presets) = &self.behavior.preset_widths else { return };
        let current = self.state.column(column).width();
        let min = self.state.column_min_width(column);
        let max = self.state.column_max_width(column);
        let width = if forward { presets.next(current, min, max) } else { presets.prev(current, min, max) };
        if let Some(width) = width {
            self.resize_focused_column(column, width);
        }
    }

    /// Applies a width the user asked for and keeps the column and its
    /// neighbors in view.
    fn resize_focused_column(&mut self, column: ColumnId, width: i32) {
        let before = self.state.column(column).width();
        self.state.set_column_width(column, width, true);
        if self.state.column(column).width() == before {
            return;
        }
        let desktop = self.state.desktop_of(column);
        self.state.scroll_center_visible(desktop, column);
        self.state.mark_changed(desktop);
        self.state.auto_adjust_scroll(desktop);
    }

    fn scroll_by(&mut self, delta: i32) {
        let desktop = self.current_desktop_id();
        self.state.adjust_scroll(desktop, delta, false);
    }

    fn scroll_past_visible(&mut self, right: bool) {
        let desktop = self.current_desktop_id();
        let range = self.state.desktop(desktop).viewport.visible_range();
        let visible = self.state.visible_columns(desktop, range, true);
        let edge = if right { visible.last() } else { visible.first() };
        let target = edge.and_then(|&column| self.neighbor_column(desktop, column, right));
        if let Some(target) = target {
            self.state.scroll_to_column(desktop, target);
        }
    }

    fn scroll_to_edge(&mut self, end: bool) {
        let desktop = self.current_desktop_id();
        if let Some(column) = self.edge_column(desktop, end) {
            self.state.scroll_to_column(desktop, column);
        }
    }
}
