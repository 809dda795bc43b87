//! The arenas behind every desktop.
//!
//! Columns, windows and desktops live in slotmaps owned by [`LayoutState`];
//! structure is expressed through [`OrderedList`](super::list::OrderedList)s
//! of keys. Column, grid and desktop operations are implemented on
//! `LayoutState` in their own modules because most of them touch more than
//! one arena.

use slotmap::SlotMap;

use crate::common::collections::HashMap;
use crate::common::config::{Config, GapSettings, ScrollMode};
use crate::model::{Client, ColumnId, DesktopId, Window, WindowId};
use crate::sys::window::ClientId;

use super::column::Column;
use super::desktop::Desktop;

/// Layout tunables resolved from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub gaps: GapSettings,
    pub stack_by_default: bool,
    pub scroll_mode: ScrollMode,
    pub overscroll: i32,
    /// Percent; 100 leaves off-screen columns alone.
    pub off_screen_opacity: u32,
}

impl LayoutOptions {
    pub fn from_config(config: &Config) -> Self {
        let layout = &config.settings.layout;
        Self {
            gaps: layout.gaps.clone(),
            stack_by_default: layout.columns.stack_by_default,
            scroll_mode: layout.scrolling.mode,
            overscroll: layout.scrolling.overscroll,
            off_screen_opacity: layout.columns.off_screen_opacity,
        }
    }

    pub fn gap_h(&self) -> i32 { self.gaps.inner.horizontal }

    pub fn gap_v(&self) -> i32 { self.gaps.inner.vertical }
}

impl Default for LayoutOptions {
    fn default() -> Self { Self::from_config(&Config::default()) }
}

#[derive(Debug, Default)]
pub struct LayoutState {
    pub windows: SlotMap<WindowId, Window>,
    pub columns: SlotMap<ColumnId, Column>,
    pub desktops: SlotMap<DesktopId, Desktop>,
    pub clients: HashMap<ClientId, Client>,
    pub options: LayoutOptions,
}

impl LayoutState {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn window(&self, window: WindowId) -> &Window { &self.windows[window] }

    pub fn column(&self, column: ColumnId) -> &Column { &self.columns[column] }

    pub fn desktop(&self, desktop: DesktopId) -> &Desktop { &self.desktops[desktop] }

    pub fn column_of(&self, window: WindowId) -> ColumnId { self.windows[window].column }

    pub fn desktop_of(&self, column: ColumnId) -> DesktopId { self.columns[column].desktop }

    /// Requests focus for a tiled window and records it as focused right
    /// away; the host's confirmation is then a no-op.
    pub fn focus_window(&mut self, window: WindowId) {
        self.windows[window].handle.focus();
        self.on_window_focused(window);
    }

    /// Panics if the arenas and the lists disagree. Used by tests after
    /// every mutation.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        for (desktop_id, desktop) in &self.desktops {
            let mut prev_x = None;
            for column_id in desktop.grid.iter() {
                let column = &self.columns[column_id];
                assert_eq!(column.desktop, desktop_id);
                assert!(column.len() > 0, "{column_id:?} is empty");
                if let Some(prev_x) = prev_x {
                    assert!(column.grid_x > prev_x, "grid_x not increasing at {column_id:?}");
                }
                prev_x = Some(column.grid_x);
                for window_id in column.iter() {
                    assert_eq!(self.windows[window_id].column, column_id);
                }
            }
        }
        let linked: usize = self.columns.values().map(|c| c.len()).sum();
        assert_eq!(linked, self.windows.len());
        let listed: usize = self.desktops.values().map(|d| d.grid.len()).sum();
        assert_eq!(listed, self.columns.len());
    }
}
