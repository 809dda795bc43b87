//! Root context of the layout.
//!
//! [`LayoutEngine`] owns every client the host reported and one grid per
//! desktop. Host events arrive through the `window_*` and `desktop_*` ports
//! and user actions through [`LayoutEngine::handle_command`]. None of them
//! writes geometry; [`LayoutEngine::arrange`] does that for every desktop
//! whose state changed.

mod commands;
mod rules;
mod snapshot;

use std::rc::Rc;

pub use commands::LayoutCommand;
pub use rules::WindowRules;
pub use snapshot::{ClientSnapshot, ColumnSnapshot, DesktopSnapshot, LayoutSnapshot, WindowSnapshot};
use tracing::{debug, info, trace, warn};

use super::preset_widths::PresetWidths;
use super::state::{LayoutOptions, LayoutState};
use super::utils::round_half;
use crate::common::collections::BTreeMap;
use crate::common::config::Config;
use crate::model::{Client, ClientState, ClientStateKind, ColumnId, DesktopId, Restore, WindowId};
use crate::sys::geometry::Rect;
use crate::sys::screen::{AreaProvider, DesktopKey};
use crate::sys::window::{ClientId, Handle, StackingFlags};

/// Settings that steer event and command handling rather than geometry.
#[derive(Debug, Clone)]
struct Behavior {
    untile_on_drag: bool,
    tiled_keep_below: bool,
    floating_keep_above: bool,
    no_layering: bool,
    skip_switcher: bool,
    re_maximize: bool,
    resize_step: i32,
    scroll_step: i32,
    resize_neighbor_column: bool,
    preset_widths: Option<PresetWidths>,
}

impl Behavior {
    fn from_config(config: &Config) -> Self {
        let settings = &config.settings;
        let columns = &settings.layout.columns;
        let spacing = settings.layout.gaps.inner.horizontal;
        let preset_widths = match PresetWidths::parse(&columns.preset_widths, spacing) {
            Ok(presets) => Some(presets),
            Err(err) => {
                warn!(%err, "ignoring preset widths");
                None
            }
        };
        Self {
            untile_on_drag: settings.untile_on_drag,
            tiled_keep_below: settings.tiled_keep_below,
            floating_keep_above: settings.floating_keep_above,
            no_layering: settings.no_layering,
            skip_switcher: settings.skip_switcher,
            re_maximize: settings.re_maximize,
            resize_step: columns.resize_step,
            scroll_step: settings.layout.scrolling.scroll_step,
            resize_neighbor_column: columns.resize_neighbor_column,
            preset_widths,
        }
    }
}

pub struct LayoutEngine {
    state: LayoutState,
    area_provider: Rc<dyn AreaProvider>,
    desktops: BTreeMap<DesktopKey, DesktopId>,
    current: DesktopKey,
    /// Last client the host reported as focused, tiled or not.
    last_focused: Option<ClientId>,
    /// Client the host is resizing interactively, with the desktop whose grid
    /// was put into resize mode.
    resizing: Option<(ClientId, DesktopId)>,
    rules: WindowRules,
    behavior: Behavior,
}

impl LayoutEngine {
    pub fn new(config: &Config, area_provider: Rc<dyn AreaProvider>, current: DesktopKey) -> Self {
        let mut engine = Self {
            state: LayoutState::new(LayoutOptions::from_config(config)),
            area_provider,
            desktops: BTreeMap::default(),
            current,
            last_focused: None,
            resizing: None,
            rules: WindowRules::compile(&config.window_rules),
            behavior: Behavior::from_config(config),
        };
        engine.desktop_id(current);
        info!(?current, "layout engine started");
        engine
    }

    /// Releases every client, restoring the floating geometry of tiled
    /// windows, and drops all grids.
    pub fn destroy(mut self) {
        let mut clients: Vec<ClientId> = self.state.clients.keys().copied().collect();
        clients.sort();
        for id in clients {
            self.remove_client(id, false);
        }
        for desktop in std::mem::take(&mut self.desktops).into_values() {
            self.state.remove_desktop(desktop);
        }
        info!("layout engine destroyed");
    }

    pub fn state(&self) -> &LayoutState { &self.state }

    pub fn current_desktop(&self) -> DesktopKey { self.current }

    pub fn desktop(&self, key: DesktopKey) -> Option<DesktopId> { self.desktops.get(&key).copied() }

    pub fn client(&self, id: ClientId) -> Option<&Client> { self.state.clients.get(&id) }

    /// Grid for `key`, created on first use.
    fn desktop_id(&mut self, key: DesktopKey) -> DesktopId {
        if let Some(&desktop) = self.desktops.get(&key) {
            return desktop;
        }
        let area = self.area_provider.placement_area(key);
        let desktop = self.state.create_desktop(key, area);
        self.desktops.insert(key, desktop);
        desktop
    }

    fn current_desktop_id(&mut self) -> DesktopId { self.desktop_id(self.current) }

    fn tiled(&self, id: ClientId) -> Option<WindowId> {
        self.state.clients.get(&id).and_then(Client::tiled_window)
    }

    /// The tiled window the host currently shows as active.
    fn focused_window(&self) -> Option<WindowId> {
        self.state
            .clients
            .values()
            .find(|client| client.handle.is_focused())
            .and_then(Client::tiled_window)
    }

    fn focused_column(&self) -> Option<(WindowId, ColumnId, DesktopId)> {
        let window = self.focused_window()?;
        let column = self.state.column_of(window);
        Some((window, column, self.state.desktop_of(column)))
    }

    fn mark_areas_dirty(&mut self) {
        for desktop in self.state.desktops.values_mut() {
            desktop.viewport.mark_area_dirty();
        }
    }

    /// Re-queries placement areas and writes geometry for every changed
    /// desktop.
    pub fn arrange(&mut self) {
        let desktops: Vec<DesktopId> = self.desktops.values().copied().collect();
        for desktop in desktops {
            self.arrange_desktop(desktop);
        }
    }

    fn arrange_desktop(&mut self, desktop: DesktopId) {
        let key = self.state.desktop(desktop).key;
        let area = self.area_provider.placement_area(key);
        self.state.arrange_desktop(desktop, area);
    }

    pub fn window_added(&mut self, id: ClientId, handle: Handle, desktop: DesktopKey) {
        if self.state.clients.contains_key(&id) {
            warn!(?id, "window reported twice");
            return;
        }
        let dock = handle.is_dock();
        let tile = !dock && self.rules.should_tile(handle.as_ref());
        debug!(?id, ?desktop, dock, tile, "window added");
        self.state.clients.insert(id, Client::new(id, handle, desktop));
        self.desktop_id(desktop);
        if dock {
            self.transition(id, ClientStateKind::Docked, false, false);
        } else if tile {
            self.transition(id, ClientStateKind::Tiled, false, false);
        }
    }

    pub fn window_removed(&mut self, id: ClientId) {
        let Some(client) = self.state.clients.get(&id) else { return };
        let pass_focus = self.last_focused == Some(id) || client.handle.is_focused();
        self.remove_client(id, pass_focus);
    }

    fn remove_client(&mut self, id: ClientId, pass_focus: bool) {
        self.teardown(id, pass_focus, false);
        self.state.clients.remove(&id);
        if self.last_focused == Some(id) {
            self.last_focused = None;
        }
        debug!(?id, pass_focus, "window removed");
    }

    pub fn window_minimized(&mut self, id: ClientId) {
        if self.tiled(id).is_some() {
            let pass_focus = self.last_focused == Some(id);
            self.transition(id, ClientStateKind::TiledMinimized, pass_focus, false);
        }
    }

    pub fn window_unminimized(&mut self, id: ClientId) {
        let minimized = self
            .state
            .clients
            .get(&id)
            .is_some_and(|client| client.state == ClientState::TiledMinimized);
        if minimized {
            self.transition(id, ClientStateKind::Tiled, false, false);
        }
    }

    pub fn window_focused(&mut self, id: Option<ClientId>) {
        self.last_focused = id;
        if let Some(window) = id.and_then(|id| self.tiled(id)) {
            self.state.on_window_focused(window);
        }
    }

    pub fn window_move_started(&mut self, id: ClientId) {
        let Some(window) = self.tiled(id) else { return };
        if self.behavior.untile_on_drag {
            self.transition(id, ClientStateKind::Floating, false, false);
        } else {
            self.state.windows[window].skip_arrange = true;
        }
    }

    pub fn window_move_finished(&mut self, id: ClientId) {
        let Some(window) = self.tiled(id) else { return };
        self.state.windows[window].skip_arrange = false;
        let desktop = self.state.desktop_of(self.state.column_of(window));
        self.state.mark_changed(desktop);
    }

    pub fn window_resize_started(&mut self, id: ClientId) {
        let Some(window) = self.tiled(id) else { return };
        self.end_user_resize();
        let desktop = self.state.desktop_of(self.state.column_of(window));
        self.resizing = Some((id, desktop));
        self.state.on_user_resize_started(desktop);
    }

    pub fn window_resize_finished(&mut self, id: ClientId) {
        if self.resizing_client() == Some(id) {
            self.end_user_resize();
        }
    }

    fn resizing_client(&self) -> Option<ClientId> { self.resizing.map(|(id, _)| id) }

    /// Takes the grid the current interactive resize started on out of
    /// resize mode. The window may no longer be tiled there.
    fn end_user_resize(&mut self) {
        let Some((id, desktop)) = self.resizing.take() else { return };
        debug!(?id, "user resize ended");
        if self.state.desktops.contains_key(desktop) {
            self.state.on_user_resize_finished(desktop);
        }
    }

    /// Applies a frame change made by the user while resizing a tiled window.
    /// Frame changes outside an interactive resize are ignored.
    pub fn window_frame_changed(&mut self, id: ClientId, old: Rect, new: Rect) {
        if self.resizing_client() != Some(id) {
            return;
        }
        let Some(window) = self.tiled(id) else { return };
        let column = self.state.column_of(window);
        let desktop = self.state.desktop_of(column);
        let left_edge = new.x != old.x;
        trace!(?id, ?old, ?new, "user resize");

        if new.width != old.width {
            let before = self.state.column(column).width();
            self.state.adjust_column_width(column, new.width - old.width, true);
            let applied = self.state.column(column).width() - before;
            let grid = &self.state.desktop(desktop).grid;
            let neighbor = if left_edge { grid.prev_column(column) } else { grid.next_column(column) };
            match neighbor.filter(|_| self.behavior.resize_neighbor_column) {
                Some(neighbor) => self.state.adjust_column_width(neighbor, -applied, true),
                // the right edge must stay put on screen
                None if left_edge => self.state.adjust_scroll(desktop, applied, true),
                None => {}
            }
        }
        if new.height != old.height {
            self.state.adjust_window_height(window, new.height - old.height, new.y != old.y);
        }
    }

    /// The host moved a window to another desktop. Tiled windows follow into
    /// a new column next to the target grid's focused column.
    pub fn window_desktop_changed(&mut self, id: ClientId, key: DesktopKey) {
        let Some(client) = self.state.clients.get_mut(&id) else { return };
        client.desktop = key;
        let target = self.desktop_id(key);
        let Some(window) = self.tiled(id) else { return };
        let source = self.state.desktop_of(self.state.column_of(window));
        if source == target {
            return;
        }
        if self.resizing_client() == Some(id) {
            self.end_user_resize();
        }
        let grid = &self.state.desktop(target).grid;
        let left = grid.last_focused_column().or_else(|| grid.last_column());
        let column = self.state.create_column(target, left);
        self.state.move_window_to_column(window, column);
        debug!(?id, ?key, "tiled window changed desktop");
    }

    pub fn desktop_switched(&mut self, key: DesktopKey) {
        debug!(from = ?self.current, to = ?key, "desktop switched");
        self.current = key;
        let desktop = self.desktop_id(key);
        self.state.mark_changed(desktop);
    }

    /// The host now has `count` desktops on `output`. Columns of removed
    /// desktops move to the end of the last remaining one.
    pub fn desktop_count_changed(&mut self, output: u32, count: u32) {
        let count = count.max(1);
        let removed: Vec<(DesktopKey, DesktopId)> = self
            .desktops
            .range(DesktopKey::new(output, count)..=DesktopKey::new(output, u32::MAX))
            .map(|(&key, &desktop)| (key, desktop))
            .collect();
        if removed.is_empty() {
            return;
        }
        let target_key = DesktopKey::new(output, count - 1);
        let target = self.desktop_id(target_key);
        for (key, desktop) in removed {
            info!(?key, into = ?target_key, "evacuating removed desktop");
            self.state.evacuate_all(desktop, target);
            for client in self.state.clients.values_mut().filter(|c| c.desktop == key) {
                client.desktop = target_key;
                client.handle.set_desktop(target_key);
            }
            self.desktops.remove(&key);
            self.state.remove_desktop(desktop);
        }
        if self.current.output == output && self.current.desktop >= count {
            self.desktop_switched(target_key);
        }
    }

    /// Placement areas may have changed; they are re-read on the next
    /// arrange.
    pub fn area_changed(&mut self) { self.mark_areas_dirty(); }

    pub fn config_updated(&mut self, config: &Config) {
        let previous = (self.behavior.skip_switcher, self.state.options.off_screen_opacity);
        self.state.options = LayoutOptions::from_config(config);
        self.rules = WindowRules::compile(&config.window_rules);
        self.behavior = Behavior::from_config(config);

        let skip_switcher = self.behavior.skip_switcher;
        let undim = previous.1 < 100 && self.state.options.off_screen_opacity >= 100;
        for window in self.state.windows.values() {
            if skip_switcher != previous.0 {
                window.handle.set_skip_switcher(skip_switcher || window.floating.skip_switcher);
            }
            if undim {
                window.handle.set_opacity(window.floating.opacity);
            }
        }
        self.mark_areas_dirty();
        info!("layout configuration updated");
    }

    /// Floats a tiled client or tiles a floating one, as the user asked.
    fn toggle_floating(&mut self, id: ClientId) {
        let Some(client) = self.state.clients.get(&id) else { return };
        match client.state.kind() {
            ClientStateKind::Floating if client.handle.is_resizable() => {
                self.transition(id, ClientStateKind::Tiled, false, false);
            }
            ClientStateKind::Tiled => {
                self.transition(id, ClientStateKind::Floating, false, true);
            }
            _ => {}
        }
    }

    /// Moves a client between states. The old state is torn down before the
    /// new one is set up. `limit_height` caps a window leaving tiling at half
    /// the placement area height.
    fn transition(&mut self, id: ClientId, to: ClientStateKind, pass_focus: bool, limit_height: bool) -> bool {
        let Some(client) = self.state.clients.get(&id) else { return false };
        let from = client.state.kind();
        if !from.can_enter(to) {
            warn!(?id, %from, %to, "rejected client state change");
            return false;
        }
        debug!(?id, %from, %to, "client state");
        self.teardown(id, pass_focus, limit_height);
        let state = match to {
            ClientStateKind::Tiled => ClientState::Tiled { window: self.tile(id) },
            ClientStateKind::Floating => {
                if self.behavior.floating_keep_above && !self.behavior.no_layering {
                    let handle = &self.state.clients[&id].handle;
                    handle.set_stacking(handle.stacking() | StackingFlags::KEEP_ABOVE);
                }
                ClientState::Floating
            }
            ClientStateKind::Docked => {
                self.mark_areas_dirty();
                ClientState::Docked
            }
            ClientStateKind::TiledMinimized => ClientState::TiledMinimized,
        };
        if let Some(client) = self.state.clients.get_mut(&id) {
            client.state = state;
        }
        true
    }

    fn teardown(&mut self, id: ClientId, pass_focus: bool, limit_height: bool) {
        let Some(client) = self.state.clients.get(&id) else { return };
        let handle = client.handle.clone();
        let state = client.state;
        if self.resizing_client() == Some(id) {
            self.end_user_resize();
        }
        match state {
            ClientState::Tiled { window } => {
                let desktop = self.state.desktop_of(self.state.column_of(window));
                self.state.remove_window(window, pass_focus);
                let removed = self.state.windows.remove(window);
                self.arrange_desktop(desktop);
                let restore = Restore {
                    max_height: limit_height
                        .then(|| round_half(self.state.desktop(desktop).viewport.area().height)),
                    stacking: !self.behavior.no_layering,
                    maximized: self.behavior.re_maximize,
                };
                if let Some(removed) = removed {
                    removed.floating.restore(&handle, restore);
                }
            }
            ClientState::Docked => self.mark_areas_dirty(),
            ClientState::Floating | ClientState::TiledMinimized => {}
        }
        if let Some(client) = self.state.clients.get_mut(&id) {
            client.state = ClientState::Floating;
        }
    }

    /// Tiles a client in a new column right of the focused column of its
    /// desktop's grid.
    fn tile(&mut self, id: ClientId) -> WindowId {
        let client = &self.state.clients[&id];
        let (handle, key) = (client.handle.clone(), client.desktop);
        let desktop = self.desktop_id(key);
        let grid = &self.state.desktop(desktop).grid;
        let left = grid.last_focused_column().or_else(|| grid.last_column());
        let column = self.state.create_column(desktop, left);
        let window = self.state.insert_window(column, id, true);
        // after insert_window so the floating snapshot records it
        if handle.is_maximized() {
            handle.set_maximized(false);
        }
        if self.behavior.skip_switcher {
            handle.set_skip_switcher(true);
        }
        if self.behavior.tiled_keep_below && !self.behavior.no_layering {
            let stacking = (handle.stacking() - StackingFlags::KEEP_ABOVE) | StackingFlags::KEEP_BELOW;
            handle.set_stacking(stacking);
        }
        window
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;
    use crate::common::config::WindowRule;
    use crate::sys::headless::{HeadlessHost, WindowSpec};
    use crate::sys::window::WindowHandle;

    pub(super) const AREA: Rect = Rect::new(0, 0, 1920, 1080);
    pub(super) const HOME: DesktopKey = DesktopKey::new(0, 0);

    pub(super) struct Harness {
        pub host: HeadlessHost,
        pub engine: LayoutEngine,
    }

    impl Harness {
        pub fn new() -> Self { Self::with_config(Config::default()) }

        pub fn with_config(config: Config) -> Self {
            let host = HeadlessHost::new(AREA);
            let engine = LayoutEngine::new(&config, Rc::new(host.clone()), HOME);
            Self { host, engine }
        }

        pub fn add(&mut self, id: u64, spec: WindowSpec) -> ClientId { self.add_on(HOME, id, spec) }

        pub fn add_on(&mut self, desktop: DesktopKey, id: u64, spec: WindowSpec) -> ClientId {
            let id = ClientId(id);
            let handle: Handle = self.host.spawn_window(id, &spec);
            self.engine.window_added(id, handle, desktop);
            self.engine.arrange();
            id
        }

        /// Focus change initiated by the user on the host side.
        pub fn click(&mut self, id: u64) {
            self.host.set_active(Some(ClientId(id)));
            self.engine.window_focused(Some(ClientId(id)));
            self.engine.arrange();
        }

        pub fn command(&mut self, command: LayoutCommand) {
            self.engine.handle_command(&command);
            self.engine.arrange();
        }

        pub fn frame(&self, id: u64) -> Rect { self.handle(id).frame() }

        pub fn handle(&self, id: u64) -> Handle {
            let handle: Handle = self.host.window(ClientId(id)).unwrap();
            handle
        }

        pub fn kind(&self, id: u64) -> ClientStateKind { self.engine.client(ClientId(id)).unwrap().state.kind() }

        pub fn home(&self) -> DesktopId { self.engine.desktop(HOME).unwrap() }

        /// Client ids per column of a desktop, left to right.
        pub fn columns(&self, key: DesktopKey) -> Vec<Vec<u64>> {
            let state = self.engine.state();
            let Some(desktop) = self.engine.desktop(key) else { return Vec::new() };
            state
                .desktop(desktop)
                .grid
                .iter()
                .map(|column| state.column(column).iter().map(|w| state.window(w).client.0).collect())
                .collect()
        }

        pub fn scroll_x(&self) -> i32 { self.engine.state().desktop(self.home()).viewport.scroll_x() }
    }

    pub(super) fn width(width: i32) -> WindowSpec { WindowSpec { width, ..Default::default() } }

    #[test]
    fn new_windows_tile_right_of_focused_column() {
        let mut h = Harness::new();
        h.add(1, width(400));
        h.add(2, width(400));
        h.click(1);
        h.add(3, width(400));
        assert_eq!(h.columns(HOME), vec![vec![1], vec![3], vec![2]]);
        assert_eq!(h.kind(3), ClientStateKind::Tiled);
        h.engine.state().assert_consistent();
    }

    #[test]
    fn tiled_windows_fill_the_tiling_height() {
        let mut h = Harness::new();
        h.add(1, width(400));
        let frame = h.frame(1);
        assert_eq!(frame.y, 16);
        assert_eq!(frame.height, 1080 - 32);
        assert_eq!(frame.width, 400);
    }

    #[test]
    fn docks_rules_and_fixed_size_windows_do_not_tile() {
        let mut config = Config::default();
        config.window_rules.push(WindowRule {
            class: Some("firefox".into()),
            caption: Some("Picture-in-Picture".into()),
            tile: false,
        });
        let mut h = Harness::with_config(config);
        h.add(1, WindowSpec { dock: true, ..Default::default() });
        h.add(2, WindowSpec { resizable: false, ..Default::default() });
        h.add(3, WindowSpec { class: "org.kde.krunner".into(), ..Default::default() });
        h.add(4, WindowSpec {
            class: "firefox".into(),
            caption: "Picture-in-Picture".into(),
            ..Default::default()
        });
        h.add(5, WindowSpec { class: "firefox".into(), caption: "Mozilla".into(), ..Default::default() });
        assert_eq!(h.kind(1), ClientStateKind::Docked);
        assert_eq!(h.kind(2), ClientStateKind::Floating);
        assert_eq!(h.kind(3), ClientStateKind::Floating);
        assert_eq!(h.kind(4), ClientStateKind::Floating);
        assert_eq!(h.kind(5), ClientStateKind::Tiled);
    }

    #[test]
    fn tiling_applies_keep_below_and_untiling_restores_stacking() {
        let mut h = Harness::new();
        h.add(1, WindowSpec { width: 500, height: 1000, keep_above: true, ..Default::default() });
        assert_eq!(h.handle(1).stacking(), StackingFlags::KEEP_BELOW);

        h.click(1);
        let tiled = h.frame(1);
        h.command(LayoutCommand::WindowToggleFloating);
        assert_eq!(h.kind(1), ClientStateKind::Floating);
        assert_eq!(h.handle(1).stacking(), StackingFlags::KEEP_ABOVE);
        // floated by the user: height is capped at half the area
        assert_eq!(h.frame(1), Rect::new(tiled.x + 20, tiled.y + 20, 500, 540));
        assert!(h.columns(HOME).is_empty());

        h.command(LayoutCommand::WindowToggleFloating);
        assert_eq!(h.kind(1), ClientStateKind::Tiled);
    }

    #[test]
    fn floating_keep_above_is_applied_when_leaving_tiling() {
        let mut config = Config::default();
        config.settings.floating_keep_above = true;
        let mut h = Harness::with_config(config);
        h.add(1, width(500));
        h.engine.window_move_started(ClientId(1));
        assert_eq!(h.kind(1), ClientStateKind::Floating);
        assert!(h.handle(1).stacking().contains(StackingFlags::KEEP_ABOVE));
    }

    #[test]
    fn minimize_keeps_client_and_unminimize_retiles() {
        let mut h = Harness::new();
        h.add(1, width(400));
        h.add(2, width(400));
        h.click(2);
        h.engine.window_minimized(ClientId(2));
        h.engine.arrange();
        assert_eq!(h.kind(2), ClientStateKind::TiledMinimized);
        assert_eq!(h.columns(HOME), vec![vec![1]]);
        assert_eq!(h.host.active(), Some(ClientId(1)));

        h.engine.window_unminimized(ClientId(2));
        h.engine.arrange();
        assert_eq!(h.kind(2), ClientStateKind::Tiled);
        assert_eq!(h.columns(HOME).len(), 2);
        h.engine.state().assert_consistent();
    }

    #[test]
    fn rejected_transitions_change_nothing() {
        let mut h = Harness::new();
        h.add(1, WindowSpec { dock: true, ..Default::default() });
        h.engine.window_unminimized(ClientId(1));
        assert!(!h.engine.transition(ClientId(1), ClientStateKind::Tiled, false, false));
        assert_eq!(h.kind(1), ClientStateKind::Docked);
    }

    #[test]
    fn removing_focused_window_passes_focus() {
        let mut h = Harness::new();
        h.add(1, width(400));
        h.add(2, width(400));
        h.add(3, width(400));
        h.click(2);
        h.engine.window_removed(ClientId(2));
        h.host.forget_window(ClientId(2));
        h.engine.arrange();
        assert_eq!(h.columns(HOME), vec![vec![1], vec![3]]);
        assert_eq!(h.host.active(), Some(ClientId(1)));
        assert!(h.engine.client(ClientId(2)).is_none());
    }

    #[test]
    fn removing_unfocused_window_keeps_focus() {
        let mut h = Harness::new();
        h.add(1, width(400));
        h.add(2, width(400));
        h.click(2);
        h.engine.window_removed(ClientId(1));
        assert_eq!(h.host.active(), Some(ClientId(2)));
    }

    #[test]
    fn drag_untiles_or_freezes_geometry() {
        let mut h = Harness::new();
        h.add(1, width(400));
        h.engine.window_move_started(ClientId(1));
        assert_eq!(h.kind(1), ClientStateKind::Floating);

        let mut config = Config::default();
        config.settings.untile_on_drag = false;
        let mut h = Harness::with_config(config);
        h.add(1, width(400));
        h.add(2, width(400));
        h.engine.window_move_started(ClientId(1));
        let writes = h.host.window(ClientId(1)).unwrap().frame_writes();
        h.command(LayoutCommand::ColumnMoveEnd);
        h.click(2);
        h.command(LayoutCommand::ColumnMoveStart);
        assert_eq!(h.host.window(ClientId(1)).unwrap().frame_writes(), writes);
        h.engine.window_move_finished(ClientId(1));
        h.engine.arrange();
        assert_eq!(h.kind(1), ClientStateKind::Tiled);
        assert!(h.host.window(ClientId(1)).unwrap().frame_writes() > writes);
    }

    #[test]
    fn resize_from_right_edge_changes_width_only() {
        let mut h = Harness::new();
        h.add(1, width(400));
        h.add(2, width(400));
        h.click(1);
        let id = ClientId(1);
        let old = h.frame(1);
        h.engine.window_resize_started(id);
        let new = Rect { width: old.width + 100, ..old };
        h.host.window(id).unwrap().user_set_frame(new);
        h.engine.window_frame_changed(id, old, new);
        h.engine.arrange();
        assert_eq!(h.frame(1), new);
        assert_eq!(h.engine.client(id).unwrap().preferred_width, 500);
        assert_eq!(h.frame(2).x, new.right() + 8);
        h.engine.window_resize_finished(id);
        h.engine.arrange();
        assert!(!h.engine.state().desktop(h.home()).grid.is_user_resizing());
    }

    #[test]
    fn resize_from_left_edge_keeps_right_edge() {
        let mut h = Harness::new();
        h.add(1, width(1000));
        h.add(2, width(1000));
        h.click(2);
        let id = ClientId(2);
        let old = h.frame(2);
        h.engine.window_resize_started(id);
        let new = Rect::new(old.x - 150, old.y, old.width + 150, old.height);
        h.host.window(id).unwrap().user_set_frame(new);
        h.engine.window_frame_changed(id, old, new);
        h.engine.arrange();
        assert_eq!(h.frame(2).right(), old.right());
        assert_eq!(h.frame(2).width, 1150);
    }

    #[test]
    fn resize_can_trade_width_with_neighbor() {
        let mut config = Config::default();
        config.settings.layout.columns.resize_neighbor_column = true;
        let mut h = Harness::with_config(config);
        h.add(1, width(600));
        h.add(2, width(600));
        let id = ClientId(1);
        let old = h.frame(1);
        h.engine.window_resize_started(id);
        let new = Rect { width: old.width + 100, ..old };
        h.engine.window_frame_changed(id, old, new);
        h.engine.arrange();
        assert_eq!(h.frame(1).width, 700);
        assert_eq!(h.frame(2).width, 500);
        assert_eq!(h.frame(2).right(), old.x + 1200 + 8);
    }

    /// Four 1000px columns with the first one focused and being resized.
    fn resizing_first_of_four() -> Harness {
        let mut h = Harness::new();
        for id in 1..=4 {
            h.add(id, width(1000));
        }
        h.click(1);
        h.engine.window_resize_started(ClientId(1));
        assert!(h.engine.state().desktop(h.home()).grid.is_user_resizing());
        h
    }

    #[test]
    fn removing_the_resized_window_ends_the_resize() {
        let mut h = resizing_first_of_four();
        h.engine.window_removed(ClientId(1));
        h.host.forget_window(ClientId(1));
        h.engine.arrange();
        assert!(!h.engine.state().desktop(h.home()).grid.is_user_resizing());

        h.click(4);
        assert_eq!(h.columns(HOME), vec![vec![2], vec![3], vec![4]]);
        assert_eq!(h.scroll_x(), 3016 - 1888);
    }

    #[test]
    fn floating_the_resized_window_ends_the_resize() {
        let mut h = resizing_first_of_four();
        h.command(LayoutCommand::WindowToggleFloating);
        assert_eq!(h.kind(1), ClientStateKind::Floating);
        h.engine.window_resize_finished(ClientId(1));
        h.engine.arrange();
        assert!(!h.engine.state().desktop(h.home()).grid.is_user_resizing());

        h.click(4);
        assert_eq!(h.scroll_x(), 3016 - 1888);
    }

    #[test]
    fn resized_window_changing_desktop_ends_the_resize() {
        let mut h = resizing_first_of_four();
        let other = DesktopKey::new(0, 1);
        h.engine.window_desktop_changed(ClientId(1), other);
        h.engine.arrange();
        assert!(!h.engine.state().desktop(h.home()).grid.is_user_resizing());
        let target = h.engine.desktop(other).unwrap();
        assert!(!h.engine.state().desktop(target).grid.is_user_resizing());
        assert_eq!(h.columns(other), vec![vec![1]]);
    }

    #[test]
    fn frame_changes_outside_resize_are_ignored() {
        let mut h = Harness::new();
        h.add(1, width(600));
        let old = h.frame(1);
        h.engine.window_frame_changed(ClientId(1), old, Rect { width: 900, ..old });
        h.engine.arrange();
        assert_eq!(h.frame(1).width, 600);
    }

    #[test]
    fn vertical_resize_trades_height_with_neighbor_window() {
        let mut h = Harness::new();
        h.add(1, width(600));
        h.add(2, width(600));
        h.click(2);
        h.command(LayoutCommand::WindowMoveLeft);
        assert_eq!(h.columns(HOME), vec![vec![1, 2]]);
        let id = ClientId(2);
        let (old, above) = (h.frame(2), h.frame(1));
        h.engine.window_resize_started(id);
        let new = Rect::new(old.x, old.y - 60, old.width, old.height + 60);
        h.engine.window_frame_changed(id, old, new);
        h.engine.arrange();
        assert_eq!(h.frame(1).height, above.height - 60);
        assert_eq!(h.frame(2), new);
    }

    #[test]
    fn tiled_window_follows_desktop_change() {
        let mut h = Harness::new();
        let other = DesktopKey::new(0, 1);
        h.add(1, width(400));
        h.add(2, width(400));
        h.add_on(other, 3, width(400));
        h.engine.window_desktop_changed(ClientId(2), other);
        h.engine.arrange();
        assert_eq!(h.columns(HOME), vec![vec![1]]);
        assert_eq!(h.columns(other), vec![vec![3], vec![2]]);
        assert_eq!(h.engine.client(ClientId(2)).unwrap().desktop, other);
        h.engine.state().assert_consistent();
    }

    #[test]
    fn reducing_desktop_count_evacuates_columns() {
        let mut h = Harness::new();
        h.add(1, width(400));
        h.add_on(DesktopKey::new(0, 1), 2, width(400));
        h.add_on(DesktopKey::new(0, 2), 3, width(400));
        h.add_on(DesktopKey::new(0, 2), 4, width(400));
        h.engine.desktop_switched(DesktopKey::new(0, 2));
        h.engine.desktop_count_changed(0, 2);
        h.engine.arrange();
        assert_eq!(h.engine.desktop(DesktopKey::new(0, 2)), None);
        assert_eq!(h.columns(DesktopKey::new(0, 1)), vec![vec![2], vec![3], vec![4]]);
        assert_eq!(h.engine.current_desktop(), DesktopKey::new(0, 1));
        assert_eq!(h.host.window(ClientId(4)).unwrap().desktop(), Some(DesktopKey::new(0, 1)));
        assert_eq!(h.columns(HOME), vec![vec![1]]);
        h.engine.state().assert_consistent();
    }

    #[test]
    fn placement_area_is_reread_on_arrange() {
        let mut h = Harness::new();
        h.add(1, width(400));
        h.host.set_default_area(Rect::new(0, 0, 1920, 1040));
        h.engine.arrange();
        assert_eq!(h.frame(1).height, 1040 - 32);

        let writes = h.host.window(ClientId(1)).unwrap().frame_writes();
        h.engine.area_changed();
        h.engine.arrange();
        assert_eq!(h.host.window(ClientId(1)).unwrap().frame_writes(), writes);
    }

    #[test]
    fn config_update_reapplies_gaps() {
        let mut h = Harness::new();
        h.add(1, width(400));
        let mut config = Config::default();
        config.settings.layout.gaps.outer.top = 40;
        h.engine.config_updated(&config);
        h.engine.arrange();
        assert_eq!(h.frame(1).y, 40);
        assert_eq!(h.frame(1).height, 1080 - 56);
    }

    #[test]
    fn tiled_windows_skip_the_switcher_while_tiled() {
        let mut config = Config::default();
        config.settings.skip_switcher = true;
        let mut h = Harness::with_config(config.clone());
        h.add(1, width(500));
        h.add(2, WindowSpec { skip_switcher: true, ..width(500) });
        assert!(h.handle(1).skip_switcher());

        h.click(1);
        h.command(LayoutCommand::WindowToggleFloating);
        assert!(!h.handle(1).skip_switcher());

        config.settings.skip_switcher = false;
        h.engine.config_updated(&config);
        // the window's own setting survives
        assert!(h.handle(2).skip_switcher());
        h.command(LayoutCommand::WindowToggleFloating);
        assert_eq!(h.kind(1), ClientStateKind::Tiled);
        assert!(!h.handle(1).skip_switcher());
    }

    #[test]
    fn no_layering_leaves_stacking_alone() {
        let mut config = Config::default();
        config.settings.no_layering = true;
        config.settings.floating_keep_above = true;
        let mut h = Harness::with_config(config);
        h.add(1, WindowSpec { keep_above: true, ..width(500) });
        assert_eq!(h.kind(1), ClientStateKind::Tiled);
        assert_eq!(h.handle(1).stacking(), StackingFlags::KEEP_ABOVE);

        h.handle(1).set_stacking(StackingFlags::empty());
        h.click(1);
        h.command(LayoutCommand::WindowToggleFloating);
        assert_eq!(h.kind(1), ClientStateKind::Floating);
        assert_eq!(h.handle(1).stacking(), StackingFlags::empty());
    }

    #[test]
    fn maximized_windows_are_unmaximized_when_tiled() {
        let mut h = Harness::new();
        h.add(1, WindowSpec { maximized: true, ..Default::default() });
        assert_eq!(h.kind(1), ClientStateKind::Tiled);
        assert!(!h.handle(1).is_maximized());
        assert_eq!(h.frame(1), Rect::new(16, 16, 1888, 1048));

        h.click(1);
        h.command(LayoutCommand::WindowToggleFloating);
        assert!(!h.handle(1).is_maximized());
        assert_eq!(h.frame(1).height, 540);
    }

    #[test]
    fn re_maximize_restores_maximized_state_on_untile() {
        let mut config = Config::default();
        config.settings.re_maximize = true;
        let mut h = Harness::with_config(config);
        h.add(1, WindowSpec { maximized: true, ..Default::default() });
        h.add(2, width(600));
        assert!(!h.handle(1).is_maximized());

        h.click(1);
        h.command(LayoutCommand::WindowToggleFloating);
        assert!(h.handle(1).is_maximized());
        assert_eq!(h.frame(1), AREA);

        // never maximized: floats normally
        h.click(2);
        h.command(LayoutCommand::WindowToggleFloating);
        assert!(!h.handle(2).is_maximized());
        assert_eq!(h.frame(2).width, 600);
    }

    #[test]
    fn off_screen_columns_are_dimmed_until_they_scroll_in() {
        let mut config = Config::default();
        config.settings.layout.columns.off_screen_opacity = 50;
        let mut h = Harness::with_config(config);
        h.add(1, width(1000));
        h.add(2, width(1000));
        assert_eq!(h.handle(1).opacity(), 1.0);
        assert_eq!(h.handle(2).opacity(), 0.5);

        h.click(2);
        assert_eq!(h.scroll_x(), 2008 - 1888);
        assert_eq!(h.handle(1).opacity(), 0.5);
        assert_eq!(h.handle(2).opacity(), 1.0);

        h.engine.config_updated(&Config::default());
        h.engine.arrange();
        assert_eq!(h.handle(1).opacity(), 1.0);
        assert_eq!(h.handle(2).opacity(), 1.0);
    }

    #[test]
    fn destroy_restores_floating_geometry() {
        let mut h = Harness::new();
        h.add(1, WindowSpec { width: 500, height: 700, ..Default::default() });
        let tiled = h.frame(1);
        let Harness { host, engine } = h;
        engine.destroy();
        let window = host.window(ClientId(1)).unwrap();
        assert_eq!(window.frame(), Rect::new(tiled.x + 20, tiled.y + 20, 500, 700));
        assert_eq!(window.stacking(), StackingFlags::empty());
    }
}
