//! Shared setup for the layout unit tests: one desktop on a headless host.

use super::state::{LayoutOptions, LayoutState};
use crate::model::{Client, ClientState, ColumnId, DesktopId, WindowId};
use crate::sys::geometry::Rect;
use crate::sys::headless::{HeadlessHost, WindowSpec};
use crate::sys::screen::DesktopKey;
use crate::sys::window::{ClientId, Handle};

pub struct Fixture {
    pub host: HeadlessHost,
    pub state: LayoutState,
    pub desktop: DesktopId,
}

impl Fixture {
    pub const AREA: Rect = Rect::new(0, 0, 1920, 1080);

    pub fn new() -> Self { Self::with_options(LayoutOptions::default()) }

    pub fn with_options(options: LayoutOptions) -> Self {
        let host = HeadlessHost::new(Self::AREA);
        let mut state = LayoutState::new(options);
        let desktop = state.create_desktop(DesktopKey::default(), Self::AREA);
        Self { host, state, desktop }
    }

    fn add_client_on(&mut self, desktop: DesktopId, id: u64, spec: WindowSpec) -> ClientId {
        let id = ClientId(id);
        let handle: Handle = self.host.spawn_window(id, &spec);
        let key = self.state.desktop(desktop).key;
        self.state.clients.insert(id, Client::new(id, handle, key));
        id
    }

    /// Registers a floating client without tiling it.
    pub fn add_client(&mut self, id: u64, spec: WindowSpec) -> ClientId {
        self.add_client_on(self.desktop, id, spec)
    }

    fn insert_tiled(&mut self, column: ColumnId, client: ClientId) -> WindowId {
        let window = self.state.insert_window(column, client, true);
        if let Some(client) = self.state.clients.get_mut(&client) {
            client.state = ClientState::Tiled { window };
        }
        window
    }

    /// Tiles a new client in its own column at the end of `desktop`.
    pub fn tile_column_on(&mut self, desktop: DesktopId, id: u64, spec: WindowSpec) -> ColumnId {
        let client = self.add_client_on(desktop, id, spec);
        let left = self.state.desktop(desktop).grid.last_column();
        let column = self.state.create_column(desktop, left);
        self.insert_tiled(column, client);
        column
    }

    pub fn tile_column(&mut self, id: u64, spec: WindowSpec) -> ColumnId {
        self.tile_column_on(self.desktop, id, spec)
    }

    pub fn tile(&mut self, id: u64, spec: WindowSpec) -> WindowId {
        let column = self.tile_column(id, spec);
        self.state.column(column).first_window().unwrap()
    }

    /// Tiles a new client at the bottom of an existing column.
    pub fn stack(&mut self, column: ColumnId, id: u64, spec: WindowSpec) -> WindowId {
        let desktop = self.state.desktop_of(column);
        let client = self.add_client_on(desktop, id, spec);
        self.insert_tiled(column, client)
    }

    pub fn client(&self, id: u64) -> &Client { &self.state.clients[&ClientId(id)] }

    pub fn window_of(&self, id: u64) -> WindowId { self.client(id).tiled_window().unwrap() }

    pub fn frame(&self, window: WindowId) -> Rect { self.state.window(window).handle.frame() }

    pub fn tiling_area(&self) -> Rect { self.state.desktop(self.desktop).viewport.tiling_area() }

    pub fn arrange(&mut self) { self.state.arrange_desktop(self.desktop, Self::AREA); }

    pub fn focus_client(&mut self, id: u64) {
        let window = self.window_of(id);
        self.state.focus_window(window);
    }
}
