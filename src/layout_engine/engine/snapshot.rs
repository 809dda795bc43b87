use std::fmt;

use ascii_tree::Tree;
use serde::Serialize;

use super::LayoutEngine;
use crate::model::{ClientState, ColumnId, DesktopId};
use crate::sys::geometry::Rect;
use crate::sys::screen::DesktopKey;
use crate::sys::window::ClientId;

/// Read-only view of everything the engine arranges, for debugging and for
/// replay output.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    pub current: DesktopKey,
    pub desktops: Vec<DesktopSnapshot>,
    pub floating: Vec<ClientSnapshot>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DesktopSnapshot {
    pub key: DesktopKey,
    pub scroll_x: i32,
    pub tiling_area: Rect,
    pub columns: Vec<ColumnSnapshot>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ColumnSnapshot {
    pub left: i32,
    pub width: i32,
    pub stacked: bool,
    /// Whether this is the grid's last focused column.
    pub focused: bool,
    pub windows: Vec<WindowSnapshot>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub client: ClientId,
    pub frame: Rect,
    pub focused: bool,
}

/// A client outside any grid.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClientSnapshot {
    pub client: ClientId,
    pub state: String,
    pub frame: Rect,
}

impl LayoutEngine {
    pub fn snapshot(&self) -> LayoutSnapshot {
        let desktops = self.desktops.values().map(|&desktop| self.desktop_snapshot(desktop)).collect();
        let mut floating: Vec<ClientSnapshot> = self
            .state
            .clients
            .values()
            .filter(|client| !matches!(client.state, ClientState::Tiled { .. }))
            .map(|client| ClientSnapshot {
                client: client.id,
                state: client.state.kind().to_string(),
                frame: client.handle.frame(),
            })
            .collect();
        floating.sort_by_key(|c| c.client);
        LayoutSnapshot { current: self.current, desktops, floating }
    }

    fn desktop_snapshot(&self, desktop: DesktopId) -> DesktopSnapshot {
        let d = self.state.desktop(desktop);
        let focused = d.grid.last_focused_column();
        DesktopSnapshot {
            key: d.key,
            scroll_x: d.viewport.scroll_x(),
            tiling_area: d.viewport.tiling_area(),
            columns: d.grid.iter().map(|column| self.column_snapshot(column, focused == Some(column))).collect(),
        }
    }

    fn column_snapshot(&self, column: ColumnId, focused: bool) -> ColumnSnapshot {
        let col = self.state.column(column);
        let windows = col
            .iter()
            .map(|window| {
                let window = self.state.window(window);
                WindowSnapshot {
                    client: window.client,
                    frame: window.handle.frame(),
                    focused: window.handle.is_focused(),
                }
            })
            .collect();
        ColumnSnapshot {
            left: col.left(),
            width: col.width(),
            stacked: col.is_stacked(),
            focused,
            windows,
        }
    }
}

fn describe_frame(frame: Rect) -> String {
    format!("({}, {}) {}x{}", frame.x, frame.y, frame.width, frame.height)
}

impl LayoutSnapshot {
    fn tree(&self) -> Tree {
        let mut children: Vec<Tree> = self
            .desktops
            .iter()
            .map(|desktop| {
                let marker = if desktop.key == self.current { " (current)" } else { "" };
                let columns = desktop
                    .columns
                    .iter()
                    .map(|column| {
                        let lines = column
                            .windows
                            .iter()
                            .map(|w| {
                                let mark = if w.focused { '☒' } else { '☐' };
                                format!("{mark} {} {}", w.client.0, describe_frame(w.frame))
                            })
                            .collect();
                        let mut desc = format!("column x={} w={}", column.left, column.width);
                        if column.stacked {
                            desc.push_str(" stacked");
                        }
                        if column.focused {
                            desc.push_str(" *");
                        }
                        Tree::Node(desc, vec![Tree::Leaf(lines)])
                    })
                    .collect();
                Tree::Node(format!("desktop {}{marker} scroll={}", desktop.key, desktop.scroll_x), columns)
            })
            .collect();
        if !self.floating.is_empty() {
            let lines = self
                .floating
                .iter()
                .map(|c| format!("{} {} {}", c.client.0, c.state, describe_frame(c.frame)))
                .collect();
            children.push(Tree::Node("floating".to_string(), vec![Tree::Leaf(lines)]));
        }
        Tree::Node("layout".to_string(), children)
    }
}

impl fmt::Display for LayoutSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { ascii_tree::write_tree(f, &self.tree()) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::super::tests::{HOME, Harness, width};
    use super::*;
    use crate::layout_engine::LayoutCommand;
    use crate::sys::headless::WindowSpec;

    #[test]
    fn snapshot_lists_columns_and_floating_clients() {
        let mut h = Harness::new();
        h.add(1, width(600));
        h.add(2, width(600));
        h.add(3, WindowSpec { resizable: false, ..Default::default() });
        h.click(2);
        h.command(LayoutCommand::WindowMoveLeft);

        let snapshot = h.engine.snapshot();
        assert_eq!(snapshot.current, HOME);
        assert_eq!(snapshot.desktops.len(), 1);
        let desktop = &snapshot.desktops[0];
        assert_eq!(desktop.columns.len(), 1);
        let column = &desktop.columns[0];
        assert!(column.focused);
        let clients: Vec<u64> = column.windows.iter().map(|w| w.client.0).collect();
        assert_eq!(clients, vec![1, 2]);
        assert_eq!(column.windows.iter().map(|w| w.focused).collect::<Vec<_>>(), vec![false, true]);
        assert_eq!(column.windows[0].frame, h.frame(1));

        assert_eq!(snapshot.floating.len(), 1);
        assert_eq!(snapshot.floating[0].client, ClientId(3));
        assert_eq!(snapshot.floating[0].state, "floating");

        let text = snapshot.to_string();
        assert!(text.contains("desktop 0:0 (current)"), "{text}");
        assert!(text.contains("☒ 2"), "{text}");
        assert!(text.contains("☐ 1"), "{text}");
        assert!(text.contains("3 floating"), "{text}");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["desktops"][0]["columns"][0]["windows"][1]["client"], 2);
    }
}
