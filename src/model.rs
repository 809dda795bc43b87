use slotmap::new_key_type;

pub mod client;
pub mod window;

pub use client::{Client, ClientState, ClientStateKind};
pub use window::{FloatingSnapshot, Restore, Window};

new_key_type! {
    /// A tiled window in the layout arena.
    pub struct WindowId;
    pub struct ColumnId;
    /// One scrollable grid and its viewport.
    pub struct DesktopId;
}
