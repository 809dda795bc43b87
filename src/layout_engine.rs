//! Scrollable column layout.
//!
//! Every desktop owns a [`Grid`] of columns laid out left to right on an
//! infinite strip, and a [`Viewport`] that scrolls over it. The
//! [`LayoutEngine`] turns host events and user commands into changes to that
//! state and writes frames back through window handles.

mod column;
mod desktop;
pub mod engine;
mod fill_space;
mod grid;
mod list;
mod preset_widths;
mod range;
mod state;
#[cfg(test)]
mod testing;
pub mod utils;
mod viewport;

pub use column::Column;
pub use desktop::Desktop;
pub use engine::{
    ClientSnapshot, ColumnSnapshot, DesktopSnapshot, LayoutCommand, LayoutEngine, LayoutSnapshot,
    WindowRules, WindowSnapshot,
};
pub use grid::Grid;
pub use preset_widths::{PresetWidths, PresetWidthsError};
pub use range::XRange;
pub use state::{LayoutOptions, LayoutState};
pub use viewport::Viewport;
