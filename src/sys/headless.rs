//! In-memory host used by the test suite and by `reel replay`.
//!
//! Windows keep their last written frame, shading collapses them to
//! [`SHADED_HEIGHT`], and focusing a window makes it the host's active
//! window. An optional callback observes focus changes so a driver can feed
//! them back into the reactor the way a real host would.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::common::collections::HashMap;
use crate::sys::geometry::{Rect, Size};
use crate::sys::screen::{AreaProvider, DesktopKey};
use crate::sys::window::{ClientId, Handle, StackingFlags, WindowHandle, WindowLookup};

pub const SHADED_HEIGHT: i32 = 28;

/// Initial properties of a headless window.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSpec {
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub can_shade: bool,
    pub resizable: bool,
    pub dock: bool,
    pub keep_above: bool,
    pub maximized: bool,
    pub skip_switcher: bool,
    pub class: String,
    pub caption: String,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            min_width: 0,
            min_height: 0,
            can_shade: true,
            resizable: true,
            dock: false,
            keep_above: false,
            maximized: false,
            skip_switcher: false,
            class: String::new(),
            caption: String::new(),
        }
    }
}

#[derive(Default)]
struct HostState {
    default_area: Cell<Rect>,
    areas: RefCell<HashMap<DesktopKey, Rect>>,
    active: Cell<Option<ClientId>>,
    windows: RefCell<BTreeMap<ClientId, Rc<HeadlessWindow>>>,
    on_focus: RefCell<Option<Box<dyn Fn(ClientId)>>>,
}

#[derive(Clone)]
pub struct HeadlessHost {
    state: Rc<HostState>,
}

impl HeadlessHost {
    pub fn new(area: Rect) -> Self {
        let state = HostState::default();
        state.default_area.set(area);
        Self { state: Rc::new(state) }
    }

    pub fn set_default_area(&self, area: Rect) { self.state.default_area.set(area); }

    pub fn set_area(&self, key: DesktopKey, area: Rect) {
        self.state.areas.borrow_mut().insert(key, area);
    }

    /// Registers a callback invoked whenever a window requests focus.
    pub fn on_focus(&self, callback: impl Fn(ClientId) + 'static) {
        *self.state.on_focus.borrow_mut() = Some(Box::new(callback));
    }

    pub fn spawn_window(&self, id: ClientId, spec: &WindowSpec) -> Rc<HeadlessWindow> {
        let mut stacking = StackingFlags::empty();
        stacking.set(StackingFlags::KEEP_ABOVE, spec.keep_above);
        let frame = if spec.maximized {
            self.state.default_area.get()
        } else {
            Rect::new(0, 0, spec.width, spec.height)
        };
        let window = Rc::new(HeadlessWindow {
            id,
            host: Rc::downgrade(&self.state),
            frame: Cell::new(frame),
            unshaded_height: Cell::new(spec.height),
            min_size: Cell::new(Size::new(spec.min_width, spec.min_height)),
            shaded: Cell::new(false),
            can_shade: spec.can_shade,
            stacking: Cell::new(stacking),
            opacity: Cell::new(1.0),
            skip_switcher: Cell::new(spec.skip_switcher),
            maximized: Cell::new(spec.maximized),
            resizable: spec.resizable,
            dock: spec.dock,
            class: spec.class.clone(),
            caption: spec.caption.clone(),
            frame_writes: Cell::new(0),
            desktop: Cell::new(None),
        });
        self.state.windows.borrow_mut().insert(id, window.clone());
        window
    }

    pub fn window(&self, id: ClientId) -> Option<Rc<HeadlessWindow>> {
        self.state.windows.borrow().get(&id).cloned()
    }

    pub fn forget_window(&self, id: ClientId) {
        self.state.windows.borrow_mut().remove(&id);
        if self.state.active.get() == Some(id) {
            self.state.active.set(None);
        }
    }

    pub fn windows(&self) -> Vec<Rc<HeadlessWindow>> {
        self.state.windows.borrow().values().cloned().collect()
    }

    pub fn active(&self) -> Option<ClientId> { self.state.active.get() }

    /// Changes the active window from the host side without notifying the
    /// focus callback, like a user clicking a window.
    pub fn set_active(&self, id: Option<ClientId>) { self.state.active.set(id); }
}

impl AreaProvider for HeadlessHost {
    fn placement_area(&self, key: DesktopKey) -> Rect {
        self.state
            .areas
            .borrow()
            .get(&key)
            .copied()
            .unwrap_or_else(|| self.state.default_area.get())
    }
}

impl WindowLookup for HeadlessHost {
    fn handle(&self, id: ClientId) -> Option<Handle> {
        let window: Handle = self.window(id)?;
        Some(window)
    }
}

pub struct HeadlessWindow {
    id: ClientId,
    host: Weak<HostState>,
    frame: Cell<Rect>,
    unshaded_height: Cell<i32>,
    min_size: Cell<Size>,
    shaded: Cell<bool>,
    can_shade: bool,
    stacking: Cell<StackingFlags>,
    opacity: Cell<f64>,
    skip_switcher: Cell<bool>,
    maximized: Cell<bool>,
    resizable: bool,
    dock: bool,
    class: String,
    caption: String,
    frame_writes: Cell<usize>,
    desktop: Cell<Option<DesktopKey>>,
}

impl HeadlessWindow {
    pub fn id(&self) -> ClientId { self.id }

    pub fn is_shaded(&self) -> bool { self.shaded.get() }

    pub fn frame_writes(&self) -> usize { self.frame_writes.get() }

    /// Last desktop the layout moved this window to.
    pub fn desktop(&self) -> Option<DesktopKey> { self.desktop.get() }

    pub fn set_min_size(&self, size: Size) { self.min_size.set(size); }

    /// Simulates the user dragging the window to a new frame.
    pub fn user_set_frame(&self, frame: Rect) {
        self.frame.set(frame);
        self.unshaded_height.set(frame.height);
    }
}

impl fmt::Debug for HeadlessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWindow")
            .field("id", &self.id)
            .field("frame", &self.frame.get())
            .field("shaded", &self.shaded.get())
            .field("maximized", &self.maximized.get())
            .finish()
    }
}

impl WindowHandle for HeadlessWindow {
    fn frame(&self) -> Rect { self.frame.get() }

    fn set_frame(&self, frame: Rect) {
        self.frame_writes.set(self.frame_writes.get() + 1);
        self.unshaded_height.set(frame.height);
        if self.shaded.get() {
            self.frame.set(Rect { height: SHADED_HEIGHT, ..frame });
        } else {
            self.frame.set(frame);
        }
    }

    fn min_size(&self) -> Size { self.min_size.get() }

    fn can_shade(&self) -> bool { self.can_shade }

    fn set_shaded(&self, shaded: bool) {
        if !self.can_shade || self.shaded.get() == shaded {
            return;
        }
        self.shaded.set(shaded);
        let frame = self.frame.get();
        let height = if shaded { SHADED_HEIGHT } else { self.unshaded_height.get() };
        self.frame.set(Rect { height, ..frame });
    }

    fn focus(&self) {
        let Some(host) = self.host.upgrade() else { return };
        host.active.set(Some(self.id));
        if let Some(callback) = host.on_focus.borrow().as_ref() {
            callback(self.id);
        }
    }

    fn is_focused(&self) -> bool {
        self.host.upgrade().is_some_and(|host| host.active.get() == Some(self.id))
    }

    fn stacking(&self) -> StackingFlags { self.stacking.get() }

    fn set_stacking(&self, flags: StackingFlags) { self.stacking.set(flags); }

    fn opacity(&self) -> f64 { self.opacity.get() }

    fn set_opacity(&self, opacity: f64) { self.opacity.set(opacity.clamp(0.0, 1.0)); }

    fn skip_switcher(&self) -> bool { self.skip_switcher.get() }

    fn set_skip_switcher(&self, skip: bool) { self.skip_switcher.set(skip); }

    fn is_maximized(&self) -> bool { self.maximized.get() }

    /// Maximizing fills the host's default area; unmaximizing keeps the
    /// frame until the next write.
    fn set_maximized(&self, maximized: bool) {
        if self.maximized.replace(maximized) == maximized || !maximized {
            return;
        }
        if let Some(host) = self.host.upgrade() {
            let area = host.default_area.get();
            self.frame.set(area);
            self.unshaded_height.set(area.height);
        }
    }

    fn is_resizable(&self) -> bool { self.resizable }

    fn is_dock(&self) -> bool { self.dock }

    fn set_desktop(&self, desktop: DesktopKey) { self.desktop.set(Some(desktop)); }

    fn class(&self) -> String { self.class.clone() }

    fn caption(&self) -> String { self.caption.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shading_collapses_and_restores_height() {
        let host = HeadlessHost::new(Rect::new(0, 0, 1000, 800));
        let window = host.spawn_window(ClientId(1), &WindowSpec::default());
        window.set_frame(Rect::new(10, 10, 300, 400));
        window.set_shaded(true);
        assert_eq!(window.frame().height, SHADED_HEIGHT);
        window.set_frame(Rect::new(10, 10, 300, 500));
        assert_eq!(window.frame().height, SHADED_HEIGHT);
        window.set_shaded(false);
        assert_eq!(window.frame(), Rect::new(10, 10, 300, 500));
    }

    #[test]
    fn focus_updates_active_window_and_notifies() {
        let host = HeadlessHost::new(Rect::new(0, 0, 1000, 800));
        let seen = Rc::new(Cell::new(None));
        let seen_cb = seen.clone();
        host.on_focus(move |id| seen_cb.set(Some(id)));
        let a = host.spawn_window(ClientId(1), &WindowSpec::default());
        let b = host.spawn_window(ClientId(2), &WindowSpec::default());
        b.focus();
        assert!(b.is_focused());
        assert!(!a.is_focused());
        assert_eq!(seen.get(), Some(ClientId(2)));
    }

    #[test]
    fn maximizing_fills_the_default_area() {
        let host = HeadlessHost::new(Rect::new(0, 0, 1000, 800));
        let window = host.spawn_window(ClientId(1), &WindowSpec::default());
        window.set_maximized(true);
        assert!(window.is_maximized());
        assert_eq!(window.frame(), Rect::new(0, 0, 1000, 800));
        window.set_maximized(false);
        assert!(!window.is_maximized());
        assert_eq!(window.frame(), Rect::new(0, 0, 1000, 800));

        let spawned = host.spawn_window(ClientId(2), &WindowSpec { maximized: true, ..Default::default() });
        assert_eq!(spawned.frame(), Rect::new(0, 0, 1000, 800));
    }

    #[test]
    fn per_desktop_area_overrides_default() {
        let host = HeadlessHost::new(Rect::new(0, 0, 1000, 800));
        let key = DesktopKey::new(0, 2);
        host.set_area(key, Rect::new(0, 30, 1000, 770));
        assert_eq!(host.placement_area(key), Rect::new(0, 30, 1000, 770));
        assert_eq!(host.placement_area(DesktopKey::new(0, 1)), Rect::new(0, 0, 1000, 800));
    }
}
