//! The reactor owns the layout engine and feeds it host events.
//!
//! Events arrive over an actor channel together with the span they were sent
//! from. Each one is handled synchronously and followed by an arrange pass,
//! except placement area changes, which come in bursts and are debounced.

mod debounce;
mod replay;

use std::rc::Rc;
use std::time::Duration;

pub use debounce::Debouncer;
pub use replay::{Script, replay};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};

use crate::actor;
use crate::common::config::Config;
use crate::layout_engine::{LayoutCommand, LayoutEngine};
use crate::sys::geometry::Rect;
use crate::sys::screen::{AreaProvider, DesktopKey};
use crate::sys::window::{ClientId, WindowLookup};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Event {
    /// A new window exists. Its handle is looked up through the reactor's
    /// [`WindowLookup`].
    WindowAdded { id: ClientId, desktop: DesktopKey },
    WindowRemoved(ClientId),
    WindowMinimized(ClientId),
    WindowUnminimized(ClientId),
    /// The host's active window changed. `None` when nothing is active.
    WindowFocused(Option<ClientId>),
    WindowMoveStarted(ClientId),
    WindowMoveFinished(ClientId),
    WindowResizeStarted(ClientId),
    WindowResizeFinished(ClientId),
    /// The user changed a window's geometry. Ignored outside interactive
    /// resizes.
    WindowFrameChanged {
        id: ClientId,
        #[serde(default)]
        old: Rect,
        new: Rect,
    },
    WindowDesktopChanged { id: ClientId, desktop: DesktopKey },
    DesktopSwitched(DesktopKey),
    DesktopCountChanged { output: u32, count: u32 },
    /// Some desktop's placement area may have changed.
    AreaChanged,
    Command(LayoutCommand),
    ConfigUpdated(Box<Config>),
}

pub struct Reactor {
    config: Config,
    engine: LayoutEngine,
    windows: Rc<dyn WindowLookup>,
    area_debounce: Debouncer,
}

fn area_delay(config: &Config) -> Duration { Duration::from_millis(config.settings.area_change_delay_ms) }

impl Reactor {
    pub fn new(
        config: Config,
        area_provider: Rc<dyn AreaProvider>,
        windows: Rc<dyn WindowLookup>,
        current: DesktopKey,
    ) -> Self {
        let engine = LayoutEngine::new(&config, area_provider, current);
        let area_debounce = Debouncer::new(area_delay(&config));
        Self { config, engine, windows, area_debounce }
    }

    pub fn engine(&self) -> &LayoutEngine { &self.engine }

    pub fn config(&self) -> &Config { &self.config }

    /// Processes events until every sender is dropped. A pending area change
    /// is applied before returning.
    pub async fn run(mut self, mut events: Receiver) -> Self {
        info!("reactor started");
        loop {
            tokio::select! {
                message = events.recv() => match message {
                    Some((span, event)) => {
                        let _guard = span.enter();
                        self.handle_event(event);
                    }
                    None => break,
                },
                () = self.area_debounce.fired(), if self.area_debounce.is_pending() => {
                    self.flush_area_change();
                }
            }
        }
        if self.area_debounce.is_pending() {
            self.flush_area_change();
        }
        info!("reactor stopped");
        self
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::WindowFrameChanged { .. } => trace!(?event, "Event"),
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self), fields(event = ?event))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        match event {
            Event::WindowAdded { id, desktop } => {
                let Some(handle) = self.windows.handle(id) else {
                    warn!(?id, "added window has no handle");
                    return;
                };
                self.engine.window_added(id, handle, desktop);
            }
            Event::WindowRemoved(id) => self.engine.window_removed(id),
            Event::WindowMinimized(id) => self.engine.window_minimized(id),
            Event::WindowUnminimized(id) => self.engine.window_unminimized(id),
            Event::WindowFocused(id) => self.engine.window_focused(id),
            Event::WindowMoveStarted(id) => self.engine.window_move_started(id),
            Event::WindowMoveFinished(id) => self.engine.window_move_finished(id),
            Event::WindowResizeStarted(id) => self.engine.window_resize_started(id),
            Event::WindowResizeFinished(id) => self.engine.window_resize_finished(id),
            Event::WindowFrameChanged { id, old, new } => self.engine.window_frame_changed(id, old, new),
            Event::WindowDesktopChanged { id, desktop } => self.engine.window_desktop_changed(id, desktop),
            Event::DesktopSwitched(key) => self.engine.desktop_switched(key),
            Event::DesktopCountChanged { output, count } => self.engine.desktop_count_changed(output, count),
            Event::AreaChanged => {
                self.area_debounce.trigger();
                return;
            }
            Event::Command(command) => self.engine.handle_command(&command),
            Event::ConfigUpdated(config) => {
                self.area_debounce.set_delay(area_delay(&config));
                self.engine.config_updated(&config);
                self.config = *config;
            }
        }
        self.engine.arrange();
    }

    fn flush_area_change(&mut self) {
        self.area_debounce.take();
        debug!("applying placement area change");
        self.engine.area_changed();
        self.engine.arrange();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::time::{Instant, sleep};

    use super::*;
    use crate::sys::headless::{HeadlessHost, WindowSpec};
    use crate::sys::window::WindowHandle;

    const AREA: Rect = Rect::new(0, 0, 1920, 1080);
    const HOME: DesktopKey = DesktopKey::new(0, 0);

    fn setup() -> (HeadlessHost, Reactor) {
        let host = HeadlessHost::new(AREA);
        host.spawn_window(ClientId(1), &WindowSpec::default());
        let reactor = Reactor::new(Config::default(), Rc::new(host.clone()), Rc::new(host.clone()), HOME);
        (host, reactor)
    }

    fn height(host: &HeadlessHost) -> i32 { host.window(ClientId(1)).unwrap().frame().height }

    #[tokio::test(start_paused = true)]
    async fn area_changes_are_debounced() {
        let (host, reactor) = setup();
        let (tx, rx) = actor::channel();
        tx.send(Event::WindowAdded { id: ClientId(1), desktop: HOME });

        let feed = async {
            sleep(Duration::from_millis(10)).await;
            let before = height(&host);
            host.set_default_area(Rect::new(0, 0, 1920, 800));
            tx.send(Event::AreaChanged);
            sleep(Duration::from_millis(500)).await;
            tx.send(Event::AreaChanged);
            sleep(Duration::from_millis(700)).await;
            assert_eq!(height(&host), before);
            sleep(Duration::from_millis(400)).await;
            assert_eq!(height(&host), before - 280);
            drop(tx);
        };
        tokio::join!(reactor.run(rx), feed);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_area_change_is_applied_on_shutdown() {
        let (host, reactor) = setup();
        let (tx, rx) = actor::channel();
        tx.send(Event::WindowAdded { id: ClientId(1), desktop: HOME });

        let start = Instant::now();
        let feed = async {
            sleep(Duration::from_millis(10)).await;
            host.set_default_area(Rect::new(0, 0, 1920, 800));
            tx.send(Event::AreaChanged);
            drop(tx);
        };
        let (reactor, ()) = tokio::join!(reactor.run(rx), feed);
        assert!(start.elapsed() < Duration::from_secs(1));
        let tiling = reactor.engine().snapshot().desktops[0].tiling_area;
        assert_eq!(height(&host), tiling.height);
        assert_eq!(tiling.height, 800 - 32);
    }

    #[tokio::test]
    async fn events_are_arranged_immediately() {
        let (host, mut reactor) = setup();
        host.spawn_window(ClientId(2), &WindowSpec::default());
        reactor.handle_event(Event::WindowAdded { id: ClientId(1), desktop: HOME });
        reactor.handle_event(Event::WindowAdded { id: ClientId(2), desktop: HOME });
        // unknown windows are ignored
        reactor.handle_event(Event::WindowAdded { id: ClientId(9), desktop: HOME });
        assert_eq!(reactor.engine().snapshot().desktops[0].columns.len(), 2);

        host.set_active(Some(ClientId(2)));
        reactor.handle_event(Event::WindowFocused(Some(ClientId(2))));
        reactor.handle_event(Event::Command(LayoutCommand::WindowMoveLeft));
        assert_eq!(reactor.engine().snapshot().desktops[0].columns.len(), 1);
        let (first, second) = (host.window(ClientId(1)).unwrap().frame(), host.window(ClientId(2)).unwrap().frame());
        assert_eq!(first.x, second.x);
        assert!(second.y > first.bottom());
    }

    #[tokio::test]
    async fn config_update_changes_gaps_and_delay() {
        let (host, mut reactor) = setup();
        reactor.handle_event(Event::WindowAdded { id: ClientId(1), desktop: HOME });
        let before = height(&host);

        let mut config = Config::default();
        config.settings.layout.gaps.outer.top += 20;
        config.settings.area_change_delay_ms = 10;
        reactor.handle_event(Event::ConfigUpdated(Box::new(config.clone())));
        assert_eq!(height(&host), before - 20);
        assert_eq!(reactor.config(), &config);
    }
}
