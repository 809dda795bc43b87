//! Scripted runs against the headless host.
//!
//! A script lists the windows that exist and a sequence of reactor events.
//! Before an event reaches the reactor, the host-side part of it is applied
//! (activating a window, the user's new frame), so the reactor sees the same
//! world a real host would show it.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info_span};

use super::{Event, Reactor};
use crate::actor;
use crate::common::collections::BTreeMap;
use crate::common::config::Config;
use crate::layout_engine::LayoutSnapshot;
use crate::sys::geometry::Rect;
use crate::sys::headless::{HeadlessHost, WindowSpec};
use crate::sys::screen::DesktopKey;
use crate::sys::window::{ClientId, WindowHandle};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default = "default_area")]
    pub area: Rect,
    /// Desktop the host starts on.
    #[serde(default)]
    pub desktop: DesktopKey,
    #[serde(default)]
    pub windows: BTreeMap<ClientId, WindowSpec>,
    pub events: Vec<Event>,
}

fn default_area() -> Rect { Rect::new(0, 0, 1920, 1080) }

impl Script {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading replay script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing replay script {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> { Ok(ron::from_str(text)?) }
}

/// Mirrors the host side of an event onto the headless host.
fn apply_to_host(host: &HeadlessHost, event: Event) -> Event {
    match event {
        Event::WindowFocused(id) => host.set_active(id),
        Event::WindowFrameChanged { id, new, .. } => {
            if let Some(window) = host.window(id) {
                let old = window.frame();
                window.user_set_frame(new);
                return Event::WindowFrameChanged { id, old, new };
            }
        }
        Event::WindowDesktopChanged { id, desktop } => {
            if let Some(window) = host.window(id) {
                window.set_desktop(desktop);
            }
        }
        Event::WindowRemoved(id) => host.forget_window(id),
        _ => {}
    }
    event
}

/// Runs `script` through a fresh reactor and returns the final layout.
pub async fn replay(config: Config, script: Script) -> LayoutSnapshot {
    let host = HeadlessHost::new(script.area);
    for (&id, spec) in &script.windows {
        host.spawn_window(id, spec);
    }
    let reactor = Reactor::new(config, Rc::new(host.clone()), Rc::new(host.clone()), script.desktop);
    let (tx, rx) = actor::channel();

    let feed = async move {
        for (step, event) in script.events.into_iter().enumerate() {
            info_span!("replay", step).in_scope(|| {
                let event = apply_to_host(&host, event);
                debug!(?event, "replaying");
                tx.send(event);
            });
            // join! polls both sides on every wake, so after two yields the
            // reactor has handled the event whichever side went first.
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }
    };
    let (reactor, ()) = tokio::join!(reactor.run(rx), feed);
    reactor.engine().snapshot()
}
