use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};

use crate::config::ClockConfig;
use crate::dom::RenderPort;
use crate::lifecycle::{Handle, Scheduler};
use crate::utils::time::ClockZone;

/// Live time display for every element matching the clock selector.
pub struct ClockController<R> {
    port: Rc<R>,
    config: ClockConfig,
    zone: ClockZone,
}

impl<R> ClockController<R>
where
    R: RenderPort + 'static,
{
    pub fn new(port: Rc<R>, config: ClockConfig) -> Self {
        let zone = config.zone();
        Self { port, config, zone }
    }

    pub fn zone(&self) -> ClockZone {
        self.zone
    }

    pub fn render<Z: TimeZone>(&self, now: &DateTime<Z>) -> String {
        self.zone.format(now, &self.config.format)
    }

    /// Writes `now` into every clock element; returns how many were updated.
    pub fn tick_at<Z: TimeZone>(&self, now: &DateTime<Z>) -> usize {
        let text = self.render(now);
        let nodes = self.port.find_all(&self.config.selector);
        for node in &nodes {
            self.port.set_text(node, &text);
        }
        nodes.len()
    }

    pub fn tick(&self) -> usize {
        self.tick_at(&Utc::now())
    }

    /// Ticks immediately, then once per interval until the handle stops.
    pub fn start<S: Scheduler>(self: Rc<Self>, scheduler: &S) -> Handle {
        self.tick();
        let controller = self.clone();
        scheduler.every(
            self.config.interval_ms,
            Box::new(move || {
                controller.tick();
            }),
        )
    }
}
