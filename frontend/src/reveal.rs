//! Entrance animation for elements scrolling into view.

use std::rc::Rc;

use crate::config::RevealConfig;
use crate::dom::{EventPort, Intersection, RenderPort};
use crate::lifecycle::Handle;

pub const VISIBLE_OPACITY: &str = "1";
pub const VISIBLE_TRANSFORM: &str = "translateY(0)";

pub struct RevealController<R> {
    port: Rc<R>,
    config: RevealConfig,
}

impl<R> RevealController<R>
where
    R: RenderPort + 'static,
{
    pub fn new(port: Rc<R>, config: RevealConfig) -> Self {
        Self { port, config }
    }

    /// Puts every marked element in its hidden, offset state.
    pub fn prepare(&self) -> Vec<R::Node> {
        let nodes = self.port.find_all(&self.config.selector);
        let offset = format!("translateY({}px)", self.config.offset_px);
        for node in &nodes {
            self.port.set_style(node, "opacity", "0");
            self.port.set_style(node, "transform", &offset);
            self.port.set_style(node, "transition", &self.config.transition);
        }
        nodes
    }

    pub fn show(&self, node: &R::Node) {
        self.port.set_style(node, "opacity", VISIBLE_OPACITY);
        self.port.set_style(node, "transform", VISIBLE_TRANSFORM);
    }

    /// Reveals the intersecting entries and returns them. Entries leaving
    /// the viewport are ignored, so an element never goes back to hidden.
    pub fn reveal_intersecting(&self, entries: &[Intersection<R::Node>]) -> Vec<R::Node> {
        entries
            .iter()
            .filter(|entry| entry.is_intersecting)
            .map(|entry| {
                self.show(&entry.node);
                entry.node.clone()
            })
            .collect()
    }

    pub fn start<E>(self: Rc<Self>, events: &E) -> Handle
    where
        E: EventPort<Node = R::Node>,
    {
        let nodes = self.prepare();
        log::debug!("observing {} reveal targets", nodes.len());
        let once = self.config.once;
        let controller = self.clone();
        events.watch_viewport(
            &nodes,
            self.config.threshold,
            Box::new(move |entries: &[Intersection<R::Node>], unobserve: &dyn Fn(&R::Node)| {
                let revealed = controller.reveal_intersecting(entries);
                if once {
                    revealed.iter().for_each(|node| unobserve(node));
                }
            }),
        )
    }
}
