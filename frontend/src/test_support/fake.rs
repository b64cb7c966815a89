//! In-memory page used by the host tests.
//!
//! Nodes are plain indices. Selectors support the compound forms the page
//! uses (`tag`, `#id`, `.class`, `[attr="value"]`) and comma-separated lists.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::dom::{DomEvent, EventPort, Intersection, Label, RenderPort, ViewportCallback};
use crate::error::{PageError, PageResult};
use crate::lifecycle::{Handle, Scheduler};
use crate::state::theme::{PreferenceStore, Theme};

pub type NodeId = usize;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

fn parse_compound(raw: &str) -> Compound {
    let is_marker = |ch: char| matches!(ch, '#' | '.' | '[');
    let mut compound = Compound::default();
    let mut rest = raw.trim();

    let end = rest.find(is_marker).unwrap_or(rest.len());
    if end > 0 {
        compound.tag = Some(rest[..end].to_ascii_lowercase());
    }
    rest = &rest[end..];

    while let Some(marker) = rest.chars().next() {
        rest = &rest[1..];
        if marker == '[' {
            let close = rest.find(']').unwrap_or(rest.len());
            let body = &rest[..close];
            let attr = match body.split_once('=') {
                Some((k, v)) => (k.trim().to_string(), Some(v.trim().trim_matches('"').to_string())),
                None => (body.trim().to_string(), None),
            };
            compound.attrs.push(attr);
            rest = rest.get(close + 1..).unwrap_or("");
        } else {
            let end = rest.find(is_marker).unwrap_or(rest.len());
            let name = rest[..end].to_string();
            if marker == '#' {
                compound.id = Some(name);
            } else {
                compound.classes.push(name);
            }
            rest = &rest[end..];
        }
    }
    compound
}

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    parent: Option<NodeId>,
    style: BTreeMap<String, String>,
    text: String,
    inner_html: String,
    value: String,
    title: Option<String>,
    disabled: bool,
}

impl NodeData {
    fn matches(&self, compound: &Compound) -> bool {
        compound.tag.as_ref().map_or(true, |t| *t == self.tag)
            && compound
                .id
                .as_ref()
                .map_or(true, |id| self.id.as_ref() == Some(id))
            && compound.classes.iter().all(|c| self.classes.contains(c))
            && compound.attrs.iter().all(|(k, v)| match v {
                Some(v) => self.attrs.get(k) == Some(v),
                None => self.attrs.contains_key(k),
            })
    }
}

struct Listener {
    node: NodeId,
    event: DomEvent,
    handler: Option<Box<dyn FnMut()>>,
    active: bool,
}

struct Watcher {
    targets: Vec<NodeId>,
    threshold: f64,
    callback: Option<ViewportCallback<NodeId>>,
    active: bool,
}

#[derive(Default)]
struct Inner {
    nodes: Vec<NodeData>,
    root_classes: BTreeSet<String>,
    prefers_dark: bool,
    listeners: Vec<Listener>,
    watchers: Vec<Watcher>,
}

#[derive(Clone, Default)]
pub struct FakePage {
    inner: Rc<RefCell<Inner>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element described as `tag#id.class[attr="value"]`.
    pub fn append(&self, parent: Option<NodeId>, spec: &str) -> NodeId {
        let compound = parse_compound(spec);
        let mut inner = self.inner.borrow_mut();
        inner.nodes.push(NodeData {
            tag: compound.tag.unwrap_or_else(|| "div".into()),
            id: compound.id,
            classes: compound.classes,
            attrs: compound
                .attrs
                .into_iter()
                .map(|(k, v)| (k, v.unwrap_or_default()))
                .collect(),
            parent,
            ..NodeData::default()
        });
        inner.nodes.len() - 1
    }

    fn is_descendant(inner: &Inner, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = inner.nodes[node].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = inner.nodes[parent].parent;
        }
        false
    }

    fn select(&self, selector: &str, within: Option<NodeId>) -> Vec<NodeId> {
        let compounds: Vec<Compound> = selector.split(',').map(parse_compound).collect();
        let inner = self.inner.borrow();
        (0..inner.nodes.len())
            .filter(|&id| within.map_or(true, |root| Self::is_descendant(&inner, id, root)))
            .filter(|&id| compounds.iter().any(|c| inner.nodes[id].matches(c)))
            .collect()
    }

    fn with_node<T>(&self, node: NodeId, f: impl FnOnce(&NodeData) -> T) -> T {
        f(&self.inner.borrow().nodes[node])
    }

    fn update_node(&self, node: NodeId, f: impl FnOnce(&mut NodeData)) {
        f(&mut self.inner.borrow_mut().nodes[node])
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.with_node(node, |n| n.style.get(property).cloned())
    }

    pub fn text(&self, node: NodeId) -> String {
        self.with_node(node, |n| n.text.clone())
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        self.with_node(node, |n| n.inner_html.clone())
    }

    pub fn value(&self, node: NodeId) -> String {
        self.with_node(node, |n| n.value.clone())
    }

    pub fn title(&self, node: NodeId) -> Option<String> {
        self.with_node(node, |n| n.title.clone())
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.with_node(node, |n| n.disabled)
    }

    pub fn root_has_class(&self, class: &str) -> bool {
        self.inner.borrow().root_classes.contains(class)
    }

    pub fn root_classes(&self) -> Vec<String> {
        self.inner.borrow().root_classes.iter().cloned().collect()
    }

    pub fn set_prefers_dark(&self, dark: bool) {
        self.inner.borrow_mut().prefers_dark = dark;
    }

    pub fn active_listeners(&self) -> usize {
        self.inner.borrow().listeners.iter().filter(|l| l.active).count()
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.inner
            .borrow()
            .watchers
            .iter()
            .any(|w| w.active && w.targets.contains(&node))
    }

    pub fn watcher_thresholds(&self) -> Vec<f64> {
        self.inner.borrow().watchers.iter().map(|w| w.threshold).collect()
    }

    /// Fires `event` on `node`; returns how many handlers ran.
    pub fn dispatch(&self, node: NodeId, event: DomEvent) -> usize {
        let ids: Vec<usize> = {
            let inner = self.inner.borrow();
            inner
                .listeners
                .iter()
                .enumerate()
                .filter(|(_, l)| l.active && l.node == node && l.event == event)
                .map(|(i, _)| i)
                .collect()
        };
        let mut ran = 0;
        for id in ids {
            let handler = self.inner.borrow_mut().listeners[id].handler.take();
            if let Some(mut handler) = handler {
                handler();
                ran += 1;
                let mut inner = self.inner.borrow_mut();
                if inner.listeners[id].active {
                    inner.listeners[id].handler = Some(handler);
                }
            }
        }
        ran
    }

    /// Reports a visibility change of `node` to every watcher observing it.
    pub fn set_intersecting(&self, node: NodeId, is_intersecting: bool) -> usize {
        let ids: Vec<usize> = {
            let inner = self.inner.borrow();
            inner
                .watchers
                .iter()
                .enumerate()
                .filter(|(_, w)| w.active && w.targets.contains(&node))
                .map(|(i, _)| i)
                .collect()
        };
        let entries = [Intersection {
            node,
            is_intersecting,
        }];
        let mut notified = 0;
        for id in ids {
            let callback = self.inner.borrow_mut().watchers[id].callback.take();
            let Some(mut callback) = callback else {
                continue;
            };
            let released = RefCell::new(Vec::new());
            let unobserve: &dyn Fn(&NodeId) = &|n: &NodeId| released.borrow_mut().push(*n);
            callback(&entries[..], unobserve);
            notified += 1;

            let mut inner = self.inner.borrow_mut();
            let watcher = &mut inner.watchers[id];
            watcher.targets.retain(|t| !released.borrow().contains(t));
            if watcher.active {
                watcher.callback = Some(callback);
            }
        }
        notified
    }

    pub fn scroll_into_view(&self, node: NodeId) -> usize {
        self.set_intersecting(node, true)
    }
}

impl RenderPort for FakePage {
    type Node = NodeId;

    fn find_all(&self, selector: &str) -> Vec<NodeId> {
        self.select(selector, None)
    }

    fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let inner = self.inner.borrow();
        inner
            .nodes
            .iter()
            .position(|n| n.id.as_deref() == Some(id))
    }

    fn find_within(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        self.select(selector, Some(*node)).into_iter().next()
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        self.update_node(*node, |n| {
            n.style.insert(property.into(), value.into());
        });
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.update_node(*node, |n| n.text = text.into());
    }

    fn set_label(&self, node: &NodeId, label: &Label) {
        self.update_node(*node, |n| {
            if n.tag == "input" {
                n.value = label.text.clone();
            } else {
                n.inner_html = label.to_markup();
            }
        });
    }

    fn set_icon(&self, node: &NodeId, markup: &str) {
        self.update_node(*node, |n| n.inner_html = markup.into());
    }

    fn set_title(&self, node: &NodeId, title: &str) {
        self.update_node(*node, |n| n.title = Some(title.into()));
    }

    fn set_disabled(&self, node: &NodeId, disabled: bool) {
        self.update_node(*node, |n| n.disabled = disabled);
    }

    fn set_root_class(&self, class: &str, enabled: bool) {
        let mut inner = self.inner.borrow_mut();
        if enabled {
            inner.root_classes.insert(class.into());
        } else {
            inner.root_classes.remove(class);
        }
    }

    fn prefers_dark_scheme(&self) -> bool {
        self.inner.borrow().prefers_dark
    }
}

impl EventPort for FakePage {
    type Node = NodeId;

    fn on(&self, node: &NodeId, event: DomEvent, handler: Box<dyn FnMut()>) -> Handle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.listeners.push(Listener {
                node: *node,
                event,
                handler: Some(handler),
                active: true,
            });
            inner.listeners.len() - 1
        };
        let inner = self.inner.clone();
        Handle::new("listener", move || {
            let mut inner = inner.borrow_mut();
            inner.listeners[id].active = false;
            inner.listeners[id].handler = None;
        })
    }

    fn watch_viewport(
        &self,
        targets: &[NodeId],
        threshold: f64,
        callback: ViewportCallback<NodeId>,
    ) -> Handle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.watchers.push(Watcher {
                targets: targets.to_vec(),
                threshold,
                callback: Some(callback),
                active: true,
            });
            inner.watchers.len() - 1
        };
        let inner = self.inner.clone();
        Handle::new("viewport-watcher", move || {
            let mut inner = inner.borrow_mut();
            let watcher = &mut inner.watchers[id];
            watcher.active = false;
            watcher.callback = None;
            watcher.targets.clear();
        })
    }
}

struct Timer {
    period_ms: u32,
    elapsed_ms: u32,
    tick: Option<Box<dyn FnMut()>>,
}

/// Scheduler driven by [`ManualScheduler::advance`].
#[derive(Clone, Default)]
pub struct ManualScheduler {
    timers: Rc<RefCell<Vec<Timer>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.borrow().iter().filter(|t| t.tick.is_some()).count()
    }

    pub fn periods(&self) -> Vec<u32> {
        self.timers.borrow().iter().map(|t| t.period_ms).collect()
    }

    pub fn advance(&self, ms: u32) {
        let count = self.timers.borrow().len();
        for id in 0..count {
            let due = {
                let mut timers = self.timers.borrow_mut();
                let timer = &mut timers[id];
                if timer.tick.is_none() {
                    continue;
                }
                timer.elapsed_ms += ms;
                let due = timer.elapsed_ms / timer.period_ms;
                timer.elapsed_ms %= timer.period_ms;
                due
            };
            for _ in 0..due {
                let tick = self.timers.borrow_mut()[id].tick.take();
                let Some(mut tick) = tick else {
                    break;
                };
                tick();
                self.timers.borrow_mut()[id].tick = Some(tick);
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Handle {
        let id = {
            let mut timers = self.timers.borrow_mut();
            timers.push(Timer {
                period_ms: period_ms.max(1),
                elapsed_ms: 0,
                tick: Some(tick),
            });
            timers.len() - 1
        };
        let timers = self.timers.clone();
        Handle::new("interval", move || {
            timers.borrow_mut()[id].tick = None;
        })
    }
}

/// Preference store backed by a shared string slot.
#[derive(Clone, Default)]
pub struct MemoryPreference {
    raw: Rc<RefCell<Option<String>>>,
    failure: Rc<RefCell<Option<PageError>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryPreference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: &str) -> Self {
        let store = Self::default();
        *store.raw.borrow_mut() = Some(raw.into());
        store
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn fail_with(&self, error: PageError) {
        *self.failure.borrow_mut() = Some(error);
    }
}

impl PreferenceStore for MemoryPreference {
    fn get(&self) -> PageResult<Option<Theme>> {
        if let Some(err) = self.failure.borrow().clone() {
            return Err(err);
        }
        Ok(Theme::from_stored(self.raw.borrow().as_deref()))
    }

    fn set(&self, theme: Theme) -> PageResult<()> {
        if let Some(err) = self.failure.borrow().clone() {
            return Err(err);
        }
        self.writes.set(self.writes.get() + 1);
        *self.raw.borrow_mut() = Some(theme.as_str().into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_compound_and_lists() {
        let page = FakePage::new();
        let form = page.append(None, "form#signup");
        let submit = page.append(Some(form), r#"button.btn[type="submit"]"#);
        let other = page.append(None, r#"input[type="submit"]"#);

        assert_eq!(page.find_all("form"), vec![form]);
        assert_eq!(page.find_all(".btn"), vec![submit]);
        assert_eq!(
            page.find_all(r#"button[type="submit"], input[type="submit"]"#),
            vec![submit, other]
        );
        assert_eq!(page.find_within(&form, "input[type=submit]"), None);
        assert_eq!(page.find_by_id("signup"), Some(form));
    }

    #[test]
    fn scheduler_fires_per_elapsed_period() {
        let scheduler = ManualScheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let counter = ticks.clone();
        let mut handle = scheduler.every(1000, Box::new(move || counter.set(counter.get() + 1)));

        scheduler.advance(999);
        assert_eq!(ticks.get(), 0);
        scheduler.advance(2001);
        assert_eq!(ticks.get(), 3);

        handle.stop();
        scheduler.advance(5000);
        assert_eq!(ticks.get(), 3);
        assert_eq!(scheduler.active_timers(), 0);
    }
}
