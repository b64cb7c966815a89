//! Ports between the controllers and the rendering surface.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::lifecycle::Handle;

/// Text shown on a control, optionally preceded by icon markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub icon: Option<String>,
}

impl Label {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn to_markup(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{}{}", icon, self.text),
            None => self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEvent {
    Click,
    Submit,
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Click => "click",
            DomEvent::Submit => "submit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Intersection<N> {
    pub node: N,
    pub is_intersecting: bool,
}

pub type ViewportCallback<N> = Box<dyn FnMut(&[Intersection<N>], &dyn Fn(&N))>;

pub trait RenderPort {
    type Node: Clone + 'static;

    fn find_all(&self, selector: &str) -> Vec<Self::Node>;
    fn find_by_id(&self, id: &str) -> Option<Self::Node>;
    fn find_within(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn set_text(&self, node: &Self::Node, text: &str);
    fn set_label(&self, node: &Self::Node, label: &Label);
    fn set_icon(&self, node: &Self::Node, markup: &str);
    fn set_title(&self, node: &Self::Node, title: &str);
    fn set_disabled(&self, node: &Self::Node, disabled: bool);

    fn set_root_class(&self, class: &str, enabled: bool);
    fn prefers_dark_scheme(&self) -> bool;
}

pub trait EventPort {
    type Node: Clone + 'static;

    fn on(&self, node: &Self::Node, event: DomEvent, handler: Box<dyn FnMut()>) -> Handle;

    /// One shared watcher for all `targets`. The callback receives the batch
    /// of changed entries and a function that stops observing a node.
    fn watch_viewport(
        &self,
        targets: &[Self::Node],
        threshold: f64,
        callback: ViewportCallback<Self::Node>,
    ) -> Handle;
}
