use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, SvgElement,
};

use super::{DomEvent, EventPort, Intersection, Label, RenderPort, ViewportCallback};
use crate::error::{PageError, PageResult};
use crate::lifecycle::{Handle, Scheduler};
use crate::state::theme::{PreferenceStore, Theme};
use crate::utils::storage;

const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

/// The live document behind both ports.
#[derive(Clone)]
pub struct WebPage {
    document: Document,
}

impl WebPage {
    pub fn current() -> PageResult<Self> {
        let document = storage::window()?.document().ok_or(PageError::NoDocument)?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn query_all(&self, selector: &str) -> PageResult<Vec<Element>> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|_| PageError::Selector(selector.into()))?;
        Ok((0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }
}

impl RenderPort for WebPage {
    type Node = Element;

    fn find_all(&self, selector: &str) -> Vec<Element> {
        self.query_all(selector).unwrap_or_else(|err| {
            log::warn!("{}", err);
            Vec::new()
        })
    }

    fn find_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn find_within(&self, node: &Element, selector: &str) -> Option<Element> {
        node.query_selector(selector).ok().flatten()
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        let style = if let Some(el) = node.dyn_ref::<HtmlElement>() {
            el.style()
        } else if let Some(el) = node.dyn_ref::<SvgElement>() {
            el.style()
        } else {
            log::debug!("<{}> has no inline style, skipping {}", node.tag_name(), property);
            return;
        };
        if let Err(err) = style.set_property(property, value) {
            log::debug!("{}", PageError::from_js(&err));
        }
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_label(&self, node: &Element, label: &Label) {
        match node.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.set_value(&label.text),
            None => node.set_inner_html(&label.to_markup()),
        }
    }

    fn set_icon(&self, node: &Element, markup: &str) {
        node.set_inner_html(markup);
    }

    fn set_title(&self, node: &Element, title: &str) {
        let _ = node.set_attribute("title", title);
    }

    fn set_disabled(&self, node: &Element, disabled: bool) {
        let _ = if disabled {
            node.set_attribute("disabled", "")
        } else {
            node.remove_attribute("disabled")
        };
    }

    fn set_root_class(&self, class: &str, enabled: bool) {
        let Some(html) = self.document.document_element() else {
            return;
        };
        let list = html.class_list();
        let _ = if enabled {
            list.add_1(class)
        } else {
            list.remove_1(class)
        };
    }

    fn prefers_dark_scheme(&self) -> bool {
        web_sys::window()
            .and_then(|w| w.match_media(DARK_SCHEME_QUERY).ok().flatten())
            .map(|m| m.matches())
            .unwrap_or(false)
    }
}

impl EventPort for WebPage {
    type Node = Element;

    fn on(&self, node: &Element, event: DomEvent, mut handler: Box<dyn FnMut()>) -> Handle {
        let closure = Closure::wrap(Box::new(move |_: web_sys::Event| handler())
            as Box<dyn FnMut(web_sys::Event)>);
        if let Err(err) =
            node.add_event_listener_with_callback(event.name(), closure.as_ref().unchecked_ref())
        {
            log::warn!("{}", PageError::from_js(&err));
            return Handle::inert("listener");
        }
        let target = node.clone();
        Handle::new("listener", move || {
            let _ = target.remove_event_listener_with_callback(
                event.name(),
                closure.as_ref().unchecked_ref(),
            );
        })
    }

    fn watch_viewport(
        &self,
        targets: &[Element],
        threshold: f64,
        mut callback: ViewportCallback<Element>,
    ) -> Handle {
        // The observer only exists once the closure is built, so the
        // callback reaches it through this slot.
        let slot: Rc<RefCell<Option<IntersectionObserver>>> = Rc::new(RefCell::new(None));
        let observer_slot = slot.clone();
        let closure = Closure::wrap(Box::new(move |entries: js_sys::Array, _: IntersectionObserver| {
            let batch: Vec<Intersection<Element>> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| Intersection {
                    node: entry.target(),
                    is_intersecting: entry.is_intersecting(),
                })
                .collect();
            let unobserve: &dyn Fn(&Element) = &|node: &Element| {
                if let Some(observer) = observer_slot.borrow().as_ref() {
                    observer.unobserve(node);
                }
            };
            callback(&batch[..], unobserve);
        })
            as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&threshold.into());
        let observer = match IntersectionObserver::new_with_options(
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            Ok(observer) => observer,
            Err(err) => {
                log::warn!("{}", PageError::from_js(&err));
                return Handle::inert("viewport-watcher");
            }
        };
        for target in targets {
            observer.observe(target);
        }
        *slot.borrow_mut() = Some(observer);

        Handle::new("viewport-watcher", move || {
            if let Some(observer) = slot.borrow_mut().take() {
                observer.disconnect();
            }
            drop(closure);
        })
    }
}

/// `setInterval` through gloo-timers; cancelled when the handle stops.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntervalScheduler;

impl Scheduler for IntervalScheduler {
    fn every(&self, period_ms: u32, mut tick: Box<dyn FnMut()>) -> Handle {
        let interval = Interval::new(period_ms, move || tick());
        Handle::new("interval", move || drop(interval))
    }
}

/// Theme preference kept in `localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStoragePreference {
    key: String,
}

impl LocalStoragePreference {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl PreferenceStore for LocalStoragePreference {
    fn get(&self) -> PageResult<Option<Theme>> {
        let raw = storage::read(&self.key)?;
        Ok(Theme::from_stored(raw.as_deref()))
    }

    fn set(&self, theme: Theme) -> PageResult<()> {
        storage::write(&self.key, theme.as_str())
    }
}
