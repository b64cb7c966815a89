//! Page enhancements compiled to WebAssembly: entrance animation on
//! scroll, submit feedback on forms, a live clock and a persisted
//! light/dark theme toggle.

rust_i18n::i18n!("locales", fallback = "ja");

pub mod clock;
pub mod config;
pub mod dom;
pub mod error;
pub mod forms;
pub mod lifecycle;
pub mod messages;
pub mod reveal;
pub mod state;
pub mod utils;


use std::rc::Rc;

use clock::ClockController;
use config::PageConfig;
use dom::{EventPort, RenderPort};
use forms::SubmitFeedback;
use lifecycle::{HandleSet, Scheduler};
use messages::Messages;
use reveal::RevealController;
use state::theme::{PreferenceStore, ThemeController};

/// Starts every controller against the given ports and returns their handles.
pub fn mount<P, S, T>(config: &PageConfig, page: Rc<P>, scheduler: &S, store: T) -> HandleSet
where
    P: RenderPort + EventPort<Node = <P as RenderPort>::Node> + 'static,
    S: Scheduler,
    T: PreferenceStore + 'static,
{
    let messages = Messages::for_locale(&config.locale);
    let mut handles = HandleSet::new();

    let reveal = Rc::new(RevealController::new(page.clone(), config.reveal.clone()));
    handles.push(reveal.start(page.as_ref()));

    let feedback = Rc::new(SubmitFeedback::new(
        page.clone(),
        config.forms.clone(),
        &messages,
    ));
    handles.extend(feedback.start(page.as_ref()));

    let clock = Rc::new(ClockController::new(page.clone(), config.clock.clone()));
    handles.push(clock.start(scheduler));

    let theme = Rc::new(ThemeController::new(
        store,
        page.clone(),
        config.theme.clone(),
        messages,
    ));
    handles.push(theme.init(page.as_ref()));

    log::info!(
        "page enhancements mounted ({} active handles)",
        handles.active_count()
    );
    handles
}

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::wasm_bindgen;
    use wasm_bindgen::JsCast;

    use crate::config;
    use crate::dom::web::{IntervalScheduler, LocalStoragePreference, WebPage};
    use crate::lifecycle::HandleSet;

    thread_local! {
        static PAGE_HANDLES: RefCell<HandleSet> = RefCell::new(HandleSet::new());
    }

    fn mount_page() {
        let config = config::load();
        let page = match WebPage::current() {
            Ok(page) => Rc::new(page),
            Err(err) => {
                log::error!("{}", err);
                return;
            }
        };
        let store = LocalStoragePreference::new(config.theme.storage_key.clone());
        let handles = crate::mount(&config, page, &IntervalScheduler, store);
        PAGE_HANDLES.with(|registry| {
            let mut registry = registry.borrow_mut();
            registry.stop_all();
            *registry = handles;
        });
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Starting page enhancements (wasm)");

        let document = match web_sys::window().and_then(|w| w.document()) {
            Some(doc) => doc,
            None => return,
        };
        if document.ready_state() != "loading" {
            mount_page();
            return;
        }
        let closure = Closure::once(mount_page);
        if document
            .add_event_listener_with_callback("DOMContentLoaded", closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("could not wait for DOMContentLoaded, mounting now");
            mount_page();
            return;
        }
        closure.forget();
    }

    /// Stops timers, watchers and listeners started by `start`.
    #[wasm_bindgen]
    pub fn teardown() {
        PAGE_HANDLES.with(|registry| registry.borrow_mut().stop_all());
        log::info!("page enhancements stopped");
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{start, teardown};
