use std::rc::Rc;
use std::str::FromStr;

use crate::config::ThemeConfig;
use crate::dom::{DomEvent, EventPort, RenderPort};
use crate::error::PageResult;
use crate::lifecycle::Handle;
use crate::messages::{Messages, MOON_ICON, SUN_ICON};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Interprets a raw stored value; anything unrecognised counts as unset.
    pub fn from_stored(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(_) => {
                log::warn!("ignoring stored theme {:?}", raw);
                None
            }
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme `{}`", other)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted theme preference.
pub trait PreferenceStore {
    fn get(&self) -> PageResult<Option<Theme>>;
    fn set(&self, theme: Theme) -> PageResult<()>;
}

pub struct ThemeController<S, R> {
    store: S,
    port: Rc<R>,
    config: ThemeConfig,
    messages: Messages,
}

impl<S, R> ThemeController<S, R>
where
    S: PreferenceStore + 'static,
    R: RenderPort + 'static,
{
    pub fn new(store: S, port: Rc<R>, config: ThemeConfig, messages: Messages) -> Self {
        Self {
            store,
            port,
            config,
            messages,
        }
    }

    /// Stored preference, or the default when nothing usable is stored.
    pub fn current(&self) -> Theme {
        match self.store.get() {
            Ok(Some(theme)) => theme,
            Ok(None) => self.default_theme(),
            Err(err) => {
                log::warn!("{}; using default theme", err);
                self.default_theme()
            }
        }
    }

    fn default_theme(&self) -> Theme {
        if self.config.follow_system && self.port.prefers_dark_scheme() {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn apply_theme(&self, theme: Theme) {
        self.port
            .set_root_class(&self.config.dark_class, theme == Theme::Dark);
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.current().toggled();
        if let Err(err) = self.store.set(next) {
            // Still switch for this page view.
            log::warn!("{}", err);
        }
        self.apply_theme(next);
        self.update_button(next);
        log::debug!("theme switched to {}", next);
        next
    }

    /// Shows the action the button will take next. Returns false when the
    /// button is not on the page.
    pub fn update_button(&self, theme: Theme) -> bool {
        let Some(button) = self.port.find_by_id(&self.config.button_id) else {
            return false;
        };
        let (icon, title) = match theme {
            Theme::Dark => (SUN_ICON, &self.messages.switch_to_light),
            Theme::Light => (MOON_ICON, &self.messages.switch_to_dark),
        };
        self.port.set_icon(&button, icon);
        self.port.set_title(&button, title);
        true
    }

    pub fn init<E>(self: Rc<Self>, events: &E) -> Handle
    where
        E: EventPort<Node = R::Node>,
    {
        let theme = self.current();
        self.apply_theme(theme);
        self.update_button(theme);

        let Some(button) = self.port.find_by_id(&self.config.button_id) else {
            return Handle::inert("theme-toggle");
        };
        let controller = self.clone();
        events.on(
            &button,
            DomEvent::Click,
            Box::new(move || {
                controller.toggle_theme();
            }),
        )
    }
}
