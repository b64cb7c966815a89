use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{PageError, PageResult};
use crate::utils::time::{self, ClockZone};

pub const CONFIG_GLOBAL: &str = "__PAGEKIT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub locale: String,
    pub reveal: RevealConfig,
    pub forms: FormConfig,
    pub clock: ClockConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub selector: String,
    pub threshold: f64,
    pub offset_px: u32,
    pub transition: String,
    /// Stop observing an element once it has been revealed.
    pub once: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub form_selector: String,
    pub submit_selector: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub selector: String,
    /// IANA zone name; unset renders in the browser's local time.
    pub time_zone: Option<String>,
    pub format: String,
    pub interval_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub storage_key: String,
    pub button_id: String,
    pub dark_class: String,
    /// Use `prefers-color-scheme` when nothing has been stored yet.
    pub follow_system: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            locale: "ja".into(),
            reveal: RevealConfig::default(),
            forms: FormConfig::default(),
            clock: ClockConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: ".fade-in-up".into(),
            threshold: 0.0,
            offset_px: 30,
            transition: "all 0.6s ease-out".into(),
            once: false,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form_selector: "form".into(),
            submit_selector: r#"button[type="submit"], input[type="submit"]"#.into(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            selector: ".current-time".into(),
            time_zone: None,
            format: "%H:%M:%S".into(),
            interval_ms: 1000,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "booking_theme".into(),
            button_id: "themeToggle".into(),
            dark_class: "theme-dark".into(),
            follow_system: false,
        }
    }
}

impl ClockConfig {
    pub fn zone(&self) -> ClockZone {
        let Some(name) = self.time_zone.as_deref() else {
            return ClockZone::Local;
        };
        match name.parse::<Tz>() {
            Ok(tz) => ClockZone::Named(tz),
            Err(_) => {
                log::warn!("unknown time zone {}, using local time", name);
                ClockZone::Local
            }
        }
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> PageResult<Self> {
        let config: PageConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PageResult<()> {
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(PageError::Config(format!(
                "reveal.threshold must be within 0..=1, got {}",
                self.reveal.threshold
            )));
        }
        if self.clock.interval_ms == 0 {
            return Err(PageError::Config("clock.interval_ms must be positive".into()));
        }
        if !time::is_valid_format(&self.clock.format) {
            return Err(PageError::Config(format!(
                "clock.format `{}` is not a valid strftime pattern",
                self.clock.format
            )));
        }
        let selectors = [
            &self.reveal.selector,
            &self.forms.form_selector,
            &self.forms.submit_selector,
            &self.clock.selector,
        ];
        if let Some(empty) = selectors.iter().find(|s| s.trim().is_empty()) {
            return Err(PageError::Selector((*empty).clone()));
        }
        if self.theme.storage_key.is_empty() || self.theme.button_id.is_empty() {
            return Err(PageError::Config("theme keys must not be empty".into()));
        }
        Ok(())
    }

    /// Parses `raw` and falls back to defaults on any problem.
    pub fn from_json_or_default(raw: Option<&str>) -> Self {
        match raw.map(Self::from_json) {
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                log::warn!("{}; using defaults", err);
                Self::default()
            }
            None => Self::default(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn snapshot_from_global() -> Option<String> {
    // Optional global object: window.__PAGEKIT_CONFIG = { locale: "en", clock: { ... } }
    let w = web_sys::window()?;
    let any = js_sys::Reflect::get(&w, &CONFIG_GLOBAL.into()).ok()?;
    if any.is_undefined() || any.is_null() {
        return None;
    }
    js_sys::JSON::stringify(&any).ok()?.as_string()
}

#[cfg(target_arch = "wasm32")]
pub fn load() -> PageConfig {
    let raw = snapshot_from_global();
    PageConfig::from_json_or_default(raw.as_deref())
}
