use rust_i18n::t;

const BUNDLED_LOCALES: &[&str] = &["ja", "en"];

pub const SPINNER_ICON: &str = r#"<i class="fas fa-spinner fa-spin me-2"></i>"#;
pub const SUN_ICON: &str = r#"<i class="fas fa-sun"></i>"#;
pub const MOON_ICON: &str = r#"<i class="fas fa-moon"></i>"#;

/// UI strings resolved once for the configured locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub processing: String,
    pub switch_to_light: String,
    pub switch_to_dark: String,
}

impl Messages {
    pub fn for_locale(locale: &str) -> Self {
        let locale = if BUNDLED_LOCALES.contains(&locale) {
            locale
        } else {
            log::warn!("locale {} is not bundled, using ja", locale);
            "ja"
        };
        Self {
            processing: t!("forms.processing", locale = locale).to_string(),
            switch_to_light: t!("theme.switch_to_light", locale = locale).to_string(),
            switch_to_dark: t!("theme.switch_to_dark", locale = locale).to_string(),
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::for_locale("ja")
    }
}
