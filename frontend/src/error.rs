use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("No window object")]
    NoWindow,
    #[error("No document attached to window")]
    NoDocument,
    #[error("No localStorage")]
    StorageUnavailable,
    #[error("Failed to write `{key}` to localStorage")]
    StorageWrite { key: String },
    #[error("Invalid selector `{0}`")]
    Selector(String),
    #[error("Invalid page config: {0}")]
    Config(String),
    #[error("Browser call failed: {0}")]
    Js(String),
}

impl PageError {
    #[cfg(target_arch = "wasm32")]
    pub fn from_js(value: &wasm_bindgen::JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(value, &"message".into())
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{:?}", value));
        PageError::Js(message)
    }
}

impl From<serde_json::Error> for PageError {
    fn from(error: serde_json::Error) -> Self {
        PageError::Config(error.to_string())
    }
}

pub type PageResult<T> = Result<T, PageError>;
