use web_sys::{Storage, Window};

use crate::error::{PageError, PageResult};

pub fn window() -> PageResult<Window> {
    web_sys::window().ok_or(PageError::NoWindow)
}

pub fn local_storage() -> PageResult<Storage> {
    window()?
        .local_storage()
        .map_err(|_| PageError::StorageUnavailable)?
        .ok_or(PageError::StorageUnavailable)
}

pub fn read(key: &str) -> PageResult<Option<String>> {
    local_storage()?
        .get_item(key)
        .map_err(|e| PageError::from_js(&e))
}

pub fn write(key: &str, value: &str) -> PageResult<()> {
    local_storage()?
        .set_item(key, value)
        .map_err(|_| PageError::StorageWrite { key: key.into() })
}
