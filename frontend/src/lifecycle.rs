//! Ownership of running page resources (timers, watchers, listeners).
//!
//! A [`Handle`] owns the teardown of exactly one resource. Stopping is
//! idempotent and dropping a handle stops it, so anything that must run for
//! the whole page lifetime has to be kept in a [`HandleSet`].

pub struct Handle {
    label: &'static str,
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Handle {
    pub fn new(label: &'static str, teardown: impl FnOnce() + 'static) -> Self {
        Self {
            label,
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A handle with nothing to release, e.g. when the target element is missing.
    pub fn inert(label: &'static str) -> Self {
        Self {
            label,
            teardown: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            log::debug!("stopping {}", self.label);
            teardown();
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("label", &self.label)
            .field("active", &self.is_active())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct HandleSet {
    handles: Vec<Handle>,
}

impl HandleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: Handle) {
        self.handles.push(handle);
    }

    pub fn extend(&mut self, handles: impl IntoIterator<Item = Handle>) {
        self.handles.extend(handles);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_active()).count()
    }

    pub fn stop_all(&mut self) {
        for handle in self.handles.iter_mut() {
            handle.stop();
        }
        self.handles.clear();
    }
}

/// Recurring wall-clock timer.
pub trait Scheduler {
    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Handle;
}
