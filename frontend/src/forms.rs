//! Submit feedback: the submit control is disabled and shows a spinner
//! while the browser navigates away. Nothing re-enables it.

use std::rc::Rc;

use crate::config::FormConfig;
use crate::dom::{DomEvent, EventPort, Label, RenderPort};
use crate::lifecycle::Handle;
use crate::messages::{Messages, SPINNER_ICON};

pub struct SubmitFeedback<R> {
    port: Rc<R>,
    config: FormConfig,
    label: Label,
}

impl<R> SubmitFeedback<R>
where
    R: RenderPort + 'static,
{
    pub fn new(port: Rc<R>, config: FormConfig, messages: &Messages) -> Self {
        Self {
            port,
            config,
            label: Label::text(messages.processing.clone()).with_icon(SPINNER_ICON),
        }
    }

    /// Returns false when the form has no submit control.
    pub fn handle_submit(&self, form: &R::Node) -> bool {
        let Some(control) = self.port.find_within(form, &self.config.submit_selector) else {
            return false;
        };
        self.port.set_label(&control, &self.label);
        self.port.set_disabled(&control, true);
        true
    }

    pub fn start<E>(self: Rc<Self>, events: &E) -> Vec<Handle>
    where
        E: EventPort<Node = R::Node>,
    {
        self.port
            .find_all(&self.config.form_selector)
            .into_iter()
            .map(|form| {
                let feedback = self.clone();
                let target = form.clone();
                events.on(
                    &form,
                    DomEvent::Submit,
                    Box::new(move || {
                        feedback.handle_submit(&target);
                    }),
                )
            })
            .collect()
    }
}
