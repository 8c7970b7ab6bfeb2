use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Element, Event, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement,
};

use crate::config::{self, SiteConfig};
use crate::dom;
use crate::form::submit::{run_submission, SubmitMachine, SubmitTimings, SubmitView};
use crate::form::validation::{validate, FieldError, FieldKind, FieldSnapshot};

const ERROR_STYLE: &str = "font-family: var(--font-mono); font-size: 0.65rem; \
                           color: var(--industrial-orange); margin-top: 5px;";

fn field_value(field: &HtmlElement) -> String {
    if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(area) = field.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

fn snapshot(field: &HtmlElement) -> FieldSnapshot {
    FieldSnapshot {
        required: field.has_attribute("required"),
        kind: FieldKind::from_type_attr(field.get_attribute("type").as_deref()),
        value: field_value(field),
    }
}

/// A field together with the message slot its container may hold.
trait ErrorHost {
    type Slot;

    fn mark(&self, invalid: bool) -> Result<(), JsValue>;
    fn find_slot(&self) -> Result<Option<Self::Slot>, JsValue>;
    /// `None` when the field has nowhere to put a message.
    fn create_slot(&self) -> Result<Option<Self::Slot>, JsValue>;
    fn write_slot(&self, slot: &Self::Slot, message: &str);
    fn remove_slot(&self, slot: Self::Slot);
}

impl ErrorHost for HtmlElement {
    type Slot = Element;

    fn mark(&self, invalid: bool) -> Result<(), JsValue> {
        let color = if invalid {
            config::ACCENT_COLOR
        } else {
            config::BASE_COLOR
        };
        dom::set_style(self, "border-color", color)
    }

    fn find_slot(&self) -> Result<Option<Element>, JsValue> {
        let Some(parent) = self.parent_element() else {
            return Ok(None);
        };
        parent.query_selector(&format!(".{}", config::ERROR_MESSAGE_CLASS))
    }

    fn create_slot(&self) -> Result<Option<Element>, JsValue> {
        let Some(parent) = self.parent_element() else {
            return Ok(None);
        };
        let span = dom::document()?.create_element("span")?;
        span.set_class_name(config::ERROR_MESSAGE_CLASS);
        span.set_attribute("style", ERROR_STYLE)?;
        parent.append_child(&span)?;
        Ok(Some(span))
    }

    fn write_slot(&self, slot: &Element, message: &str) {
        slot.set_text_content(Some(message));
    }

    fn remove_slot(&self, slot: Element) {
        slot.remove();
    }
}

/// Reuses the field's slot when it has one, so a field never shows two
/// messages.
fn show_error<H: ErrorHost>(field: &H, error: FieldError) -> Result<(), JsValue> {
    field.mark(true)?;
    let slot = match field.find_slot()? {
        Some(existing) => Some(existing),
        None => field.create_slot()?,
    };
    if let Some(slot) = slot {
        field.write_slot(&slot, &error.to_string());
    }
    Ok(())
}

/// Safe to call repeatedly; a field with no error is left as is apart from
/// its border.
fn clear_error<H: ErrorHost>(field: &H) -> Result<(), JsValue> {
    field.mark(false)?;
    if let Some(slot) = field.find_slot()? {
        field.remove_slot(slot);
    }
    Ok(())
}

fn check_field(field: &HtmlElement) -> bool {
    match validate(&snapshot(field)) {
        Ok(()) => true,
        Err(error) => {
            if let Err(e) = show_error(field, error) {
                log::error!("failed to show field error: {:?}", e);
            }
            false
        }
    }
}

struct ContactForm {
    form: HtmlFormElement,
    fields: Vec<HtmlElement>,
    submit: Option<HtmlElement>,
}

impl SubmitView for ContactForm {
    fn validate_all(&self) -> bool {
        // Every field is checked so each one shows its own error.
        self.fields
            .iter()
            .fold(true, |all_valid, field| check_field(field) && all_valid)
    }

    fn label(&self) -> String {
        self.submit
            .as_ref()
            .and_then(|b| b.text_content())
            .unwrap_or_default()
    }

    fn set_label(&self, label: &str) {
        if let Some(button) = &self.submit {
            button.set_text_content(Some(label));
        }
    }

    fn set_disabled(&self, disabled: bool) {
        let Some(button) = &self.submit else {
            return;
        };
        if let Some(button) = button.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
        } else if let Some(input) = button.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
        }
    }

    fn set_background(&self, color: Option<&'static str>) {
        if let Some(button) = &self.submit {
            if let Err(e) = dom::set_style(button, "background-color", color.unwrap_or("")) {
                log::error!("failed to color submit control: {:?}", e);
            }
        }
    }

    fn reset_fields(&self) {
        self.form.reset();
    }
}

pub fn init(cfg: &SiteConfig) -> Result<(), JsValue> {
    let Some(form) = dom::document()?
        .get_element_by_id(config::CONTACT_FORM_ID)
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        debug!("no #{} on page, skipping form", config::CONTACT_FORM_ID);
        return Ok(());
    };

    let fields = dom::query_all_in(&form, config::FORM_INPUT_SELECTOR)?;
    for field in &fields {
        let f = field.clone();
        dom::listen(field, "blur", move |_: Event| {
            check_field(&f);
        })?;
        let f = field.clone();
        dom::listen(field, "input", move |_: Event| {
            if let Err(e) = clear_error(&f) {
                log::error!("failed to clear field error: {:?}", e);
            }
        })?;
    }

    let submit = form
        .query_selector(config::FORM_SUBMIT_SELECTOR)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let view = Rc::new(ContactForm {
        form: form.clone(),
        fields,
        submit,
    });
    let machine = Rc::new(RefCell::new(SubmitMachine::new()));
    let timings = SubmitTimings {
        sending_ms: cfg.submit_sending_ms,
        sent_ms: cfg.submit_sent_ms,
        success_color: config::SUCCESS_COLOR,
    };

    dom::listen(&form, "submit", move |e: Event| {
        e.prevent_default();
        let view = view.clone();
        let machine = machine.clone();
        spawn_local(async move {
            let outcome =
                run_submission(&machine, view.as_ref(), timings, TimeoutFuture::new).await;
            match outcome {
                Ok(outcome) => debug!("submission finished: {:?}", outcome),
                Err(e) if e.is_reentry() => {}
                Err(e) => log::error!("submission aborted: {}", e),
            }
        });
    })
}
