use std::cell::Cell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsValue;
use web_sys::{HtmlElement, MouseEvent};

use crate::config::{self, SiteConfig};
use crate::dom;
use crate::throttle::throttled;

/// What the custom marker should look like right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerState {
    pub visible: bool,
    pub hovering: bool,
}

impl MarkerState {
    pub fn new() -> Self {
        Self {
            visible: true,
            hovering: false,
        }
    }

    pub fn enter_interactive(self) -> Self {
        Self {
            hovering: true,
            ..self
        }
    }

    pub fn leave_interactive(self) -> Self {
        Self {
            hovering: false,
            ..self
        }
    }

    pub fn leave_document(self) -> Self {
        Self {
            visible: false,
            ..self
        }
    }

    pub fn enter_document(self) -> Self {
        Self {
            visible: true,
            ..self
        }
    }

    pub fn opacity(&self) -> &'static str {
        if self.visible {
            "1"
        } else {
            "0"
        }
    }
}

fn apply(marker: &HtmlElement, prev: MarkerState, next: MarkerState) -> Result<(), JsValue> {
    if prev.hovering != next.hovering {
        if next.hovering {
            marker.class_list().add_1(config::HOVER_CLASS)?;
        } else {
            marker.class_list().remove_1(config::HOVER_CLASS)?;
        }
    }
    if prev.visible != next.visible {
        dom::set_style(marker, "opacity", next.opacity())?;
    }
    Ok(())
}

fn transition(
    marker: &HtmlElement,
    state: &Cell<MarkerState>,
    step: fn(MarkerState) -> MarkerState,
) {
    let prev = state.get();
    let next = step(prev);
    state.set(next);
    if let Err(e) = apply(marker, prev, next) {
        log::error!("cursor update failed: {:?}", e);
    }
}

pub fn init(cfg: &SiteConfig) -> Result<(), JsValue> {
    let Some(marker) = dom::by_id(config::CURSOR_ID)? else {
        debug!("no #{} on page, keeping native cursor", config::CURSOR_ID);
        return Ok(());
    };
    let document = dom::document()?;
    dom::set_style(&dom::body()?, "cursor", "none")?;

    let state = Rc::new(Cell::new(MarkerState::new()));
    let pointer = Rc::new(Cell::new((0, 0)));

    {
        let marker = marker.clone();
        let pointer_reader = pointer.clone();
        let mut reposition = throttled(cfg.throttle_ms, move || {
            let (x, y) = pointer_reader.get();
            let placed = dom::set_style(&marker, "left", &format!("{}px", x))
                .and_then(|()| dom::set_style(&marker, "top", &format!("{}px", y)));
            if let Err(e) = placed {
                log::error!("failed to move cursor marker: {:?}", e);
            }
        });
        dom::listen(&document, "mousemove", move |e: MouseEvent| {
            pointer.set((e.client_x(), e.client_y()));
            reposition();
        })?;
    }

    for el in dom::query_all(config::INTERACTIVE_SELECTORS)? {
        let (m, s) = (marker.clone(), state.clone());
        dom::listen(&el, "mouseenter", move |_: MouseEvent| {
            transition(&m, &s, MarkerState::enter_interactive)
        })?;
        let (m, s) = (marker.clone(), state.clone());
        dom::listen(&el, "mouseleave", move |_: MouseEvent| {
            transition(&m, &s, MarkerState::leave_interactive)
        })?;
    }

    let (m, s) = (marker.clone(), state.clone());
    dom::listen(&document, "mouseleave", move |_: MouseEvent| {
        transition(&m, &s, MarkerState::leave_document)
    })?;
    dom::listen(&document, "mouseenter", move |_: MouseEvent| {
        transition(&marker, &state, MarkerState::enter_document)
    })?;

    Ok(())
}
