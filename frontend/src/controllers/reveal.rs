use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

use log::{debug, error};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Event, HtmlElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use crate::config::{self, SiteConfig};
use crate::dom;
use crate::throttle::throttled;

const REVEAL_KEY_ATTR: &str = "data-reveal-key";

/// Elements that have already played their reveal.
#[derive(Debug)]
pub struct RevealSet<K> {
    revealed: HashSet<K>,
}

impl<K: Eq + Hash> RevealSet<K> {
    pub fn new() -> Self {
        Self {
            revealed: HashSet::new(),
        }
    }

    /// True exactly once per key, on its first visible intersection.
    pub fn should_reveal(&mut self, key: K, is_intersecting: bool) -> bool {
        is_intersecting && self.revealed.insert(key)
    }
}

/// Hero image offset for the current scroll, or `None` once the hero has
/// scrolled out and the image should stay put.
pub fn parallax_offset(scroll_y: f64, hero_height: f64, factor: f64) -> Option<f64> {
    (scroll_y < hero_height).then(|| scroll_y * factor)
}

pub fn header_border_color(scroll_y: f64, threshold: f64) -> &'static str {
    if scroll_y > threshold {
        config::ACCENT_COLOR
    } else {
        config::BASE_COLOR
    }
}

pub fn init(cfg: &SiteConfig) -> Result<(), JsValue> {
    observe_reveals(cfg)?;
    init_parallax(cfg)?;
    init_header_scroll(cfg)
}

fn observe_reveals(cfg: &SiteConfig) -> Result<(), JsValue> {
    let targets = dom::query_all(config::REVEAL_SELECTORS)?;
    if targets.is_empty() {
        return Ok(());
    }

    let revealed = Rc::new(RefCell::new(RevealSet::<usize>::new()));
    let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let target = entry.target();
            let Some(key) = target
                .get_attribute(REVEAL_KEY_ATTR)
                .and_then(|k| k.parse::<usize>().ok())
            else {
                continue;
            };
            if !revealed.borrow_mut().should_reveal(key, entry.is_intersecting()) {
                continue;
            }
            if let Err(e) = target.class_list().add_1(config::REVEALED_CLASS) {
                error!("failed to reveal element {}: {:?}", key, e);
            }
            observer.unobserve(&target);
        }
    }) as Box<dyn FnMut(Array, IntersectionObserver)>);

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(cfg.reveal_threshold));
    options.set_root_margin(cfg.reveal_root_margin);
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    callback.forget();

    for (key, el) in targets.iter().enumerate() {
        el.set_attribute(REVEAL_KEY_ATTR, &key.to_string())?;
        // Hidden up front so nothing flashes before the first intersection.
        dom::set_style(el, "opacity", "0")?;
        observer.observe(el);
    }
    debug!("observing {} reveal targets", targets.len());
    Ok(())
}

fn init_parallax(cfg: &SiteConfig) -> Result<(), JsValue> {
    let (Some(image), Some(hero)) = (
        dom::query(config::HERO_IMAGE_SELECTOR)?,
        dom::query(config::HERO_SELECTOR)?,
    ) else {
        return Ok(());
    };
    let factor = cfg.parallax_factor;
    let mut on_scroll = throttled(cfg.throttle_ms, move || {
        apply_parallax(&image, &hero, factor);
    });
    let window = dom::browser_window()?;
    dom::listen(&window, "scroll", move |_: Event| on_scroll())
}

fn apply_parallax(image: &HtmlElement, hero: &HtmlElement, factor: f64) {
    let hero_height = f64::from(hero.offset_height());
    if let Some(offset) = parallax_offset(dom::scroll_y(), hero_height, factor) {
        let transform = format!("translateY({}px)", offset);
        if let Err(e) = dom::set_style(image, "transform", &transform) {
            error!("failed to move hero image: {:?}", e);
        }
    }
}

fn init_header_scroll(cfg: &SiteConfig) -> Result<(), JsValue> {
    let Some(header) = dom::by_id(config::HEADER_ID)? else {
        return Ok(());
    };
    let threshold = cfg.header_accent_after_px;
    let mut on_scroll = throttled(cfg.throttle_ms, move || {
        let color = header_border_color(dom::scroll_y(), threshold);
        if let Err(e) = dom::set_style(&header, "border-bottom-color", color) {
            error!("failed to recolor header: {:?}", e);
        }
    });
    let window = dom::browser_window()?;
    dom::listen(&window, "scroll", move |_: Event| on_scroll())
}
