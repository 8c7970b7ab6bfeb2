use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::{Event, HtmlElement, MouseEvent};

use crate::config::{self, SiteConfig};
use crate::dom;
use crate::throttle::throttled;

#[derive(Clone, Debug, PartialEq)]
pub struct SectionBounds {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    fn contains(&self, position: f64) -> bool {
        position >= self.top && position < self.top + self.height
    }
}

/// The section holding `scroll_y + lookahead`. Overlaps resolve to the
/// later section in document order.
pub fn current_section(sections: &[SectionBounds], scroll_y: f64, lookahead: f64) -> Option<&str> {
    let position = scroll_y + lookahead;
    sections
        .iter()
        .rev()
        .find(|s| s.contains(position))
        .map(|s| s.id.as_str())
}

/// Section id for an in-page link like `#projects`; anything else is left to
/// the browser.
pub fn internal_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub fn scroll_target(section_top: f64, header_height: f64) -> f64 {
    section_top - header_height
}

fn links_matching(href: Option<&str>, section_id: &str) -> bool {
    href.and_then(internal_target) == Some(section_id)
}

pub fn init(cfg: &SiteConfig) -> Result<(), JsValue> {
    let links = Rc::new(dom::query_all(config::NAV_LINK_SELECTORS)?);
    let sections = Rc::new(dom::query_all(config::SECTION_SELECTOR)?);

    for link in links.iter() {
        let target = link.clone();
        dom::listen(link, "click", move |e: MouseEvent| {
            let Some(href) = target.get_attribute("href") else {
                return;
            };
            let Some(id) = internal_target(&href) else {
                return;
            };
            e.prevent_default();
            if let Err(err) = jump_to(id) {
                log::error!("failed to jump to #{}: {:?}", id, err);
            }
        })?;
    }

    let lookahead = cfg.nav_lookahead_px;
    let mut on_scroll = throttled(cfg.throttle_ms, move || {
        highlight_current(&links, &sections, lookahead);
    });
    let window = dom::browser_window()?;
    dom::listen(&window, "scroll", move |_: Event| on_scroll())
}

fn jump_to(id: &str) -> Result<(), JsValue> {
    let Some(section) = dom::by_id(id)? else {
        return Ok(());
    };
    let header_height = dom::by_id(config::HEADER_ID)?
        .map(|h| f64::from(h.offset_height()))
        .unwrap_or(0.0);
    let window = dom::browser_window()?;
    window.scroll_to_with_x_and_y(
        window.scroll_x()?,
        scroll_target(f64::from(section.offset_top()), header_height),
    );
    Ok(())
}

fn highlight_current(links: &[HtmlElement], sections: &[HtmlElement], lookahead: f64) {
    let bounds: Vec<SectionBounds> = sections
        .iter()
        .map(|s| SectionBounds {
            id: s.id(),
            top: f64::from(s.offset_top()),
            height: f64::from(s.offset_height()),
        })
        .collect();
    let Some(current) = current_section(&bounds, dom::scroll_y(), lookahead) else {
        return;
    };
    for link in links {
        let active = links_matching(link.get_attribute("href").as_deref(), current);
        if let Err(e) = link
            .class_list()
            .toggle_with_force(config::ACTIVE_CLASS, active)
        {
            log::error!("failed to mark active link: {:?}", e);
        }
    }
}
