use wasm_bindgen::JsValue;
use web_sys::{HtmlElement, MouseEvent};

use crate::config::{self, SiteConfig};
use crate::dom;

pub fn hover_transform(hovered: bool, offset_px: u32) -> String {
    if hovered {
        format!("translateX({}px)", offset_px)
    } else {
        "translateX(0)".to_string()
    }
}

fn shift(el: &HtmlElement, hovered: bool, offset_px: u32) {
    if let Err(e) = dom::set_style(el, "transform", &hover_transform(hovered, offset_px)) {
        log::error!("failed to offset skill item: {:?}", e);
    }
}

pub fn init(cfg: &SiteConfig) -> Result<(), JsValue> {
    let offset = cfg.skill_hover_offset_px;
    for item in dom::query_all(config::SKILL_ITEM_SELECTOR)? {
        let el = item.clone();
        dom::listen(&item, "mouseenter", move |_: MouseEvent| {
            shift(&el, true, offset);
        })?;
        let el = item.clone();
        dom::listen(&item, "mouseleave", move |_: MouseEvent| {
            shift(&el, false, offset);
        })?;
    }
    Ok(())
}
