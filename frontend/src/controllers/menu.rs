use std::cell::Cell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsValue;
use web_sys::{HtmlElement, KeyboardEvent, MouseEvent};

use crate::config;
use crate::dom;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MenuState {
    Closed,
    Open,
}

impl MenuState {
    pub fn toggled(self) -> Self {
        match self {
            MenuState::Closed => MenuState::Open,
            MenuState::Open => MenuState::Closed,
        }
    }

    /// Escape only closes; it never opens the panel.
    pub fn on_key(self, key: &str) -> Self {
        match (self, key) {
            (MenuState::Open, "Escape") => MenuState::Closed,
            _ => self,
        }
    }

    pub fn is_open(self) -> bool {
        self == MenuState::Open
    }

    /// Value for `body.style.overflow`: scrolling is locked while open.
    pub fn body_overflow(self) -> &'static str {
        if self.is_open() {
            "hidden"
        } else {
            ""
        }
    }
}

struct MobileMenu {
    panel: HtmlElement,
    toggle: HtmlElement,
    body: HtmlElement,
    state: Cell<MenuState>,
}

impl MobileMenu {
    fn set(&self, next: MenuState) {
        self.state.set(next);
        if let Err(e) = self.render() {
            log::error!("mobile menu update failed: {:?}", e);
        }
    }

    fn render(&self) -> Result<(), JsValue> {
        let open = self.state.get().is_open();
        for el in [&self.toggle, &self.panel] {
            el.class_list()
                .toggle_with_force(config::ACTIVE_CLASS, open)?;
        }
        dom::set_style(&self.body, "overflow", self.state.get().body_overflow())
    }
}

pub fn init() -> Result<(), JsValue> {
    let (Some(panel), Some(toggle)) = (
        dom::by_id(config::MOBILE_MENU_ID)?,
        dom::by_id(config::MENU_TOGGLE_ID)?,
    ) else {
        debug!("mobile menu markup missing, skipping");
        return Ok(());
    };
    let links = dom::query_all_in(&panel, config::MOBILE_NAV_LINK_SELECTOR)?;

    let menu = Rc::new(MobileMenu {
        panel,
        toggle,
        body: dom::body()?,
        state: Cell::new(MenuState::Closed),
    });

    {
        let menu = menu.clone();
        let toggle = menu.toggle.clone();
        dom::listen(&toggle, "click", move |_: MouseEvent| {
            menu.set(menu.state.get().toggled())
        })?;
    }

    for link in links {
        let menu = menu.clone();
        dom::listen(&link, "click", move |_: MouseEvent| menu.set(MenuState::Closed))?;
    }

    let document = dom::document()?;
    dom::listen(&document, "keydown", move |e: KeyboardEvent| {
        let current = menu.state.get();
        let next = current.on_key(&e.key());
        if next != current {
            menu.set(next);
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_states() {
        let s = MenuState::Closed.toggled();
        assert_eq!(s, MenuState::Open);
        assert_eq!(s.toggled(), MenuState::Closed);
    }

    #[test]
    fn escape_closes_only_when_open() {
        assert_eq!(MenuState::Open.on_key("Escape"), MenuState::Closed);
        assert_eq!(MenuState::Closed.on_key("Escape"), MenuState::Closed);
        assert_eq!(MenuState::Open.on_key("Enter"), MenuState::Open);
    }

    #[test]
    fn scroll_lock_tracks_open_state() {
        assert_eq!(MenuState::Open.body_overflow(), "hidden");
        assert_eq!(MenuState::Closed.body_overflow(), "");
    }
}
