use log::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

mod config;
mod dom;
mod session;
mod throttle;

mod controllers {
    pub mod curtain;
    pub mod cursor;
    pub mod menu;
    pub mod navigation;
    pub mod reveal;
    pub mod skills;
}
mod form {
    pub mod contact;
    pub mod submit;
    pub mod validation;
}

use config::SiteConfig;
use controllers::{curtain, cursor, menu, navigation, reveal, skills};
use session::BrowserSession;

fn run(name: &str, init: impl FnOnce() -> Result<(), JsValue>) {
    // A failed controller is logged; the rest still initialize.
    if let Err(e) = init() {
        error!("{} failed to initialize: {:?}", name, e);
    }
}

fn start() {
    let cfg = SiteConfig::default();
    let session = BrowserSession::open();

    run("curtain", || curtain::init(&session, &cfg));
    run("cursor", || cursor::init(&cfg));
    run("mobile menu", menu::init);
    run("scroll reveal", || reveal::init(&cfg));
    run("contact form", || form::contact::init(&cfg));
    run("navigation", || navigation::init(&cfg));
    run("skill items", || skills::init(&cfg));

    info!("page behaviors ready");
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    let Ok(document) = dom::document() else {
        error!("no document to attach to");
        return;
    };

    if document.ready_state() != "loading" {
        start();
        return;
    }

    let on_ready = Closure::once_into_js(start);
    if let Err(e) =
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
    {
        error!("failed to wait for DOMContentLoaded: {:?}", e);
    }
}
