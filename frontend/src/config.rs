use log::Level;

// Element ids and class names the page markup provides.
pub const CURTAIN_ID: &str = "curtain";
pub const CURSOR_ID: &str = "cursor";
pub const HEADER_ID: &str = "header";
pub const MOBILE_MENU_ID: &str = "mobileMenu";
pub const MENU_TOGGLE_ID: &str = "menuToggle";
pub const CONTACT_FORM_ID: &str = "contactForm";

pub const INTERACTIVE_SELECTORS: &str =
    "a, button, .project-card, .skill-item, .cert-item, .form-input, .form-submit, .social-link";
pub const REVEAL_SELECTORS: &str =
    ".project-card, .skill-category, .cert-item, .credential-main, .contact-block";
pub const SKILL_ITEM_SELECTOR: &str = ".skill-item";
pub const MOBILE_NAV_LINK_SELECTOR: &str = ".mobile-nav-link";
pub const NAV_LINK_SELECTORS: &str = ".nav-link, .mobile-nav-link";
pub const SECTION_SELECTOR: &str = "section[id]";
pub const HERO_SELECTOR: &str = ".hero";
pub const HERO_IMAGE_SELECTOR: &str = ".hero-image";
pub const FORM_INPUT_SELECTOR: &str = ".form-input";
pub const FORM_SUBMIT_SELECTOR: &str = ".form-submit";
pub const ERROR_MESSAGE_CLASS: &str = "error-message";

pub const ACTIVE_CLASS: &str = "active";
pub const HOVER_CLASS: &str = "hover";
pub const HIDDEN_CLASS: &str = "hidden";
pub const REVEALED_CLASS: &str = "fade-in-up";

pub const VISITED_KEY: &str = "visited";

pub const ACCENT_COLOR: &str = "var(--industrial-orange)";
pub const BASE_COLOR: &str = "var(--jet-black)";
pub const SUCCESS_COLOR: &str = "#22c55e";

/// Tunables for every controller. The defaults are what the page ships with.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteConfig {
    pub curtain_reveal_ms: u32,
    pub curtain_remove_ms: u32,
    pub skill_hover_offset_px: u32,
    pub reveal_threshold: f64,
    pub reveal_root_margin: &'static str,
    pub parallax_factor: f64,
    pub header_accent_after_px: f64,
    pub nav_lookahead_px: f64,
    pub submit_sending_ms: u32,
    pub submit_sent_ms: u32,
    /// `None` runs scroll and pointer handlers at native event cadence.
    pub throttle_ms: Option<u32>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            curtain_reveal_ms: 1000,
            curtain_remove_ms: 600,
            skill_hover_offset_px: 10,
            reveal_threshold: 0.1,
            reveal_root_margin: "0px 0px -50px 0px",
            parallax_factor: 0.2,
            header_accent_after_px: 100.0,
            nav_lookahead_px: 100.0,
            submit_sending_ms: 1500,
            submit_sent_ms: 2000,
            throttle_ms: Some(16),
        }
    }
}

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose console output when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}
