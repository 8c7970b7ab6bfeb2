use gloo_timers::callback::Timeout;
use log::debug;
use wasm_bindgen::JsValue;

use crate::config::{self, SiteConfig};
use crate::dom;
use crate::session::SessionFlags;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CurtainPlan {
    Animate {
        reveal_after_ms: u32,
        remove_after_ms: u32,
    },
    SkipImmediately,
}

impl CurtainPlan {
    /// Decides whether this load plays the curtain, marking the session
    /// visited the first time.
    pub fn for_session(session: &dyn SessionFlags, cfg: &SiteConfig) -> Self {
        if session.is_set(config::VISITED_KEY) {
            return CurtainPlan::SkipImmediately;
        }
        session.set(config::VISITED_KEY);
        CurtainPlan::Animate {
            reveal_after_ms: cfg.curtain_reveal_ms,
            remove_after_ms: cfg.curtain_remove_ms,
        }
    }
}

pub fn init(session: &dyn SessionFlags, cfg: &SiteConfig) -> Result<(), JsValue> {
    let Some(curtain) = dom::by_id(config::CURTAIN_ID)? else {
        debug!("no #{} on page, skipping curtain", config::CURTAIN_ID);
        return Ok(());
    };

    match CurtainPlan::for_session(session, cfg) {
        CurtainPlan::SkipImmediately => dom::set_style(&curtain, "display", "none")?,
        CurtainPlan::Animate {
            reveal_after_ms,
            remove_after_ms,
        } => {
            Timeout::new(reveal_after_ms, move || {
                if let Err(e) = curtain.class_list().add_1(config::HIDDEN_CLASS) {
                    log::error!("failed to hide curtain: {:?}", e);
                    return;
                }
                Timeout::new(remove_after_ms, move || {
                    if let Err(e) = dom::set_style(&curtain, "display", "none") {
                        log::error!("failed to remove curtain: {:?}", e);
                    }
                })
                .forget();
            })
            .forget();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySession, MockSessionFlags};
    use mockall::predicate::eq;

    #[test]
    fn first_visit_marks_session_and_animates() {
        let mut session = MockSessionFlags::new();
        session
            .expect_is_set()
            .with(eq("visited"))
            .return_const(false);
        session.expect_set().with(eq("visited")).times(1).return_const(());

        let plan = CurtainPlan::for_session(&session, &SiteConfig::default());
        assert_eq!(
            plan,
            CurtainPlan::Animate {
                reveal_after_ms: 1000,
                remove_after_ms: 600
            }
        );
    }

    #[test]
    fn repeat_visit_skips_without_writing() {
        let mut session = MockSessionFlags::new();
        session.expect_is_set().return_const(true);
        session.expect_set().never();

        let plan = CurtainPlan::for_session(&session, &SiteConfig::default());
        assert_eq!(plan, CurtainPlan::SkipImmediately);
    }

    #[test]
    fn animation_runs_once_per_session() {
        let session = MemorySession::new();
        let cfg = SiteConfig::default();

        let plans: Vec<_> = (0..3)
            .map(|_| CurtainPlan::for_session(&session, &cfg))
            .collect();
        assert!(matches!(plans[0], CurtainPlan::Animate { .. }));
        assert_eq!(plans[1], CurtainPlan::SkipImmediately);
        assert_eq!(plans[2], CurtainPlan::SkipImmediately);
    }
}
