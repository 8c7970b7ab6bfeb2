//! Simulated contact form round trip.
//!
//! Nothing is sent over the network. A valid submission walks
//! `Idle -> Validating -> Sending -> Sent -> Resetting -> Idle`, each timed
//! step gated by a sleep, and cannot be cancelled or re-entered once started.

use std::cell::RefCell;
use std::future::Future;

use log::{info, warn};
use thiserror::Error;

pub const SENDING_LABEL: &str = "SENDING...";
pub const SENT_LABEL: &str = "SENT";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Validating,
    Sending,
    Sent,
    Resetting,
}

#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error("a submission is already in progress ({0:?})")]
    InFlight(SubmitPhase),
    #[error("cannot move from {from:?} to {to:?}")]
    IllegalTransition { from: SubmitPhase, to: SubmitPhase },
}

impl SubmitError {
    /// A second submit while one is pending; already reported as a warning.
    pub fn is_reentry(&self) -> bool {
        matches!(self, SubmitError::InFlight(_))
    }
}

#[derive(Debug)]
pub struct SubmitMachine {
    phase: SubmitPhase,
}

impl Default for SubmitMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitMachine {
    pub fn new() -> Self {
        Self {
            phase: SubmitPhase::Idle,
        }
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// Starts a submission; rejected unless idle.
    pub fn begin(&mut self) -> Result<(), SubmitError> {
        if self.phase != SubmitPhase::Idle {
            return Err(SubmitError::InFlight(self.phase));
        }
        self.phase = SubmitPhase::Validating;
        Ok(())
    }

    pub fn advance(&mut self, to: SubmitPhase) -> Result<(), SubmitError> {
        use SubmitPhase::*;
        let allowed = matches!(
            (self.phase, to),
            (Validating, Idle)
                | (Validating, Sending)
                | (Sending, Sent)
                | (Sent, Resetting)
                | (Resetting, Idle)
        );
        if !allowed {
            return Err(SubmitError::IllegalTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }
}

/// The form as the submit sequence sees it.
#[cfg_attr(test, mockall::automock)]
pub trait SubmitView {
    /// Validates every field, showing errors; true when all pass.
    fn validate_all(&self) -> bool;
    fn label(&self) -> String;
    fn set_label(&self, label: &str);
    fn set_disabled(&self, disabled: bool);
    fn set_background(&self, color: Option<&'static str>);
    fn reset_fields(&self);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubmitTimings {
    pub sending_ms: u32,
    pub sent_ms: u32,
    pub success_color: &'static str,
}

#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    Rejected,
    Sent,
}

pub async fn run_submission<V, S, F>(
    machine: &RefCell<SubmitMachine>,
    view: &V,
    timings: SubmitTimings,
    sleep: S,
) -> Result<SubmitOutcome, SubmitError>
where
    V: SubmitView + ?Sized,
    S: Fn(u32) -> F,
    F: Future<Output = ()>,
{
    if let Err(e) = machine.borrow_mut().begin() {
        warn!("ignoring submit: {}", e);
        return Err(e);
    }

    if !view.validate_all() {
        machine.borrow_mut().advance(SubmitPhase::Idle)?;
        return Ok(SubmitOutcome::Rejected);
    }

    let original_label = view.label();
    machine.borrow_mut().advance(SubmitPhase::Sending)?;
    view.set_disabled(true);
    view.set_label(SENDING_LABEL);
    sleep(timings.sending_ms).await;

    machine.borrow_mut().advance(SubmitPhase::Sent)?;
    view.set_label(SENT_LABEL);
    view.set_background(Some(timings.success_color));
    sleep(timings.sent_ms).await;

    machine.borrow_mut().advance(SubmitPhase::Resetting)?;
    view.reset_fields();
    view.set_label(&original_label);
    view.set_background(None);
    view.set_disabled(false);
    machine.borrow_mut().advance(SubmitPhase::Idle)?;

    info!("contact form submission simulated");
    Ok(SubmitOutcome::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use mockall::predicate::eq;
    use mockall::Sequence;

    const TIMINGS: SubmitTimings = SubmitTimings {
        sending_ms: 1500,
        sent_ms: 2000,
        success_color: "#22c55e",
    };

    #[test]
    fn machine_rejects_reentry() {
        let mut m = SubmitMachine::new();
        m.begin().unwrap();
        assert_eq!(m.begin(), Err(SubmitError::InFlight(SubmitPhase::Validating)));
        m.advance(SubmitPhase::Sending).unwrap();
        assert_eq!(m.begin(), Err(SubmitError::InFlight(SubmitPhase::Sending)));
    }

    #[test]
    fn only_reentry_counts_as_an_expected_failure() {
        assert!(SubmitError::InFlight(SubmitPhase::Sent).is_reentry());
        assert!(!SubmitError::IllegalTransition {
            from: SubmitPhase::Idle,
            to: SubmitPhase::Sent,
        }
        .is_reentry());
    }

    #[test]
    fn machine_refuses_skipped_steps() {
        let mut m = SubmitMachine::new();
        assert!(m.advance(SubmitPhase::Sending).is_err());
        m.begin().unwrap();
        assert_eq!(
            m.advance(SubmitPhase::Sent),
            Err(SubmitError::IllegalTransition {
                from: SubmitPhase::Validating,
                to: SubmitPhase::Sent
            })
        );
    }

    #[test]
    fn invalid_form_leaves_control_untouched() {
        let mut view = MockSubmitView::new();
        view.expect_validate_all().times(1).return_const(false);
        view.expect_label().never();
        view.expect_set_label().never();
        view.expect_set_disabled().never();
        view.expect_set_background().never();
        view.expect_reset_fields().never();

        let machine = RefCell::new(SubmitMachine::new());
        let slept = RefCell::new(Vec::new());
        let outcome = block_on(run_submission(&machine, &view, TIMINGS, |ms| {
            slept.borrow_mut().push(ms);
            async {}
        }));

        assert_eq!(outcome, Ok(SubmitOutcome::Rejected));
        assert!(slept.borrow().is_empty());
        assert_eq!(machine.borrow().phase(), SubmitPhase::Idle);
    }

    #[test]
    fn valid_form_walks_the_full_sequence_in_order() {
        let mut view = MockSubmitView::new();
        let mut seq = Sequence::new();
        view.expect_validate_all()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(true);
        view.expect_label()
            .times(1)
            .in_sequence(&mut seq)
            .return_const("SEND MESSAGE".to_string());
        view.expect_set_disabled()
            .with(eq(true))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        view.expect_set_label()
            .with(eq("SENDING..."))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        view.expect_set_label()
            .with(eq("SENT"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        view.expect_set_background()
            .with(eq(Some("#22c55e")))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        view.expect_reset_fields()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        view.expect_set_label()
            .with(eq("SEND MESSAGE"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        view.expect_set_background()
            .with(eq(None::<&'static str>))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        view.expect_set_disabled()
            .with(eq(false))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let machine = RefCell::new(SubmitMachine::new());
        let slept = RefCell::new(Vec::new());
        let outcome = block_on(run_submission(&machine, &view, TIMINGS, |ms| {
            slept.borrow_mut().push(ms);
            async {}
        }));

        assert_eq!(outcome, Ok(SubmitOutcome::Sent));
        assert_eq!(*slept.borrow(), vec![1500, 2000]);
        assert_eq!(machine.borrow().phase(), SubmitPhase::Idle);
    }

    #[test]
    fn submit_while_pending_is_rejected_without_touching_the_view() {
        let mut view = MockSubmitView::new();
        view.expect_validate_all().never();

        let machine = RefCell::new(SubmitMachine::new());
        machine.borrow_mut().begin().unwrap();
        machine.borrow_mut().advance(SubmitPhase::Sending).unwrap();

        let outcome = block_on(run_submission(&machine, &view, TIMINGS, |_| async {}));
        assert_eq!(outcome, Err(SubmitError::InFlight(SubmitPhase::Sending)));
        assert_eq!(machine.borrow().phase(), SubmitPhase::Sending);
    }
}
