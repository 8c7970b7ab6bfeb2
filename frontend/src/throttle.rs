use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

use crate::dom;

#[derive(Debug, PartialEq)]
pub enum Gate {
    /// Call the handler now.
    Run,
    /// Call the handler after this many milliseconds.
    Defer(u32),
    /// A trailing call is already scheduled and will see the latest state.
    Drop,
}

/// Leading-edge throttle with a single trailing call, so the last event of a
/// burst is never lost.
#[derive(Debug)]
pub struct Throttle {
    interval_ms: f64,
    last_run: Option<f64>,
    trailing: bool,
}

impl Throttle {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: f64::from(interval_ms),
            last_run: None,
            trailing: false,
        }
    }

    pub fn admit(&mut self, now: f64) -> Gate {
        if self.trailing {
            return Gate::Drop;
        }
        match self.last_run {
            // A clock that went backwards restarts the window.
            Some(last) if now >= last && now - last < self.interval_ms => {
                self.trailing = true;
                Gate::Defer((self.interval_ms - (now - last)).ceil() as u32)
            }
            _ => {
                self.last_run = Some(now);
                Gate::Run
            }
        }
    }

    pub fn trailing_fired(&mut self, now: f64) {
        self.trailing = false;
        self.last_run = Some(now);
    }
}

/// Wraps `handler` so it runs at most once per `interval_ms`; `None` passes
/// every call straight through.
pub fn throttled(interval_ms: Option<u32>, handler: impl FnMut() + 'static) -> impl FnMut() {
    let handler = Rc::new(RefCell::new(handler));
    let gate = interval_ms.map(|ms| Rc::new(RefCell::new(Throttle::new(ms))));

    move || {
        let Some(gate) = gate.as_ref() else {
            (*handler.borrow_mut())();
            return;
        };
        let decision = gate.borrow_mut().admit(dom::now_ms());
        match decision {
            Gate::Run => (*handler.borrow_mut())(),
            Gate::Defer(ms) => {
                let gate = gate.clone();
                let handler = handler.clone();
                Timeout::new(ms, move || {
                    gate.borrow_mut().trailing_fired(dom::now_ms());
                    (*handler.borrow_mut())();
                })
                .forget();
            }
            Gate::Drop => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_runs_immediately() {
        let mut t = Throttle::new(16);
        assert_eq!(t.admit(1000.0), Gate::Run);
    }

    #[test]
    fn burst_collapses_into_one_trailing_call() {
        let mut t = Throttle::new(16);
        assert_eq!(t.admit(0.0), Gate::Run);
        assert_eq!(t.admit(4.0), Gate::Defer(12));
        assert_eq!(t.admit(8.0), Gate::Drop);
        assert_eq!(t.admit(12.0), Gate::Drop);

        t.trailing_fired(16.0);
        assert_eq!(t.admit(20.0), Gate::Defer(12));
    }

    #[test]
    fn clock_moving_backwards_restarts_the_window() {
        let mut t = Throttle::new(16);
        assert_eq!(t.admit(1_000_000.0), Gate::Run);
        assert_eq!(t.admit(400_000.0), Gate::Run);
        assert_eq!(t.admit(400_004.0), Gate::Defer(12));
        assert_eq!(t.admit(400_008.0), Gate::Drop);

        t.trailing_fired(400_016.0);
        assert_eq!(t.admit(400_040.0), Gate::Run);
    }

    #[test]
    fn calls_spaced_past_interval_all_run() {
        let mut t = Throttle::new(16);
        assert_eq!(t.admit(0.0), Gate::Run);
        assert_eq!(t.admit(16.0), Gate::Run);
        assert_eq!(t.admit(40.0), Gate::Run);
    }
}
