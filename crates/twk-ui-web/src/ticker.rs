use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use gloo::timers::callback::Interval;
use twk_ui_core::{
  Cancel,
  TimerHandle
};

use crate::SharedUi;

/// A running `gloo` interval.
pub struct Ticker(Interval);

impl Cancel for Ticker {
  fn cancel(self) {
    let _callback = self.0.cancel();
  }
}

/// Starts ticking the timer and day progress every
/// `tick_ms`.
fn start(
  tick_ms: u32,
  ui: &SharedUi
) -> Ticker {
  let ui = Rc::clone(ui);
  let interval =
    Interval::new(tick_ms, move || {
      match ui.try_borrow_mut() {
        | Ok(mut ui) => ui.tick(Utc::now()),
        | Err(_) => {
          tracing::trace!(
            "ui busy; skipping tick"
          )
        }
      }
    });
  tracing::info!(tick_ms, "timer started");
  Ticker(interval)
}

/// Starts a fresh interval in the slot, cancelling the one
/// it held before.
pub fn restart(
  slot: &RefCell<TimerHandle<Ticker>>,
  tick_ms: u32,
  ui: &SharedUi
) {
  let next = start(tick_ms, ui);
  slot.borrow_mut().restart(next);
}
