use chrono::{
  DateTime,
  Local,
  NaiveDateTime,
  NaiveTime,
  Timelike,
  Utc
};
use chrono_tz::Tz;
use tracing::{
  debug,
  trace
};

use crate::config::{
  DayProgressConfig,
  TimerConfig
};
use crate::page::Page;

/// Compact UTC form the task server writes, e.g.
/// `20250501T035408Z`.
const TASKWARRIOR_FORMAT: &str =
  "%Y%m%dT%H%M%SZ";
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Renders the time elapsed since the anchor instant on the
/// timer container.
///
/// Every tick recomputes the duration from the anchor, so a
/// late or skipped tick never leaves the display behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElapsedTimer {
  container:        String,
  duration_class:   String,
  anchor_attribute: String
}

impl ElapsedTimer {
  pub fn new(config: &TimerConfig) -> Self {
    Self {
      container:        config
        .container
        .clone(),
      duration_class:   config
        .duration_class
        .clone(),
      anchor_attribute: config
        .anchor_attribute
        .clone()
    }
  }

  /// One tick. Returns the rendered text, or `None` when
  /// the timer is not shown or has no usable anchor.
  pub fn tick<P: Page>(
    &self,
    page: &mut P,
    now: DateTime<Utc>
  ) -> Option<String> {
    if !page.contains(&self.container)
      || !page.has_descendant(
        &self.container,
        &self.duration_class
      )
    {
      trace!(
        container = %self.container,
        "no active timer on page"
      );
      return None;
    }

    let Some(raw) = page.attribute(
      &self.container,
      &self.anchor_attribute
    ) else {
      debug!(
        attribute = %self.anchor_attribute,
        "timer has no anchor"
      );
      return None;
    };
    let Some(anchor) = parse_anchor(&raw)
    else {
      debug!(anchor = %raw, "unparseable timer anchor");
      return None;
    };

    let text = format_elapsed(
      elapsed_seconds(anchor, now)
    );
    page.set_descendant_text(
      &self.container,
      &self.duration_class,
      &text
    );
    Some(text)
  }
}

/// Parses an anchor instant. Accepts RFC 3339, a naive ISO
/// date-time and the compact taskwarrior form.
///
/// A date-time without an offset is read as UTC, not as
/// the viewer's local time. Send an offset or `Z` when the
/// anchor is local.
pub fn parse_anchor(
  raw: &str
) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Ok(parsed) =
    DateTime::parse_from_rfc3339(raw)
  {
    return Some(
      parsed.with_timezone(&Utc)
    );
  }

  [
    TASKWARRIOR_FORMAT,
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M"
  ]
  .iter()
  .find_map(|format| {
    NaiveDateTime::parse_from_str(
      raw, format
    )
    .ok()
  })
  .map(|naive| naive.and_utc())
}

/// Whole seconds from `anchor` to `now`, never negative.
pub fn elapsed_seconds(
  anchor: DateTime<Utc>,
  now: DateTime<Utc>
) -> i64 {
  (now - anchor)
    .num_milliseconds()
    .div_euclid(1000)
    .max(0)
}

/// `HH:MM:SS`, each part zero-padded to two digits. Hours
/// keep growing past 99.
pub fn format_elapsed(
  total_seconds: i64
) -> String {
  let total = total_seconds.max(0);
  let hours = total / 3600;
  let minutes = (total % 3600) / 60;
  let seconds = total % 60;
  format!(
    "{hours:02}:{minutes:02}:{seconds:02}"
  )
}

/// Something a scheduler hands back for a repeating
/// callback.
pub trait Cancel {
  fn cancel(self);
}

/// Owns one running repeating callback.
///
/// Stopping is idempotent, and dropping the handle stops
/// the callback, so a replaced handle cannot keep a
/// dangling timer alive.
pub struct TimerHandle<C: Cancel> {
  active: Option<C>
}

impl<C: Cancel> TimerHandle<C> {
  pub fn running(active: C) -> Self {
    Self {
      active: Some(active)
    }
  }

  /// A handle with nothing to stop.
  pub fn idle() -> Self {
    Self { active: None }
  }

  pub fn is_running(&self) -> bool {
    self.active.is_some()
  }

  pub fn stop(&mut self) {
    if let Some(active) = self.active.take()
    {
      active.cancel();
      debug!("timer stopped");
    }
  }

  /// Stops the current callback, if any, and takes
  /// ownership of `next`.
  pub fn restart(&mut self, next: C) {
    self.stop();
    self.active = Some(next);
    debug!("timer restarted");
  }
}

impl<C: Cancel> Default for TimerHandle<C> {
  fn default() -> Self {
    Self::idle()
  }
}

impl<C: Cancel> Drop for TimerHandle<C> {
  fn drop(&mut self) {
    self.stop();
  }
}

/// The wall clock the day-progress indicator reads.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DayClock {
  Local,
  Zone(Tz)
}

impl DayClock {
  pub fn time_of_day(
    self,
    now: DateTime<Utc>
  ) -> NaiveTime {
    match self {
      | Self::Local => {
        now.with_timezone(&Local).time()
      }
      | Self::Zone(tz) => {
        now.with_timezone(&tz).time()
      }
    }
  }
}

/// Width and label of the day-progress indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct DayProgressReading {
  pub percent: f64,
  pub label:   String
}

impl DayProgressReading {
  pub fn at(time: NaiveTime) -> Self {
    let minutes_passed =
      time.hour() * 60 + time.minute();
    Self {
      percent: f64::from(minutes_passed)
        * 100.0
        / f64::from(MINUTES_PER_DAY),
      label:   format!(
        "{}h",
        24 - time.hour()
      )
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayProgress {
  element: String,
  clock:   DayClock
}

impl DayProgress {
  pub fn new(
    config: &DayProgressConfig
  ) -> Self {
    let clock = config
      .resolve_timezone()
      .map_or(DayClock::Local, DayClock::Zone);
    Self {
      element: config.element.clone(),
      clock
    }
  }

  pub fn with_clock(
    mut self,
    clock: DayClock
  ) -> Self {
    self.clock = clock;
    self
  }

  pub fn tick<P: Page>(
    &self,
    page: &mut P,
    now: DateTime<Utc>
  ) -> Option<DayProgressReading> {
    if !page.contains(&self.element) {
      trace!(
        element = %self.element,
        "no day progress on page"
      );
      return None;
    }

    let reading = DayProgressReading::at(
      self.clock.time_of_day(now)
    );
    page.set_progress(
      &self.element,
      reading.percent,
      &reading.label
    );
    Some(reading)
  }
}
