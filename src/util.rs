use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

pub fn seconds_since(t: DateTime<Utc>) -> f32 {
  let t2 = Utc::now();
  let d = (t2 - t).to_std();
  if let Ok(d) = d {
    d.as_secs_f32()
  } else {
    0.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
  pub const ZERO: Timestamp = Timestamp(0);

  pub const fn from_millis(ms: u64) -> Self {
    Self(ms)
  }

  pub fn since(&self, earlier: Timestamp) -> Duration {
    Duration::from_millis(self.0.saturating_sub(earlier.0))
  }
}

#[derive(Debug, Clone, Copy)]
pub struct Clock {
  epoch: Instant,
}

impl Clock {
  pub fn new() -> Self {
    Self {
      epoch: Instant::now(),
    }
  }

  pub fn now(&self) -> Timestamp {
    Timestamp(self.epoch.elapsed().as_millis() as u64)
  }
}

impl Default for Clock {
  fn default() -> Self {
    Self::new()
  }
}

/// Copies as much of `s` as fits into `N` bytes without splitting a char.
pub fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
  let mut out = heapless::String::new();
  for ch in s.chars() {
    if out.push(ch).is_err() {
      break;
    }
  }
  out
}
