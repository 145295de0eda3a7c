pub mod store;

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use serde::Serialize;

use crate::{
  types::{Point, Rect},
  util::Timestamp,
};

pub use store::{SlotId, TrackStore, MAX_TRACKS};

pub const ID_LEN: usize = 8;
pub const CALLSIGN_LEN: usize = 8;

/// Radio (ICAO) address as received, e.g. "4b1805" or "~2d1a0f"
pub type TrackId = heapless::String<ID_LEN>;
pub type Callsign = heapless::String<CALLSIGN_LEN>;

const BAND_LOW_M: i32 = 1000;
const BAND_MEDIUM_M: i32 = 5000;
const BAND_HIGH_M: i32 = 9000;

const DARKGREY: Rgb565 = Rgb565::new(15, 31, 15);

/// Unknown sorts below every known altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Default)]
pub enum Altitude {
  #[default]
  Unknown,
  Meters(i32),
}

impl Altitude {
  pub fn from_feet(feet: f64) -> Self {
    if feet.is_finite() {
      Altitude::Meters((feet * 0.3048).round() as i32)
    } else {
      Altitude::Unknown
    }
  }

  pub fn meters(&self) -> Option<i32> {
    match self {
      Altitude::Unknown => None,
      Altitude::Meters(m) => Some(*m),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AltitudeBand {
  Unknown,
  Low,
  Medium,
  High,
  VeryHigh,
}

impl AltitudeBand {
  pub const LEGEND: [(AltitudeBand, &'static str); 5] = [
    (AltitudeBand::Low, "0-1000"),
    (AltitudeBand::Medium, "1000-5000"),
    (AltitudeBand::High, "5000-9000"),
    (AltitudeBand::VeryHigh, "9000+"),
    (AltitudeBand::Unknown, "UNKNOWN"),
  ];

  pub fn color(&self) -> Rgb565 {
    match self {
      AltitudeBand::Unknown => DARKGREY,
      AltitudeBand::Low => Rgb565::RED,
      AltitudeBand::Medium => Rgb565::GREEN,
      AltitudeBand::High => Rgb565::YELLOW,
      AltitudeBand::VeryHigh => Rgb565::CYAN,
    }
  }
}

impl From<Altitude> for AltitudeBand {
  fn from(alt: Altitude) -> Self {
    match alt {
      Altitude::Unknown => AltitudeBand::Unknown,
      Altitude::Meters(m) if m < BAND_LOW_M => AltitudeBand::Low,
      Altitude::Meters(m) if m < BAND_MEDIUM_M => AltitudeBand::Medium,
      Altitude::Meters(m) if m < BAND_HIGH_M => AltitudeBand::High,
      Altitude::Meters(_) => AltitudeBand::VeryHigh,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
  pub id: TrackId,
  pub callsign: Callsign,
  pub position: Point,
  pub heading: u16,
  pub altitude: Altitude,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
  pub id: TrackId,
  pub callsign: Callsign,
  pub position: Point,
  pub heading: u16,
  pub altitude: Altitude,
  pub band: AltitudeBand,
  pub cx: i32,
  pub cy: i32,
  /// valid only while `painted` is set
  pub last_painted: Rect,
  pub painted: bool,
  pub updated_at: Timestamp,
}

impl Track {
  pub const EMPTY: Track = Track {
    id: TrackId::new(),
    callsign: Callsign::new(),
    position: Point::ZERO,
    heading: 0,
    altitude: Altitude::Unknown,
    band: AltitudeBand::Unknown,
    cx: 0,
    cy: 0,
    last_painted: Rect::EMPTY,
    painted: false,
    updated_at: Timestamp::ZERO,
  };

  pub fn label(&self) -> &str {
    if self.callsign.is_empty() {
      self.id.as_str()
    } else {
      self.callsign.as_str()
    }
  }

  pub fn age(&self, now: Timestamp) -> std::time::Duration {
    now.since(self.updated_at)
  }
}
