pub mod exttypes;

use std::{error::Error, fmt::Display, time::Duration};

use log::{debug, trace};
use reqwest::{Client, StatusCode};

use crate::{
  config::{Api, Config},
  projector::Projector,
  track::{Altitude, Sighting},
  types::Point,
  util::bounded,
};
use exttypes::{AltBaro, Data};

#[derive(Debug)]
pub enum IngestError {
  Transport(reqwest::Error),
  Status(StatusCode),
  Decode(serde_json::Error),
}

impl Display for IngestError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      IngestError::Transport(err) => write!(f, "transport error: {err}"),
      IngestError::Status(code) => write!(f, "unexpected response status {code}"),
      IngestError::Decode(err) => write!(f, "error decoding aircraft data: {err}"),
    }
  }
}

impl Error for IngestError {}

impl From<reqwest::Error> for IngestError {
  fn from(value: reqwest::Error) -> Self {
    Self::Transport(value)
  }
}

impl From<serde_json::Error> for IngestError {
  fn from(value: serde_json::Error) -> Self {
    Self::Decode(value)
  }
}

pub trait Link {
  fn is_up(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysUp;

impl Link for AlwaysUp {
  fn is_up(&self) -> bool {
    true
  }
}

#[derive(Debug, Clone)]
pub struct Source {
  client: Client,
  url: String,
}

impl Source {
  pub fn new(api: &Api) -> Result<Self, IngestError> {
    let client = Client::builder().timeout(api.timeout).build()?;
    Ok(Self {
      client,
      url: api.url.clone(),
    })
  }

  /// Fetches and decodes one document. Either the whole document is returned
  /// or nothing is.
  pub async fn pull(&self) -> Result<Data, IngestError> {
    let response = self.client.get(&self.url).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(IngestError::Status(status));
    }
    let body = response.bytes().await?;
    let data = serde_json::from_slice(&body)?;
    Ok(data)
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
  pub now: f64,
  pub total: usize,
  pub seen: usize,
  pub with_position: usize,
  pub fresh: usize,
  pub within_range: usize,
  pub sightings: Vec<Sighting>,
}

#[derive(Debug, Clone)]
pub struct Ingestor {
  home: Point,
  max_position_age: Duration,
  max_seen_age: Duration,
  range_km: f64,
  projector: Projector,
}

impl Ingestor {
  pub fn new(
    home: Point,
    max_position_age: Duration,
    max_seen_age: Duration,
    range_km: f64,
    projector: Projector,
  ) -> Self {
    Self {
      home,
      max_position_age,
      max_seen_age,
      range_km,
      projector,
    }
  }

  pub fn from_config(cfg: &Config) -> Self {
    Self::new(
      (&cfg.home).into(),
      cfg.tracks.max_position_age,
      cfg.tracks.max_seen_age,
      cfg.tracks.range_km,
      Projector::from_config(cfg),
    )
  }

  pub fn adapt(&self, data: Data) -> Snapshot {
    let mut snap = Snapshot {
      now: data.now,
      total: data.aircraft.len(),
      ..Default::default()
    };
    let max_seen = self.max_seen_age.as_secs_f64();
    let max_pos = self.max_position_age.as_secs_f64();

    for ac in data.aircraft.iter() {
      let id = match ac.hex.as_deref().map(str::trim) {
        Some(hex) if !hex.is_empty() => bounded(hex),
        _ => continue,
      };

      // an unknown age is never recent
      if ac.seen.unwrap_or(f64::INFINITY) <= max_seen {
        snap.seen += 1;
      }

      let (lat, lon) = match (ac.lat, ac.lon) {
        (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
        _ => continue,
      };
      snap.with_position += 1;

      if ac.seen_pos.unwrap_or(f64::INFINITY) > max_pos {
        trace!("{id}: position is {:?}s old", ac.seen_pos);
        continue;
      }
      snap.fresh += 1;

      let position = Point { lat, lng: lon };
      if self.home.distance_km(&position) > self.range_km {
        continue;
      }
      snap.within_range += 1;

      if !self.projector.project(lat, lon).on_screen {
        continue;
      }

      snap.sightings.push(Sighting {
        id,
        callsign: bounded(ac.flight.as_deref().unwrap_or("").trim()),
        position,
        heading: heading(ac.track),
        altitude: altitude(ac.alt_baro.as_ref()),
      });
    }

    debug!(
      "aircraft: {} seen: {} with position: {} fresh: {} within {}km: {} on screen: {}",
      snap.total,
      snap.seen,
      snap.with_position,
      snap.fresh,
      self.range_km,
      snap.within_range,
      snap.sightings.len()
    );
    snap
  }
}

fn heading(track: Option<f64>) -> u16 {
  match track {
    Some(deg) if deg.is_finite() => (deg.round() as i64).rem_euclid(360) as u16,
    _ => 0,
  }
}

fn altitude(alt: Option<&AltBaro>) -> Altitude {
  match alt {
    Some(AltBaro::Feet(feet)) => Altitude::from_feet(*feet),
    _ => Altitude::Unknown,
  }
}
