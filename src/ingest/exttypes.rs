use serde::Deserialize;

/// Barometric altitude as published: feet, or a marker such as "ground".
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum AltBaro {
  Feet(f64),
  Other(serde_json::Value),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Aircraft {
  #[serde(default, alias = "id")]
  pub hex: Option<String>,
  #[serde(default, alias = "callsign")]
  pub flight: Option<String>,
  #[serde(default)]
  pub lat: Option<f64>,
  #[serde(default)]
  pub lon: Option<f64>,
  #[serde(default, alias = "headingDeg")]
  pub track: Option<f64>,
  #[serde(default, alias = "ageSincePositionS")]
  pub seen_pos: Option<f64>,
  #[serde(default, alias = "ageSinceAnySeenS")]
  pub seen: Option<f64>,
  #[serde(default, alias = "altitudeFeet")]
  pub alt_baro: Option<AltBaro>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Data {
  #[serde(default)]
  pub now: f64,
  #[serde(default)]
  pub aircraft: Vec<Aircraft>,
}
