use duration_str::deserialize_duration;
use log::LevelFilter;
use serde::Deserialize;
use std::{fmt, fs::File, io::Read, path::Path, time::Duration};

use crate::types::{Layout, Point, Rect, Size};

#[derive(Deserialize, Debug, Clone)]
pub struct Api {
  pub url: String,
  #[serde(deserialize_with = "deserialize_duration")]
  pub poll_period: Duration,
  #[serde(deserialize_with = "deserialize_duration")]
  pub timeout: Duration,
}

impl Default for Api {
  fn default() -> Self {
    Self {
      url: "http://192.168.0.15/tar1090/data/aircraft.json".to_owned(),
      poll_period: Duration::from_secs(1),
      timeout: Duration::from_millis(3500),
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
  pub level: LevelFilter,
}

impl Default for Log {
  fn default() -> Self {
    Self {
      level: LevelFilter::Info,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Home {
  pub lat: f64,
  pub lng: f64,
}

impl Default for Home {
  fn default() -> Self {
    Self {
      lat: 46.47171849999999,
      lng: 6.476770899999999,
    }
  }
}

impl From<&Home> for Point {
  fn from(home: &Home) -> Self {
    Point {
      lat: home.lat,
      lng: home.lng,
    }
  }
}

/// Slippy-map geometry, must match the pre-rendered background image.
#[derive(Deserialize, Debug, Clone)]
pub struct Map {
  pub zoom: u8,
  pub origin_x: f64,
  pub origin_y: f64,
  pub background: Option<String>,
}

impl Default for Map {
  fn default() -> Self {
    Self {
      zoom: 8,
      origin_x: 33707.06016028444,
      origin_y: 23031.052289240848,
      background: None,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Display {
  pub width: i32,
  pub height: i32,
  pub legend_height: i32,
  pub status_height: i32,
  pub snapshot: Option<String>,
}

impl Default for Display {
  fn default() -> Self {
    Self {
      width: 480,
      height: 320,
      legend_height: 18,
      status_height: 18,
      snapshot: None,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Sprite {
  pub width: i32,
  pub height: i32,
  pub atlas: Option<String>,
  pub ccw: bool,
  pub offset_deg: i32,
  pub flip_180: bool,
}

impl Default for Sprite {
  fn default() -> Self {
    Self {
      width: 32,
      height: 32,
      atlas: None,
      ccw: true,
      offset_deg: 0,
      flip_180: false,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Tracks {
  #[serde(deserialize_with = "deserialize_duration")]
  pub ttl: Duration,
  #[serde(deserialize_with = "deserialize_duration")]
  pub stale_after: Duration,
  pub max_draw: usize,
  #[serde(deserialize_with = "deserialize_duration")]
  pub max_position_age: Duration,
  #[serde(deserialize_with = "deserialize_duration")]
  pub max_seen_age: Duration,
  pub range_km: f64,
}

impl Default for Tracks {
  fn default() -> Self {
    Self {
      ttl: Duration::from_secs(15),
      stale_after: Duration::from_secs(10),
      max_draw: 99,
      max_position_age: Duration::from_secs(30),
      max_seen_age: Duration::from_secs(60),
      range_km: 500.0,
    }
  }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
  pub log: Log,
  pub api: Api,
  pub home: Home,
  pub map: Map,
  pub display: Display,
  pub sprite: Sprite,
  pub tracks: Tracks,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
  StaleNotBeforeTtl(Duration, Duration),
  ZeroDrawCap,
  SpriteTooLarge(Size, Size),
  NoDrawableArea,
  InvalidZoom(u8),
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::StaleNotBeforeTtl(stale, ttl) => write!(
        f,
        "tracks.stale_after ({stale:?}) must be shorter than tracks.ttl ({ttl:?})"
      ),
      ConfigError::ZeroDrawCap => write!(f, "tracks.max_draw must be at least 1"),
      ConfigError::SpriteTooLarge(sprite, screen) => write!(
        f,
        "sprite {}x{} does not fit the {}x{} display",
        sprite.w, sprite.h, screen.w, screen.h
      ),
      ConfigError::NoDrawableArea => {
        write!(f, "legend and status strips leave no drawable area")
      }
      ConfigError::InvalidZoom(zoom) => write!(f, "map.zoom {zoom} is out of range 0..=22"),
    }
  }
}

impl std::error::Error for ConfigError {}

impl Config {
  pub fn layout(&self) -> Layout {
    Layout {
      screen: Size::new(self.display.width, self.display.height),
      legend_height: self.display.legend_height,
      status_height: self.display.status_height,
      sprite: Size::new(self.sprite.width, self.sprite.height),
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.tracks.stale_after >= self.tracks.ttl {
      return Err(ConfigError::StaleNotBeforeTtl(
        self.tracks.stale_after,
        self.tracks.ttl,
      ));
    }
    if self.tracks.max_draw == 0 {
      return Err(ConfigError::ZeroDrawCap);
    }
    if self.map.zoom > 22 {
      return Err(ConfigError::InvalidZoom(self.map.zoom));
    }
    let layout = self.layout();
    let sprite = Rect::new(0, 0, layout.sprite.w, layout.sprite.h);
    if sprite.is_empty() || !layout.bounds().contains(&sprite) {
      return Err(ConfigError::SpriteTooLarge(layout.sprite, layout.screen));
    }
    if layout.drawable().is_empty() {
      return Err(ConfigError::NoDrawableArea);
    }
    Ok(())
  }
}

pub fn read_config(filename: Option<&str>) -> Config {
  let mut filenames = vec!["./skywatch.toml", "/etc/skywatch.toml"];
  if let Some(filename) = filename {
    filenames.insert(0, filename);
  }

  for fname in filenames {
    let path = Path::new(fname);
    println!("Trying config file {}...", fname);
    if path.is_file() {
      let mut f = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
          println!("Error opening config file {}: {}", fname, err);
          continue;
        }
      };
      let mut config_raw = String::new();
      if let Err(err) = f.read_to_string(&mut config_raw) {
        println!("Error reading config file {}: {}", fname, err);
        continue;
      }
      match toml::from_str::<Config>(&config_raw) {
        Ok(config) => return config,
        Err(err) => {
          println!("Error parsing config file {}: {}", fname, err);
          continue;
        }
      }
    }
    println!("Config file {} does not exist", fname);
  }
  println!("No config files can be read, using default settings");
  Default::default()
}

#[cfg(test)]
pub mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_valid() {
    let cfg = Config::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.tracks.max_draw, 99);
    assert_eq!(cfg.map.zoom, 8);
  }

  #[test]
  fn test_partial_toml() {
    let raw = r#"
      [log]
      level = "debug"

      [tracks]
      ttl = "20s"
      stale_after = "12s"
      max_draw = 10
      max_position_age = "30s"
      max_seen_age = "60s"
      range_km = 250.0
    "#;
    let cfg: Config = toml::from_str(raw).unwrap();
    assert_eq!(cfg.log.level, LevelFilter::Debug);
    assert_eq!(cfg.tracks.ttl, Duration::from_secs(20));
    assert_eq!(cfg.tracks.max_seen_age, Duration::from_secs(60));
    assert_eq!(cfg.tracks.max_draw, 10);
    assert_eq!(cfg.display.width, 480);
    assert!(cfg.validate().is_ok());
  }

  #[test]
  fn test_stale_must_be_shorter_than_ttl() {
    let mut cfg = Config::default();
    cfg.tracks.stale_after = cfg.tracks.ttl;
    assert_eq!(
      cfg.validate(),
      Err(ConfigError::StaleNotBeforeTtl(
        Duration::from_secs(15),
        Duration::from_secs(15)
      ))
    );
  }

  #[test]
  fn test_strips_leave_no_room() {
    let mut cfg = Config::default();
    cfg.display.legend_height = 160;
    cfg.display.status_height = 160;
    assert_eq!(cfg.validate(), Err(ConfigError::NoDrawableArea));
  }
}
