use std::f64::consts::PI;

use crate::{
  config::Config,
  types::{Layout, Point, Rect, Size},
};

/// Web Mercator pole limit
pub const MAX_LAT: f64 = 85.0511287798;
pub const TILE_SIZE: f64 = 256.0;
/// Screen offsets are held within this many pixels of the map origin so the
/// integer conversion and sprite rectangles never overflow.
const PIXEL_LIMIT: f64 = 16_777_216.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
  pub x: i32,
  pub y: i32,
  pub on_screen: bool,
}

impl Projection {
  const NOWHERE: Projection = Projection {
    x: -(PIXEL_LIMIT as i32),
    y: -(PIXEL_LIMIT as i32),
    on_screen: false,
  };
}

pub fn global_pixels(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
  let lat = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
  let world = TILE_SIZE * 2.0_f64.powi(zoom as i32);
  let x = (lon + 180.0) / 360.0 * world;
  let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
  (x, y)
}

#[derive(Debug, Clone, Copy)]
pub struct Projector {
  zoom: u8,
  origin_x: f64,
  origin_y: f64,
  screen: Size,
  sprite: Size,
}

impl Projector {
  pub fn new(zoom: u8, origin_x: f64, origin_y: f64, layout: &Layout) -> Self {
    Self {
      zoom,
      origin_x,
      origin_y,
      screen: layout.screen,
      sprite: layout.sprite,
    }
  }

  pub fn from_config(cfg: &Config) -> Self {
    Self::new(
      cfg.map.zoom,
      cfg.map.origin_x,
      cfg.map.origin_y,
      &cfg.layout(),
    )
  }

  pub fn project(&self, lat: f64, lon: f64) -> Projection {
    let pos = Point { lat, lng: lon }.normalized();
    if !pos.lat.is_finite() || !pos.lng.is_finite() {
      return Projection::NOWHERE;
    }
    let (gx, gy) = global_pixels(pos.lat, pos.lng, self.zoom);
    let x = to_pixel(gx - self.origin_x);
    let y = to_pixel(gy - self.origin_y);
    let bbox = Rect::centered(x, y, self.sprite);
    let screen = Rect::new(0, 0, self.screen.w, self.screen.h);
    Projection {
      x,
      y,
      on_screen: bbox.intersects(&screen),
    }
  }
}

fn to_pixel(offset: f64) -> i32 {
  offset.round().clamp(-PIXEL_LIMIT, PIXEL_LIMIT) as i32
}

#[cfg(test)]
pub mod tests {
  use super::*;
  use crate::types::tests::layout;

  pub fn projector() -> Projector {
    Projector::new(8, 33707.06016028444, 23031.052289240848, &layout())
  }

  #[test]
  fn test_global_pixels_origin() {
    let (x, y) = global_pixels(0.0, 0.0, 0);
    assert!((x - 128.0).abs() < 1e-9);
    assert!((y - 128.0).abs() < 1e-9);

    let (x, y) = global_pixels(0.0, -180.0, 3);
    assert!(x.abs() < 1e-9);
    assert!((y - 1024.0).abs() < 1e-9);
  }

  #[test]
  fn test_latitude_is_clamped() {
    let (_, y_pole) = global_pixels(90.0, 0.0, 4);
    let (_, y_limit) = global_pixels(MAX_LAT, 0.0, 4);
    assert_eq!(y_pole, y_limit);
    assert!(y_pole.is_finite());
    assert!(y_pole.abs() < 1e-3);

    let (_, y_south) = global_pixels(-90.0, 0.0, 4);
    assert!((y_south - 4096.0).abs() < 1e-3);
  }

  #[test]
  fn test_project_home_area() {
    let p = projector().project(46.47, 6.48);
    assert!((p.x - 241).abs() <= 1, "{p:?}");
    assert!((p.y - 163).abs() <= 1, "{p:?}");
    assert!(p.on_screen);
  }

  #[test]
  fn test_project_is_deterministic() {
    let pr = projector();
    for i in 0..50 {
      let lat = 45.0 + i as f64 * 0.07;
      let lon = 5.0 + i as f64 * 0.05;
      assert_eq!(pr.project(lat, lon), pr.project(lat, lon));
    }
  }

  #[test]
  fn test_x_monotonic_in_longitude() {
    let pr = projector();
    let mut prev = i32::MIN;
    let mut lon = -180.0;
    while lon < 180.0 {
      let p = pr.project(46.0, lon);
      assert!(p.x >= prev, "lon {lon}");
      prev = p.x;
      lon += 0.25;
    }
  }

  #[test]
  fn test_on_screen_uses_sprite_extent() {
    let pr = projector();
    let p = pr.project(46.47, 6.48);
    // just left of the screen, but half a sprite still overlaps
    let (gx, _) = global_pixels(46.47, 6.48, 8);
    let dx_deg = 360.0 / (TILE_SIZE * 256.0);
    let lon_edge = 6.48 - (gx - 33707.06016028444 + 10.0) * dx_deg;
    let edge = pr.project(46.47, lon_edge);
    assert!(edge.x < 0);
    assert!(edge.x > -16);
    assert!(edge.on_screen);
    assert_eq!(edge.y, p.y);

    let far = pr.project(10.0, -60.0);
    assert!(!far.on_screen);
  }

  #[test]
  fn test_longitude_is_wrapped() {
    let pr = projector();
    let home = pr.project(46.47, 6.48);
    for lon in [6.48 + 360.0, 6.48 - 720.0, 6.48 + 360.0 * 1e7] {
      let p = pr.project(46.47, lon);
      assert!((p.x - home.x).abs() <= 1, "lon {lon}: {p:?}");
      assert_eq!(p.y, home.y);
      assert!(p.on_screen);
    }

    let east = pr.project(46.47, 186.48);
    let west = pr.project(46.47, -173.52);
    assert!((east.x - west.x).abs() <= 1);
    assert!(!east.on_screen);
  }

  #[test]
  fn test_extreme_inputs_stay_off_screen() {
    let pr = projector();
    for (lat, lon) in [
      (46.47, f64::INFINITY),
      (46.47, f64::NEG_INFINITY),
      (46.47, f64::NAN),
      (f64::NAN, 6.48),
    ] {
      let p = pr.project(lat, lon);
      assert!(!p.on_screen, "{lat} {lon}");
    }
    // finite extremes fold back onto the globe
    assert_eq!(pr.project(46.47, f64::MAX).y, pr.project(46.47, 0.0).y);

    let far = Projector::new(8, -1e300, 1e300, &layout()).project(0.0, 0.0);
    assert_eq!(far.x, PIXEL_LIMIT as i32);
    assert_eq!(far.y, -(PIXEL_LIMIT as i32));
    assert!(!far.on_screen);
  }
}
