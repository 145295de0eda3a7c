use embedded_graphics::{
  geometry::{Point as PixelPoint, Size as PixelSize},
  primitives::Rectangle,
};
use geo::HaversineDistance;
use geo_types::{Coord, Point as GeoPoint};
use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Point {
  pub lat: f64,
  pub lng: f64,
}

impl From<Point> for GeoPoint {
  fn from(val: Point) -> Self {
    Self(Coord {
      x: val.lng,
      y: val.lat,
    })
  }
}

impl Point {
  pub const ZERO: Point = Point { lat: 0.0, lng: 0.0 };

  /// Longitude folded into [-180, 180), latitude held at the poles.
  /// Non-finite input stays non-finite.
  pub fn normalized(&self) -> Self {
    let lng = (self.lng + 180.0).rem_euclid(360.0) - 180.0;
    Self {
      lat: self.lat.clamp(-90.0, 90.0),
      lng,
    }
  }

  pub fn distance_km(&self, other: &Point) -> f64 {
    let a: GeoPoint = (*self).into();
    let b: GeoPoint = (*other).into();
    a.haversine_distance(&b) / 1000.0
  }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
  pub w: i32,
  pub h: i32,
}

impl Size {
  pub const fn new(w: i32, h: i32) -> Self {
    Self { w, h }
  }
}

/// Screen-space rectangle, origin top-left, half-open on the right and bottom edges.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
  pub x: i32,
  pub y: i32,
  pub w: i32,
  pub h: i32,
}

impl Rect {
  pub const EMPTY: Rect = Rect::new(0, 0, 0, 0);

  pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
    Self { x, y, w, h }
  }

  pub fn centered(cx: i32, cy: i32, size: Size) -> Self {
    Self::new(cx - size.w / 2, cy - size.h / 2, size.w, size.h)
  }

  pub fn right(&self) -> i32 {
    self.x + self.w
  }

  pub fn bottom(&self) -> i32 {
    self.y + self.h
  }

  pub fn is_empty(&self) -> bool {
    self.w <= 0 || self.h <= 0
  }

  pub fn intersects(&self, other: &Rect) -> bool {
    !(self.right() <= other.x
      || other.right() <= self.x
      || self.bottom() <= other.y
      || other.bottom() <= self.y)
  }

  pub fn contains(&self, other: &Rect) -> bool {
    other.x >= self.x
      && other.y >= self.y
      && other.right() <= self.right()
      && other.bottom() <= self.bottom()
  }

  pub fn union(&self, other: &Rect) -> Rect {
    let x1 = self.x.min(other.x);
    let y1 = self.y.min(other.y);
    let x2 = self.right().max(other.right());
    let y2 = self.bottom().max(other.bottom());
    Rect::new(x1, y1, x2 - x1, y2 - y1)
  }

  pub fn clamp_to(&self, bounds: &Rect) -> Rect {
    let x1 = self.x.max(bounds.x);
    let y1 = self.y.max(bounds.y);
    let x2 = self.right().min(bounds.right());
    let y2 = self.bottom().min(bounds.bottom());
    Rect::new(x1, y1, (x2 - x1).max(0), (y2 - y1).max(0))
  }

}

impl From<Rect> for Rectangle {
  fn from(r: Rect) -> Self {
    Rectangle::new(
      PixelPoint::new(r.x, r.y),
      PixelSize::new(r.w.max(0) as u32, r.h.max(0) as u32),
    )
  }
}

impl From<Rectangle> for Rect {
  fn from(r: Rectangle) -> Self {
    Rect::new(
      r.top_left.x,
      r.top_left.y,
      i32::try_from(r.size.width).unwrap_or(i32::MAX),
      i32::try_from(r.size.height).unwrap_or(i32::MAX),
    )
  }
}

impl From<Size> for PixelSize {
  fn from(s: Size) -> Self {
    PixelSize::new(s.w.max(0) as u32, s.h.max(0) as u32)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
  pub screen: Size,
  pub legend_height: i32,
  pub status_height: i32,
  pub sprite: Size,
}

impl Layout {
  pub fn bounds(&self) -> Rect {
    Rect::new(0, 0, self.screen.w, self.screen.h)
  }

  pub fn drawable(&self) -> Rect {
    Rect::new(
      0,
      self.legend_height,
      self.screen.w,
      self.screen.h - self.legend_height - self.status_height,
    )
  }

  pub fn legend_strip(&self) -> Rect {
    Rect::new(0, 0, self.screen.w, self.legend_height)
  }

  pub fn status_strip(&self) -> Rect {
    Rect::new(
      0,
      self.screen.h - self.status_height,
      self.screen.w,
      self.status_height,
    )
  }
}
