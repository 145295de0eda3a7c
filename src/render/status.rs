use std::fmt::Write;

use embedded_graphics::{
  draw_target::DrawTarget,
  pixelcolor::{Rgb565, RgbColor},
};

use super::surface::{draw_text, GLYPH_H, GLYPH_W};
use crate::{
  track::Track,
  types::{Layout, Point},
};

pub const MAX_CHARS: usize = 95;
const LEFT_MARGIN: i32 = 25;
const TEXT_Y_OFFSET: i32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
  pub seen: usize,
  pub with_position: usize,
}

pub fn compose(counts: StatusCounts, drawn: &[&Track], home: &Point) -> String {
  let mut line = format!(
    "Tot {}  Pos {}  Drw {}",
    counts.seen,
    counts.with_position,
    drawn.len()
  );

  let mut near: Option<(&Track, f64)> = None;
  let mut far_km = 0.0f64;
  for &t in drawn.iter() {
    let d = home.distance_km(&t.position);
    if near.map_or(true, |(_, near_km)| d < near_km) {
      near = Some((t, d));
    }
    far_km = far_km.max(d);
  }
  let max_alt = drawn.iter().filter_map(|t| t.altitude.meters()).max();

  // writing into a String cannot fail
  let _ = match near {
    Some((t, near_km)) => write!(
      line,
      " | NEAR {} {:.1}km | FAR {:.1}km",
      t.label(),
      near_km,
      far_km
    ),
    None => write!(line, " | NEAR --- --.-km | FAR --.-km"),
  };
  let _ = match max_alt {
    Some(m) => write!(line, " | MAX ALT {m}m"),
    None => write!(line, " | MAX ALT ---"),
  };
  line
}

/// Bottom status strip. Keeps the last drawn text so later updates only touch
/// the glyph cells that changed.
#[derive(Debug, Default)]
pub struct StatusLine {
  prev: Vec<char>,
  has_prev: bool,
}

impl StatusLine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn reset(&mut self) {
    self.prev.clear();
    self.has_prev = false;
  }

  fn origin(layout: &Layout) -> (i32, i32) {
    let strip = layout.status_strip();
    let y = strip.y + (strip.h - GLYPH_H) / 2 + TEXT_Y_OFFSET;
    (LEFT_MARGIN, y)
  }

  pub fn draw<D>(&mut self, target: &mut D, layout: &Layout, text: &str) -> Result<usize, D::Error>
  where
    D: DrawTarget<Color = Rgb565>,
  {
    let cur: Vec<char> = text.chars().take(MAX_CHARS).collect();
    let (x0, y) = Self::origin(layout);

    if !self.has_prev {
      target.fill_solid(&layout.status_strip().into(), Rgb565::BLACK)?;
      let line: String = cur.iter().collect();
      draw_text(target, x0, y, &line)?;
      self.prev = cur;
      self.has_prev = true;
      return Ok(self.prev.len());
    }

    let mut cells = 0;
    let mut buf = [0u8; 4];
    for i in 0..self.prev.len().max(cur.len()) {
      let old = self.prev.get(i).copied();
      let new = cur.get(i).copied();
      if old == new {
        continue;
      }
      // a cell whose character went away is blanked
      let ch = new.unwrap_or(' ');
      draw_text(target, x0 + i as i32 * GLYPH_W, y, ch.encode_utf8(&mut buf))?;
      cells += 1;
    }
    self.prev = cur;
    Ok(cells)
  }
}

#[cfg(test)]
pub mod tests {
  use super::*;
  use crate::{
    render::surface::{tests::region, FrameBuffer},
    track::Altitude,
    types::tests::layout,
    util::bounded,
  };

  fn home() -> Point {
    Point {
      lat: 46.4717185,
      lng: 6.4767709,
    }
  }

  fn track(id: &str, callsign: &str, lat: f64, altitude: Altitude) -> Track {
    Track {
      id: bounded(id),
      callsign: bounded(callsign),
      position: Point {
        lat,
        lng: home().lng,
      },
      altitude,
      ..Track::EMPTY
    }
  }

  /// The status strip as a fresh screen shows `text`
  fn strip_showing(text: &str) -> Vec<Rgb565> {
    let l = layout();
    let mut fb = FrameBuffer::new(l.screen);
    let (x, y) = StatusLine::origin(&l);
    draw_text(&mut fb, x, y, text).unwrap();
    region(&fb, l.status_strip())
  }

  #[test]
  fn test_compose_empty() {
    let counts = StatusCounts {
      seen: 12,
      with_position: 7,
    };
    assert_eq!(
      compose(counts, &[], &home()),
      "Tot 12  Pos 7  Drw 0 | NEAR --- --.-km | FAR --.-km | MAX ALT ---"
    );
  }

  #[test]
  fn test_compose_near_far_and_max_altitude() {
    let a = track("4b1805", "SWR12", home().lat + 0.1, Altitude::Meters(3000));
    let b = track("3c66b0", "", home().lat + 1.0, Altitude::Meters(11000));
    let c = track("440abc", "EZY1", home().lat - 0.5, Altitude::Unknown);
    let counts = StatusCounts {
      seen: 3,
      with_position: 3,
    };
    assert_eq!(
      compose(counts, &[&c, &a, &b], &home()),
      "Tot 3  Pos 3  Drw 3 | NEAR SWR12 11.1km | FAR 111.2km | MAX ALT 11000m"
    );
  }

  #[test]
  fn test_compose_unknown_altitudes_only() {
    let b = track("3c66b0", "", home().lat + 0.2, Altitude::Unknown);
    let line = compose(StatusCounts::default(), &[&b], &home());
    assert_eq!(
      line,
      "Tot 0  Pos 0  Drw 1 | NEAR 3c66b0 22.2km | FAR 22.2km | MAX ALT ---"
    );
  }

  #[test]
  fn test_first_draw_clears_strip() {
    let l = layout();
    let mut fb = FrameBuffer::new(l.screen);
    fb.fill_solid(&l.status_strip().into(), Rgb565::RED).unwrap();
    let mut status = StatusLine::new();

    let cells = status.draw(&mut fb, &l, "Tot 1").unwrap();
    assert_eq!(cells, 5);
    assert_eq!(region(&fb, l.status_strip()), strip_showing("Tot 1"));
    assert_eq!(fb.pixel(0, 302), Rgb565::BLACK);
    assert_eq!(fb.pixel(479, 319), Rgb565::BLACK);
  }

  #[test]
  fn test_only_changed_cells_redrawn() {
    let l = layout();
    let mut fb = FrameBuffer::new(l.screen);
    let mut status = StatusLine::new();
    status.draw(&mut fb, &l, "Tot 12  Pos 7").unwrap();

    assert_eq!(status.draw(&mut fb, &l, "Tot 12  Pos 7").unwrap(), 0);
    assert_eq!(status.draw(&mut fb, &l, "Tot 13  Pos 7").unwrap(), 1);
    assert_eq!(
      region(&fb, l.status_strip()),
      strip_showing("Tot 13  Pos 7")
    );

    // shrinking blanks the tail
    assert_eq!(status.draw(&mut fb, &l, "Tot 9").unwrap(), 9);
    assert_eq!(region(&fb, l.status_strip()), strip_showing("Tot 9"));
  }

  #[test]
  fn test_text_is_truncated() {
    let l = layout();
    let mut fb = FrameBuffer::new(l.screen);
    let mut status = StatusLine::new();
    let long = "x".repeat(200);
    assert_eq!(status.draw(&mut fb, &l, &long).unwrap(), MAX_CHARS);
    // only the kept prefix is remembered
    let longer = "x".repeat(300);
    assert_eq!(status.draw(&mut fb, &l, &longer).unwrap(), 0);
    assert_eq!(
      region(&fb, l.status_strip()),
      strip_showing(&"x".repeat(MAX_CHARS))
    );
  }

  #[test]
  fn test_reset_forces_full_redraw() {
    let l = layout();
    let mut fb = FrameBuffer::new(l.screen);
    let mut status = StatusLine::new();
    status.draw(&mut fb, &l, "abc").unwrap();
    status.reset();
    assert_eq!(status.draw(&mut fb, &l, "abc").unwrap(), 3);
  }
}
