use std::path::Path;

use super::surface::{read_asset, AssetError};
use crate::{config, types::Size};

pub const BUCKETS: usize = 360;

/// Heading to atlas bucket, for atlases baked in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingMap {
  pub ccw: bool,
  pub offset_deg: i32,
  pub flip_180: bool,
}

impl Default for HeadingMap {
  fn default() -> Self {
    Self {
      ccw: true,
      offset_deg: 0,
      flip_180: false,
    }
  }
}

impl From<&config::Sprite> for HeadingMap {
  fn from(cfg: &config::Sprite) -> Self {
    Self {
      ccw: cfg.ccw,
      offset_deg: cfg.offset_deg,
      flip_180: cfg.flip_180,
    }
  }
}

impl HeadingMap {
  pub fn bucket(&self, heading: i32) -> u16 {
    let mut h = heading.rem_euclid(360);
    if self.ccw {
      h = (360 - h) % 360;
    }
    h = (h + self.offset_deg).rem_euclid(360);
    if self.flip_180 {
      h = (h + 180) % 360;
    }
    h as u16
  }
}

/// 1-bit opacity mask, rows of `stride` bytes, most significant bit first.
#[derive(Debug, Clone, Copy)]
pub struct Mask<'a> {
  bits: &'a [u8],
  size: Size,
  stride: usize,
}

impl<'a> Mask<'a> {
  pub fn size(&self) -> Size {
    self.size
  }

  pub fn is_set(&self, x: i32, y: i32) -> bool {
    if x < 0 || y < 0 || x >= self.size.w || y >= self.size.h {
      return false;
    }
    let byte = self.bits[y as usize * self.stride + (x as usize >> 3)];
    byte & (0x80 >> (x & 7)) != 0
  }

  pub fn runs(&self, y: i32) -> Runs<'a> {
    Runs {
      mask: *self,
      y,
      x: 0,
    }
  }
}

pub struct Runs<'a> {
  mask: Mask<'a>,
  y: i32,
  x: i32,
}

impl<'a> Iterator for Runs<'a> {
  type Item = (i32, i32);

  fn next(&mut self) -> Option<Self::Item> {
    let w = self.mask.size.w;
    while self.x < w && !self.mask.is_set(self.x, self.y) {
      self.x += 1;
    }
    if self.x >= w {
      return None;
    }
    let start = self.x;
    while self.x < w && self.mask.is_set(self.x, self.y) {
      self.x += 1;
    }
    Some((start, self.x - start))
  }
}

#[derive(Debug, Clone)]
pub struct SpriteAtlas {
  size: Size,
  stride: usize,
  masks: Vec<u8>,
}

impl SpriteAtlas {
  fn stride_for(size: Size) -> usize {
    (size.w as usize + 7) / 8
  }

  fn mask_len(&self) -> usize {
    self.stride * self.size.h as usize
  }

  pub fn load<P: AsRef<Path>>(path: P, size: Size) -> Result<Self, AssetError> {
    let stride = Self::stride_for(size);
    let masks = read_asset(path.as_ref(), BUCKETS * stride * size.h as usize)?;
    Ok(Self {
      size,
      stride,
      masks,
    })
  }

  /// Builds an aircraft silhouette for every bucket, bucket `b` pointing `b`
  /// degrees counter-clockwise from north.
  pub fn generated(size: Size) -> Self {
    let stride = Self::stride_for(size);
    let mask_len = stride * size.h as usize;
    let mut masks = vec![0u8; BUCKETS * mask_len];
    let scale = size.w.min(size.h) as f64 / 32.0;
    let (cx, cy) = (size.w as f64 / 2.0, size.h as f64 / 2.0);

    for bucket in 0..BUCKETS {
      let theta = ((360 - bucket) % 360) as f64;
      let (sin, cos) = theta.to_radians().sin_cos();
      let mask = &mut masks[bucket * mask_len..(bucket + 1) * mask_len];
      for py in 0..size.h {
        for px in 0..size.w {
          let dx = (px as f64 + 0.5 - cx) / scale;
          let dy = (py as f64 + 0.5 - cy) / scale;
          // aircraft frame: v along the nose, u towards the right wing
          let v = dx * sin - dy * cos;
          let u = dx * cos + dy * sin;
          if silhouette(u, v) {
            mask[py as usize * stride + (px as usize >> 3)] |= 0x80 >> (px & 7);
          }
        }
      }
    }
    Self {
      size,
      stride,
      masks,
    }
  }

  pub fn size(&self) -> Size {
    self.size
  }

  pub fn mask(&self, bucket: u16) -> Mask<'_> {
    let len = self.mask_len();
    let start = (bucket as usize % BUCKETS) * len;
    Mask {
      bits: &self.masks[start..start + len],
      size: self.size,
      stride: self.stride,
    }
  }
}

fn silhouette(u: f64, v: f64) -> bool {
  let au = u.abs();
  let fuselage = au <= 1.6 && (-12.0..=13.0).contains(&v);
  let wings = au <= 13.0 && v <= 2.0 - 0.45 * au && v >= -3.0 - 0.45 * au;
  let tail = au <= 5.5 && (-12.5..=-9.0).contains(&v);
  fuselage || wings || tail
}
