use std::{
  convert::Infallible,
  error::Error,
  fmt::Display,
  fs::File,
  io::{BufWriter, Read, Write},
  path::{Path, PathBuf},
};

use embedded_graphics::{
  draw_target::DrawTarget,
  geometry::{OriginDimensions, Point as PixelPoint, Size as PixelSize},
  mono_font::{ascii::FONT_6X9, MonoTextStyle, MonoTextStyleBuilder},
  pixelcolor::{raw::RawU16, Rgb565, RgbColor},
  primitives::Rectangle,
  text::{Baseline, Text},
  Drawable, Pixel,
};

use crate::types::{Rect, Size};

pub const GLYPH_W: i32 = 6;
pub const GLYPH_H: i32 = 9;

pub trait Surface: DrawTarget<Color = Rgb565> {
  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

pub trait Background {
  fn size(&self) -> Size;

  /// `w` pixels of row `y` starting at column `x`; the span must lie inside
  /// the image.
  fn row(&self, x: i32, y: i32, w: i32) -> &[Rgb565];
}

pub fn text_style() -> MonoTextStyle<'static, Rgb565> {
  MonoTextStyleBuilder::new()
    .font(&FONT_6X9)
    .text_color(Rgb565::WHITE)
    .background_color(Rgb565::BLACK)
    .build()
}

pub fn draw_text<D>(target: &mut D, x: i32, y: i32, text: &str) -> Result<(), D::Error>
where
  D: DrawTarget<Color = Rgb565>,
{
  Text::with_baseline(text, PixelPoint::new(x, y), text_style(), Baseline::Top).draw(target)?;
  Ok(())
}

#[derive(Debug)]
pub enum AssetError {
  Io(std::io::Error),
  InvalidLength(usize, usize),
}

impl Display for AssetError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AssetError::Io(err) => write!(f, "AssetError: {err}"),
      AssetError::InvalidLength(expected, got) => {
        write!(f, "invalid asset length: expected {expected}, got {got}")
      }
    }
  }
}

impl Error for AssetError {}

impl From<std::io::Error> for AssetError {
  fn from(value: std::io::Error) -> Self {
    Self::Io(value)
  }
}

pub(crate) fn read_asset(path: &Path, expected: usize) -> Result<Vec<u8>, AssetError> {
  let mut raw = vec![];
  File::open(path)?.read_to_end(&mut raw)?;
  if raw.len() != expected {
    return Err(AssetError::InvalidLength(expected, raw.len()));
  }
  Ok(raw)
}

#[derive(Debug, Clone)]
pub struct BackgroundImage {
  size: Size,
  pixels: Vec<Rgb565>,
}

impl BackgroundImage {
  pub fn solid(size: Size, color: Rgb565) -> Self {
    Self {
      size,
      pixels: vec![color; (size.w * size.h) as usize],
    }
  }

  pub fn from_pixels(size: Size, pixels: Vec<Rgb565>) -> Result<Self, AssetError> {
    let expected = (size.w * size.h) as usize;
    if pixels.len() != expected {
      return Err(AssetError::InvalidLength(expected, pixels.len()));
    }
    Ok(Self { size, pixels })
  }

  pub fn load<P: AsRef<Path>>(path: P, size: Size) -> Result<Self, AssetError> {
    let raw = read_asset(path.as_ref(), (size.w * size.h) as usize * 2)?;
    let pixels = raw
      .chunks_exact(2)
      .map(|px| RawU16::new(u16::from_le_bytes([px[0], px[1]])).into())
      .collect();
    Self::from_pixels(size, pixels)
  }
}

impl Background for BackgroundImage {
  fn size(&self) -> Size {
    self.size
  }

  fn row(&self, x: i32, y: i32, w: i32) -> &[Rgb565] {
    let start = (y * self.size.w + x) as usize;
    &self.pixels[start..start + w as usize]
  }
}

/// In-memory display. With a snapshot path set, every flushed frame is
/// written there as a PPM image.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
  size: Size,
  pixels: Vec<Rgb565>,
  snapshot: Option<PathBuf>,
}

impl FrameBuffer {
  pub fn new(size: Size) -> Self {
    Self {
      size,
      pixels: vec![Rgb565::BLACK; (size.w * size.h) as usize],
      snapshot: None,
    }
  }

  pub fn with_snapshot<P: Into<PathBuf>>(size: Size, path: P) -> Self {
    Self {
      snapshot: Some(path.into()),
      ..Self::new(size)
    }
  }

  pub fn pixel(&self, x: i32, y: i32) -> Rgb565 {
    self.pixels[(y * self.size.w + x) as usize]
  }

  fn index(&self, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x >= self.size.w || y >= self.size.h {
      None
    } else {
      Some((y * self.size.w + x) as usize)
    }
  }

  fn bounds(&self) -> Rect {
    Rect::new(0, 0, self.size.w, self.size.h)
  }

  pub fn write_ppm<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write!(out, "P6\n{} {}\n255\n", self.size.w, self.size.h)?;
    for px in self.pixels.iter() {
      let (r, g, b) = (px.r(), px.g(), px.b());
      out.write_all(&[r << 3 | r >> 2, g << 2 | g >> 4, b << 3 | b >> 2])?;
    }
    out.flush()
  }
}

impl OriginDimensions for FrameBuffer {
  fn size(&self) -> PixelSize {
    self.size.into()
  }
}

impl DrawTarget for FrameBuffer {
  type Color = Rgb565;
  type Error = Infallible;

  fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
  where
    I: IntoIterator<Item = Pixel<Self::Color>>,
  {
    for Pixel(PixelPoint { x, y }, color) in pixels {
      if let Some(idx) = self.index(x, y) {
        self.pixels[idx] = color;
      }
    }
    Ok(())
  }

  fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
    let clipped = Rect::from(*area).clamp_to(&self.bounds());
    for y in clipped.y..clipped.bottom() {
      let start = (y * self.size.w + clipped.x) as usize;
      self.pixels[start..start + clipped.w as usize].fill(color);
    }
    Ok(())
  }
}

impl Surface for FrameBuffer {
  fn flush(&mut self) -> std::io::Result<()> {
    match &self.snapshot {
      Some(path) => self.write_ppm(path),
      None => Ok(()),
    }
  }
}
