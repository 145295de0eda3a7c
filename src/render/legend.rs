use embedded_graphics::{
  draw_target::DrawTarget,
  pixelcolor::{Rgb565, RgbColor},
  primitives::{Primitive, PrimitiveStyleBuilder, Rectangle, StrokeAlignment},
  Drawable,
};

use super::surface::{draw_text, GLYPH_H, GLYPH_W};
use crate::{
  track::AltitudeBand,
  types::{Layout, Rect},
};

const LEFT_MARGIN: i32 = 50;
const TITLE: &str = "ALT m:";
const TITLE_ADVANCE: i32 = 46;
const SWATCH: i32 = 10;
const LABEL_GAP: i32 = 3;
const ENTRY_GAP: i32 = 10;

pub fn draw_legend<D>(target: &mut D, layout: &Layout) -> Result<(), D::Error>
where
  D: DrawTarget<Color = Rgb565>,
{
  let strip = layout.legend_strip();
  target.fill_solid(&strip.into(), Rgb565::BLACK)?;

  let text_y = strip.y + (strip.h - GLYPH_H) / 2;
  let swatch_y = strip.y + (strip.h - SWATCH) / 2 - 1;

  let mut x = LEFT_MARGIN;
  draw_text(target, x, text_y, TITLE)?;
  x += TITLE_ADVANCE;

  for (band, label) in AltitudeBand::LEGEND.iter() {
    let style = PrimitiveStyleBuilder::new()
      .fill_color(band.color())
      .stroke_color(Rgb565::WHITE)
      .stroke_width(1)
      .stroke_alignment(StrokeAlignment::Inside)
      .build();
    Rectangle::from(Rect::new(x, swatch_y, SWATCH, SWATCH))
      .into_styled(style)
      .draw(target)?;
    x += SWATCH + LABEL_GAP;

    draw_text(target, x, text_y, label)?;
    x += label.len() as i32 * GLYPH_W + ENTRY_GAP;
  }
  Ok(())
}

#[cfg(test)]
pub mod tests {
  use super::*;
  use crate::{
    render::surface::{tests::region, FrameBuffer},
    types::tests::layout,
  };

  fn text_rect(x: i32, text: &str) -> Rect {
    Rect::new(x, 4, text.len() as i32 * GLYPH_W, GLYPH_H)
  }

  #[test]
  fn test_legend_layout() {
    let l = layout();
    let mut fb = FrameBuffer::new(l.screen);
    fb.clear(Rgb565::RED).unwrap();
    draw_legend(&mut fb, &l).unwrap();

    // same text drawn on its own at the expected spots
    let mut expect = FrameBuffer::new(l.screen);
    draw_text(&mut expect, LEFT_MARGIN, 4, TITLE).unwrap();
    let title = text_rect(LEFT_MARGIN, TITLE);
    assert_eq!(region(&fb, title), region(&expect, title));

    let mut x = LEFT_MARGIN + TITLE_ADVANCE;
    for (band, label) in AltitudeBand::LEGEND.iter() {
      // outlined swatch filled with the band colour
      assert_eq!(fb.pixel(x, 3), Rgb565::WHITE, "{label}");
      assert_eq!(fb.pixel(x + SWATCH - 1, 12), Rgb565::WHITE, "{label}");
      assert_eq!(fb.pixel(x + 5, 8), band.color(), "{label}");
      x += SWATCH + LABEL_GAP;

      draw_text(&mut expect, x, 4, label).unwrap();
      let cells = text_rect(x, label);
      assert_eq!(region(&fb, cells), region(&expect, cells), "{label}");
      x += label.len() as i32 * GLYPH_W + ENTRY_GAP;
    }

    // strip background
    assert_eq!(fb.pixel(0, 0), Rgb565::BLACK);
    assert_eq!(fb.pixel(479, 17), Rgb565::BLACK);
    // nothing below the strip is touched
    assert_eq!(fb.pixel(0, 18), Rgb565::RED);
  }
}
