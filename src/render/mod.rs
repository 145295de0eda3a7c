pub mod dirty;
pub mod legend;
pub mod sprite;
pub mod status;
pub mod surface;

use embedded_graphics::draw_target::DrawTarget;
use log::{debug, trace, warn};

use self::{
  dirty::DirtySet,
  legend::draw_legend,
  sprite::{HeadingMap, SpriteAtlas},
  status::{compose, StatusCounts, StatusLine},
  surface::{Background, Surface},
};
use crate::{
  config::Config,
  select::Selector,
  track::{SlotId, Track, TrackId, TrackStore},
  types::{Layout, Point, Rect},
  util::Timestamp,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
  pub restored: Vec<Rect>,
  pub painted: Vec<TrackId>,
  pub status: String,
  pub status_cells: usize,
}

pub struct Renderer<B: Background> {
  layout: Layout,
  background: B,
  atlas: SpriteAtlas,
  heading_map: HeadingMap,
  home: Point,
  dirty: DirtySet,
  status: StatusLine,
}

impl<B: Background> Renderer<B> {
  pub fn new(
    layout: Layout,
    background: B,
    atlas: SpriteAtlas,
    heading_map: HeadingMap,
    home: Point,
  ) -> Self {
    if atlas.size() != layout.sprite {
      warn!(
        "sprite atlas is {:?}, drawing it cropped to {:?}",
        atlas.size(),
        layout.sprite
      );
    }
    Self {
      layout,
      background,
      atlas,
      heading_map,
      home,
      dirty: DirtySet::with_capacity(64),
      status: StatusLine::new(),
    }
  }

  pub fn from_config(cfg: &Config, background: B, atlas: SpriteAtlas) -> Self {
    Self::new(
      cfg.layout(),
      background,
      atlas,
      HeadingMap::from(&cfg.sprite),
      (&cfg.home).into(),
    )
  }

  pub fn full_redraw<S: Surface>(&mut self, surface: &mut S) -> Result<(), S::Error> {
    self.restore(surface, self.layout.bounds())?;
    draw_legend(surface, &self.layout)?;
    self.status.reset();
    Ok(())
  }

  /// `pending_erase` carries rectangles of painted tracks evicted from the
  /// store since the previous pass.
  pub fn render<S: Surface, const N: usize>(
    &mut self,
    surface: &mut S,
    store: &mut TrackStore<N>,
    selector: &Selector,
    pending_erase: &[Rect],
    counts: StatusCounts,
    now: Timestamp,
  ) -> Result<Frame, S::Error> {
    self.dirty.clear();
    self.dirty.extend(pending_erase.iter().copied());
    self.dirty.extend(store.expire(now));

    let selected = selector.select(store, now);

    let dropped: Vec<SlotId> = store
      .iter()
      .filter(|(slot, t)| t.painted && !selected.contains(slot))
      .map(|(slot, _)| slot)
      .collect();
    for slot in dropped {
      if let Some(rect) = store.take_painted(slot) {
        self.dirty.push(rect);
      }
    }

    let mut drawn: Vec<(SlotId, Track)> = Vec::with_capacity(selected.len());
    for slot in selected.iter() {
      if let Some(t) = store.get(*slot) {
        if t.painted {
          self.dirty.push(t.last_painted);
        }
        let rect = self.sprite_rect(t);
        self.dirty.push(rect);
        drawn.push((*slot, t.clone()));
      }
    }

    self.dirty.clamp(&self.layout.drawable());
    self.dirty.merge();

    let regions = self.dirty.rects().to_vec();
    for region in regions.iter() {
      self.restore(surface, *region)?;
      for (_, t) in drawn.iter() {
        self.paint(surface, t, region)?;
      }
    }

    for (slot, t) in drawn.iter() {
      store.mark_painted(*slot, self.sprite_rect(t));
      trace!(
        "{} alt {:?} {:.1}km at ({}, {}) age {:?}",
        t.label(),
        t.altitude,
        self.home.distance_km(&t.position),
        t.cx,
        t.cy,
        t.age(now)
      );
    }

    let tracks: Vec<&Track> = drawn.iter().map(|(_, t)| t).collect();
    let status = compose(counts, &tracks, &self.home);
    let status_cells = self.status.draw(surface, &self.layout, &status)?;

    debug!(
      "drew {} of {} tracks, {} regions restored",
      drawn.len(),
      store.len(),
      regions.len()
    );

    Ok(Frame {
      restored: regions,
      painted: drawn.into_iter().map(|(_, t)| t.id).collect(),
      status,
      status_cells,
    })
  }

  fn sprite_rect(&self, t: &Track) -> Rect {
    Rect::centered(t.cx, t.cy, self.layout.sprite)
  }

  fn restore<S: Surface>(&self, surface: &mut S, rect: Rect) -> Result<(), S::Error> {
    let size = self.background.size();
    let rect = rect.clamp_to(&Rect::new(0, 0, size.w, size.h));
    for y in rect.y..rect.bottom() {
      let row = self.background.row(rect.x, y, rect.w);
      surface.fill_contiguous(&Rect::new(rect.x, y, rect.w, 1).into(), row.iter().copied())?;
    }
    Ok(())
  }

  // a mask of another size is centred on the track and cropped to its rectangle
  fn paint<S: Surface>(&self, surface: &mut S, t: &Track, clip: &Rect) -> Result<(), S::Error> {
    let bbox = self.sprite_rect(t);
    if !bbox.intersects(clip) {
      return Ok(());
    }
    let mask = self.atlas.mask(self.heading_map.bucket(t.heading as i32));
    let origin = Rect::centered(t.cx, t.cy, mask.size());
    let color = t.band.color();
    let clip = bbox.clamp_to(clip);
    for y in clip.y..clip.bottom() {
      for (start, len) in mask.runs(y - origin.y) {
        let x1 = (origin.x + start).max(clip.x);
        let x2 = (origin.x + start + len).min(clip.right());
        if x1 < x2 {
          surface.fill_solid(&Rect::new(x1, y, x2 - x1, 1).into(), color)?;
        }
      }
    }
    Ok(())
  }
}
