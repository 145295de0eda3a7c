use std::time::Duration;

use crate::{
  config::Config,
  track::{SlotId, TrackStore},
  types::{Layout, Rect, Size},
  util::Timestamp,
};

#[derive(Debug, Clone)]
pub struct Selector {
  stale_after: Duration,
  max_draw: usize,
  drawable: Rect,
  sprite: Size,
}

impl Selector {
  pub fn new(stale_after: Duration, max_draw: usize, layout: &Layout) -> Self {
    Self {
      stale_after,
      max_draw,
      drawable: layout.drawable(),
      sprite: layout.sprite,
    }
  }

  pub fn from_config(cfg: &Config) -> Self {
    Self::new(cfg.tracks.stale_after, cfg.tracks.max_draw, &cfg.layout())
  }

  /// Paint order, lowest first. The cap is applied in slot order.
  pub fn select<const N: usize>(&self, store: &TrackStore<N>, now: Timestamp) -> Vec<SlotId> {
    let mut selected: Vec<SlotId> = store
      .iter()
      .filter(|(_, t)| t.age(now) <= self.stale_after)
      .filter(|(_, t)| Rect::centered(t.cx, t.cy, self.sprite).intersects(&self.drawable))
      .map(|(slot, _)| slot)
      .take(self.max_draw)
      .collect();

    // sort_by_key is stable, equal altitudes keep slot order
    selected.sort_by_key(|slot| store.get(*slot).map(|t| t.altitude));
    selected
  }
}
