use std::{error::Error, fmt::Debug};

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::time::{interval, MissedTickBehavior};

use crate::{
  config::Config,
  ingest::{Ingestor, Link, Snapshot, Source},
  projector::Projector,
  render::{
    sprite::SpriteAtlas,
    status::StatusCounts,
    surface::{Background, Surface},
    Frame, Renderer,
  },
  select::Selector,
  track::TrackStore,
  util::{seconds_since, Clock, Timestamp},
};

pub struct Manager<S: Surface, B: Background, L: Link> {
  cfg: Config,
  clock: Clock,
  store: TrackStore,
  selector: Selector,
  renderer: Renderer<B>,
  ingestor: Ingestor,
  surface: S,
  link: L,
  counts: StatusCounts,
}

impl<S, B, L> Manager<S, B, L>
where
  S: Surface,
  S::Error: Debug,
  B: Background,
  L: Link,
{
  pub fn new(cfg: Config, mut surface: S, background: B, atlas: SpriteAtlas, link: L) -> Self {
    info!("setting display manager up");
    let store = TrackStore::new(Projector::from_config(&cfg), cfg.tracks.ttl);
    let selector = Selector::from_config(&cfg);
    let ingestor = Ingestor::from_config(&cfg);
    let mut renderer = Renderer::from_config(&cfg, background, atlas);
    if let Err(err) = renderer.full_redraw(&mut surface) {
      error!("error drawing background: {err:?}");
    }

    Self {
      cfg,
      clock: Clock::new(),
      store,
      selector,
      renderer,
      ingestor,
      surface,
      link,
      counts: StatusCounts::default(),
    }
  }

  pub fn config(&self) -> &Config {
    &self.cfg
  }

  pub fn store(&self) -> &TrackStore {
    &self.store
  }

  pub fn surface(&self) -> &S {
    &self.surface
  }

  pub fn counts(&self) -> StatusCounts {
    self.counts
  }

  /// Applies a snapshot, if any, and renders. Returns `None` without
  /// touching the store or the screen while the link is down, and when the
  /// surface fails mid-frame.
  pub fn cycle(&mut self, snapshot: Option<Snapshot>, now: Timestamp) -> Option<Frame> {
    if !self.link.is_up() {
      debug!("link down, skipping cycle");
      return None;
    }

    let mut evicted = vec![];
    if let Some(snapshot) = snapshot {
      self.counts = StatusCounts {
        seen: snapshot.seen,
        with_position: snapshot.with_position,
      };
      for sighting in snapshot.sightings.iter() {
        if let Some(rect) = self.store.upsert(sighting, now) {
          evicted.push(rect);
        }
      }
      debug!(
        "{} tracks updated, {} in store",
        snapshot.sightings.len(),
        self.store.len()
      );
    }

    let frame = self.renderer.render(
      &mut self.surface,
      &mut self.store,
      &self.selector,
      &evicted,
      self.counts,
      now,
    );
    let frame = match frame {
      Ok(frame) => frame,
      Err(err) => {
        error!("error drawing frame: {err:?}");
        return None;
      }
    };
    if let Err(err) = self.surface.flush() {
      error!("error flushing frame: {err}");
    }
    Some(frame)
  }

  async fn pull(&self, source: &Source) -> Option<Snapshot> {
    info!("loading aircraft data");
    let t = Utc::now();
    let res = source.pull().await;
    let process_time = seconds_since(t);
    match res {
      Ok(data) => {
        info!("aircraft data loaded in {}s", process_time);
        Some(self.ingestor.adapt(data))
      }
      Err(err) => {
        error!("error loading aircraft data: {err}");
        None
      }
    }
  }

  pub async fn run(&mut self, source: &Source) -> Result<(), Box<dyn Error>> {
    let mut ticker = interval(self.cfg.api.poll_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      ticker.tick().await;
      if !self.link.is_up() {
        warn!("link down, waiting");
        continue;
      }
      let snapshot = self.pull(source).await;

      let t = Utc::now();
      let frame = self.cycle(snapshot, self.clock.now());
      if let Some(frame) = frame {
        info!(
          "{} tracks drawn, {} regions restored in {}s",
          frame.painted.len(),
          frame.restored.len(),
          seconds_since(t)
        );
      }
    }
  }
}
