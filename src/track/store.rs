use std::time::Duration;

use log::{debug, trace};

use super::{AltitudeBand, Sighting, Track, TrackId};
use crate::{projector::Projector, types::Rect, util::Timestamp};

pub const MAX_TRACKS: usize = 200;

pub type SlotId = usize;

/// Fixed-capacity table of live tracks.
#[derive(Debug)]
pub struct TrackStore<const N: usize = MAX_TRACKS> {
  slots: Box<[Track; N]>,
  occupied: [bool; N],
  projector: Projector,
  ttl: Duration,
}

impl<const N: usize> TrackStore<N> {
  pub fn new(projector: Projector, ttl: Duration) -> Self {
    Self {
      slots: Box::new(std::array::from_fn(|_| Track::EMPTY)),
      occupied: [false; N],
      projector,
      ttl,
    }
  }

  pub fn capacity(&self) -> usize {
    N
  }

  pub fn len(&self) -> usize {
    self.occupied.iter().filter(|o| **o).count()
  }

  pub fn is_empty(&self) -> bool {
    !self.occupied.iter().any(|o| *o)
  }

  pub fn find(&self, id: &TrackId) -> Option<SlotId> {
    (0..N).find(|&slot| self.occupied[slot] && self.slots[slot].id == *id)
  }

  pub fn get(&self, slot: SlotId) -> Option<&Track> {
    if slot < N && self.occupied[slot] {
      Some(&self.slots[slot])
    } else {
      None
    }
  }

  pub fn get_by_id(&self, id: &TrackId) -> Option<&Track> {
    self.find(id).map(|slot| &self.slots[slot])
  }

  pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Track)> + '_ {
    self
      .slots
      .iter()
      .enumerate()
      .filter(|(slot, _)| self.occupied[*slot])
  }

  fn allocate(&self) -> SlotId {
    if let Some(free) = (0..N).find(|&slot| !self.occupied[slot]) {
      return free;
    }
    // strict comparison keeps the lowest index on ties
    let mut oldest = 0;
    for slot in 1..N {
      if self.slots[slot].updated_at < self.slots[oldest].updated_at {
        oldest = slot;
      }
    }
    oldest
  }

  /// Applies a sighting, creating the track on first sight of its identity.
  /// Returns the rectangle to erase when a painted track had to be evicted
  /// to make room.
  pub fn upsert(&mut self, sighting: &Sighting, now: Timestamp) -> Option<Rect> {
    let mut erase = None;
    let slot = match self.find(&sighting.id) {
      Some(slot) => slot,
      None => {
        let slot = self.allocate();
        if self.occupied[slot] {
          let evicted = &self.slots[slot];
          debug!(
            "table full, evicting {} (idle {:?}) for {}",
            evicted.id,
            evicted.age(now),
            sighting.id
          );
          if evicted.painted {
            erase = Some(evicted.last_painted);
          }
        }
        self.slots[slot] = Track {
          id: sighting.id.clone(),
          ..Track::EMPTY
        };
        self.occupied[slot] = true;
        slot
      }
    };

    let projection = self
      .projector
      .project(sighting.position.lat, sighting.position.lng);
    let track = &mut self.slots[slot];
    track.callsign = sighting.callsign.clone();
    track.position = sighting.position;
    track.heading = sighting.heading % 360;
    track.altitude = sighting.altitude;
    track.band = AltitudeBand::from(sighting.altitude);
    track.cx = projection.x;
    track.cy = projection.y;
    track.updated_at = now;
    erase
  }

  pub fn expire(&mut self, now: Timestamp) -> Vec<Rect> {
    let mut erased = vec![];
    for slot in 0..N {
      if !self.occupied[slot] {
        continue;
      }
      let track = &self.slots[slot];
      if track.age(now) > self.ttl {
        trace!("expiring {} after {:?}", track.id, track.age(now));
        if track.painted {
          erased.push(track.last_painted);
        }
        self.slots[slot] = Track::EMPTY;
        self.occupied[slot] = false;
      }
    }
    erased
  }

  pub(crate) fn mark_painted(&mut self, slot: SlotId, rect: Rect) {
    if slot < N && self.occupied[slot] {
      let track = &mut self.slots[slot];
      track.last_painted = rect;
      track.painted = true;
    }
  }

  pub(crate) fn take_painted(&mut self, slot: SlotId) -> Option<Rect> {
    if slot >= N || !self.occupied[slot] {
      return None;
    }
    let track = &mut self.slots[slot];
    if track.painted {
      track.painted = false;
      Some(track.last_painted)
    } else {
      None
    }
  }
}
