use crate::types::Rect;

#[derive(Debug, Default)]
pub struct DirtySet {
  rects: Vec<Rect>,
}

impl DirtySet {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      rects: Vec::with_capacity(capacity),
    }
  }

  pub fn clear(&mut self) {
    self.rects.clear();
  }

  pub fn push(&mut self, rect: Rect) {
    self.rects.push(rect);
  }

  pub fn extend<I: IntoIterator<Item = Rect>>(&mut self, rects: I) {
    self.rects.extend(rects);
  }

  pub fn rects(&self) -> &[Rect] {
    &self.rects
  }

  pub fn clamp(&mut self, bounds: &Rect) {
    for rect in self.rects.iter_mut() {
      *rect = rect.clamp_to(bounds);
    }
    self.rects.retain(|r| !r.is_empty());
  }

  /// Unions intersecting regions until no two of them intersect.
  pub fn merge(&mut self) {
    loop {
      let mut merged = false;
      let mut i = 0;
      while i < self.rects.len() {
        let mut j = i + 1;
        while j < self.rects.len() {
          if self.rects[i].intersects(&self.rects[j]) {
            self.rects[i] = self.rects[i].union(&self.rects[j]);
            self.rects.swap_remove(j);
            merged = true;
            // the grown region may now reach earlier candidates
            j = i + 1;
          } else {
            j += 1;
          }
        }
        i += 1;
      }
      if !merged {
        break;
      }
    }
  }
}
