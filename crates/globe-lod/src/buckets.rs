//! Per-frame grouping of chunks by desired detail level.

use glam::Vec3;

use crate::LodSelector;

/// Chunk indices grouped by the level they should be rebuilt at.
///
/// Rebuilt every frame; the inner vectors keep their allocations between
/// frames.
#[derive(Clone, Debug, Default)]
pub struct LodBuckets {
    levels: Vec<Vec<usize>>,
}

impl LodBuckets {
    pub fn new(max_levels: u8) -> Self {
        Self {
            levels: vec![Vec::new(); usize::from(max_levels)],
        }
    }

    /// Empty every bucket and resize to `max_levels` buckets.
    pub fn reset(&mut self, max_levels: u8) {
        self.levels.resize_with(usize::from(max_levels), Vec::new);
        for bucket in &mut self.levels {
            bucket.clear();
        }
    }

    /// Add `chunk` to the bucket for `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level` is not below the configured number of levels.
    pub fn push(&mut self, level: u8, chunk: usize) {
        self.levels[usize::from(level)].push(chunk);
    }

    /// Chunks waiting for `level`, in insertion order.
    #[must_use]
    pub fn bucket(&self, level: u8) -> &[usize] {
        self.levels
            .get(usize::from(level))
            .map_or(&[], Vec::as_slice)
    }

    /// Total number of bucketed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.levels.iter().filter(|b| !b.is_empty()).count()
    }

    /// Non-empty buckets from the highest level down to level 0.
    pub fn iter_descending(&self) -> impl Iterator<Item = (u8, &[usize])> {
        self.levels
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, b)| !b.is_empty())
            .map(|(level, b)| (level as u8, b.as_slice()))
    }

    /// Rebuild the buckets for this frame.
    ///
    /// `chunks` yields `(center, current_level)` per chunk in index order.
    pub fn rebuild<I>(&mut self, selector: &LodSelector, chunks: I, view: Vec3, force: bool)
    where
        I: IntoIterator<Item = (Vec3, Option<u8>)>,
    {
        self.reset(selector.max_levels());
        for (index, (center, current)) in chunks.into_iter().enumerate() {
            if let Some(level) = selector.select(center, current, view, force) {
                self.push(level, index);
            }
        }
    }
}
