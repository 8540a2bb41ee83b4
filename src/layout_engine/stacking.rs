//! Stacking order. z is a plain integer per block layout; higher draws on
//! top. Assignments only ever move upward so "last touched" stays topmost.

use serde::{Deserialize, Serialize};

use crate::model::workspace::BlockLayout;

/// One greater than the highest z present, or 1 on an empty canvas.
pub fn next_z<'a>(layouts: impl IntoIterator<Item = &'a BlockLayout>) -> u64 {
    layouts.into_iter().map(|layout| layout.z).max().map_or(1, |z| z + 1)
}

/// Whether `target` draws above every layout in `others`. A tie is not
/// topmost: ties are broken by recency, and the tied sibling may have been
/// assigned later.
pub fn is_topmost<'a>(
    target: &BlockLayout,
    others: impl IntoIterator<Item = &'a BlockLayout>,
) -> bool {
    others.into_iter().all(|layout| layout.z < target.z)
}

/// High-water mark for z assignment. `next_z` alone would let z slide back
/// down after the topmost block is removed; routing every assignment through
/// this counter keeps z monotonically non-decreasing for the whole engine
/// lifetime.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ZCounter {
    high_water: u64,
}

impl ZCounter {
    pub fn new() -> Self { Self::default() }

    /// Next z for the block being raised, given every layout on the canvas.
    pub fn bump<'a>(&mut self, layouts: impl IntoIterator<Item = &'a BlockLayout>) -> u64 {
        let next = next_z(layouts).max(self.high_water + 1);
        self.high_water = next;
        next
    }

    /// Fold an externally supplied z (e.g. restored from storage) into the
    /// mark so later bumps land above it.
    pub fn observe(&mut self, z: u64) { self.high_water = self.high_water.max(z); }

    pub fn high_water(&self) -> u64 { self.high_water }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn layout(z: u64) -> BlockLayout { BlockLayout::new(Rect::new(0.0, 0.0, 100.0, 100.0), z) }

    #[test]
    fn test_next_z_empty_is_one() {
        assert_eq!(next_z([]), 1);
    }

    #[test]
    fn test_next_z_is_max_plus_one() {
        let layouts = [layout(3), layout(7), layout(2)];
        assert_eq!(next_z(layouts.iter()), 8);
    }

    #[test]
    fn test_is_topmost_requires_strict_max() {
        let target = layout(5);
        assert!(is_topmost(&target, [layout(3), layout(4)].iter()));
        assert!(!is_topmost(&target, [layout(5)].iter()));
        assert!(!is_topmost(&target, [layout(6)].iter()));
        assert!(is_topmost(&target, [].iter()));
    }

    #[test]
    fn test_counter_never_moves_down() {
        let mut counter = ZCounter::new();
        let layouts = [layout(3), layout(7)];
        assert_eq!(counter.bump(layouts.iter()), 8);

        // the z=7 and z=8 blocks go away; the next bump must not reuse 8
        let remaining = [layout(3)];
        assert_eq!(counter.bump(remaining.iter()), 9);
        assert_eq!(counter.bump(remaining.iter()), 10);
    }

    #[test]
    fn test_observe_raises_the_mark() {
        let mut counter = ZCounter::new();
        counter.observe(41);
        assert_eq!(counter.bump([].iter()), 42);
    }
}
