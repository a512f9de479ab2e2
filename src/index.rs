// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Point-in-rectangles lookup for the highlighted parts of one schematic.

use crate::geometry::{Point, Rect};

/// Immutable set of highlight rectangles in schematic-pixel space.
///
/// Queries are a linear scan; one board carries hundreds of rectangles at
/// most, and the index is rebuilt from scratch on every selection change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightIndex {
    rects: Vec<Rect>,
}

impl HighlightIndex {
    /// Builds an index, keeping input order and skipping empty rectangles.
    pub fn new<I>(rects: I) -> Self
    where
        I: IntoIterator<Item = Rect>,
    {
        Self {
            rects: rects.into_iter().filter(|r| !r.is_empty()).collect(),
        }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// True when at least one rectangle contains `p`.
    pub fn contains(&self, p: Point) -> bool {
        self.rects.iter().any(|r| r.contains(p))
    }

    /// All rectangles containing `p`, in construction order.
    pub fn hits(&self, p: Point) -> impl Iterator<Item = &Rect> + '_ {
        self.rects.iter().filter(move |r| r.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_empty_rects() {
        let index = HighlightIndex::new(vec![
            Rect::new(0.0, 0.0, 0.0, 5.0),
            Rect::new(1.0, 1.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, 5.0, -1.0),
        ]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_hits_in_order() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let index = HighlightIndex::new(vec![a, b]);

        let hits: Vec<_> = index.hits(Point::new(6.0, 6.0)).copied().collect();
        assert_eq!(hits, vec![a, b]);
        assert!(!index.contains(Point::new(15.0, 15.0)));
    }
}
