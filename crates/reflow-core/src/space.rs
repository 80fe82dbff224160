//! Float ledger of one block formatting context.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "Since a float is not in the flow, non-positioned block boxes created
//! before and after the float box flow vertically as if the float did not
//! exist. However, the current and subsequent line boxes created next to
//! the float are shortened as necessary to make room for the margin box
//! of the float."
//!
//! Every container in a block formatting context reads and appends to the
//! same [`SpaceManager`]. All coordinates here are relative to the
//! formatting context root.

use std::hash::{DefaultHasher, Hash, Hasher};

use crate::error::{LayoutError, MemoryBudget};
use crate::geom::{LAYOUT_COORD_MAX, LAYOUT_COORD_MIN, LayoutCoord, Rect};
use crate::style::{ClearSide, FloatSide};
use crate::tree::BoxId;

/// A float that has been placed in the formatting context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FloatEntry {
    /// The floating box.
    pub id: BoxId,
    /// The container the float is a child of.
    pub owner: BoxId,
    /// Which side the float is on.
    pub side: FloatSide,
    /// The margin box of the float.
    pub rect: Rect,
    /// Margin-box width the float would have with unlimited space.
    pub max_width: LayoutCoord,
    /// Highest top the float could legally have, given earlier floats
    /// and `clear`. Recorded for intrinsic height computation.
    pub min_y: LayoutCoord,
    /// The float waits for the open line to close before it is placed
    /// for good. Deferred floats do not narrow the open line.
    pub deferred: bool,
}

/// Free horizontal space at some vertical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space {
    /// Left edge of the free space.
    pub x: LayoutCoord,
    /// Top of the band. At or below the position asked for.
    pub y: LayoutCoord,
    /// Width of the free space.
    pub width: LayoutCoord,
    /// How far down from `y` the space stays this wide.
    pub max_height: LayoutCoord,
}

/// Request for [`SpaceManager::add_float`].
#[derive(Debug, Clone, Copy)]
pub struct FloatRequest {
    /// The floating box.
    pub id: BoxId,
    /// The container the float is a child of.
    pub owner: BoxId,
    /// Which side to float to.
    pub side: FloatSide,
    /// Margin-box width.
    pub width: LayoutCoord,
    /// Margin-box height.
    pub height: LayoutCoord,
    /// Margin-box width with unlimited space.
    pub max_width: LayoutCoord,
    /// Static position: the highest the float's top may go.
    pub y: LayoutCoord,
    /// Left edge of the containing block's content box.
    pub bfc_x: LayoutCoord,
    /// Width of the containing block's content box.
    pub containing_width: LayoutCoord,
    /// `clear` of the float itself.
    pub clear: Option<ClearSide>,
    /// Place as deferred.
    pub deferred: bool,
}

/// Append-only float ledger for one block formatting context.
#[derive(Debug, Clone, Default)]
pub struct SpaceManager {
    entries: Vec<FloatEntry>,
}

impl SpaceManager {
    /// An empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of placed floats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no float has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All placed floats, in placement order.
    #[must_use]
    pub fn entries(&self) -> &[FloatEntry] {
        &self.entries
    }

    /// The entry of float `id`.
    #[must_use]
    pub fn entry(&self, id: BoxId) -> Option<&FloatEntry> {
        self.entries.iter().rev().find(|e| e.id == id)
    }

    /// Free space for content of at least `min_width` and `min_height`
    /// starting at or below `bfc_y`, within `[bfc_x, bfc_x + width)`.
    ///
    /// [§ 9.5.1 Rules 2, 3, 7](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Scans downward from float bottom to float bottom until the band is
    /// wide enough. If no band is wide enough, the first band below all
    /// floats is returned even if content overflows it.
    #[must_use]
    pub fn get_space(
        &self,
        bfc_y: LayoutCoord,
        bfc_x: LayoutCoord,
        width: LayoutCoord,
        min_width: LayoutCoord,
        min_height: LayoutCoord,
    ) -> Space {
        let mut y = bfc_y;
        loop {
            let band_bottom = y + min_height.max(1);
            let (left, right) = self.edges_in_band(y, band_bottom, bfc_x, width);
            let available = (right - left).max(0);

            if available >= min_width {
                return Space {
                    x: left,
                    y,
                    width: available,
                    max_height: self.next_top_below(y, bfc_x, width) - y,
                };
            }

            // STEP 2: Too narrow here; advance to the next float bottom.
            match self.next_bottom_below(y, band_bottom, bfc_x, width) {
                Some(next) if next > y => y = next,
                _ => {
                    return Space {
                        x: left,
                        y,
                        width: available,
                        max_height: self.next_top_below(y, bfc_x, width) - y,
                    };
                }
            }
        }
    }

    /// [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place a float and return its margin box.
    ///
    /// - Rule 5: "The outer top of a floating box may not be higher than
    ///   the outer top of any block or floated box generated by an element
    ///   earlier in the source document."
    /// - Rules 2, 3, 7: the float does not overlap other floats.
    /// - Rule 9: "A left-floating box must be put as far to the left as
    ///   possible, a right-floating box as far to the right as possible."
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] if the ledger cannot grow.
    pub fn add_float(
        &mut self,
        request: FloatRequest,
        budget: &mut MemoryBudget,
    ) -> Result<Rect, LayoutError> {
        // STEP 1: Highest legal top.
        let min_y = self.min_float_top(request.y, request.clear);

        // STEP 2: Find a band wide and tall enough.
        let space = self.get_space(
            min_y,
            request.bfc_x,
            request.containing_width,
            request.width,
            request.height,
        );

        // STEP 3: Put it against its side.
        let x = match request.side {
            FloatSide::Left => space.x,
            FloatSide::Right => (space.x + space.width - request.width).max(request.bfc_x),
        };
        let rect = Rect::new(x, space.y, request.width, request.height);

        budget.push(
            &mut self.entries,
            FloatEntry {
                id: request.id,
                owner: request.owner,
                side: request.side,
                rect,
                max_width: request.max_width,
                min_y,
                deferred: request.deferred,
            },
        )?;
        Ok(rect)
    }

    /// Highest top a new float may have: not above `y`, not above any
    /// earlier float's top, and below floats it clears.
    #[must_use]
    pub fn min_float_top(&self, y: LayoutCoord, clear: Option<ClearSide>) -> LayoutCoord {
        let after_earlier = self
            .entries
            .iter()
            .map(|e| e.rect.y)
            .fold(y, LayoutCoord::max);
        clear.map_or(after_earlier, |c| after_earlier.max(self.find_bfc_bottom(c)))
    }

    /// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// The lowest bottom outer edge among floats that `clear` applies to,
    /// or [`LAYOUT_COORD_MIN`] if there are none.
    #[must_use]
    pub fn find_bfc_bottom(&self, clear: ClearSide) -> LayoutCoord {
        self.entries
            .iter()
            .filter(|e| clear.clears(e.side))
            .map(|e| e.rect.bottom())
            .fold(LAYOUT_COORD_MIN, LayoutCoord::max)
    }

    /// Lowest bottom outer edge of all floats, or [`LAYOUT_COORD_MIN`].
    #[must_use]
    pub fn max_bottom(&self) -> LayoutCoord {
        self.find_bfc_bottom(ClearSide::Both)
    }

    /// Sum of the unconstrained widths of the floats of `owner` beside
    /// the band `[top, bottom)`.
    #[must_use]
    pub fn get_floats_max_width(
        &self,
        top: LayoutCoord,
        bottom: LayoutCoord,
        owner: BoxId,
    ) -> LayoutCoord {
        self.entries
            .iter()
            .filter(|e| e.owner == owner && e.rect.overlaps_band(top, bottom.max(top + 1)))
            .map(|e| e.max_width)
            .sum()
    }

    /// Move every float placed at or after `mark` down by `dy`.
    pub fn translate_from(&mut self, mark: usize, dy: LayoutCoord) {
        for entry in self.entries.iter_mut().skip(mark) {
            entry.rect.y += dy;
            entry.min_y += dy;
        }
    }

    /// Remove and return every float placed at or after `index`.
    #[must_use]
    pub fn pull_from(&mut self, index: usize) -> Vec<FloatEntry> {
        if index >= self.entries.len() {
            return Vec::new();
        }
        self.entries.split_off(index)
    }

    /// Index of the first deferred float, if any.
    #[must_use]
    pub fn first_deferred(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.deferred)
    }

    /// Re-append floats recorded from an earlier pass, unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] if the ledger cannot grow.
    pub fn replay(
        &mut self,
        floats: &[FloatEntry],
        budget: &mut MemoryBudget,
    ) -> Result<(), LayoutError> {
        for entry in floats {
            budget.push(&mut self.entries, entry.clone())?;
        }
        Ok(())
    }

    /// A hash of every entry. Two ledgers with the same fingerprint give
    /// the same answers to every query.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.entries.hash(&mut hasher);
        hasher.finish()
    }

    /// Left and right edges of the free space in a band.
    fn edges_in_band(
        &self,
        top: LayoutCoord,
        bottom: LayoutCoord,
        bfc_x: LayoutCoord,
        width: LayoutCoord,
    ) -> (LayoutCoord, LayoutCoord) {
        let mut left = bfc_x;
        let mut right = bfc_x + width;
        for entry in self.relevant(bfc_x, width) {
            if !entry.rect.overlaps_band(top, bottom) {
                continue;
            }
            match entry.side {
                FloatSide::Left => left = left.max(entry.rect.right()),
                FloatSide::Right => right = right.min(entry.rect.x),
            }
        }
        (left, right)
    }

    /// Smallest float bottom below `top` among floats in the band.
    fn next_bottom_below(
        &self,
        top: LayoutCoord,
        bottom: LayoutCoord,
        bfc_x: LayoutCoord,
        width: LayoutCoord,
    ) -> Option<LayoutCoord> {
        self.relevant(bfc_x, width)
            .filter(|e| e.rect.overlaps_band(top, bottom))
            .map(|e| e.rect.bottom())
            .filter(|&b| b > top)
            .min()
    }

    /// Smallest float top strictly below `y`.
    fn next_top_below(&self, y: LayoutCoord, bfc_x: LayoutCoord, width: LayoutCoord) -> LayoutCoord {
        self.relevant(bfc_x, width)
            .filter(|e| e.rect.height > 0 && e.rect.y > y)
            .map(|e| e.rect.y)
            .min()
            .unwrap_or(LAYOUT_COORD_MAX)
    }

    /// Placed (non-deferred) floats that horizontally overlap
    /// `[bfc_x, bfc_x + width)`.
    fn relevant(&self, bfc_x: LayoutCoord, width: LayoutCoord) -> impl Iterator<Item = &FloatEntry> {
        let right = bfc_x + width;
        self.entries
            .iter()
            .filter(move |e| !e.deferred && e.rect.right() > bfc_x && e.rect.x < right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: usize, side: FloatSide, width: LayoutCoord, height: LayoutCoord, y: LayoutCoord) -> FloatRequest {
        FloatRequest {
            id: BoxId(id),
            owner: BoxId(0),
            side,
            width,
            height,
            max_width: width,
            y,
            bfc_x: 0,
            containing_width: 300,
            clear: None,
            deferred: false,
        }
    }

    #[test]
    fn test_left_and_right_floats_share_a_band() {
        let mut space = SpaceManager::new();
        let mut budget = MemoryBudget::unlimited();
        let a = space.add_float(request(1, FloatSide::Left, 100, 50, 0), &mut budget).unwrap();
        let b = space.add_float(request(2, FloatSide::Right, 100, 30, 0), &mut budget).unwrap();
        assert_eq!(a, Rect::new(0, 0, 100, 50));
        assert_eq!(b, Rect::new(200, 0, 100, 30));

        let s = space.get_space(10, 0, 300, 0, 10);
        assert_eq!((s.x, s.width), (100, 100));
        assert_eq!(s.max_height, LAYOUT_COORD_MAX - 10);
    }

    #[test]
    fn test_too_wide_float_moves_below() {
        let mut space = SpaceManager::new();
        let mut budget = MemoryBudget::unlimited();
        let _ = space.add_float(request(1, FloatSide::Left, 200, 50, 0), &mut budget).unwrap();
        let b = space.add_float(request(2, FloatSide::Left, 150, 20, 0), &mut budget).unwrap();
        assert_eq!(b, Rect::new(0, 50, 150, 20));
    }

    #[test]
    fn test_clear_bottom() {
        let mut space = SpaceManager::new();
        let mut budget = MemoryBudget::unlimited();
        let _ = space.add_float(request(1, FloatSide::Left, 50, 40, 0), &mut budget).unwrap();
        let _ = space.add_float(request(2, FloatSide::Right, 50, 70, 0), &mut budget).unwrap();
        assert_eq!(space.find_bfc_bottom(ClearSide::Left), 40);
        assert_eq!(space.find_bfc_bottom(ClearSide::Both), 70);
    }

    #[test]
    fn test_deferred_floats_do_not_narrow_lines() {
        let mut space = SpaceManager::new();
        let mut budget = MemoryBudget::unlimited();
        let mut r = request(1, FloatSide::Left, 100, 40, 0);
        r.deferred = true;
        let _ = space.add_float(r, &mut budget).unwrap();
        assert_eq!(space.get_space(0, 0, 300, 0, 10).width, 300);
        assert_eq!(space.first_deferred(), Some(0));
    }
}
