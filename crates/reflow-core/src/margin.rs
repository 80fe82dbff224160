//! Vertical margin collapsing.
//!
//! [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//!
//! "When two or more margins collapse, the resulting margin width is the
//! maximum of the collapsing margins' widths. In the case of negative
//! margins, the maximum of the absolute values of the negative adjoining
//! margins is deducted from the maximum of the positive adjoining margins.
//! If there are no positive margins, the maximum of the absolute values
//! of the adjoining margins is deducted from zero."
//!
//! Margins are accumulated as maxima, not as a running sum, so any number
//! of adjoining margins can join in any order with the same result.

use serde::Serialize;

use crate::geom::LayoutCoord;

/// Collapse two adjoining margins.
///
/// Both positive: the larger. Both negative: the more negative. Mixed:
/// their sum.
#[must_use]
pub const fn collapse_two_margins(a: LayoutCoord, b: LayoutCoord) -> LayoutCoord {
    if a >= 0 && b >= 0 {
        if a > b { a } else { b }
    } else if a < 0 && b < 0 {
        if a < b { a } else { b }
    } else {
        a + b
    }
}

/// A set of adjoining margins, kept as three maxima.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct VerticalMargin {
    /// Largest positive margin from author styles.
    pub max_positive: LayoutCoord,
    /// Largest magnitude among negative margins.
    pub max_negative: LayoutCoord,
    /// Largest positive margin that came from the UA default stylesheet.
    pub max_default: LayoutCoord,
}

impl VerticalMargin {
    /// No margins.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_positive: 0,
            max_negative: 0,
            max_default: 0,
        }
    }

    /// A single margin.
    #[must_use]
    pub fn of(margin: LayoutCoord, is_default: bool) -> Self {
        let mut m = Self::new();
        m.add(margin, is_default);
        m
    }

    /// Join one more adjoining margin.
    pub fn add(&mut self, margin: LayoutCoord, is_default: bool) {
        if margin < 0 {
            self.max_negative = self.max_negative.max(-margin);
        } else if is_default {
            self.max_default = self.max_default.max(margin);
        } else {
            self.max_positive = self.max_positive.max(margin);
        }
    }

    /// Join another set of adjoining margins.
    pub fn join(&mut self, other: &Self) {
        self.max_positive = self.max_positive.max(other.max_positive);
        self.max_negative = self.max_negative.max(other.max_negative);
        self.max_default = self.max_default.max(other.max_default);
    }

    /// Drop margins that came from the UA stylesheet.
    ///
    /// Quirks mode ignores default margins at the top of table cells.
    pub const fn drop_defaults(&mut self) {
        self.max_default = 0;
    }

    /// The collapsed margin.
    #[must_use]
    pub fn collapse(&self) -> LayoutCoord {
        self.max_positive.max(self.max_default) - self.max_negative
    }

    /// No margin has joined yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.max_positive == 0 && self.max_negative == 0 && self.max_default == 0
    }
}

/// Margins pending below a position, and the position they hang from.
///
/// While margins are pending, content placed below them (floats, and
/// boxes whose margins collapse through) uses `applied`. When another
/// margin joins and the collapsed value changes, the owner translates
/// everything placed since `float_mark` by the returned delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MarginChain {
    /// BFC-relative y where the pending margins begin.
    pub anchor: LayoutCoord,
    /// The adjoining margins.
    pub margin: VerticalMargin,
    /// Collapsed value that positions below the margins were computed with.
    pub applied: LayoutCoord,
    /// Float ledger length when the margins started pending.
    pub float_mark: usize,
}

impl MarginChain {
    /// An empty chain hanging from `anchor`.
    #[must_use]
    pub const fn new(anchor: LayoutCoord, float_mark: usize) -> Self {
        Self {
            anchor,
            margin: VerticalMargin::new(),
            applied: 0,
            float_mark,
        }
    }

    /// BFC-relative y below the collapsed margins.
    #[must_use]
    pub const fn position(&self) -> LayoutCoord {
        self.anchor + self.applied
    }

    /// Join a margin. Returns how far content below the margins moves.
    #[must_use]
    pub fn add(&mut self, margin: LayoutCoord, is_default: bool) -> LayoutCoord {
        self.margin.add(margin, is_default);
        self.reapply()
    }

    /// Replace the margins. Returns how far content below the margins moves.
    #[must_use]
    pub fn set_margin(&mut self, margin: VerticalMargin) -> LayoutCoord {
        self.margin = margin;
        self.reapply()
    }

    fn reapply(&mut self) -> LayoutCoord {
        let collapsed = self.margin.collapse();
        let delta = collapsed - self.applied;
        self.applied = collapsed;
        delta
    }
}
