//! Used width computation.
//!
//! [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
//!
//! Which CSS 2.1 rules apply depends on the kind of box, so the rules are
//! a [`WidthStrategy`] chosen once per pass from the style. Containers
//! call through the trait and never branch on the box kind themselves.

use std::fmt;

use serde::Serialize;

use crate::geom::LayoutCoord;
use crate::style::{Display, ResolvedStyle};
use crate::values::{AutoOr, Dimension, clamp_width};

/// Intrinsic widths of a box, border box included.
///
/// [§ 5.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MinMaxWidths {
    /// Absolute floor: the widest piece that can never be broken.
    pub minimum: LayoutCoord,
    /// The min-content width: the widest unbreakable run at normal
    /// break opportunities.
    pub normal_minimum: LayoutCoord,
    /// The max-content width: no line breaks except forced ones.
    pub maximum: LayoutCoord,
}

impl MinMaxWidths {
    /// All three equal.
    #[must_use]
    pub const fn exact(width: LayoutCoord) -> Self {
        Self {
            minimum: width,
            normal_minimum: width,
            maximum: width,
        }
    }

    /// Enforce `minimum <= normal_minimum <= maximum`.
    pub fn normalize(&mut self) {
        self.minimum = self.minimum.max(0);
        self.normal_minimum = self.normal_minimum.max(self.minimum);
        self.maximum = self.maximum.max(self.normal_minimum);
    }

    /// Grow each width to at least the other's.
    pub fn include(&mut self, other: &Self) {
        self.minimum = self.minimum.max(other.minimum);
        self.normal_minimum = self.normal_minimum.max(other.normal_minimum);
        self.maximum = self.maximum.max(other.maximum);
    }

    /// Add a fixed amount to all three.
    #[must_use]
    pub const fn widened(self, by: LayoutCoord) -> Self {
        Self {
            minimum: self.minimum + by,
            normal_minimum: self.normal_minimum + by,
            maximum: self.maximum + by,
        }
    }

    /// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
    ///
    /// "Calculation of the shrink-to-fit width is similar to calculating
    /// the width of a table cell using the automatic table layout
    /// algorithm. [...] the shrink-to-fit width is:
    /// min(max(preferred minimum width, available width), preferred width)."
    #[must_use]
    pub fn shrink_to_fit(&self, available: LayoutCoord) -> LayoutCoord {
        available.max(self.normal_minimum).min(self.maximum)
    }
}

/// The used content width and horizontal margins of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsedWidth {
    /// Width of the content box.
    pub content_width: LayoutCoord,
    /// Used left margin.
    pub margin_left: LayoutCoord,
    /// Used right margin.
    pub margin_right: LayoutCoord,
}

/// One set of width rules.
pub trait WidthStrategy: fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Compute the used width inside `available` (the containing block's
    /// content width). `minmax` is the box's last intrinsic widths, when
    /// known.
    fn compute_width(
        &self,
        style: &ResolvedStyle,
        available: LayoutCoord,
        minmax: Option<&MinMaxWidths>,
    ) -> UsedWidth;

    /// The used width depends on the box's own intrinsic widths.
    fn needs_min_max(&self) -> bool {
        false
    }
}

/// Pick the width rules for a box.
#[must_use]
pub fn select_width_strategy(style: &ResolvedStyle) -> Box<dyn WidthStrategy> {
    if style.table_cell {
        Box::new(TableCellWidth)
    } else if !matches!(style.width, Dimension::Auto) {
        Box::new(FixedWidth)
    } else if style.is_floating() || matches!(style.display, Display::InlineBlock) {
        Box::new(ShrinkToFit)
    } else {
        Box::new(BlockWidth)
    }
}

fn border_and_padding(style: &ResolvedStyle) -> LayoutCoord {
    style.border.horizontal() + style.padding.horizontal()
}

/// Resolve horizontal margins once the content width is known.
///
/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "If both 'margin-left' and 'margin-right' are 'auto', their used
/// values are equal." "If there is exactly one value specified as 'auto',
/// its used value follows from the equality." Over-constrained boxes give
/// the slack to the end margin.
fn resolve_margins(style: &ResolvedStyle, available: LayoutCoord, content_width: LayoutCoord) -> UsedWidth {
    let base = Some(available);
    let left = style.margin.left.resolve(base);
    let right = style.margin.right.resolve(base);
    let slack = available - content_width - border_and_padding(style);
    let (margin_left, margin_right) = match (left, right) {
        (AutoOr::Auto, AutoOr::Auto) => {
            let half = slack.max(0) / 2;
            (half, slack.max(0) - half)
        }
        (AutoOr::Auto, AutoOr::Length(r)) => (slack - r, r),
        (AutoOr::Length(l), AutoOr::Auto) => (l, slack - l),
        (AutoOr::Length(l), AutoOr::Length(r)) => {
            if style.direction == crate::style::Direction::Rtl {
                (slack - r, r)
            } else {
                (l, r)
            }
        }
    };
    UsedWidth {
        content_width,
        margin_left,
        margin_right,
    }
}

/// `auto` width in normal flow: fill the containing block.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockWidth;

impl WidthStrategy for BlockWidth {
    fn name(&self) -> &'static str {
        "block"
    }

    fn compute_width(
        &self,
        style: &ResolvedStyle,
        available: LayoutCoord,
        _minmax: Option<&MinMaxWidths>,
    ) -> UsedWidth {
        let base = Some(available);
        let margins =
            style.margin.left.resolve_or_zero(base) + style.margin.right.resolve_or_zero(base);
        let tentative = (available - margins - border_and_padding(style)).max(0);
        let content_width = clamp_width(tentative, style.min_width, style.max_width, base);
        if content_width == tentative {
            UsedWidth {
                content_width,
                margin_left: style.margin.left.resolve_or_zero(base),
                margin_right: style.margin.right.resolve_or_zero(base),
            }
        } else {
            // Clamped by min/max-width: auto margins absorb the difference.
            resolve_margins(style, available, content_width)
        }
    }
}

/// A specified `width`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWidth;

impl WidthStrategy for FixedWidth {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn compute_width(
        &self,
        style: &ResolvedStyle,
        available: LayoutCoord,
        _minmax: Option<&MinMaxWidths>,
    ) -> UsedWidth {
        let base = Some(available);
        let specified = style.width.resolve(base).unwrap_or(available);
        let content_width = clamp_width(specified, style.min_width, style.max_width, base).max(0);
        if style.is_floating() || matches!(style.display, Display::InlineBlock) {
            // [§ 10.3.5] "If 'margin-left' or 'margin-right' are computed
            // as 'auto', their used value is '0'."
            return UsedWidth {
                content_width,
                margin_left: style.margin.left.resolve_or_zero(base),
                margin_right: style.margin.right.resolve_or_zero(base),
            };
        }
        resolve_margins(style, available, content_width)
    }
}

/// Floats and inline-blocks with `auto` width.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShrinkToFit;

impl WidthStrategy for ShrinkToFit {
    fn name(&self) -> &'static str {
        "shrink-to-fit"
    }

    fn compute_width(
        &self,
        style: &ResolvedStyle,
        available: LayoutCoord,
        minmax: Option<&MinMaxWidths>,
    ) -> UsedWidth {
        let base = Some(available);
        let margin_left = style.margin.left.resolve_or_zero(base);
        let margin_right = style.margin.right.resolve_or_zero(base);
        let outer = available - margin_left - margin_right;
        // The first visit has no intrinsic widths yet; the box takes the
        // whole space and asks for another pass once they are known.
        let border_box = minmax.map_or(outer, |m| m.shrink_to_fit(outer));
        let content_width = clamp_width(
            (border_box - border_and_padding(style)).max(0),
            style.min_width,
            style.max_width,
            base,
        );
        UsedWidth {
            content_width,
            margin_left,
            margin_right,
        }
    }

    fn needs_min_max(&self) -> bool {
        true
    }
}

/// Table cells: the table assigns the width; the cell only fills it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableCellWidth;

impl WidthStrategy for TableCellWidth {
    fn name(&self) -> &'static str {
        "table-cell"
    }

    fn compute_width(
        &self,
        style: &ResolvedStyle,
        available: LayoutCoord,
        _minmax: Option<&MinMaxWidths>,
    ) -> UsedWidth {
        UsedWidth {
            content_width: (available - border_and_padding(style)).max(0),
            margin_left: 0,
            margin_right: 0,
        }
    }

    fn needs_min_max(&self) -> bool {
        true
    }
}
