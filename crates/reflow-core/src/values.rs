//! Specified-but-unresolved lengths and their resolution.
//!
//! [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! The style snapshot hands layout values that may still depend on the
//! containing block: percentages and `auto`. They are resolved here, at
//! the point where the containing block size is known.

use serde::{Deserialize, Serialize};

use crate::geom::{LAYOUT_COORD_MAX, LayoutCoord, to_coord};

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// This enum represents a value that can either be 'auto' or a specific length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AutoOr {
    /// The value is 'auto' and must be resolved during layout.
    #[default]
    Auto,
    /// The value is a specific length in pixels.
    Length(LayoutCoord),
}

impl AutoOr {
    /// Returns true if this value is 'auto'.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Returns the length, or `default` if this value is 'auto'.
    #[must_use]
    pub const fn unwrap_or(self, default: LayoutCoord) -> LayoutCoord {
        match self {
            Self::Auto => default,
            Self::Length(v) => v,
        }
    }
}

/// A length as specified: `auto`, an absolute pixel length, or a
/// percentage of the containing block.
///
/// [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS2/syndata.html#length-units)
/// [§ 4.3.3 Percentages](https://www.w3.org/TR/CSS2/syndata.html#percentage-units)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Dimension {
    /// `auto` (or `none` for `max-width`).
    #[default]
    Auto,
    /// An absolute length in pixels.
    Px(LayoutCoord),
    /// A percentage of the containing block's corresponding dimension.
    Percent(f32),
}

impl Dimension {
    /// Resolve against a containing-block length.
    ///
    /// A percentage against an unknown base behaves as `auto`.
    ///
    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// "If the height of the containing block is not specified explicitly
    /// (i.e., it depends on content height), and this element is not
    /// absolutely positioned, the value computes to 'auto'."
    #[must_use]
    pub fn resolve(self, base: Option<LayoutCoord>) -> AutoOr {
        match self {
            Self::Auto => AutoOr::Auto,
            Self::Px(v) => AutoOr::Length(v),
            Self::Percent(p) => base.map_or(AutoOr::Auto, |b| AutoOr::Length(percent_of(p, b))),
        }
    }

    /// Resolve with `auto` (and unresolvable percentages) treated as zero.
    #[must_use]
    pub fn resolve_or_zero(self, base: Option<LayoutCoord>) -> LayoutCoord {
        self.resolve(base).unwrap_or(0)
    }

    /// The pixel value if this is an absolute length.
    ///
    /// Used when computing intrinsic widths, where percentages cannot be
    /// resolved and count as zero.
    #[must_use]
    pub const fn fixed(self) -> Option<LayoutCoord> {
        match self {
            Self::Px(v) => Some(v),
            _ => None,
        }
    }
}

/// `p`% of `base`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent_of(p: f32, base: LayoutCoord) -> LayoutCoord {
    to_coord(base as f32 * p / 100.0)
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// Clamp a tentative width by `min-width` and `max-width`.
///
/// "If the tentative used width is greater than 'max-width', the rules
/// above are applied again using the computed value of 'max-width' as the
/// computed value for 'width'. If the resulting width is smaller than
/// 'min-width', the rules above are applied again using the value of
/// 'min-width' as the computed value for 'width'."
#[must_use]
pub fn clamp_width(
    tentative: LayoutCoord,
    min_width: Dimension,
    max_width: Dimension,
    base: Option<LayoutCoord>,
) -> LayoutCoord {
    let max = max_width.resolve(base).unwrap_or(LAYOUT_COORD_MAX);
    let min = min_width.resolve_or_zero(base);
    tentative.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_against_unknown_base_is_auto() {
        assert_eq!(Dimension::Percent(50.0).resolve(None), AutoOr::Auto);
        assert_eq!(
            Dimension::Percent(50.0).resolve(Some(300)),
            AutoOr::Length(150)
        );
    }

    #[test]
    fn test_min_width_wins_over_max_width() {
        // [§ 10.4] min-width is applied last, so it wins a conflict.
        assert_eq!(
            clamp_width(100, Dimension::Px(80), Dimension::Px(50), None),
            80
        );
    }
}
