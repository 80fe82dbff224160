//! Geometry primitives.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//!
//! All layout positions are integral. Floats are stored relative to their
//! block formatting context and converted to container-relative values at
//! container boundaries; keeping both in integer units makes that
//! conversion exact in both directions.

use serde::Serialize;

/// A layout length in CSS pixels.
pub type LayoutCoord = i32;

/// Largest representable layout length. Used as "no maximum".
pub const LAYOUT_COORD_MAX: LayoutCoord = LayoutCoord::MAX / 4;

/// Smallest representable layout length.
pub const LAYOUT_COORD_MIN: LayoutCoord = -LAYOUT_COORD_MAX;

/// Round a measured floating-point length to layout units.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_coord(value: f32) -> LayoutCoord {
    if value.is_nan() {
        return 0;
    }
    // `as` saturates; the bound is re-applied in integer space because the
    // f32 nearest to LAYOUT_COORD_MAX lies above it.
    (value.round() as LayoutCoord).clamp(LAYOUT_COORD_MIN, LAYOUT_COORD_MAX)
}

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Point {
    /// Horizontal position.
    pub x: LayoutCoord,
    /// Vertical position.
    pub y: LayoutCoord,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: LayoutCoord, y: LayoutCoord) -> Self {
        Self { x, y }
    }

    /// Offset this point by another one.
    #[must_use]
    pub const fn offset(self, dx: LayoutCoord, dy: LayoutCoord) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: LayoutCoord,
    /// Vertical position of the top-left corner.
    pub y: LayoutCoord,
    /// Width of the rectangle.
    pub width: LayoutCoord,
    /// Height of the rectangle.
    pub height: LayoutCoord,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: LayoutCoord, y: LayoutCoord, width: LayoutCoord, height: LayoutCoord) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`).
    #[must_use]
    pub const fn right(&self) -> LayoutCoord {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    #[must_use]
    pub const fn bottom(&self) -> LayoutCoord {
        self.y + self.height
    }

    /// Whether the vertical band `[top, bottom)` intersects this rectangle.
    ///
    /// Zero-height rectangles never intersect anything.
    #[must_use]
    pub const fn overlaps_band(&self, top: LayoutCoord, bottom: LayoutCoord) -> bool {
        self.height > 0 && self.y < bottom && self.bottom() > top
    }

    /// Translate by an offset.
    #[must_use]
    pub const fn translated(self, dx: LayoutCoord, dy: LayoutCoord) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width,
            height: self.height,
        }
    }
}

/// Edge sizes for padding, border, or margin.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: LayoutCoord,
    /// Right edge size.
    pub right: LayoutCoord,
    /// Bottom edge size.
    pub bottom: LayoutCoord,
    /// Left edge size.
    pub left: LayoutCoord,
}

impl EdgeSizes {
    /// The same size on all four edges.
    #[must_use]
    pub const fn uniform(size: LayoutCoord) -> Self {
        Self {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }

    /// `left + right`.
    #[must_use]
    pub const fn horizontal(&self) -> LayoutCoord {
        self.left + self.right
    }

    /// `top + bottom`.
    #[must_use]
    pub const fn vertical(&self) -> LayoutCoord {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_coord_rounds_and_clamps() {
        assert_eq!(to_coord(29.6), 30);
        assert_eq!(to_coord(-0.4), 0);
        assert_eq!(to_coord(f32::NAN), 0);
        assert_eq!(to_coord(f32::INFINITY), LAYOUT_COORD_MAX);
    }

    #[test]
    fn test_band_overlap_is_half_open() {
        let r = Rect::new(0, 10, 5, 10);
        assert!(r.overlaps_band(0, 11));
        assert!(!r.overlaps_band(0, 10));
        assert!(!r.overlaps_band(20, 30));
        assert!(!Rect::new(0, 10, 5, 0).overlaps_band(0, 100));
    }
}
