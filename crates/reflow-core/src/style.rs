//! Resolved style snapshot.
//!
//! The cascade is not part of this crate. Layout consumes a read-only
//! snapshot of the properties it needs, already cascaded and inherited,
//! with lengths kept unresolved where they depend on the containing block.

use serde::Serialize;
use strum_macros::Display as StrumDisplay;

use crate::geom::{EdgeSizes, LayoutCoord};
use crate::values::Dimension;

/// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
pub enum Display {
    /// "This value causes an element to generate a block box."
    #[default]
    Block,
    /// "This value causes an element to generate one or more inline boxes."
    Inline,
    /// "This value causes an element to generate an inline-level block
    /// container."
    InlineBlock,
    /// "This value causes an element (e.g., LI in HTML) to generate a
    /// principal block box and a marker box."
    ListItem,
    /// "This value causes an element to not appear in the formatting
    /// structure."
    None,
}

/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "Values have the following meanings:
///
/// left
///   The element generates a block box that is floated to the left.
///
/// right
///   The element generates a block box that is floated to the right."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, StrumDisplay)]
pub enum FloatSide {
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "This property indicates which sides of an element's box(es) may not
/// be adjacent to an earlier floating box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, StrumDisplay)]
pub enum ClearSide {
    /// "Requires the top border edge be below any left-floating boxes."
    Left,
    /// "Requires the top border edge be below any right-floating boxes."
    Right,
    /// "Requires the top border edge be below any floating boxes."
    Both,
}

impl ClearSide {
    /// Whether this value clears floats on `side`.
    #[must_use]
    pub const fn clears(self, side: FloatSide) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::Left, FloatSide::Left) | (Self::Right, FloatSide::Right)
        )
    }
}

/// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
pub enum TextAlign {
    /// Align to the start edge (left in LTR, right in RTL).
    #[default]
    Start,
    /// Align to the end edge.
    End,
    /// Align to the left edge.
    Left,
    /// Align to the right edge.
    Right,
    /// Center within the line box.
    Center,
    /// Stretch inter-word spacing. Layout aligns justified lines to the
    /// start edge and exposes word counts for the justification service.
    Justify,
}

/// [§ 16.6 Whitespace: the 'white-space' property](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
pub enum WhiteSpace {
    /// "This value directs user agents to collapse sequences of white
    /// space, and break lines as necessary to fill line boxes."
    #[default]
    Normal,
    /// "This value collapses white space as for 'normal', but suppresses
    /// line breaks within text."
    NoWrap,
    /// "This value prevents user agents from collapsing sequences of white
    /// space. Lines are only broken at preserved newline characters."
    Pre,
    /// "This value prevents user agents from collapsing sequences of white
    /// space. Lines are broken at preserved newline characters, and as
    /// necessary to fill line boxes."
    PreWrap,
}

impl WhiteSpace {
    /// Whether sequences of white space collapse to one space.
    #[must_use]
    pub const fn collapses(self) -> bool {
        matches!(self, Self::Normal | Self::NoWrap)
    }

    /// Whether lines may be broken at soft wrap opportunities.
    #[must_use]
    pub const fn wraps(self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap)
    }
}

/// [§ 5.5 Overflow Wrapping: the 'overflow-wrap' property](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
pub enum OverflowWrap {
    /// "Lines may break only at allowed break points."
    #[default]
    Normal,
    /// "An otherwise unbreakable sequence of characters may be broken at
    /// an arbitrary point if there are no otherwise-acceptable break
    /// points in the line."
    BreakWord,
}

/// [§ 9.10 Text direction: the 'direction' property](https://www.w3.org/TR/CSS2/visuren.html#direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
pub enum Direction {
    /// Left-to-right.
    #[default]
    Ltr,
    /// Right-to-left.
    Rtl,
}

/// [§ 11.1.1 Overflow: the 'overflow' property](https://www.w3.org/TR/CSS2/visufx.html#overflow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
pub enum Overflow {
    /// "Content is not clipped."
    #[default]
    Visible,
    /// "Content is clipped and no scrolling user interface should be provided."
    Hidden,
    /// "Content is clipped and a scrolling mechanism is provided."
    Scroll,
    /// "Should cause a scrolling mechanism to be provided for overflowing boxes."
    Auto,
}

/// [§ 3 Breaks Between Boxes](https://www.w3.org/TR/css-break-3/#break-between)
///
/// Page or column break policy attached to a block edge or a forced break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
pub enum BreakPolicy {
    /// "Neither force nor forbid a break."
    #[default]
    Auto,
    /// "Avoid a break."
    Avoid,
    /// "Always force a break."
    Always,
    /// "Always force a page break."
    Page,
    /// "Always force a column break."
    Column,
}

impl BreakPolicy {
    /// Whether this policy forces a break.
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, Self::Always | Self::Page | Self::Column)
    }
}

/// [§ 5.12.1 The :first-line pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-line-pseudo)
///
/// Properties overridden on the first formatted line of a block. Only the
/// properties that change line geometry matter to layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FirstLineStyle {
    /// Overridden font size in pixels.
    pub font_size: Option<f32>,
    /// Overridden line height in pixels.
    pub line_height: Option<LayoutCoord>,
}

/// Specified margins. Margins may be `auto` and may be percentages of
/// the containing block width.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Margins {
    /// Top margin.
    pub top: Dimension,
    /// Right margin.
    pub right: Dimension,
    /// Bottom margin.
    pub bottom: Dimension,
    /// Left margin.
    pub left: Dimension,
}

impl Margins {
    /// The same pixel margin on every side.
    #[must_use]
    pub const fn uniform(px: LayoutCoord) -> Self {
        Self {
            top: Dimension::Px(px),
            right: Dimension::Px(px),
            bottom: Dimension::Px(px),
            left: Dimension::Px(px),
        }
    }

    /// Pixel margins on the block axis only.
    #[must_use]
    pub const fn vertical(top: LayoutCoord, bottom: LayoutCoord) -> Self {
        Self {
            top: Dimension::Px(top),
            right: Dimension::Px(0),
            bottom: Dimension::Px(bottom),
            left: Dimension::Px(0),
        }
    }
}

/// The resolved properties of one box, as layout sees them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStyle {
    /// Outer/inner display type.
    pub display: Display,
    /// `float`; `None` for non-floating boxes.
    pub float: Option<FloatSide>,
    /// `clear`; `None` for no constraint.
    pub clear: Option<ClearSide>,
    /// Specified margins.
    pub margin: Margins,
    /// The top margin came from the UA default stylesheet.
    pub default_margin_top: bool,
    /// The bottom margin came from the UA default stylesheet.
    pub default_margin_bottom: bool,
    /// Padding widths.
    pub padding: EdgeSizes,
    /// Border widths.
    pub border: EdgeSizes,
    /// `width` (content box).
    pub width: Dimension,
    /// `height` (content box).
    pub height: Dimension,
    /// `min-width`; `Auto` means 0.
    pub min_width: Dimension,
    /// `max-width`; `Auto` means none.
    pub max_width: Dimension,
    /// `min-height` in pixels.
    pub min_height: LayoutCoord,
    /// `text-align`.
    pub text_align: TextAlign,
    /// `text-indent` in pixels.
    pub text_indent: LayoutCoord,
    /// Font size in pixels.
    pub font_size: f32,
    /// `line-height` in pixels; `None` is `normal`.
    pub line_height: Option<LayoutCoord>,
    /// `white-space`.
    pub white_space: WhiteSpace,
    /// `overflow-wrap`.
    pub overflow_wrap: OverflowWrap,
    /// `direction`.
    pub direction: Direction,
    /// `overflow`.
    pub overflow: Overflow,
    /// `break-before`.
    pub break_before: BreakPolicy,
    /// `break-after`.
    pub break_after: BreakPolicy,
    /// The box is a table cell whose width is assigned by table layout.
    pub table_cell: bool,
    /// The box is the document root.
    pub is_root: bool,
    /// `::first-line` overrides, if any rule matched.
    pub first_line: Option<FirstLineStyle>,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            float: None,
            clear: None,
            margin: Margins::default(),
            default_margin_top: false,
            default_margin_bottom: false,
            padding: EdgeSizes::default(),
            border: EdgeSizes::default(),
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            max_width: Dimension::Auto,
            min_height: 0,
            text_align: TextAlign::Start,
            text_indent: 0,
            font_size: 16.0,
            line_height: None,
            white_space: WhiteSpace::Normal,
            overflow_wrap: OverflowWrap::Normal,
            direction: Direction::Ltr,
            overflow: Overflow::Visible,
            break_before: BreakPolicy::Auto,
            break_after: BreakPolicy::Auto,
            table_cell: false,
            is_root: false,
            first_line: None,
        }
    }
}

impl ResolvedStyle {
    /// A plain block box.
    #[must_use]
    pub fn block() -> Self {
        Self::default()
    }

    /// A plain inline box.
    #[must_use]
    pub fn inline() -> Self {
        Self {
            display: Display::Inline,
            ..Self::default()
        }
    }

    /// The document root box.
    #[must_use]
    pub fn root() -> Self {
        Self {
            is_root: true,
            ..Self::default()
        }
    }

    /// Style for a child text run or anonymous inline: inherited text
    /// properties of `self`, initial values for everything else.
    ///
    /// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
    #[must_use]
    pub fn inherit_text(&self) -> Self {
        Self {
            display: Display::Inline,
            text_align: self.text_align,
            text_indent: self.text_indent,
            font_size: self.font_size,
            line_height: self.line_height,
            white_space: self.white_space,
            overflow_wrap: self.overflow_wrap,
            direction: self.direction,
            ..Self::default()
        }
    }

    /// Whether the box is taken out of flow by `float`.
    ///
    /// [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
    ///
    /// The root element never floats.
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        self.float.is_some() && !self.is_root
    }

    /// Whether the box is block-level when in flow.
    #[must_use]
    pub const fn is_block_level(&self) -> bool {
        matches!(self.display, Display::Block | Display::ListItem)
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Floats, absolutely positioned elements, block containers (such as
    /// inline-blocks, table-cells, and table-captions) that are not block
    /// boxes, and block boxes with 'overflow' other than 'visible' (except
    /// when that value has been propagated to the viewport) establish new
    /// block formatting contexts for their contents."
    #[must_use]
    pub const fn establishes_bfc(&self) -> bool {
        self.is_root
            || self.float.is_some()
            || matches!(self.display, Display::InlineBlock)
            || self.table_cell
            || !matches!(self.overflow, Overflow::Visible)
    }

    /// `text-align` resolved against `direction`, for a line that is not
    /// the last line of a justified paragraph.
    #[must_use]
    pub const fn physical_align(&self) -> TextAlign {
        match (self.text_align, self.direction) {
            (TextAlign::Start | TextAlign::Justify, Direction::Ltr)
            | (TextAlign::End, Direction::Rtl) => TextAlign::Left,
            (TextAlign::Start | TextAlign::Justify, Direction::Rtl)
            | (TextAlign::End, Direction::Ltr) => TextAlign::Right,
            (other, _) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bfc_roots() {
        assert!(ResolvedStyle::root().establishes_bfc());
        assert!(!ResolvedStyle::block().establishes_bfc());
        let hidden = ResolvedStyle {
            overflow: Overflow::Hidden,
            ..ResolvedStyle::block()
        };
        assert!(hidden.establishes_bfc());
        let float = ResolvedStyle {
            float: Some(FloatSide::Left),
            ..ResolvedStyle::block()
        };
        assert!(float.establishes_bfc());
    }

    #[test]
    fn test_start_alignment_follows_direction() {
        let rtl = ResolvedStyle {
            direction: Direction::Rtl,
            ..ResolvedStyle::block()
        };
        assert_eq!(rtl.physical_align(), TextAlign::Right);
        assert_eq!(ResolvedStyle::block().physical_align(), TextAlign::Left);
    }
}
