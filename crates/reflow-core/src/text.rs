//! Text measurement and line break opportunities.
//!
//! [§ 5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! Layout does not shape glyphs or classify characters itself. It asks a
//! [`FontMetrics`] for advance widths and a [`BreakOracle`] for break
//! opportunities, and only decides which opportunities to take.

use std::ops::Range;

use strum_macros::Display;
use unicode_linebreak::{BreakOpportunity as UnicodeBreakOpportunity, linebreaks};

use crate::error::{LayoutError, MemoryBudget};
use crate::style::WhiteSpace;

/// Font metrics interface for text measurement during layout.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
pub trait FontMetrics {
    /// Measure the total advance width of a text string at the given font size.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Calculate the line height for `line-height: normal`.
    ///
    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "The initial value of 'line-height' is 'normal'. We recommend a used
    /// value for 'normal' between 1.0 and 1.2."
    fn line_height(&self, font_size: f32) -> f32;

    /// Height above the baseline of the font's em box.
    fn ascent(&self, font_size: f32) -> f32 {
        font_size * 0.8
    }
}

/// Approximate font metrics using fixed ratios.
///
/// The average advance width of Latin glyphs in a proportional font is
/// approximately 0.6× the font size. Line height uses 1.2×, the upper end
/// of the recommended range for `line-height: normal`.
///
/// This is used as a fallback when no font is available, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        text.chars().count() as f32 * font_size * CHAR_WIDTH_RATIO
    }

    fn line_height(&self, font_size: f32) -> f32 {
        const LINE_HEIGHT_RATIO: f32 = 1.2;
        font_size * LINE_HEIGHT_RATIO
    }
}

/// Whether a line may break at a join point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LineBreak {
    /// A soft wrap opportunity exists here.
    Yes,
    /// Content on both sides must stay on the same line.
    No,
}

/// A position in a string where a new line may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakOpportunity {
    /// Byte offset of the first character of the next line.
    pub offset: usize,
    /// The break is required (a preserved newline).
    pub mandatory: bool,
}

/// Pure classifier of line break opportunities.
///
/// [Unicode Standard Annex #14](https://www.unicode.org/reports/tr14/)
pub trait BreakOracle {
    /// Break opportunities strictly inside `text` (offsets `0` and
    /// `text.len()` are never reported).
    fn opportunities(&self, text: &str) -> Vec<BreakOpportunity>;

    /// Whether a line may break between `before` and `after`.
    fn break_between(&self, before: char, after: char) -> LineBreak {
        let mut pair = String::with_capacity(8);
        pair.push(before);
        pair.push(after);
        let split = before.len_utf8();
        if self.opportunities(&pair).iter().any(|o| o.offset == split) {
            LineBreak::Yes
        } else {
            LineBreak::No
        }
    }
}

/// [`BreakOracle`] backed by the `unicode-linebreak` implementation of
/// UAX #14.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeBreakOracle;

impl BreakOracle for UnicodeBreakOracle {
    fn opportunities(&self, text: &str) -> Vec<BreakOpportunity> {
        linebreaks(text)
            .filter(|&(offset, _)| offset > 0 && offset < text.len())
            .map(|(offset, opportunity)| BreakOpportunity {
                offset,
                mandatory: matches!(opportunity, UnicodeBreakOpportunity::Mandatory),
            })
            .collect()
    }
}

/// One unbreakable piece of a text run: a word plus the white space
/// that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    /// Byte range of the whole segment in the original text.
    pub range: Range<usize>,
    /// End of the non-white-space part. Equal to `range.start` for a
    /// segment that is only white space.
    pub word_end: usize,
    /// Whether a line may break before this segment. Always
    /// [`LineBreak::No`] for the first segment; the caller decides the
    /// join with preceding content.
    pub break_before: LineBreak,
    /// A preserved newline ends this segment.
    pub forced_break_after: bool,
    /// Byte offset where the next segment starts (after a forced newline).
    pub raw_end: usize,
}

impl TextSegment {
    /// The segment has no visible characters.
    #[must_use]
    pub const fn is_whitespace_only(&self) -> bool {
        self.word_end == self.range.start
    }

    /// The segment has trailing white space (excluding a forced newline).
    #[must_use]
    pub const fn has_trailing_whitespace(&self) -> bool {
        self.word_end < self.range.end
    }
}

/// Characters that `white-space` collapsing treats as spaces.
///
/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
#[must_use]
pub const fn is_collapsible_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Split a text run into segments at the break opportunities that
/// `white_space` allows.
///
/// With collapsing white space, newlines and tabs count as spaces and
/// never force a break. With preserved white space, a newline forces a
/// break after the segment that contains it, and soft opportunities are
/// only taken when the mode wraps.
///
/// # Errors
///
/// Returns [`LayoutError::OutOfMemory`] if the segment list cannot grow.
pub fn segment_text(
    text: &str,
    white_space: WhiteSpace,
    oracle: &dyn BreakOracle,
    budget: &mut MemoryBudget,
) -> Result<Vec<TextSegment>, LayoutError> {
    let mut segments = Vec::new();
    if text.is_empty() {
        return Ok(segments);
    }

    // STEP 1: Normalize collapsible white space. Every replaced character
    // is ASCII, so byte offsets are unchanged.
    let normalized;
    let classified: &str = if white_space.collapses() {
        normalized = text.replace(['\t', '\n', '\r'], " ");
        &normalized
    } else {
        text
    };

    // STEP 2: Pick the opportunities this mode takes.
    let boundaries = oracle
        .opportunities(classified)
        .into_iter()
        .filter(|o| o.mandatory || white_space.wraps());

    // STEP 3: Cut segments and find where their trailing space starts.
    let mut start = 0;
    let mut push = |segments: &mut Vec<TextSegment>,
                    start: usize,
                    end: usize,
                    break_before: LineBreak|
     -> Result<(), LayoutError> {
        let piece = &text[start..end];
        let forced = !white_space.collapses() && piece.ends_with('\n');
        let body = if forced {
            piece.trim_end_matches(['\n', '\r'])
        } else {
            piece
        };
        let word_len = body.trim_end_matches(is_collapsible_space).len();
        let word_len = if white_space.collapses() || white_space.wraps() {
            word_len
        } else {
            // `pre` keeps trailing spaces as visible content.
            body.len()
        };
        budget.push(
            segments,
            TextSegment {
                range: start..start + body.len(),
                word_end: start + word_len,
                break_before,
                forced_break_after: forced,
                raw_end: end,
            },
        )
    };

    let mut break_before = LineBreak::No;
    for opportunity in boundaries {
        push(&mut segments, start, opportunity.offset, break_before)?;
        break_before = if white_space.wraps() {
            LineBreak::Yes
        } else {
            LineBreak::No
        };
        start = opportunity.offset;
    }
    push(&mut segments, start, text.len(), break_before)?;
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(text: &str, ws: WhiteSpace) -> Vec<TextSegment> {
        segment_text(text, ws, &UnicodeBreakOracle, &mut MemoryBudget::unlimited())
            .expect("unlimited budget")
    }

    #[test]
    fn test_normal_segments_carry_trailing_space() {
        let text = "foo bar  baz";
        let segs = segments(text, WhiteSpace::Normal);
        let words: Vec<&str> = segs.iter().map(|s| &text[s.range.start..s.word_end]).collect();
        assert_eq!(words, ["foo", "bar", "baz"]);
        assert!(segs[1].has_trailing_whitespace());
        assert_eq!(segs[0].break_before, LineBreak::No);
        assert_eq!(segs[1].break_before, LineBreak::Yes);
    }

    #[test]
    fn test_nowrap_is_one_segment() {
        let segs = segments("foo bar baz", WhiteSpace::NoWrap);
        assert_eq!(segs.len(), 1);
    }

    #[test]
    fn test_pre_breaks_only_at_newlines() {
        let text = "a b\ncd";
        let segs = segments(text, WhiteSpace::Pre);
        assert_eq!(segs.len(), 2);
        assert!(segs[0].forced_break_after);
        assert_eq!(&text[segs[0].range.clone()], "a b");
        assert_eq!(&text[segs[1].range.clone()], "cd");
    }

    #[test]
    fn test_collapsed_newline_is_a_space() {
        let segs = segments("foo\nbar", WhiteSpace::Normal);
        assert_eq!(segs.len(), 2);
        assert!(!segs[0].forced_break_after);
    }

    #[test]
    fn test_no_break_inside_nbsp() {
        assert_eq!(UnicodeBreakOracle.break_between('a', '\u{a0}'), LineBreak::No);
        assert_eq!(UnicodeBreakOracle.break_between(' ', 'a'), LineBreak::Yes);
    }
}
