//! Line boxes and the inline item buffer.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! Items are not placed on a line one by one. Items joined without a
//! break opportunity form an envelope in the [`LineBuffer`], and the
//! envelope is committed to the line only when the next break opportunity
//! arrives. If the envelope does not fit, the line closes before it and
//! the whole envelope moves to the next line.

use std::ops::Range;

use crate::container::Container;
use crate::error::{LayoutError, MemoryBudget, ResumePoint};
use crate::geom::LayoutCoord;
use crate::text::LineBreak;
use crate::tree::BoxId;
use crate::width::MinMaxWidths;

/// What a fragment on a line shows.
#[derive(Debug)]
pub enum FragmentKind {
    /// A slice of a text run.
    Text {
        /// Byte range into the text of the fragment's node.
        range: Range<usize>,
    },
    /// The start edge (margin, border, padding) of an inline box.
    InlineStart,
    /// The end edge of an inline box.
    InlineEnd,
    /// A replaced element.
    Replaced,
    /// A list item marker.
    Marker,
    /// An inline-block, laid out as its own container.
    InlineBlock(Box<Container>),
}

/// One horizontally placed piece of a line.
#[derive(Debug)]
pub struct Fragment {
    /// The box the fragment belongs to.
    pub node: BoxId,
    /// What the fragment shows.
    pub kind: FragmentKind,
    /// Left edge relative to the line box.
    pub x: LayoutCoord,
    /// Top edge relative to the line box.
    pub y: LayoutCoord,
    /// Advance width, including trailing white space.
    pub width: LayoutCoord,
    /// Height above the baseline.
    pub ascent: LayoutCoord,
    /// Height below the baseline.
    pub descent: LayoutCoord,
}

impl Fragment {
    /// A fragment with no vertical extent, placed later by the line.
    #[must_use]
    pub const fn new(node: BoxId, kind: FragmentKind, width: LayoutCoord) -> Self {
        Self {
            node,
            kind,
            x: 0,
            y: 0,
            width,
            ascent: 0,
            descent: 0,
        }
    }

    /// Set the vertical metrics.
    #[must_use]
    pub const fn with_metrics(mut self, ascent: LayoutCoord, descent: LayoutCoord) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }

    /// The text byte range, for text fragments.
    #[must_use]
    pub fn text_range(&self) -> Option<Range<usize>> {
        match &self.kind {
            FragmentKind::Text { range } => Some(range.clone()),
            _ => None,
        }
    }
}

/// An item waiting for a line.
#[derive(Debug)]
pub struct InlineItem {
    /// The fragment the item becomes once placed.
    pub fragment: Fragment,
    /// Whether the line may break before this item.
    pub break_before: LineBreak,
    /// Part of the width that may hang past the end of a line.
    pub trailing_whitespace: LayoutCoord,
    /// Intrinsic widths without the trailing white space. `minimum` is
    /// below the width for text that may break anywhere and zero for
    /// percentage-sized replaced content.
    pub intrinsic: MinMaxWidths,
    /// Counts as a word for justification.
    pub is_word: bool,
    /// Is real content. A line holding only a list marker is not
    /// committed before a float.
    pub is_content: bool,
}

impl InlineItem {
    /// Width that must fit on the line.
    #[must_use]
    pub const fn required_width(&self) -> LayoutCoord {
        self.fragment.width - self.trailing_whitespace
    }
}

/// A line box.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
#[derive(Debug, Default)]
pub struct Line {
    /// Left edge relative to the container's content box.
    pub x: LayoutCoord,
    /// Top edge relative to the container's content box.
    pub y: LayoutCoord,
    /// Available width.
    pub width: LayoutCoord,
    /// Height, known once the line is closed.
    pub height: LayoutCoord,
    /// Baseline offset from the top of the line, known once closed.
    pub baseline: LayoutCoord,
    /// Width taken by committed items, `text-indent` included.
    pub used_space: LayoutCoord,
    /// White space at the end of the committed items.
    pub trailing_whitespace: LayoutCoord,
    /// Width at the start that is not content (`text-indent`).
    pub noncontent: LayoutCoord,
    /// Committed words, for justification.
    pub number_of_words: u32,
    /// The line ended at a forced break.
    pub has_forced_break: bool,
    /// The line was formatted with `::first-line` properties.
    pub is_first_line: bool,
    /// Only a list marker has been committed so far.
    pub marker_only: bool,
    /// How far content sticks out past the left edge.
    pub overflow_left: LayoutCoord,
    /// How far content sticks out past the right edge.
    pub overflow_right: LayoutCoord,
    /// Committed fragments in logical order.
    pub fragments: Vec<Fragment>,
    committed_content: bool,
}

impl Line {
    /// A new empty line.
    #[must_use]
    pub fn new(x: LayoutCoord, y: LayoutCoord, width: LayoutCoord) -> Self {
        Self {
            x,
            y,
            width,
            ..Self::default()
        }
    }

    /// Bottom edge relative to the container's content box.
    #[must_use]
    pub const fn bottom(&self) -> LayoutCoord {
        self.y + self.height
    }

    /// Some content has been committed.
    #[must_use]
    pub const fn has_committed_content(&self) -> bool {
        self.committed_content
    }

    /// Width taken by committed content, without trailing white space.
    #[must_use]
    pub const fn content_width(&self) -> LayoutCoord {
        self.used_space - self.trailing_whitespace
    }

    /// Width still free after committed content.
    #[must_use]
    pub const fn remaining_width(&self) -> LayoutCoord {
        self.width - self.content_width()
    }
}

/// The open envelope: items joined without a break opportunity.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<Fragment>,
    width: LayoutCoord,
    trailing_whitespace: LayoutCoord,
    words: u32,
    has_content: bool,
    has_marker: bool,
    start: Option<ResumePoint>,
}

/// Envelope contents carried from a closed line to the next one.
#[derive(Debug, Default)]
pub struct PendingEnvelope {
    buffer: LineBuffer,
}

impl PendingEnvelope {
    /// Total width of the carried items.
    #[must_use]
    pub const fn width(&self) -> LayoutCoord {
        self.buffer.width
    }

    /// Width that must fit on the next line.
    #[must_use]
    pub const fn required_width(&self) -> LayoutCoord {
        self.buffer.width - self.buffer.trailing_whitespace
    }
}

impl LineBuffer {
    /// No item is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Width of the pending items, trailing white space included.
    #[must_use]
    pub const fn width(&self) -> LayoutCoord {
        self.width
    }

    /// The envelope holds a list marker and nothing else.
    #[must_use]
    pub const fn is_marker_only(&self) -> bool {
        self.has_marker && !self.has_content
    }

    /// Where the envelope started, for resuming after `::first-line`.
    #[must_use]
    pub const fn start(&self) -> Option<&ResumePoint> {
        self.start.as_ref()
    }

    /// Append an item to the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] if the buffer cannot grow.
    pub fn push(
        &mut self,
        item: InlineItem,
        position: ResumePoint,
        budget: &mut MemoryBudget,
    ) -> Result<(), LayoutError> {
        if self.pending.is_empty() {
            self.start = Some(position);
        }
        self.width += item.fragment.width;
        self.trailing_whitespace = item.trailing_whitespace;
        self.words += u32::from(item.is_word);
        self.has_content |= item.is_content;
        self.has_marker |= matches!(item.fragment.kind, FragmentKind::Marker);
        budget.push(&mut self.pending, item.fragment)
    }

    /// Move the envelope onto `line`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] if the line cannot grow.
    pub fn commit(&mut self, line: &mut Line, budget: &mut MemoryBudget) -> Result<(), LayoutError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        line.fragments.try_reserve(self.pending.len())?;
        for fragment in self.pending.drain(..) {
            budget.charge()?;
            line.fragments.push(fragment);
        }
        line.used_space += self.width;
        line.trailing_whitespace = self.trailing_whitespace;
        line.number_of_words += self.words;
        if self.has_content {
            line.committed_content = true;
            line.marker_only = false;
        } else if self.has_marker && !line.committed_content {
            line.marker_only = true;
        }
        self.clear();
        Ok(())
    }

    /// Drop the envelope. Used when the line is rolled back to the start
    /// of the envelope so the items can be produced again later.
    pub fn rollback(&mut self) {
        self.pending.clear();
        self.clear();
    }

    /// Take the envelope out to carry it to the next line.
    #[must_use]
    pub fn take(&mut self) -> PendingEnvelope {
        PendingEnvelope {
            buffer: std::mem::take(self),
        }
    }

    /// Put a carried envelope back.
    pub fn restore(&mut self, envelope: PendingEnvelope) {
        *self = envelope.buffer;
    }

    fn clear(&mut self) {
        self.width = 0;
        self.trailing_whitespace = 0;
        self.words = 0;
        self.has_content = false;
        self.has_marker = false;
        self.start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_item(width: LayoutCoord, trailing: LayoutCoord) -> InlineItem {
        InlineItem {
            fragment: Fragment::new(BoxId(1), FragmentKind::Text { range: 0..1 }, width),
            break_before: LineBreak::Yes,
            trailing_whitespace: trailing,
            intrinsic: MinMaxWidths::exact(width - trailing),
            is_word: true,
            is_content: true,
        }
    }

    #[test]
    fn test_commit_moves_envelope_to_line() {
        let mut budget = MemoryBudget::unlimited();
        let mut line = Line::new(0, 0, 100);
        let mut buffer = LineBuffer::default();
        buffer.push(text_item(30, 6), ResumePoint::default(), &mut budget).unwrap();
        buffer.push(text_item(20, 0), ResumePoint::default(), &mut budget).unwrap();
        buffer.commit(&mut line, &mut budget).unwrap();

        assert!(buffer.is_empty());
        assert_eq!(line.used_space, 50);
        assert_eq!(line.number_of_words, 2);
        assert_eq!(line.fragments.len(), 2);
        assert!(line.has_committed_content());
    }

    #[test]
    fn test_marker_alone_marks_line() {
        let mut budget = MemoryBudget::unlimited();
        let mut line = Line::new(0, 0, 100);
        let mut buffer = LineBuffer::default();
        let mut marker = text_item(10, 0);
        marker.is_content = false;
        marker.fragment.kind = FragmentKind::Marker;
        buffer.push(marker, ResumePoint::default(), &mut budget).unwrap();
        buffer.commit(&mut line, &mut budget).unwrap();
        assert!(line.marker_only);
        assert!(!line.has_committed_content());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_take_and_restore_keep_start() {
        let mut budget = MemoryBudget::unlimited();
        let mut buffer = LineBuffer::default();
        let start = ResumePoint {
            path: vec![2],
            text_offset: 4,
        };
        buffer.push(text_item(30, 6), start.clone(), &mut budget).unwrap();
        let carried = buffer.take();
        assert!(buffer.is_empty());
        assert_eq!(carried.required_width(), 24);
        buffer.restore(carried);
        assert_eq!(buffer.start(), Some(&start));
    }

    #[test]
    fn test_rollback_forgets_start() {
        let mut budget = MemoryBudget::unlimited();
        let mut buffer = LineBuffer::default();
        let start = ResumePoint {
            path: vec![1],
            text_offset: 3,
        };
        buffer.push(text_item(30, 6), start, &mut budget).unwrap();
        buffer.rollback();
        assert!(buffer.is_empty());
        assert_eq!(buffer.width(), 0);
        assert_eq!(buffer.start(), None);
    }
}
