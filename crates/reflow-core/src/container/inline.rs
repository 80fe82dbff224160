//! Inline content: text, atoms, inline boxes and line allocation.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! Inline content is turned into [`InlineItem`]s and handed to
//! `allocate_line_space`, which owns every line-breaking decision.

use reflow_common::warning::warn_once;

use super::{Container, layout_to_completion};
use crate::context::{LayoutInput, MarginMode, ReflowContext};
use crate::error::{LayoutError, LayoutStatus, ResumePoint};
use crate::geom::{LayoutCoord, to_coord};
use crate::layout_item::{BreakItem, VerticalLayout};
use crate::line::{Fragment, FragmentKind, InlineItem, Line};
use crate::margin::MarginChain;
use crate::reflow_state::{FirstLineState, ReflowState};
use crate::space::{Space, SpaceManager};
use crate::style::{BreakPolicy, Display, OverflowWrap, ResolvedStyle, TextAlign};
use crate::text::{FontMetrics, LineBreak, segment_text};
use crate::tree::{BoxContent, BoxId};
use crate::values::percent_of;
use crate::width::MinMaxWidths;

/// Object replacement character: what an atom looks like to the break
/// oracle.
const ATOM_CHAR: char = '\u{fffc}';

/// Font size and line height in effect for some inline content.
#[derive(Debug, Clone, Copy)]
pub(super) struct Font {
    size: f32,
    line_height: LayoutCoord,
}

impl Font {
    /// Split the line height around the baseline.
    ///
    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "Half the leading is added above A and the other half below D,
    /// giving the glyphs and their leading, L, a total height above the
    /// baseline of A' = A + L/2 and a total depth of D' = D + L/2."
    fn split(self, metrics: &dyn FontMetrics) -> (LayoutCoord, LayoutCoord) {
        #[allow(clippy::cast_precision_loss)]
        let leading = self.line_height as f32 - self.size;
        let ascent = to_coord(metrics.ascent(self.size) + leading / 2.0);
        (ascent, self.line_height - ascent)
    }

    fn measure(self, metrics: &dyn FontMetrics, text: &str) -> LayoutCoord {
        to_coord(metrics.text_width(text, self.size))
    }
}

impl Container {
    /// The font for content styled `style`, with `::first-line`
    /// overrides while the first line is open.
    pub(super) fn font_for(
        cx: &ReflowContext<'_>,
        state: &ReflowState,
        style: &ResolvedStyle,
    ) -> Font {
        let normal_height = |size: f32| to_coord(cx.metrics.line_height(size));
        if state.first_line_active()
            && let Some(first) = state.first_line_style
        {
            let size = first.font_size.unwrap_or(style.font_size);
            let line_height = first
                .line_height
                .or(if first.font_size.is_some() { None } else { style.line_height })
                .unwrap_or_else(|| normal_height(size));
            return Font { size, line_height };
        }
        Font {
            size: style.font_size,
            line_height: style.line_height.unwrap_or_else(|| normal_height(style.font_size)),
        }
    }

    /// The container's own font: the strut of every line.
    fn strut(&self, cx: &ReflowContext<'_>, state: &ReflowState) -> Font {
        Self::font_for(cx, state, cx.tree.style(self.node))
    }

    /// Resume point at `text_offset` in the box the cursor addresses.
    fn resume_point(state: &ReflowState, text_offset: usize) -> Result<ResumePoint, LayoutError> {
        let mut path = Vec::new();
        path.try_reserve(state.cursor.len())?;
        path.extend_from_slice(&state.cursor);
        Ok(ResumePoint { path, text_offset })
    }

    /// Resume point just after the box the cursor addresses.
    fn resume_after(state: &ReflowState) -> Result<ResumePoint, LayoutError> {
        let mut point = Self::resume_point(state, 0)?;
        if let Some(last) = point.path.last_mut() {
            *last += 1;
        }
        Ok(point)
    }

    /// Whether a line may break before content starting with `first`.
    fn join_break(cx: &ReflowContext<'_>, state: &ReflowState, style: &ResolvedStyle, first: char) -> LineBreak {
        if state.force_break_opportunity {
            return LineBreak::Yes;
        }
        match state.last_char {
            Some(previous) if style.white_space.wraps() => cx.oracle.break_between(previous, first),
            _ => LineBreak::No,
        }
    }

    /// Lay out an inline-level child.
    pub(super) fn layout_inline_node(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        node: BoxId,
        resume: Option<(&ResumePoint, usize)>,
    ) -> Result<LayoutStatus, LayoutError> {
        let tree = cx.tree;
        let box_node = tree.node(node);
        let style = &box_node.style;
        let resumed_inside = resume.is_some_and(|(point, depth)| point.path.len() > depth);

        match &box_node.content {
            BoxContent::Text(text) => {
                if let Some((point, _)) = resume.filter(|_| resumed_inside) {
                    return Err(LayoutError::ResumeMismatch(point.clone()));
                }
                let offset = resume.map_or(0, |(point, _)| point.text_offset);
                self.layout_text(cx, space, state, node, text, offset)
            }
            BoxContent::LineBreak => {
                let after = Self::resume_after(state)?;
                self.force_line_break(cx, space, state, Some(node), after)
            }
            BoxContent::WordBreak => {
                state.force_break_opportunity = true;
                Ok(LayoutStatus::Continue)
            }
            BoxContent::Marker { width } => {
                let strut = Self::font_for(cx, state, style);
                let (ascent, descent) = strut.split(cx.metrics);
                let item = InlineItem {
                    fragment: Fragment::new(node, FragmentKind::Marker, *width)
                        .with_metrics(ascent, descent),
                    break_before: LineBreak::No,
                    trailing_whitespace: 0,
                    intrinsic: MinMaxWidths::exact(*width),
                    is_word: false,
                    is_content: false,
                };
                let position = Self::resume_point(state, 0)?;
                self.allocate_line_space(cx, space, state, item, position)
            }
            BoxContent::Replaced(replaced) => {
                let width = replaced
                    .percent_width
                    .map_or(replaced.width, |p| percent_of(p, state.content_width));
                // A percentage width follows the container, so it cannot
                // size the container: it shrinks to nothing and grows to
                // the intrinsic width.
                let floor = if replaced.percent_width.is_some() { 0 } else { width };
                let item = InlineItem {
                    fragment: Fragment::new(node, FragmentKind::Replaced, width)
                        .with_metrics(replaced.height, 0),
                    break_before: Self::join_break(cx, state, style, ATOM_CHAR),
                    trailing_whitespace: 0,
                    intrinsic: MinMaxWidths {
                        minimum: floor,
                        normal_minimum: floor,
                        maximum: replaced.width,
                    },
                    is_word: true,
                    is_content: true,
                };
                self.place_atom(cx, space, state, item)
            }
            BoxContent::Element if style.is_block_level() => {
                let _ = warn_once(
                    "Layout",
                    "block-level box inside an inline box is laid out as an inline-block",
                );
                self.layout_inline_block(cx, space, state, node)
            }
            BoxContent::Element if matches!(style.display, Display::InlineBlock) => {
                self.layout_inline_block(cx, space, state, node)
            }
            BoxContent::Element => self.layout_inline_box(cx, space, state, node, resume),
        }
    }

    /// Allocate an atom and remember it for break decisions.
    fn place_atom(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        item: InlineItem,
    ) -> Result<LayoutStatus, LayoutError> {
        let position = Self::resume_point(state, 0)?;
        let status = self.allocate_line_space(cx, space, state, item, position)?;
        if status == LayoutStatus::Continue {
            state.last_char = Some(ATOM_CHAR);
            state.after_collapsible_space = false;
        }
        Ok(status)
    }

    /// [§ 10.3.9 'Inline-block', non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
    fn layout_inline_block(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        node: BoxId,
    ) -> Result<LayoutStatus, LayoutError> {
        let tree = cx.tree;
        let mut container = Self::take_child(state, node, tree);
        let input = LayoutInput {
            available_width: state.content_width,
            containing_height: state.child_containing_height,
            margin_mode: MarginMode::Atomic,
            incoming: MarginChain::new(0, 0),
            ..LayoutInput::default()
        };
        layout_to_completion(&mut container, cx, space, &input)?;

        let margins = container.margin;
        let width = container.width + margins.horizontal();
        let height = container.height + margins.vertical();
        let intrinsic = container
            .min_max_width()
            .map_or(MinMaxWidths::exact(width), |w| w.widened(margins.horizontal()));
        let style = tree.style(node);
        let item = InlineItem {
            fragment: Fragment::new(node, FragmentKind::InlineBlock(container), width)
                .with_metrics(height, 0),
            break_before: Self::join_break(cx, state, style, ATOM_CHAR),
            trailing_whitespace: 0,
            intrinsic,
            is_word: true,
            is_content: true,
        };
        self.place_atom(cx, space, state, item)
    }

    /// An inline box: start edge, children, end edge.
    ///
    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    fn layout_inline_box(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        node: BoxId,
        resume: Option<(&ResumePoint, usize)>,
    ) -> Result<LayoutStatus, LayoutError> {
        let tree = cx.tree;
        let style = tree.style(node);
        let children = tree.children(node);
        let base = Some(state.content_width);
        let (ascent, descent) = Self::font_for(cx, state, style).split(cx.metrics);

        let resumed_inside = resume.filter(|(point, depth)| point.path.len() > *depth);
        let start = match resumed_inside {
            Some((point, depth)) => match point.index_at(depth) {
                Some(index) if index <= children.len() => index,
                _ => return Err(LayoutError::ResumeMismatch(point.clone())),
            },
            None => 0,
        };

        // STEP 1: Start edge, unless resuming inside the box.
        if resumed_inside.is_none() {
            let edge = style.margin.left.resolve_or_zero(base) + style.border.left + style.padding.left;
            if edge != 0 {
                let break_before = if state.after_collapsible_space && style.white_space.wraps() {
                    LineBreak::Yes
                } else {
                    LineBreak::No
                };
                let item = edge_item(node, FragmentKind::InlineStart, edge, ascent, descent, break_before);
                let position = Self::resume_point(state, 0)?;
                if let LayoutStatus::EndOfFirstLine(point) =
                    self.allocate_line_space(cx, space, state, item, position)?
                {
                    return Ok(LayoutStatus::EndOfFirstLine(point));
                }
                state.after_collapsible_space = false;
            }
        }

        // STEP 2: Children.
        for (index, &child) in children.iter().enumerate().skip(start) {
            cx.budget.push(&mut state.cursor, index)?;
            let child_resume = resumed_inside
                .filter(|_| index == start)
                .map(|(point, depth)| (point, depth + 1));
            let status = self.layout_child(cx, space, state, child, index, child_resume, true);
            let _ = state.cursor.pop();
            if let LayoutStatus::EndOfFirstLine(point) = status? {
                return Ok(LayoutStatus::EndOfFirstLine(point));
            }
        }

        // STEP 3: End edge.
        let edge = style.margin.right.resolve_or_zero(base) + style.border.right + style.padding.right;
        if edge != 0 {
            let item = edge_item(node, FragmentKind::InlineEnd, edge, ascent, descent, LineBreak::No);
            cx.budget.push(&mut state.cursor, children.len())?;
            let position = Self::resume_point(state, 0);
            let _ = state.cursor.pop();
            return self.allocate_line_space(cx, space, state, item, position?);
        }
        Ok(LayoutStatus::Continue)
    }

    /// Lay out a text run from byte `offset`.
    ///
    /// [§ 4 White Space and Wrapping: the white-space property](https://www.w3.org/TR/css-text-3/#white-space-property)
    fn layout_text(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        node: BoxId,
        text: &str,
        offset: usize,
    ) -> Result<LayoutStatus, LayoutError> {
        let Some(rest) = text.get(offset..) else {
            return Err(LayoutError::ResumeMismatch(Self::resume_point(state, offset)?));
        };
        let tree = cx.tree;
        let style = tree.style(node);
        let segments = segment_text(rest, style.white_space, cx.oracle, &mut cx.budget)?;

        for (i, segment) in segments.iter().enumerate() {
            let start = offset + segment.range.start;
            let word_end = offset + segment.word_end;
            let end = offset + segment.range.end;
            let break_before = if i == 0 { None } else { Some(segment.break_before) };

            if let LayoutStatus::EndOfFirstLine(point) =
                self.layout_word(cx, space, state, node, text, (start, word_end, end), break_before)?
            {
                return Ok(LayoutStatus::EndOfFirstLine(point));
            }

            if segment.forced_break_after {
                let after = Self::resume_point(state, offset + segment.raw_end)?;
                if let LayoutStatus::EndOfFirstLine(point) =
                    self.force_line_break(cx, space, state, Some(node), after)?
                {
                    return Ok(LayoutStatus::EndOfFirstLine(point));
                }
            }
        }
        Ok(LayoutStatus::Continue)
    }

    /// Lay out one segment: `text[start..word_end]` is the word and
    /// `text[word_end..end]` its trailing white space. `break_before` is
    /// `None` for the first segment of the run, which joins with whatever
    /// came before.
    #[allow(clippy::too_many_arguments)]
    fn layout_word(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        node: BoxId,
        text: &str,
        (start, word_end, end): (usize, usize, usize),
        break_before: Option<LineBreak>,
    ) -> Result<LayoutStatus, LayoutError> {
        let tree = cx.tree;
        let style = tree.style(node);
        let collapses = style.white_space.collapses();
        let word = &text[start..word_end];

        // STEP 1: Collapse white space at line starts and after spaces.
        // [§ 4.1.1] "Any collapsible space immediately following another
        // collapsible space [...] is collapsed to have zero advance width."
        if word.is_empty() && collapses && (state.after_collapsible_space || Self::at_line_start(state)) {
            return Ok(LayoutStatus::Continue);
        }

        // STEP 2: Measure.
        let font = Self::font_for(cx, state, style);
        let (ascent, descent) = font.split(cx.metrics);
        let (word_width, trailing) = if collapses {
            let trailing = if end > word_end { font.measure(cx.metrics, " ") } else { 0 };
            (font.measure(cx.metrics, word), trailing)
        } else {
            let tab = " ".repeat(usize::from(cx.config.tab_size));
            let measure = |s: &str| {
                if s.contains('\t') {
                    font.measure(cx.metrics, &s.replace('\t', &tab))
                } else {
                    font.measure(cx.metrics, s)
                }
            };
            let trailing = if style.white_space.wraps() { measure(&text[word_end..end]) } else { 0 };
            (measure(&text[start..word_end]), trailing)
        };

        let first_break = match (break_before, text[start..end].chars().next()) {
            (Some(LineBreak::Yes), _) => LineBreak::Yes,
            (Some(LineBreak::No), _) if !state.force_break_opportunity => LineBreak::No,
            (_, Some(first)) => Self::join_break(cx, state, style, first),
            (_, None) => LineBreak::No,
        };

        // STEP 3: Split words that may break anywhere and cannot fit.
        // [§ 5.5 Overflow Wrapping: the overflow-wrap property](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
        let break_word = style.overflow_wrap == OverflowWrap::BreakWord;
        let widest_char = if break_word {
            word.chars()
                .map(|c| font.measure(cx.metrics, c.encode_utf8(&mut [0; 4])))
                .max()
                .unwrap_or(0)
        } else {
            word_width
        };
        let mut pieces = Vec::new();
        if break_word && word_width > state.content_width && style.white_space.wraps() {
            let mut piece_start = start;
            let mut piece_width = 0;
            for (i, c) in word.char_indices() {
                let w = font.measure(cx.metrics, c.encode_utf8(&mut [0; 4]));
                if piece_width > 0 && piece_width + w > state.content_width {
                    cx.budget.push(&mut pieces, (piece_start, start + i, piece_width))?;
                    piece_start = start + i;
                    piece_width = 0;
                }
                piece_width += w;
            }
            cx.budget.push(&mut pieces, (piece_start, word_end, piece_width))?;
        } else {
            cx.budget.push(&mut pieces, (start, word_end, word_width))?;
        }

        // STEP 4: Allocate.
        let last = pieces.len() - 1;
        for (i, &(piece_start, piece_end, width)) in pieces.iter().enumerate() {
            let is_last = i == last;
            let piece_trailing = if is_last { trailing } else { 0 };
            let range_end = if is_last { end } else { piece_end };
            let item = InlineItem {
                fragment: Fragment::new(
                    node,
                    FragmentKind::Text {
                        range: piece_start..range_end,
                    },
                    width + piece_trailing,
                )
                .with_metrics(ascent, descent),
                break_before: if i == 0 { first_break } else { LineBreak::Yes },
                trailing_whitespace: piece_trailing,
                intrinsic: MinMaxWidths {
                    minimum: widest_char.min(width),
                    normal_minimum: if break_word { widest_char.min(width) } else { width },
                    maximum: width,
                },
                is_word: piece_start < piece_end,
                is_content: true,
            };
            let position = Self::resume_point(state, piece_start)?;
            let status = self.allocate_line_space(cx, space, state, item, position)?;
            if status != LayoutStatus::Continue {
                return Ok(status);
            }
            state.force_break_opportunity = false;
        }

        state.last_char = text[start..end].chars().next_back();
        state.after_collapsible_space = collapses && end > word_end;
        Ok(LayoutStatus::Continue)
    }

    /// Nothing is on the open line yet (or no line is open).
    fn at_line_start(state: &ReflowState) -> bool {
        state
            .reflow_line
            .as_ref()
            .is_none_or(|line| line.fragments.is_empty() && state.buffer.is_empty())
    }

    /// Put an item on the open line, breaking lines as needed.
    ///
    /// [§ 5.1 Line Breaking Details](https://www.w3.org/TR/css-text-3/#line-break-details)
    ///
    /// The item joins the pending envelope. If the envelope no longer fits
    /// and the line has committed content, the line closes before the
    /// envelope and the envelope moves to a new line. An item that cannot
    /// fit even on an empty line overflows it.
    pub(super) fn allocate_line_space(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        item: InlineItem,
        position: ResumePoint,
    ) -> Result<LayoutStatus, LayoutError> {
        // STEP 1: Make sure a line is open, and commit at a break opportunity.
        if state.reflow_line.is_none() {
            self.get_new_line(cx, space, state, item.required_width())?;
        }
        if item.break_before == LineBreak::Yes {
            Self::commit_pending(cx, state)?;
        }
        if state.buffer.is_empty() {
            state.minmax_checkpoint = state.minmax;
        }
        if state.calculate_min_max {
            state.minmax.add_inline(
                &item.intrinsic,
                item.trailing_whitespace,
                item.break_before == LineBreak::Yes,
            );
        }

        // STEP 2: Fit test.
        loop {
            let Some(line) = state.reflow_line.as_ref() else {
                self.get_new_line(cx, space, state, item.required_width())?;
                continue;
            };
            let needed = line.used_space + state.buffer.width() + item.required_width();
            if needed <= line.width || !line.has_committed_content() {
                state.buffer.push(item, position, &mut cx.budget)?;
                return Ok(LayoutStatus::Continue);
            }

            // STEP 3: Break before the envelope.
            if state.first_line_active() {
                let resume = match state.buffer.start() {
                    Some(start) => start.clone(),
                    None => position,
                };
                state.buffer.rollback();
                state.minmax = state.minmax_checkpoint;
                let _ = self.close_line(cx, space, state)?;
                return Ok(LayoutStatus::EndOfFirstLine(resume));
            }
            let carried = state.buffer.take();
            let _ = self.close_line(cx, space, state)?;
            self.get_new_line(cx, space, state, carried.required_width() + item.required_width())?;
            state.buffer.restore(carried);
        }
    }

    pub(super) fn commit_pending(cx: &mut ReflowContext<'_>, state: &mut ReflowState) -> Result<(), LayoutError> {
        match state.reflow_line.as_mut() {
            Some(line) => state.buffer.commit(line, &mut cx.budget),
            None => Ok(()),
        }
    }

    /// Open a line at the current position, beside the floats.
    ///
    /// [§ 9.4.2] "the current and subsequent line boxes created next to
    /// the float are shortened as necessary to make room for the margin
    /// box of the float."
    fn get_new_line(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        min_width: LayoutCoord,
    ) -> Result<(), LayoutError> {
        self.settle_margins(space, state);
        let tree = cx.tree;
        let style = tree.style(self.node);
        let strut = self.strut(cx, state);

        let content_width = state.content_width;
        let limited = cx
            .config
            .paragraph_width_limit
            .is_some_and(|limit| limit < content_width);
        let mut min_width = min_width.clamp(0, content_width.max(0));
        if limited {
            // Lines beside a float narrower than this move below it.
            min_width = min_width.max(cx.config.min_limited_line_width.min(content_width));
        }

        let top = state.bfc_position();
        let found = space.get_space(top, state.bfc_x, content_width, min_width, strut.line_height);
        let (x, width) = Self::line_extent(cx, state, style, found);
        let mut line = Line::new(x, found.y - state.bfc_y, width);
        line.is_first_line = state.first_line_active();
        if state.line_count == 0 {
            // [§ 7.1 First Line Indentation: the text-indent property]
            line.used_space = style.text_indent;
            line.noncontent = style.text_indent;
        }

        if state.calculate_min_max && state.minmax.paragraph_top.is_none() {
            state.minmax.paragraph_top = Some(found.y);
            if state.line_count == 0 {
                state.minmax.line_max += style.text_indent;
            }
        }
        state.line_count += 1;
        state.reflow_line = Some(line);
        Ok(())
    }

    /// Horizontal extent of a line in free space `found`, with the
    /// paragraph width limit applied.
    fn line_extent(
        cx: &ReflowContext<'_>,
        state: &ReflowState,
        style: &ResolvedStyle,
        found: Space,
    ) -> (LayoutCoord, LayoutCoord) {
        let mut x = found.x - state.bfc_x;
        let mut width = found.width;
        if let Some(limit) = cx.config.paragraph_width_limit
            && width > limit
        {
            match style.physical_align() {
                TextAlign::Right => x += width - limit,
                TextAlign::Center => x += (width - limit) / 2,
                _ => {}
            }
            width = limit;
        }
        (x, width)
    }

    /// Re-fit the open line after a float was placed beside it.
    pub(super) fn fit_open_line(&self, cx: &ReflowContext<'_>, space: &SpaceManager, state: &mut ReflowState) {
        let style = cx.tree.style(self.node);
        let strut = self.strut(cx, state);
        let Some(line) = state.reflow_line.as_ref() else {
            return;
        };
        let top = state.bfc_y + line.y;
        let min_width = if line.has_committed_content() {
            0
        } else {
            state.buffer.width().max(1).min(state.content_width)
        };
        let found = space.get_space(top, state.bfc_x, state.content_width, min_width, strut.line_height);
        let (x, width) = Self::line_extent(cx, state, style, found);
        let y = found.y - state.bfc_y;
        if let Some(line) = state.reflow_line.as_mut() {
            line.x = x;
            line.width = width;
            if !line.has_committed_content() {
                line.y = y;
            }
        }
    }

    /// Close the open line: size it, align it, and place floats that
    /// waited for it. Returns whether this ended the `::first-line`.
    ///
    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// "The line box height is the distance between the uppermost box top
    /// and the lowermost box bottom."
    pub(super) fn close_line(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
    ) -> Result<bool, LayoutError> {
        let Some(mut line) = state.reflow_line.take() else {
            return Ok(false);
        };
        state.buffer.commit(&mut line, &mut cx.budget)?;
        let tree = cx.tree;
        let style = tree.style(self.node);
        let (strut_ascent, strut_descent) = self.strut(cx, state).split(cx.metrics);

        // STEP 1: Height and baseline.
        let ascent = line.fragments.iter().map(|f| f.ascent).fold(strut_ascent, LayoutCoord::max);
        let descent = line.fragments.iter().map(|f| f.descent).fold(strut_descent, LayoutCoord::max);
        line.baseline = ascent;
        line.height = ascent + descent;

        // STEP 2: Alignment.
        // [§ 6.1 Text Alignment: the text-align shorthand]
        let content = line.content_width();
        let free = line.width - content;
        let offset = match style.physical_align() {
            TextAlign::Right => free,
            TextAlign::Center => free / 2,
            _ => 0,
        }
        .max(0);
        let mut cursor = offset + line.noncontent;
        let mut leftmost = 0;
        for fragment in &mut line.fragments {
            fragment.x = cursor;
            fragment.y = ascent - fragment.ascent;
            leftmost = leftmost.min(cursor);
            cursor += fragment.width;
            if let FragmentKind::InlineBlock(container) = &mut fragment.kind {
                container.x = line.x + fragment.x + container.margin.left;
                container.y = line.y + fragment.y + container.margin.top;
            }
        }
        line.overflow_left = -leftmost;
        line.overflow_right = (offset + content - line.width).max(0);

        // STEP 3: Advance.
        if state.calculate_min_max && !state.minmax.paragraph_line_counted {
            state.minmax.min_height += line.height;
            state.minmax.paragraph_line_counted = true;
        }
        state.reflow_position = line.bottom();
        state.pending = MarginChain::new(state.bfc_position(), space.len());
        let first_line_ended = state.first_line_active();
        if first_line_ended {
            state.first_line = FirstLineState::Finished;
        }
        cx.budget.push(&mut self.stack, VerticalLayout::Line(line))?;

        // STEP 4: Floats that waited for this line.
        self.place_deferred_floats(cx, space, state)?;
        Ok(first_line_ended)
    }

    /// A forced line break: `<br>` or a preserved newline.
    ///
    /// `after` is where layout continues if this ends the `::first-line`.
    pub(super) fn force_line_break(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        node: Option<BoxId>,
        after: ResumePoint,
    ) -> Result<LayoutStatus, LayoutError> {
        let first_line_ended = if let Some(line) = state.reflow_line.as_mut() {
            line.has_forced_break = true;
            self.close_line(cx, space, state)?
        } else {
            // A break with no line open still takes a line's height.
            self.settle_margins(space, state);
            let height = self.strut(cx, state).line_height;
            cx.budget.push(
                &mut self.stack,
                VerticalLayout::Break(BreakItem {
                    y: state.reflow_position,
                    height,
                    policy: BreakPolicy::Auto,
                    node,
                }),
            )?;
            state.reflow_position += height;
            state.pending = MarginChain::new(state.bfc_position(), space.len());
            let ended = state.first_line_active();
            if ended {
                state.first_line = FirstLineState::Finished;
            }
            ended
        };

        self.end_paragraph(space, state);
        state.last_char = None;
        state.after_collapsible_space = false;
        state.force_break_opportunity = false;
        if first_line_ended {
            return Ok(LayoutStatus::EndOfFirstLine(after));
        }
        Ok(LayoutStatus::Continue)
    }
}

fn edge_item(
    node: BoxId,
    kind: FragmentKind,
    width: LayoutCoord,
    ascent: LayoutCoord,
    descent: LayoutCoord,
    break_before: LineBreak,
) -> InlineItem {
    InlineItem {
        fragment: Fragment::new(node, kind, width).with_metrics(ascent, descent),
        break_before,
        trailing_whitespace: 0,
        intrinsic: MinMaxWidths::exact(width),
        is_word: false,
        is_content: true,
    }
}
