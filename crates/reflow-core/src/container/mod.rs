//! Block containers and their reflow state machine.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block. The vertical
//! distance between two sibling boxes is determined by the 'margin'
//! properties."
//!
//! A [`Container`] is the layout of one block-level box (or float, or
//! inline-block). Each pass it walks its box's children once, building a
//! vertical stack of lines, blocks and floats:
//!
//! 1. `begin_layout` sizes the box, joins its top margin to the incoming
//!    chain and sets up a [`ReflowState`].
//! 2. Children are dispatched in order. Inline content goes through the
//!    line buffer in `inline.rs`, block children recurse in `block.rs`,
//!    floats are placed in `float.rs`.
//! 3. `finish_layout` closes the last line, settles the bottom margin and
//!    the height, and tears the state down.
//!
//! Positions stored in the stack are relative to the container's content
//! box, so moving a container moves everything in it.

mod block;
mod float;
mod inline;
mod minmax;

use std::collections::HashMap;

use crate::context::{InputKey, LayoutInput, LayoutOutcome, MarginMode, ReflowContext};
use crate::error::{LayoutError, LayoutStatus, ResumePoint};
use crate::geom::{EdgeSizes, LAYOUT_COORD_MIN, LayoutCoord, Point, Rect};
use crate::layout_item::VerticalLayout;
use crate::line::{FragmentKind, Line};
use crate::margin::{MarginChain, VerticalMargin};
use crate::reflow_state::{FirstLineState, ReflowState};
use crate::space::{FloatEntry, SpaceManager};
use crate::style::{Display, ResolvedStyle};
use crate::tree::{BoxContent, BoxId, BoxTree};
use crate::values::AutoOr;
use crate::width::{MinMaxWidths, UsedWidth, WidthStrategy, select_width_strategy};

/// Layout of one block container box.
#[derive(Debug)]
pub struct Container {
    node: BoxId,
    strategy: Box<dyn WidthStrategy>,
    stack: Vec<VerticalLayout>,
    /// Border-box left edge, relative to the parent's content box.
    pub x: LayoutCoord,
    /// Border-box top edge, relative to the parent's content box.
    pub y: LayoutCoord,
    /// Border-box width.
    pub width: LayoutCoord,
    /// Border-box height.
    pub height: LayoutCoord,
    /// Used margins.
    pub margin: EdgeSizes,
    content_offset: Point,
    content_width: LayoutCoord,
    widths: Option<MinMaxWidths>,
    min_height: LayoutCoord,
    minmax_calculated: bool,
    outcome: LayoutOutcome,
    last_key: Option<InputKey>,
    subtree_floats: Vec<FloatEntry>,
    reflow_state: Option<Box<ReflowState>>,
}

impl Container {
    /// A container for `node` that has never been laid out.
    #[must_use]
    pub fn new(node: BoxId, tree: &BoxTree) -> Self {
        Self {
            node,
            strategy: select_width_strategy(tree.style(node)),
            stack: Vec::new(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            margin: EdgeSizes::default(),
            content_offset: Point::default(),
            content_width: 0,
            widths: None,
            min_height: 0,
            minmax_calculated: false,
            outcome: LayoutOutcome::default(),
            last_key: None,
            subtree_floats: Vec::new(),
            reflow_state: None,
        }
    }

    /// The box this container lays out.
    #[must_use]
    pub const fn node(&self) -> BoxId {
        self.node
    }

    /// The vertical stack of the last pass.
    #[must_use]
    pub fn stack(&self) -> &[VerticalLayout] {
        &self.stack
    }

    /// The line boxes of the last pass, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.stack.iter().filter_map(VerticalLayout::as_line)
    }

    /// Border box relative to the parent's content box.
    #[must_use]
    pub const fn border_box(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Used content width.
    #[must_use]
    pub const fn content_width(&self) -> LayoutCoord {
        self.content_width
    }

    /// Offset of the content box from the border box.
    #[must_use]
    pub const fn content_offset(&self) -> Point {
        self.content_offset
    }

    /// Intrinsic widths (border box), once computed.
    #[must_use]
    pub const fn min_max_width(&self) -> Option<MinMaxWidths> {
        self.widths
    }

    /// Forget the intrinsic widths so the next pass recomputes them.
    pub fn clear_min_max_width(&mut self) {
        self.minmax_calculated = false;
        self.last_key = None;
    }

    /// Border-box height the content would need with unlimited width.
    #[must_use]
    pub const fn min_height(&self) -> LayoutCoord {
        self.min_height
    }

    /// The intrinsic widths are up to date with the box's subtree.
    #[must_use]
    pub const fn is_min_max_calculated(&self) -> bool {
        self.minmax_calculated
    }

    /// Vertical placement of the last pass.
    #[must_use]
    pub const fn outcome(&self) -> LayoutOutcome {
        self.outcome
    }

    /// The container is suspended mid-pass.
    #[must_use]
    pub const fn is_reflowing(&self) -> bool {
        self.reflow_state.is_some()
    }

    /// This container or any container below it is suspended mid-pass.
    #[must_use]
    pub fn any_reflowing(&self) -> bool {
        self.is_reflowing() || self.children().any(Self::any_reflowing)
    }

    /// Direct child containers: blocks, floats and inline-blocks.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.stack.iter().flat_map(|item| {
            let own = item.container().into_iter();
            let atoms = item.as_line().into_iter().flat_map(|line| {
                line.fragments.iter().filter_map(|f| match &f.kind {
                    FragmentKind::InlineBlock(c) => Some(&**c),
                    _ => None,
                })
            });
            own.chain(atoms)
        })
    }

    /// Find the container of `node` in this subtree.
    #[must_use]
    pub fn find(&self, node: BoxId) -> Option<&Self> {
        if self.node == node {
            return Some(self);
        }
        self.children().find_map(|c| c.find(node))
    }

    /// Compute the used width for a containing block of `available`.
    ///
    /// [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
    ///
    /// Shrink-to-fit boxes use the intrinsic widths of the last pass; on
    /// their first visit they take all of `available`.
    pub fn compute_size(&mut self, style: &ResolvedStyle, available: LayoutCoord) -> UsedWidth {
        let used = self.strategy.compute_width(style, available, self.widths.as_ref());
        self.content_width = used.content_width;
        self.margin.left = used.margin_left;
        self.margin.right = used.margin_right;
        self.width = used.content_width + style.border.horizontal() + style.padding.horizontal();
        self.x = used.margin_left;
        used
    }

    /// Lay the container out.
    ///
    /// Returns [`LayoutStatus::EndOfFirstLine`] when the box's
    /// `::first-line` ended; the caller must call again with the returned
    /// resume point in `input.resume` to finish the box.
    ///
    /// # Errors
    ///
    /// On failure the pass is abandoned: the container's reflow state is
    /// dropped and its intrinsic widths are marked stale, so the next pass
    /// starts clean.
    pub fn layout(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        input: &LayoutInput,
    ) -> Result<LayoutStatus, LayoutError> {
        #[cfg(feature = "layout-trace")]
        let _guard = {
            let guard = reflow_common::trace::DepthGuard::enter();
            log::trace!(
                target: "reflow",
                "{:indent$}layout {:?} available={} resume={:?}",
                "",
                self.node,
                input.available_width,
                input.resume,
                indent = guard.depth() * 2
            );
            guard
        };

        if let Some(state) = self.reflow_state.take() {
            match input.resume.as_ref() {
                Some(resume) => return self.run(cx, space, state, Some(resume)),
                None => log::debug!(target: "reflow", "{:?}: suspended layout restarted", self.node),
            }
        } else if let Some(resume) = &input.resume {
            return Err(LayoutError::ResumeMismatch(resume.clone()));
        }

        if self.can_skip(cx, space, input) {
            cx.note_skip();
            space.replay(&self.subtree_floats, &mut cx.budget)?;
            return Ok(LayoutStatus::Continue);
        }

        cx.note_layout();
        let state = match self.begin_layout(cx, space, input) {
            Ok(state) => state,
            Err(error) => {
                self.abandon();
                return Err(error);
            }
        };
        self.run(cx, space, state, None)
    }

    /// Finish a container suspended at the end of its `::first-line`
    /// without laying out the rest of its content.
    ///
    /// The box keeps the lines it has, gets its final height and drops its
    /// reflow state. Its intrinsic widths stay stale because they only
    /// cover part of the content.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] if closing the box fails.
    pub fn finish_layout(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
    ) -> Result<(), LayoutError> {
        let Some(mut state) = self.reflow_state.take() else {
            return Ok(());
        };
        state.calculate_min_max = false;
        self.minmax_calculated = false;
        let mut own_space = state.own_space.take();
        let space = own_space.as_mut().unwrap_or(space);
        let result = self.finish_with_state(cx, space, &mut state);
        self.last_key = None;
        if result.is_err() {
            self.abandon();
        }
        result
    }

    /// The last pass's result still holds for `input`.
    ///
    /// A box whose top margin joins a chain with floats hanging below it
    /// moves those floats when the margin joins, so it is always laid out.
    fn can_skip(&self, cx: &ReflowContext<'_>, space: &SpaceManager, input: &LayoutInput) -> bool {
        let moves_earlier_floats =
            input.margin_mode == MarginMode::Collapse && space.len() > input.incoming.float_mark;
        !moves_earlier_floats
            && self.minmax_calculated
            && !cx.tree.node(self.node).is_subtree_dirty()
            && self
                .last_key
                .is_some_and(|key| key == input.key(space.fingerprint()))
    }

    fn abandon(&mut self) {
        self.reflow_state = None;
        self.minmax_calculated = false;
        self.last_key = None;
    }

    /// Run the child loop and finish, or store the state on suspension.
    fn run(
        &mut self,
        cx: &mut ReflowContext<'_>,
        outer: &mut SpaceManager,
        mut state: Box<ReflowState>,
        resume: Option<&ResumePoint>,
    ) -> Result<LayoutStatus, LayoutError> {
        let mut own_space = state.own_space.take();
        let result = {
            let space = own_space.as_mut().unwrap_or(outer);
            match self.layout_children(cx, space, &mut state, resume) {
                Ok(LayoutStatus::Continue) => self
                    .finish_with_state(cx, space, &mut state)
                    .map(|()| LayoutStatus::Continue),
                other => other,
            }
        };

        match result {
            Ok(LayoutStatus::EndOfFirstLine(point)) => {
                state.own_space = own_space;
                self.reflow_state = Some(state);
                cx.note_suspension();
                Ok(LayoutStatus::EndOfFirstLine(point))
            }
            Ok(LayoutStatus::Continue) => Ok(LayoutStatus::Continue),
            Err(error) => {
                self.abandon();
                Err(error)
            }
        }
    }

    /// Set up the reflow state for a pass.
    fn begin_layout(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        input: &LayoutInput,
    ) -> Result<Box<ReflowState>, LayoutError> {
        let tree = cx.tree;
        let node = tree.node(self.node);
        let style = &node.style;
        let mut state = Box::new(ReflowState::new());
        state.entry_key = Some(input.key(space.fingerprint()));
        state.previous_box = self.last_key.map(|_| Rect::new(self.x, self.outcome.top_bfc, self.width, self.height));
        self.last_key = None;

        // STEP 1: Width.
        self.strategy = select_width_strategy(style);
        let used = self.compute_size(style, input.available_width);
        log::trace!(
            target: "reflow",
            "{:?}: {} width {} of {}",
            self.node,
            self.strategy.name(),
            used.content_width,
            input.available_width
        );
        state.content_width = used.content_width;
        state.available_width = input.available_width;
        self.content_offset = Point::new(
            style.border.left + style.padding.left,
            style.border.top + style.padding.top,
        );

        // STEP 2: Specified heights and vertical margins.
        // [§ 8.3 Margin properties] Percentages refer to the width of the
        // containing block.
        let base = Some(input.available_width);
        self.margin.top = style.margin.top.resolve_or_zero(base);
        self.margin.bottom = style.margin.bottom.resolve_or_zero(base);
        state.css_height = style.height.resolve(input.containing_height);
        state.child_containing_height = match state.css_height {
            AutoOr::Length(h) => Some(h),
            AutoOr::Auto => None,
        };

        // STEP 3: Intrinsic widths are recomputed when the subtree changed.
        state.calculate_min_max = !self.minmax_calculated || node.is_subtree_dirty();
        if state.calculate_min_max {
            self.minmax_calculated = false;
        }

        // STEP 4: Top position.
        self.position_top(cx, space, &mut state, style, input)?;

        // STEP 5: Keep last pass's children for reuse.
        let old = std::mem::take(&mut self.stack);
        retain_children(old, &mut state.retained)?;

        state.first_line_style = style.first_line;
        state.first_line = if style.first_line.is_some() {
            FirstLineState::Active
        } else {
            FirstLineState::Inactive
        };
        state.drop_default_margins = cx.config.quirks_mode && style.table_cell;
        state.space_mark = if state.own_space.is_some() { 0 } else { space.len() };
        Ok(state)
    }

    /// Join the top margin to the incoming chain and find where the
    /// content starts.
    ///
    /// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
    ///
    /// "The top margin of an in-flow block element collapses with its
    /// first in-flow block-level child's top margin if the element has no
    /// top border, no top padding, and the child has no clearance."
    fn position_top(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        style: &ResolvedStyle,
        input: &LayoutInput,
    ) -> Result<(), LayoutError> {
        let edge_top = style.border.top + style.padding.top;
        let mut chain = input.incoming;
        if input.margin_mode == MarginMode::Collapse {
            let mut delta = chain.add(self.margin.top, style.default_margin_top);
            if input.drop_default_margins {
                // Quirks: UA margins at the top of a table cell do not count.
                let mut margin = chain.margin;
                margin.drop_defaults();
                delta += chain.set_margin(margin);
            }
            translate_floats(cx, space, chain.float_mark, delta)?;
        }

        let opens_chain = input.margin_mode == MarginMode::Collapse
            && edge_top == 0
            && !style.establishes_bfc();
        state.top_bfc = chain.position();
        if opens_chain {
            state.in_parent_chain = true;
            state.bfc_y = chain.position();
            state.pending = chain;
        } else {
            state.closed_chain = Some(chain);
            state.bfc_y = state.top_bfc + edge_top;
        }

        if style.establishes_bfc() {
            state.own_space = Some(SpaceManager::new());
            state.bfc_x = style.border.left + style.padding.left;
            state.bfc_y = edge_top;
            state.pending = MarginChain::new(state.bfc_y, 0);
        } else {
            state.bfc_x = input.bfc_x + self.margin.left + style.border.left + style.padding.left;
            if !opens_chain {
                state.pending = MarginChain::new(state.bfc_y, space.len());
            }
        }
        state.reflow_position = 0;
        Ok(())
    }

    /// Walk the box's children from `resume` (or the first child).
    fn layout_children(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        resume: Option<&ResumePoint>,
    ) -> Result<LayoutStatus, LayoutError> {
        let tree = cx.tree;
        let children = tree.children(self.node);
        let start = match resume {
            Some(point) => match point.index_at(0) {
                Some(index) if index <= children.len() => index,
                _ => return Err(LayoutError::ResumeMismatch(point.clone())),
            },
            None => 0,
        };

        for (index, &child) in children.iter().enumerate().skip(start) {
            state.cursor.clear();
            cx.budget.push(&mut state.cursor, index)?;
            let child_resume = resume.filter(|_| index == start).map(|point| (point, 1));
            if let LayoutStatus::EndOfFirstLine(point) =
                self.layout_child(cx, space, state, child, index, child_resume, false)?
            {
                return Ok(LayoutStatus::EndOfFirstLine(point));
            }
        }
        Ok(LayoutStatus::Continue)
    }

    /// Dispatch one child box by kind.
    #[allow(clippy::too_many_arguments)]
    fn layout_child(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        child: BoxId,
        index: usize,
        resume: Option<(&ResumePoint, usize)>,
        in_inline: bool,
    ) -> Result<LayoutStatus, LayoutError> {
        let node = cx.tree.node(child);
        if node.style.display == Display::None {
            return Ok(LayoutStatus::Continue);
        }
        match &node.content {
            BoxContent::Element if node.style.is_floating() => {
                self.layout_float_child(cx, space, state, child)
            }
            BoxContent::Element if node.style.is_block_level() && !in_inline => {
                self.layout_block_child(cx, space, state, child, index)
            }
            _ => self.layout_inline_node(cx, space, state, child, resume),
        }
    }

    /// Close the pass: last line, bottom margin, height, intrinsic sizes.
    fn finish_with_state(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
    ) -> Result<(), LayoutError> {
        let tree = cx.tree;
        let style = tree.style(self.node);

        // STEP 1: Close the last line.
        if state.reflow_line.is_some() {
            // No content follows, so a `::first-line` ending here has
            // nothing to suspend for.
            let _ = self.close_line(cx, space, state)?;
        }
        self.end_paragraph(space, state);
        state.first_line = FirstLineState::Finished;

        // STEP 2: Bottom margin.
        // [§ 8.3.1] "The bottom margin of an in-flow block box with a
        // 'height' of 'auto' and a 'min-height' of zero collapses with its
        // last in-flow block-level child's bottom margin if the box has no
        // bottom padding and no bottom border and the child's bottom
        // margin does not collapse with a top margin that has clearance."
        let edge_bottom = style.border.bottom + style.padding.bottom;
        let bottom_collapses = edge_bottom == 0
            && state.css_height.is_auto()
            && style.min_height <= 0
            && !style.establishes_bfc()
            && !state.stop_bottom_margin_collapsing;
        let own_bottom = VerticalMargin::of(self.margin.bottom, style.default_margin_bottom);

        let mut outcome = LayoutOutcome::default();
        let mut content_height;
        if state.in_parent_chain && bottom_collapses {
            // [§ 8.3.1] "top and bottom margins of a box that does not
            // establish a new block formatting context and that has zero
            // computed 'min-height', zero or 'auto' computed 'height', and
            // no in-flow children" collapse through it.
            outcome.top_bfc = state.pending.position();
            let delta = state.pending.add(self.margin.bottom, style.default_margin_bottom);
            translate_floats(cx, space, state.pending.float_mark, delta)?;
            outcome.collapsed_through = true;
            outcome.chain = state.pending;
            outcome.outgoing = state.pending.margin;
            content_height = 0;
        } else {
            if state.in_parent_chain {
                self.settle_margins(space, state);
            }
            outcome.top_bfc = state.top_bfc;
            outcome.chain = state.closed_chain.unwrap_or(state.pending);
            if bottom_collapses {
                let mut outgoing = state.pending.margin;
                outgoing.join(&own_bottom);
                outcome.outgoing = outgoing;
                content_height = state.reflow_position;
            } else {
                outcome.outgoing = own_bottom;
                content_height = state.pending.position() - state.bfc_y;
            }
        }

        // STEP 3: Formatting context roots contain their floats.
        // [§ 10.6.7 'Auto' heights for block formatting context roots]
        if style.establishes_bfc() {
            let floats_bottom = space.max_bottom();
            if floats_bottom > LAYOUT_COORD_MIN {
                content_height = content_height.max(floats_bottom - state.bfc_y);
            }
        }

        // STEP 4: Height.
        content_height = state
            .css_height
            .unwrap_or(content_height)
            .max(style.min_height)
            .max(0);
        self.height = content_height + style.border.vertical() + style.padding.vertical();
        self.width = state.content_width + style.border.horizontal() + style.padding.horizontal();
        self.content_width = state.content_width;

        // STEP 5: Floats follow the ledger, which moved them with the
        // margins above.
        self.sync_floats(space, state);

        // STEP 6: Intrinsic sizes.
        if state.calculate_min_max {
            self.finish_min_max(style, state);
            self.minmax_calculated = true;
        }

        // STEP 7: Remember the result for skipping.
        self.outcome = outcome;
        self.subtree_floats.clear();
        if !style.establishes_bfc() {
            let placed = space.entries().get(state.space_mark..).unwrap_or(&[]);
            self.subtree_floats.try_reserve(placed.len())?;
            self.subtree_floats.extend_from_slice(placed);
        }
        // A box whose margins collapse through can still move with later
        // siblings' margins, so its floats are not replayed.
        self.last_key = if outcome.collapsed_through && !self.subtree_floats.is_empty() {
            None
        } else {
            state.entry_key.take()
        };

        let now = Rect::new(self.x, outcome.top_bfc, self.width, self.height);
        if let Some(before) = state.previous_box
            && before != now
        {
            cx.invalidate(before)?;
            cx.invalidate(now)?;
        }

        // STEP 8: Clean flags, then check the shrink-to-fit guess.
        tree.acknowledge(self.node);
        if state.calculate_min_max && self.strategy.needs_min_max() {
            let corrected = self
                .strategy
                .compute_width(style, state.available_width, self.widths.as_ref());
            if corrected.content_width != state.content_width {
                cx.request_extra_pass(self.node);
            }
        }
        Ok(())
    }

    /// Move float items to where the ledger has them.
    fn sync_floats(&mut self, space: &SpaceManager, state: &ReflowState) {
        for item in &mut self.stack {
            if let VerticalLayout::Float(float) = item
                && let Some(entry) = space.entry(float.container.node)
            {
                float.margin_box = entry.rect.translated(-state.bfc_x, -state.bfc_y);
                float.container.x = float.margin_box.x + float.container.margin.left;
                float.container.y = float.margin_box.y + float.container.margin.top;
            }
        }
    }

    /// Resolve pending margins: content is about to be placed.
    ///
    /// If the box's top was still collapsing with the margins above, its
    /// position becomes fixed here.
    fn settle_margins(&mut self, space: &SpaceManager, state: &mut ReflowState) {
        if state.in_parent_chain {
            let position = state.pending.position();
            state.in_parent_chain = false;
            state.closed_chain = Some(state.pending);
            state.top_bfc = position;
            state.bfc_y = position;
            state.reflow_position = 0;
        } else {
            state.reflow_position = state.pending.position() - state.bfc_y;
        }
        state.pending = MarginChain::new(state.bfc_position(), space.len());
        state.drop_default_margins = false;
        state.stop_bottom_margin_collapsing = false;
    }

    /// End the paragraph in progress for intrinsic width accounting.
    fn end_paragraph(&self, space: &SpaceManager, state: &mut ReflowState) {
        if !state.calculate_min_max {
            return;
        }
        let beside = state.minmax.paragraph_top.map_or(0, |top| {
            space.get_floats_max_width(top, state.bfc_position(), self.node)
        });
        state.minmax.end_paragraph(beside);
    }

    /// Take a child's container from last pass, or create one.
    fn take_child(state: &mut ReflowState, node: BoxId, tree: &BoxTree) -> Box<Self> {
        state
            .retained
            .remove(&node)
            .unwrap_or_else(|| Box::new(Self::new(node, tree)))
    }
}

/// Lay `container` out, resuming after every `::first-line` suspension.
pub(crate) fn layout_to_completion(
    container: &mut Container,
    cx: &mut ReflowContext<'_>,
    space: &mut SpaceManager,
    input: &LayoutInput,
) -> Result<(), LayoutError> {
    let mut status = container.layout(cx, space, input)?;
    while let LayoutStatus::EndOfFirstLine(point) = status {
        status = container.layout(cx, space, &input.resumed(Some(point)))?;
    }
    Ok(())
}

/// Move floats placed since `mark` by `delta`, recording the areas.
fn translate_floats(
    cx: &mut ReflowContext<'_>,
    space: &mut SpaceManager,
    mark: usize,
    delta: LayoutCoord,
) -> Result<(), LayoutError> {
    if delta == 0 {
        return Ok(());
    }
    for entry in space.entries().iter().skip(mark) {
        cx.invalidate(entry.rect)?;
        cx.invalidate(entry.rect.translated(0, delta))?;
    }
    space.translate_from(mark, delta);
    Ok(())
}

/// Index last pass's child containers by box.
fn retain_children(
    old: Vec<VerticalLayout>,
    retained: &mut HashMap<BoxId, Box<Container>>,
) -> Result<(), LayoutError> {
    retained.try_reserve(old.len())?;
    for item in old {
        match item {
            VerticalLayout::Block(block) => {
                let _ = retained.insert(block.container.node, block.container);
            }
            VerticalLayout::Float(float) => {
                let _ = retained.insert(float.container.node, float.container);
            }
            VerticalLayout::Line(line) => {
                for fragment in line.fragments {
                    if let FragmentKind::InlineBlock(container) = fragment.kind {
                        let _ = retained.insert(container.node, container);
                    }
                }
            }
            VerticalLayout::Break(_) => {}
        }
    }
    Ok(())
}
