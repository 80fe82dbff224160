//! In-flow block-level children.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)

use super::{Container, layout_to_completion};
use crate::context::{LayoutInput, MarginMode, ReflowContext};
use crate::error::{LayoutError, LayoutStatus, ResumePoint};
use crate::layout_item::{BlockItem, BreakItem, VerticalLayout};
use crate::margin::MarginChain;
use crate::reflow_state::ReflowState;
use crate::space::SpaceManager;
use crate::style::BreakPolicy;
use crate::tree::BoxId;

impl Container {
    /// Lay out a block-level child and stack it below the content so far.
    pub(super) fn layout_block_child(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        node: BoxId,
        index: usize,
    ) -> Result<LayoutStatus, LayoutError> {
        let tree = cx.tree;
        let style = tree.style(node);

        // STEP 1: A block ends the paragraph before it.
        let first_line_ended = self.close_line(cx, space, state)?;
        self.end_paragraph(space, state);
        state.last_char = None;
        state.after_collapsible_space = false;
        state.force_break_opportunity = false;
        if first_line_ended {
            let mut path = Vec::new();
            cx.budget.push(&mut path, index)?;
            return Ok(LayoutStatus::EndOfFirstLine(ResumePoint {
                path,
                text_offset: 0,
            }));
        }

        if style.break_before.is_forced() {
            self.push_break(cx, state, style.break_before, node)?;
        }

        // STEP 2: Clearance.
        // [§ 9.5.2] "Computing the clearance of an element on which 'clear'
        // is set is done by first determining the hypothetical position of
        // the element's top border edge within its parent block."
        let base = Some(state.content_width);
        let mut probe = state.pending;
        let _ = probe.add(style.margin.top.resolve_or_zero(base), style.default_margin_top);
        let hypothetical = probe.position();

        let mut incoming = state.pending;
        let mut mode = MarginMode::Collapse;
        if let Some(clear) = style.clear {
            let clear_y = space.find_bfc_bottom(clear);
            if clear_y > hypothetical {
                self.settle_margins(space, state);
                incoming = MarginChain::new(clear_y, space.len());
                mode = MarginMode::Clearance;
            }
        }

        // STEP 3: Formatting context roots go beside floats.
        // [§ 9.5] "The border box of a table, a block-level replaced
        // element, or an element in the normal flow that establishes a new
        // block formatting context [...] must not overlap the margin box of
        // any floats in the same block formatting context as the element
        // itself."
        let mut container = Self::take_child(state, node, tree);
        let mut available = state.content_width;
        let mut offset = 0;
        if style.establishes_bfc() && !space.is_empty() {
            let top = if mode == MarginMode::Clearance {
                incoming.anchor
            } else {
                hypothetical
            };
            let min_width = container.min_max_width().map_or(0, |w| w.minimum);
            let found = space.get_space(top, state.bfc_x, state.content_width, min_width, 1);
            offset = found.x - state.bfc_x;
            available = found.width;
            if found.y > top {
                if mode == MarginMode::Collapse {
                    self.settle_margins(space, state);
                }
                incoming = MarginChain::new(found.y, space.len());
                mode = MarginMode::Clearance;
            }
        }

        // STEP 4: Lay the child out.
        let input = LayoutInput {
            available_width: available,
            containing_height: state.child_containing_height,
            bfc_x: state.bfc_x + offset,
            incoming,
            margin_mode: mode,
            drop_default_margins: state.drop_default_margins,
            resume: None,
        };
        layout_to_completion(&mut container, cx, space, &input)?;
        let outcome = container.outcome();
        container.x = container.margin.left + offset;

        // STEP 5: Stack it.
        state.pending = outcome.chain;
        if outcome.collapsed_through {
            container.y = outcome.top_bfc - state.bfc_y;
        } else {
            self.settle_margins(space, state);
            container.y = outcome.top_bfc - state.bfc_y;
            state.reflow_position = container.y + container.height;
            let mut below = MarginChain::new(state.bfc_position(), space.len());
            let _ = below.set_margin(outcome.outgoing);
            state.pending = below;
        }
        // [§ 8.3.1] A margin that collapses with a top margin that has
        // clearance does not collapse with the parent's bottom margin.
        state.stop_bottom_margin_collapsing = mode == MarginMode::Clearance && container.height == 0;

        // STEP 6: Intrinsic sizes. The child sits beside this box's floats
        // in its band, so with unlimited width it would need room for both.
        if state.calculate_min_max {
            let horizontal = style.margin.left.fixed().unwrap_or(0) + style.margin.right.fixed().unwrap_or(0);
            if let Some(mut widths) = container.min_max_width() {
                if !outcome.collapsed_through {
                    let top = outcome.top_bfc;
                    widths.maximum += space.get_floats_max_width(top, top + container.height, self.node);
                }
                state.minmax.add_box(&widths.widened(horizontal));
            }
            state.minmax.min_height += container.min_height();
        }

        let collapsed_through = outcome.collapsed_through;
        cx.budget.push(
            &mut self.stack,
            VerticalLayout::Block(BlockItem {
                container,
                collapsed_through,
            }),
        )?;

        if style.break_after.is_forced() {
            self.push_break(cx, state, style.break_after, node)?;
        }
        Ok(LayoutStatus::Continue)
    }

    /// Record a forced break at the current position.
    fn push_break(
        &mut self,
        cx: &mut ReflowContext<'_>,
        state: &ReflowState,
        policy: BreakPolicy,
        node: BoxId,
    ) -> Result<(), LayoutError> {
        cx.budget.push(
            &mut self.stack,
            VerticalLayout::Break(BreakItem {
                y: state.pending.position() - state.bfc_y,
                height: 0,
                policy,
                node: Some(node),
            }),
        )
    }
}
