//! Floating children.
//!
//! [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
//!
//! A float is laid out as its own formatting context root first, so its
//! margin box is known, and then placed in the ledger. A float that does
//! not fit beside the content already on the open line waits until the
//! line closes and is then placed below it.

use super::{Container, layout_to_completion};
use crate::context::{LayoutInput, MarginMode, ReflowContext};
use crate::error::{LayoutError, LayoutStatus};
use crate::layout_item::{FloatItem, VerticalLayout};
use crate::margin::MarginChain;
use crate::reflow_state::ReflowState;
use crate::space::{FloatRequest, SpaceManager};
use crate::style::FloatSide;
use crate::tree::BoxId;
use crate::width::MinMaxWidths;

impl Container {
    /// Lay out and place a floating child.
    pub(super) fn layout_float_child(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
        node: BoxId,
    ) -> Result<LayoutStatus, LayoutError> {
        let tree = cx.tree;
        let style = tree.style(node);
        let side = style.float.unwrap_or(FloatSide::Left);

        // STEP 1: Content before the float belongs to the line, except a
        // lone list marker, which stays with the content after it.
        if !state.buffer.is_marker_only() {
            Self::commit_pending(cx, state)?;
        }

        // STEP 2: Lay the float out.
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
        let widths = container
            .min_max_width()
            .map_or(MinMaxWidths::exact(width), |w| w.widened(margins.horizontal()));

        // STEP 3: Decide whether it waits for the open line.
        // [§ 9.5.1] Rule 6: "The outer top of an element's floating box
        // may not be higher than the top of any line-box containing a box
        // generated by an element earlier in the source document."
        let line = state.reflow_line.as_ref();
        let static_y = line.map_or_else(|| state.pending.position(), |l| state.bfc_y + l.y);
        let deferred = line.is_some_and(|l| {
            l.has_committed_content()
                && (!state.deferred_floats.is_empty()
                    || width > l.remaining_width()
                    || space.min_float_top(static_y, style.clear) > static_y)
        });

        // STEP 4: Place it.
        let rect = space.add_float(
            FloatRequest {
                id: node,
                owner: self.node,
                side,
                width,
                height,
                max_width: widths.maximum,
                y: static_y,
                bfc_x: state.bfc_x,
                containing_width: state.content_width,
                clear: style.clear,
                deferred,
            },
            &mut cx.budget,
        )?;
        log::trace!(target: "reflow", "float {node:?} placed at {rect:?} deferred={deferred}");
        if !deferred {
            self.fit_open_line(cx, space, state);
        }

        let margin_box = rect.translated(-state.bfc_x, -state.bfc_y);
        container.x = margin_box.x + margins.left;
        container.y = margin_box.y + margins.top;
        if deferred {
            cx.budget.push(&mut state.deferred_floats, self.stack.len())?;
        }
        cx.budget.push(
            &mut self.stack,
            VerticalLayout::Float(FloatItem {
                container,
                side,
                margin_box,
                deferred,
            }),
        )?;

        // STEP 5: Intrinsic sizes.
        if state.calculate_min_max {
            state.minmax.add_box(&widths);
            state.minmax.min_height = state.minmax.min_height.max(height);
        }
        Ok(LayoutStatus::Continue)
    }

    /// Place floats that waited for the line that just closed, below it.
    pub(super) fn place_deferred_floats(
        &mut self,
        cx: &mut ReflowContext<'_>,
        space: &mut SpaceManager,
        state: &mut ReflowState,
    ) -> Result<(), LayoutError> {
        if state.deferred_floats.is_empty() {
            return Ok(());
        }
        state.deferred_floats.clear();
        let Some(first) = space.first_deferred() else {
            return Ok(());
        };

        let tree = cx.tree;
        let y = state.bfc_position();
        for entry in space.pull_from(first) {
            let _ = space.add_float(
                FloatRequest {
                    id: entry.id,
                    owner: entry.owner,
                    side: entry.side,
                    width: entry.rect.width,
                    height: entry.rect.height,
                    max_width: entry.max_width,
                    y: if entry.deferred { y } else { entry.rect.y },
                    bfc_x: state.bfc_x,
                    containing_width: state.content_width,
                    clear: tree.style(entry.id).clear,
                    deferred: false,
                },
                &mut cx.budget,
            )?;
        }
        Ok(())
    }
}
