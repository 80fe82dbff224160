//! Scratch state of a container during one layout pass.
//!
//! A [`ReflowState`] exists only while its container is being laid out,
//! or while it is suspended at the end of its `::first-line`. It is owned
//! by the container, created when a pass reaches the container and torn
//! down when the container finishes. Nothing in it survives into the
//! next pass.

use std::collections::HashMap;

use crate::container::Container;
use crate::context::InputKey;
use crate::geom::{LayoutCoord, Rect};
use crate::line::{Line, LineBuffer};
use crate::margin::MarginChain;
use crate::space::SpaceManager;
use crate::style::FirstLineStyle;
use crate::tree::BoxId;
use crate::values::AutoOr;
use crate::width::MinMaxWidths;

/// Progress of the container's `::first-line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstLineState {
    /// No `::first-line` properties apply.
    #[default]
    Inactive,
    /// The first line is being formatted with `::first-line` properties.
    Active,
    /// The first line has ended.
    Finished,
}

/// Running intrinsic width accumulation.
///
/// Tracked on the side while the container lays out at its real width,
/// so no separate intrinsic sizing pass is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxAccumulator {
    /// Content-box widths found so far.
    pub widths: MinMaxWidths,
    /// Width of the current paragraph laid out on one line.
    pub line_max: LayoutCoord,
    /// Trailing white space at the end of `line_max`.
    pub line_trailing: LayoutCoord,
    /// Width of the current unbreakable run.
    pub envelope_normal: LayoutCoord,
    /// Narrowest the current run can become.
    pub envelope_min: LayoutCoord,
    /// Trailing white space at the end of the run.
    pub envelope_trailing: LayoutCoord,
    /// BFC-relative y where the current paragraph's first line starts.
    pub paragraph_top: Option<LayoutCoord>,
    /// Content height with unlimited width.
    pub min_height: LayoutCoord,
    /// The current paragraph's line has been counted in `min_height`.
    pub paragraph_line_counted: bool,
}

impl MinMaxAccumulator {
    /// Account for an inline item. `intrinsic` excludes the trailing
    /// white space.
    pub fn add_inline(&mut self, intrinsic: &MinMaxWidths, trailing: LayoutCoord, breaks_before: bool) {
        if breaks_before {
            self.end_envelope();
        }
        self.line_max += intrinsic.maximum + trailing;
        self.line_trailing = trailing;
        self.envelope_normal += intrinsic.normal_minimum + trailing;
        self.envelope_min += intrinsic.minimum;
        self.envelope_trailing = trailing;
    }

    /// The unbreakable run ended.
    pub fn end_envelope(&mut self) {
        let normal = self.envelope_normal - self.envelope_trailing;
        self.widths.normal_minimum = self.widths.normal_minimum.max(normal);
        self.widths.minimum = self.widths.minimum.max(self.envelope_min.min(normal));
        self.envelope_normal = 0;
        self.envelope_min = 0;
        self.envelope_trailing = 0;
    }

    /// The paragraph ended. `floats_beside` is the unconstrained width of
    /// floats next to it.
    pub fn end_paragraph(&mut self, floats_beside: LayoutCoord) {
        self.end_envelope();
        if self.line_max > 0 || floats_beside > 0 {
            let max = self.line_max - self.line_trailing + floats_beside;
            self.widths.maximum = self.widths.maximum.max(max);
        }
        self.line_max = 0;
        self.line_trailing = 0;
        self.paragraph_top = None;
        self.paragraph_line_counted = false;
    }

    /// Account for a box that cannot be broken (block, float, atom).
    pub fn add_box(&mut self, widths: &MinMaxWidths) {
        self.widths.include(widths);
    }
}

/// Scratch state of one container for one pass.
#[derive(Debug, Default)]
pub struct ReflowState {
    /// Children of the previous pass, looked up by box to be reused.
    pub retained: HashMap<BoxId, Box<Container>>,
    /// Used content width.
    pub content_width: LayoutCoord,
    /// Specified height, resolved.
    pub css_height: AutoOr,
    /// Height percentages of children resolve against this.
    pub child_containing_height: Option<LayoutCoord>,
    /// BFC-relative x of the content edge.
    pub bfc_x: LayoutCoord,
    /// BFC-relative y of the content edge.
    pub bfc_y: LayoutCoord,
    /// Border-box top in the parent's formatting context.
    pub top_bfc: LayoutCoord,
    /// No in-flow content has been placed yet and the box's top still
    /// floats with the incoming margin chain.
    pub in_parent_chain: bool,
    /// The incoming chain as it was when this box's top was fixed.
    pub closed_chain: Option<MarginChain>,
    /// Margins pending below `reflow_position`.
    pub pending: MarginChain,
    /// Next free y, relative to the content edge.
    pub reflow_position: LayoutCoord,
    /// The last child had clearance and collapsed through.
    pub stop_bottom_margin_collapsing: bool,
    /// Quirks: drop default margins until content arrives.
    pub drop_default_margins: bool,
    /// The open line. Pushed onto the stack when it closes.
    pub reflow_line: Option<Line>,
    /// The open envelope.
    pub buffer: LineBuffer,
    /// Lines created this pass.
    pub line_count: usize,
    /// Progress of `::first-line`.
    pub first_line: FirstLineState,
    /// The `::first-line` overrides, if any apply.
    pub first_line_style: Option<FirstLineStyle>,
    /// Child index path of the inline box being laid out.
    pub cursor: Vec<usize>,
    /// Last character of inline content, for break decisions at joins.
    pub last_char: Option<char>,
    /// The last inline content ended in collapsible white space.
    pub after_collapsible_space: bool,
    /// A `<wbr>` was seen since the last item.
    pub force_break_opportunity: bool,
    /// Stack indices of floats waiting for the open line to close.
    pub deferred_floats: Vec<usize>,
    /// The box's own float ledger while it is a formatting context root.
    /// Held outside the state while the box is running.
    pub own_space: Option<SpaceManager>,
    /// Ledger length when the pass started here.
    pub space_mark: usize,
    /// Intrinsic widths are being recomputed this pass.
    pub calculate_min_max: bool,
    /// Intrinsic width accumulation.
    pub minmax: MinMaxAccumulator,
    /// Accumulation as it was when the open envelope started, restored
    /// when the envelope is rolled back for `::first-line`.
    pub minmax_checkpoint: MinMaxAccumulator,
    /// Content width the box was given.
    pub available_width: LayoutCoord,
    /// Border box and top of the previous pass, for invalidation.
    pub previous_box: Option<Rect>,
    /// Input of this pass, kept for skipping the next one.
    pub entry_key: Option<InputKey>,
}

impl ReflowState {
    /// A fresh state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// BFC-relative y of the next free position.
    #[must_use]
    pub const fn bfc_position(&self) -> LayoutCoord {
        self.bfc_y + self.reflow_position
    }

    /// `::first-line` properties currently apply.
    #[must_use]
    pub fn first_line_active(&self) -> bool {
        self.first_line == FirstLineState::Active
    }
}
