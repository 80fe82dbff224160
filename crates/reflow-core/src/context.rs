//! Per-pass shared state and per-call inputs.

use crate::config::LayoutConfig;
use crate::error::{LayoutError, MemoryBudget, ResumePoint};
use crate::geom::{LayoutCoord, Rect};
use crate::margin::{MarginChain, VerticalMargin};
use crate::text::{BreakOracle, FontMetrics};
use crate::tree::{BoxId, BoxTree};

/// Everything a reflow pass shares across containers.
///
/// The tree is read-only for the whole pass. The context owns the pass's
/// memory budget and collects what the pass reports back: areas to
/// repaint and whether another pass is needed.
pub struct ReflowContext<'a> {
    /// The box tree being laid out.
    pub tree: &'a BoxTree,
    /// Engine configuration.
    pub config: &'a LayoutConfig,
    /// Text measurement.
    pub metrics: &'a dyn FontMetrics,
    /// Line break classification.
    pub oracle: &'a dyn BreakOracle,
    /// Allocation accounting.
    pub budget: MemoryBudget,
    extra_pass_requested: bool,
    first_line_suspensions: usize,
    containers_laid_out: usize,
    containers_skipped: usize,
    invalidated: Vec<Rect>,
}

impl<'a> ReflowContext<'a> {
    /// A context with an unlimited memory budget.
    #[must_use]
    pub fn new(
        tree: &'a BoxTree,
        config: &'a LayoutConfig,
        metrics: &'a dyn FontMetrics,
        oracle: &'a dyn BreakOracle,
    ) -> Self {
        Self {
            tree,
            config,
            metrics,
            oracle,
            budget: MemoryBudget::unlimited(),
            extra_pass_requested: false,
            first_line_suspensions: 0,
            containers_laid_out: 0,
            containers_skipped: 0,
            invalidated: Vec::new(),
        }
    }

    /// Replace the memory budget.
    #[must_use]
    pub fn with_budget(mut self, budget: MemoryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Forget the previous pass's extra-pass request.
    pub const fn begin_pass(&mut self) {
        self.extra_pass_requested = false;
    }

    /// Ask for another pass because `node`'s size assumption was wrong.
    /// The node is marked dirty so the next pass does not skip it.
    pub fn request_extra_pass(&mut self, node: BoxId) {
        log::debug!(target: "reflow", "extra pass requested by {node:?}");
        self.extra_pass_requested = true;
        self.tree.mark_dirty(node);
    }

    /// Another pass was requested during this one.
    #[must_use]
    pub const fn extra_pass_requested(&self) -> bool {
        self.extra_pass_requested
    }

    /// Count a `::first-line` suspension.
    pub const fn note_suspension(&mut self) {
        self.first_line_suspensions += 1;
    }

    /// `::first-line` suspensions so far.
    #[must_use]
    pub const fn first_line_suspensions(&self) -> usize {
        self.first_line_suspensions
    }

    /// Count a container that ran its child loop.
    pub const fn note_layout(&mut self) {
        self.containers_laid_out += 1;
    }

    /// Count a container that reused its previous result.
    pub const fn note_skip(&mut self) {
        self.containers_skipped += 1;
    }

    /// Containers laid out so far.
    #[must_use]
    pub const fn containers_laid_out(&self) -> usize {
        self.containers_laid_out
    }

    /// Containers skipped so far.
    #[must_use]
    pub const fn containers_skipped(&self) -> usize {
        self.containers_skipped
    }

    /// Record an area whose contents moved.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] if the list cannot grow.
    pub fn invalidate(&mut self, rect: Rect) -> Result<(), LayoutError> {
        if rect.width <= 0 || rect.height <= 0 {
            return Ok(());
        }
        self.budget.push(&mut self.invalidated, rect)
    }

    /// Take the recorded areas.
    #[must_use]
    pub fn take_invalidated(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.invalidated)
    }
}

/// How a box's top margin relates to the margins above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarginMode {
    /// In-flow block: the top margin joins the incoming chain.
    #[default]
    Collapse,
    /// The box has clearance. Its border edge is at the incoming anchor.
    Clearance,
    /// Float or inline-block: the parent places the margin box.
    Atomic,
}

/// What a parent tells a child container about where it is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutInput {
    /// Content width of the containing block, less space taken by floats
    /// for boxes that avoid them.
    pub available_width: LayoutCoord,
    /// Content height of the containing block, when definite.
    pub containing_height: Option<LayoutCoord>,
    /// BFC-relative x of the containing block's content edge.
    pub bfc_x: LayoutCoord,
    /// Margins pending above the box, in the parent's formatting context.
    pub incoming: MarginChain,
    /// How the box's own top margin is treated.
    pub margin_mode: MarginMode,
    /// Quirks: UA default margins at the top of a table cell are dropped.
    pub drop_default_margins: bool,
    /// Where to continue after a `::first-line` suspension.
    pub resume: Option<ResumePoint>,
}

impl LayoutInput {
    /// Input for the root box in a viewport.
    #[must_use]
    pub fn root(width: LayoutCoord, height: LayoutCoord) -> Self {
        Self {
            available_width: width,
            containing_height: Some(height),
            ..Self::default()
        }
    }

    /// The same input resuming at `resume`.
    #[must_use]
    pub fn resumed(&self, resume: Option<ResumePoint>) -> Self {
        Self {
            resume,
            ..self.clone()
        }
    }

    /// Everything that affects the result of a pass except the box's own
    /// subtree: equal keys over a clean subtree give equal results.
    #[must_use]
    pub(crate) fn key(&self, space_fingerprint: u64) -> InputKey {
        InputKey {
            available_width: self.available_width,
            containing_height: self.containing_height,
            bfc_x: self.bfc_x,
            incoming: self.incoming,
            margin_mode: self.margin_mode,
            drop_default_margins: self.drop_default_margins,
            space_fingerprint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct InputKey {
    available_width: LayoutCoord,
    containing_height: Option<LayoutCoord>,
    bfc_x: LayoutCoord,
    incoming: MarginChain,
    margin_mode: MarginMode,
    drop_default_margins: bool,
    space_fingerprint: u64,
}

/// What a finished child tells its parent about vertical placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutOutcome {
    /// BFC-relative y of the border-box top, in the parent's formatting
    /// context.
    pub top_bfc: LayoutCoord,
    /// The box has no in-flow content and no vertical border or padding;
    /// its top and bottom margins collapsed together with the chain.
    pub collapsed_through: bool,
    /// The incoming chain as the box left it. When the box collapsed
    /// through, this is still open and includes the bottom margin.
    pub chain: MarginChain,
    /// Margins below the box that may still collapse with what follows.
    pub outgoing: VerticalMargin,
}
