//! The reflow driver.
//!
//! A reflow runs passes over the root container until no container asks
//! for another one. Each pass starts with an empty float ledger and the
//! viewport as the root's containing block; containers whose subtree and
//! inputs did not change reuse their previous result.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::container::{Container, layout_to_completion};
use crate::context::{LayoutInput, ReflowContext};
use crate::error::{LayoutError, MemoryBudget};
use crate::geom::{LayoutCoord, Rect};
use crate::space::SpaceManager;
use crate::text::{ApproximateFontMetrics, BreakOracle, FontMetrics, UnicodeBreakOracle};
use crate::tree::BoxTree;

/// What a reflow did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReflowReport {
    /// Passes run.
    pub passes: usize,
    /// Times a container stopped at the end of its `::first-line`.
    pub first_line_suspensions: usize,
    /// Containers that ran their child loop, over all passes.
    pub containers_laid_out: usize,
    /// Containers that reused their previous result, over all passes.
    pub containers_skipped: usize,
    /// Areas whose contents moved, in formatting context coordinates.
    pub invalidated: Vec<Rect>,
}

/// Lays out a box tree.
pub struct LayoutEngine {
    config: LayoutConfig,
    metrics: Box<dyn FontMetrics>,
    oracle: Box<dyn BreakOracle>,
    budget: MemoryBudget,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    /// An engine with approximate font metrics and UAX #14 line breaking.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            metrics: Box::new(ApproximateFontMetrics),
            oracle: Box::new(UnicodeBreakOracle),
            budget: MemoryBudget::unlimited(),
        }
    }

    /// Use `metrics` to measure text.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Box<dyn FontMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Use `oracle` to find line break opportunities.
    #[must_use]
    pub fn with_break_oracle(mut self, oracle: Box<dyn BreakOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Limit the allocations of each reflow.
    #[must_use]
    pub const fn with_memory_budget(mut self, budget: MemoryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `tree` from scratch in a `width` × `height` viewport.
    ///
    /// # Errors
    ///
    /// See [`LayoutEngine::reflow`].
    pub fn layout(
        &self,
        tree: &BoxTree,
        width: LayoutCoord,
        height: LayoutCoord,
    ) -> Result<Container, LayoutError> {
        let mut root = Container::new(tree.root(), tree);
        let _ = self.reflow(tree, &mut root, width, height)?;
        Ok(root)
    }

    /// Bring `root`, the container of the tree's root box, up to date.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] if an allocation fails. The
    /// pass is abandoned: no container is left mid-pass and the boxes that
    /// were not laid out stay dirty, so a later reflow starts clean.
    pub fn reflow(
        &self,
        tree: &BoxTree,
        root: &mut Container,
        width: LayoutCoord,
        height: LayoutCoord,
    ) -> Result<ReflowReport, LayoutError> {
        let mut cx = ReflowContext::new(tree, &self.config, self.metrics.as_ref(), self.oracle.as_ref())
            .with_budget(self.budget);
        let input = LayoutInput::root(width, height);
        let mut report = ReflowReport::default();

        for pass in 1..=self.config.max_passes.max(1) {
            cx.begin_pass();
            let mut space = SpaceManager::new();
            log::debug!(target: "reflow", "pass {pass}: {width}x{height}");
            if let Err(error) = layout_to_completion(root, &mut cx, &mut space, &input) {
                log::warn!(target: "reflow", "pass {pass} abandoned: {error}");
                return Err(error);
            }
            report.passes = pass;
            if !cx.extra_pass_requested() {
                break;
            }
            if pass == self.config.max_passes {
                log::warn!(
                    target: "reflow",
                    "gave up after {pass} passes with a size correction still pending"
                );
            }
        }

        report.first_line_suspensions = cx.first_line_suspensions();
        report.containers_laid_out = cx.containers_laid_out();
        report.containers_skipped = cx.containers_skipped();
        report.invalidated = cx.take_invalidated();
        log::debug!(
            target: "reflow",
            "reflow done: {} passes, {} laid out, {} skipped",
            report.passes,
            report.containers_laid_out,
            report.containers_skipped
        );
        Ok(report)
    }
}
