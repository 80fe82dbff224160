//! Nesting depth for layout tracing.
//!
//! Layout recursion is single-threaded, so the depth lives in a
//! thread-local counter. [`DepthGuard`] increments it on creation and
//! decrements it on drop, which keeps the count right on every return
//! path including `?` propagation.

use std::cell::Cell;

thread_local! {
    static LAYOUT_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// RAII guard for one level of layout nesting.
#[derive(Debug)]
pub struct DepthGuard {
    depth: usize,
}

impl DepthGuard {
    /// Enter one level of nesting.
    #[must_use]
    pub fn enter() -> Self {
        let depth = LAYOUT_DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            current
        });
        Self { depth }
    }

    /// Depth of this guard (0 for the outermost layout call).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        LAYOUT_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Current nesting depth.
#[must_use]
pub fn current_depth() -> usize {
    LAYOUT_DEPTH.with(Cell::get)
}
