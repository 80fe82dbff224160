//! Layout outcomes and errors.
//!
//! Every mutating layout operation returns
//! `Result<LayoutStatus, LayoutError>`: it either finished
//! ([`LayoutStatus::Continue`]), stopped at the end of a `::first-line`
//! and must be resumed ([`LayoutStatus::EndOfFirstLine`]), or failed.
//! Failure is fatal to the pass; the engine decides what the document
//! does about it.

use std::collections::TryReserveError;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors that abort a reflow pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// An allocation needed by layout failed.
    #[error("out of memory during reflow")]
    OutOfMemory,
    /// A resume point did not address content of the box it was given to.
    #[error("resume point {0} does not address content of the box")]
    ResumeMismatch(ResumePoint),
    /// The configuration could not be parsed.
    #[error("invalid layout configuration: {0}")]
    Config(String),
}

impl From<TryReserveError> for LayoutError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Where inline layout of a box resumes after its `::first-line` ended.
///
/// `path` indexes children from the box that returned the point down
/// through inline boxes. An index equal to the child count of an inline
/// box addresses the end of that box. `text_offset` is a byte offset
/// into the text run at the end of the path (zero for other boxes).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResumePoint {
    /// Child indices from the container down to the resumed box.
    pub path: Vec<usize>,
    /// Byte offset into the addressed text run.
    pub text_offset: usize,
}

impl ResumePoint {
    /// The index at `depth`, if the path is that deep.
    #[must_use]
    pub fn index_at(&self, depth: usize) -> Option<usize> {
        self.path.get(depth).copied()
    }
}

impl fmt::Display for ResumePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.path, self.text_offset)
    }
}

/// Result of a layout call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum LayoutStatus {
    /// The box is done for this pass.
    Continue,
    /// [§ 5.12.1 The :first-line pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-line-pseudo)
    ///
    /// The box's first formatted line just ended and more content
    /// follows. The caller swaps in the normal properties and calls
    /// `layout` again with this resume point.
    EndOfFirstLine(ResumePoint),
}

/// Allocation accounting for a pass.
///
/// Layout reserves capacity with `try_reserve` before every growth, so
/// real allocation failure surfaces as [`LayoutError::OutOfMemory`]. A
/// limited budget additionally fails after a fixed number of growth
/// operations, which lets tests fail every step in turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryBudget {
    remaining: Option<usize>,
}

impl MemoryBudget {
    /// No artificial limit.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { remaining: None }
    }

    /// Fail the growth operation after `growths` successful ones.
    #[must_use]
    pub const fn limited(growths: usize) -> Self {
        Self {
            remaining: Some(growths),
        }
    }

    /// Growth operations left, if limited.
    #[must_use]
    pub const fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    /// Account for one growth operation.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] when the budget is exhausted.
    pub fn charge(&mut self) -> Result<(), LayoutError> {
        match &mut self.remaining {
            None => Ok(()),
            Some(0) => Err(LayoutError::OutOfMemory),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
        }
    }

    /// Push onto `vec`, failing instead of aborting on allocation failure.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OutOfMemory`] if the budget is exhausted or
    /// the allocator refuses.
    pub fn push<T>(&mut self, vec: &mut Vec<T>, value: T) -> Result<(), LayoutError> {
        self.charge()?;
        vec.try_reserve(1)?;
        vec.push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limited_budget_fails_after_n_growths() {
        let mut budget = MemoryBudget::limited(2);
        let mut v = Vec::new();
        assert!(budget.push(&mut v, 1).is_ok());
        assert!(budget.push(&mut v, 2).is_ok());
        assert_eq!(budget.push(&mut v, 3), Err(LayoutError::OutOfMemory));
        assert_eq!(v, vec![1, 2]);
    }
}
