//! Incremental block and inline reflow for the box tree.
//!
//! # Scope
//!
//! This crate implements:
//! - **Block layout** ([§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting))
//!   - Vertical stacking of block children
//!   - Margin collapsing, including through empty boxes and with parents
//!   - Clearance
//!
//! - **Inline layout** ([§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting))
//!   - Line breaking at UAX #14 opportunities, with `white-space` and
//!     `overflow-wrap`
//!   - Inline boxes, inline-blocks, replaced elements, markers
//!   - `text-align`, `text-indent` and a paragraph width limit
//!   - `::first-line` geometry, by suspending and resuming the container
//!
//! - **Floats** ([§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats))
//!   - A float ledger per block formatting context
//!   - Floats deferred below the line they occur in
//!
//! - **Intrinsic widths** ([CSS Sizing Level 3](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes))
//!   - Collected during the real pass
//!   - Shrink-to-fit boxes that guessed wrong ask for another pass
//!
//! - **Incremental reflow**
//!   - Clean containers with unchanged inputs reuse their last result
//!   - Moved areas are reported for repaint
//!
//! # Not Implemented
//!
//! - Tables beyond cells given a width
//! - Bidirectional reordering
//! - Positioned boxes

/// Engine configuration.
pub mod config;
/// Block containers and their reflow state machine.
pub mod container;
/// Per-pass shared state and per-call inputs.
pub mod context;
/// The reflow driver.
pub mod engine;
/// Layout outcomes and errors.
pub mod error;
/// Geometry primitives.
pub mod geom;
/// Entries of the vertical layout stack.
pub mod layout_item;
/// Line boxes and the inline item buffer.
pub mod line;
/// Vertical margin collapsing per [§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins).
pub mod margin;
pub(crate) mod reflow_state;
/// The float ledger per [§ 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats).
pub mod space;
/// Resolved style snapshot.
pub mod style;
/// Text measurement and line break opportunities.
pub mod text;
/// Walking a finished layout.
pub mod traverse;
/// Arena box tree with dirty tracking.
pub mod tree;
/// Specified lengths and their resolution.
pub mod values;
/// Used width rules per [§ 10.3](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins).
pub mod width;

// Re-exports for convenience
pub use config::LayoutConfig;
pub use container::Container;
pub use context::{LayoutInput, LayoutOutcome, MarginMode, ReflowContext};
pub use engine::{LayoutEngine, ReflowReport};
pub use error::{LayoutError, LayoutStatus, MemoryBudget, ResumePoint};
pub use geom::{EdgeSizes, LayoutCoord, Point, Rect};
pub use layout_item::{BlockItem, BreakItem, FloatItem, VerticalLayout};
pub use line::{Fragment, FragmentKind, Line};
pub use space::{FloatEntry, SpaceManager};
pub use style::{
    BreakPolicy, ClearSide, Direction, Display, FirstLineStyle, FloatSide, Margins, Overflow,
    OverflowWrap, ResolvedStyle, TextAlign, WhiteSpace,
};
pub use text::{ApproximateFontMetrics, BreakOracle, FontMetrics, LineBreak, UnicodeBreakOracle};
pub use traverse::{BoxCollector, LayoutVisitor};
pub use tree::{BoxContent, BoxId, BoxTree, ReplacedContent};
pub use values::{AutoOr, Dimension};
pub use width::MinMaxWidths;
