//! Entries of a container's vertical layout stack.
//!
//! A container lays its content out as a vertical stack of lines, block
//! children, floats and explicit breaks, in document order. Lines and
//! blocks take vertical space; floats are listed where they occur but
//! are positioned by the float ledger.

use crate::container::Container;
use crate::geom::{LayoutCoord, Rect};
use crate::line::Line;
use crate::style::{BreakPolicy, FloatSide};
use crate::tree::BoxId;

/// An in-flow block-level child.
#[derive(Debug)]
pub struct BlockItem {
    /// The child's container. Its `x`/`y` are relative to the parent's
    /// content box.
    pub container: Box<Container>,
    /// All of the child's margins collapsed through it.
    pub collapsed_through: bool,
}

/// A floating child.
#[derive(Debug)]
pub struct FloatItem {
    /// The float's container.
    pub container: Box<Container>,
    /// Which side it floats to.
    pub side: FloatSide,
    /// Margin box relative to the parent's content box.
    pub margin_box: Rect,
    /// The float was placed below the line it occurred in.
    pub deferred: bool,
}

/// A forced break between lines or blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakItem {
    /// Top relative to the container's content box.
    pub y: LayoutCoord,
    /// Vertical space the break takes (a `<br>` with no line).
    pub height: LayoutCoord,
    /// What kind of break.
    pub policy: BreakPolicy,
    /// The box that caused it, if it was a `<br>`.
    pub node: Option<BoxId>,
}

/// One entry of the vertical layout stack.
#[derive(Debug)]
pub enum VerticalLayout {
    /// A line box.
    Line(Line),
    /// A block-level child.
    Block(BlockItem),
    /// A float.
    Float(FloatItem),
    /// A break.
    Break(BreakItem),
}

impl VerticalLayout {
    /// The entry is a line.
    #[must_use]
    pub const fn is_line(&self) -> bool {
        matches!(self, Self::Line(_))
    }

    /// The entry takes part in vertical stacking.
    #[must_use]
    pub const fn is_in_stack(&self) -> bool {
        !matches!(self, Self::Float(_))
    }

    /// Top relative to the container's content box.
    #[must_use]
    pub fn stack_position(&self) -> LayoutCoord {
        match self {
            Self::Line(line) => line.y,
            Self::Block(block) => block.container.y,
            Self::Float(float) => float.margin_box.y,
            Self::Break(item) => item.y,
        }
    }

    /// Vertical space taken in the stack. Floats take none.
    #[must_use]
    pub fn layout_height(&self) -> LayoutCoord {
        match self {
            Self::Line(line) => line.height,
            Self::Block(block) => block.container.height,
            Self::Float(_) => 0,
            Self::Break(item) => item.height,
        }
    }

    /// The line, if the entry is one.
    #[must_use]
    pub const fn as_line(&self) -> Option<&Line> {
        match self {
            Self::Line(line) => Some(line),
            _ => None,
        }
    }

    /// The child container, for blocks and floats.
    #[must_use]
    pub fn container(&self) -> Option<&Container> {
        match self {
            Self::Block(block) => Some(&block.container),
            Self::Float(float) => Some(&float.container),
            Self::Line(_) | Self::Break(_) => None,
        }
    }
}
