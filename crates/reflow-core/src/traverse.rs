//! Walking a finished layout.
//!
//! Painting, hit testing and tests all need the same walk: every
//! container, line and break, with absolute positions. The walk is done
//! once here and callers implement [`LayoutVisitor`] for the parts they
//! care about.

use crate::container::Container;
use crate::geom::{Point, Rect};
use crate::layout_item::{BreakItem, VerticalLayout};
use crate::line::{FragmentKind, Line};
use crate::tree::BoxId;

/// Callbacks for [`Container::traverse`]. Every method defaults to doing
/// nothing.
pub trait LayoutVisitor {
    /// A container is entered. `border_box` is absolute.
    fn enter_container(&mut self, _container: &Container, _border_box: Rect) {}

    /// A container's content has been visited.
    fn leave_container(&mut self, _container: &Container) {}

    /// A line box. `origin` is the absolute position of the line's
    /// top-left corner.
    fn visit_line(&mut self, _line: &Line, _origin: Point) {}

    /// A forced break. `origin` is the absolute position of its top.
    fn visit_break(&mut self, _item: &BreakItem, _origin: Point) {}
}

impl Container {
    /// Visit this container and everything below it in document order.
    ///
    /// `origin` is the absolute position of the parent's content box.
    pub fn traverse(&self, visitor: &mut dyn LayoutVisitor, origin: Point) {
        let border_box = self.border_box().translated(origin.x, origin.y);
        visitor.enter_container(self, border_box);

        let offset = self.content_offset();
        let content = Point::new(border_box.x + offset.x, border_box.y + offset.y);
        for item in self.stack() {
            match item {
                VerticalLayout::Line(line) => {
                    let line_origin = content.offset(line.x, line.y);
                    visitor.visit_line(line, line_origin);
                    for fragment in &line.fragments {
                        if let FragmentKind::InlineBlock(child) = &fragment.kind {
                            child.traverse(visitor, content);
                        }
                    }
                }
                VerticalLayout::Block(block) => block.container.traverse(visitor, content),
                VerticalLayout::Float(float) => float.container.traverse(visitor, content),
                VerticalLayout::Break(item) => visitor.visit_break(item, content.offset(0, item.y)),
            }
        }
        visitor.leave_container(self);
    }
}

/// Collects the absolute border box of every container, by box.
#[derive(Debug, Default)]
pub struct BoxCollector {
    /// Boxes in visit order.
    pub boxes: Vec<(BoxId, Rect)>,
}

impl LayoutVisitor for BoxCollector {
    fn enter_container(&mut self, container: &Container, border_box: Rect) {
        self.boxes.push((container.node(), border_box));
    }
}
