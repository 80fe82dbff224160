//! The box tree layout runs over.
//!
//! The tree uses arena allocation with [`BoxId`] indices for all
//! relationships. Layout holds the tree by shared reference for a whole
//! pass; the only state it writes back is dirty-flag acknowledgment, which
//! lives in [`Cell`]s.

use std::cell::Cell;

use crate::geom::LayoutCoord;
use crate::style::ResolvedStyle;

/// A type-safe index into the box tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct BoxId(pub usize);

/// Intrinsic geometry of a replaced element (an image, a widget).
///
/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplacedContent {
    /// Intrinsic width.
    pub width: LayoutCoord,
    /// Intrinsic height.
    pub height: LayoutCoord,
    /// Percentage width, if the used width depends on the containing block.
    pub percent_width: Option<f32>,
}

/// What a box contains.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxContent {
    /// An element box whose children are other boxes. Its display type
    /// decides whether it is a block container, an inline box or an
    /// inline-block.
    Element,
    /// A run of text.
    Text(String),
    /// A replaced element.
    Replaced(ReplacedContent),
    /// A list item marker of a given width.
    Marker {
        /// Marker width in pixels.
        width: LayoutCoord,
    },
    /// A forced line break (`<br>`).
    LineBreak,
    /// A word break opportunity (`<wbr>`).
    WordBreak,
}

/// One node of the box tree.
#[derive(Debug, Clone)]
pub struct BoxNode {
    /// Resolved style snapshot.
    pub style: ResolvedStyle,
    /// Content kind.
    pub content: BoxContent,
    /// Parent box, `None` for the root.
    pub parent: Option<BoxId>,
    /// Children in document order.
    pub children: Vec<BoxId>,
    dirty: Cell<bool>,
    subtree_dirty: Cell<bool>,
}

impl BoxNode {
    /// Whether this box itself changed since it was last laid out.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Whether this box or any descendant changed since last layout.
    #[must_use]
    pub fn is_subtree_dirty(&self) -> bool {
        self.dirty.get() || self.subtree_dirty.get()
    }

    /// The text of a text box.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            BoxContent::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Arena-based box tree.
#[derive(Debug, Clone)]
pub struct BoxTree {
    nodes: Vec<BoxNode>,
}

impl BoxTree {
    /// Create a tree containing only a root element with `style`.
    #[must_use]
    pub fn new(style: ResolvedStyle) -> Self {
        Self {
            nodes: vec![BoxNode {
                style,
                content: BoxContent::Element,
                parent: None,
                children: Vec::new(),
                dirty: Cell::new(true),
                subtree_dirty: Cell::new(true),
            }],
        }
    }

    /// The root box.
    #[must_use]
    pub const fn root(&self) -> BoxId {
        BoxId(0)
    }

    /// Number of boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the tree has at least a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a box.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: BoxId) -> &BoxNode {
        &self.nodes[id.0]
    }

    /// Get a box mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node_mut(&mut self, id: BoxId) -> &mut BoxNode {
        &mut self.nodes[id.0]
    }

    /// Resolved style of a box.
    #[must_use]
    pub fn style(&self, id: BoxId) -> &ResolvedStyle {
        &self.node(id).style
    }

    /// Children of a box.
    #[must_use]
    pub fn children(&self, id: BoxId) -> &[BoxId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Parent of a box.
    #[must_use]
    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Append a new box as the last child of `parent`.
    pub fn append(&mut self, parent: BoxId, style: ResolvedStyle, content: BoxContent) -> BoxId {
        let id = BoxId(self.nodes.len());
        self.nodes.push(BoxNode {
            style,
            content,
            parent: Some(parent),
            children: Vec::new(),
            dirty: Cell::new(true),
            subtree_dirty: Cell::new(true),
        });
        self.nodes[parent.0].children.push(id);
        self.mark_dirty(parent);
        id
    }

    /// Append an element box.
    pub fn append_element(&mut self, parent: BoxId, style: ResolvedStyle) -> BoxId {
        self.append(parent, style, BoxContent::Element)
    }

    /// Append a text run inheriting text properties from `parent`.
    pub fn append_text(&mut self, parent: BoxId, text: &str) -> BoxId {
        let style = self.style(parent).inherit_text();
        self.append(parent, style, BoxContent::Text(text.to_string()))
    }

    /// Replace the text of a text box and mark it dirty.
    pub fn set_text(&mut self, id: BoxId, text: &str) {
        if let BoxContent::Text(s) = &mut self.nodes[id.0].content {
            text.clone_into(s);
        }
        self.mark_dirty(id);
    }

    /// Replace the style of a box and mark it dirty.
    pub fn set_style(&mut self, id: BoxId, style: ResolvedStyle) {
        self.nodes[id.0].style = style;
        self.mark_dirty(id);
    }

    /// Mark a box as changed. Every ancestor learns that its subtree
    /// changed, so clean siblings can still be skipped.
    pub fn mark_dirty(&self, id: BoxId) {
        self.nodes[id.0].dirty.set(true);
        let mut current = self.parent(id);
        while let Some(p) = current {
            let node = &self.nodes[p.0];
            if node.subtree_dirty.get() {
                break;
            }
            node.subtree_dirty.set(true);
            current = node.parent;
        }
    }

    /// Acknowledge that `id` and its inline content have been laid out.
    ///
    /// Block-level, floating and inline-block descendants are laid out by
    /// their own containers and acknowledge themselves. If one of them is
    /// still dirty (it asked for another pass), `id` keeps its subtree bit.
    pub fn acknowledge(&self, id: BoxId) {
        let node = &self.nodes[id.0];
        node.dirty.set(false);
        node.subtree_dirty.set(false);
        for &child in &node.children {
            let c = &self.nodes[child.0];
            if self.owns_container(child) {
                if c.is_subtree_dirty() {
                    node.subtree_dirty.set(true);
                }
            } else {
                self.acknowledge(child);
                if c.is_subtree_dirty() {
                    node.subtree_dirty.set(true);
                }
            }
        }
    }

    /// Whether `id` is laid out by a container of its own (block-level,
    /// floating or inline-block element).
    #[must_use]
    pub fn owns_container(&self, id: BoxId) -> bool {
        let node = self.node(id);
        matches!(node.content, BoxContent::Element)
            && (node.style.is_block_level()
                || node.style.is_floating()
                || node.style.establishes_bfc())
    }
}
