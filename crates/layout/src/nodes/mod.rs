//! Layout nodes: the flow tree converted for breaking.
//!
//! Nodes live in a [`NodeTree`] arena and refer to each other by
//! [`OwnerHandle`]. Every node turns itself into elements and, for the
//! positions it put on its boxes, into areas once the breaker has placed them.

pub mod block;
pub mod builder;
pub mod cell;
pub mod image;
pub mod list;
pub mod page_break;
pub mod paragraph;
pub mod table;

pub use block::BlockNode;
pub use builder::TreeBuilder;
pub use cell::CellNode;
pub use image::ImageNode;
pub use list::{ListItemNode, ListNode};
pub use page_break::PageBreakNode;
pub use paragraph::ParagraphNode;
pub use table::TableNode;

use crate::LayoutError;
use crate::algorithms::justify::AdjustmentNegotiator;
use crate::area::Area;
use crate::assembler::areas::AreaContext;
use crate::elements::Element;
use folio_idf::NodeMetadata;
use folio_style::{Borders, Edges, Space};
use folio_types::{Color, Mpt, OwnerHandle, Rect};

/// Position index of the box standing for border and padding before the content.
pub const BORDER_BEFORE: usize = usize::MAX - 1;
/// Position index of the box standing for border and padding after the content.
pub const BORDER_AFTER: usize = usize::MAX - 2;

/// Inline geometry and decoration of a node's areas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    /// Offset from the parent's content edge.
    pub x: Mpt,
    /// Border-box width.
    pub width: Mpt,
    pub borders: Borders,
    pub padding: Edges,
    pub background: Option<Color>,
}

impl Frame {
    pub fn from_meta(meta: &NodeMetadata, width: Mpt) -> Self {
        Self {
            x: 0,
            width,
            borders: meta.border,
            padding: meta.padding,
            background: meta.background,
        }
    }

    pub fn content_offset(&self) -> Mpt {
        self.borders.widths().start.mpt() + self.padding.start.mpt()
    }

    pub fn content_width(&self) -> Mpt {
        (self.width - self.borders.widths().inline() - self.padding.inline()).max(0)
    }

    pub fn before_extent(&self) -> Mpt {
        self.borders.widths().before.mpt() + self.padding.before.mpt()
    }

    pub fn after_extent(&self) -> Mpt {
        self.borders.widths().after.mpt() + self.padding.after.mpt()
    }
}

/// Where a box was placed, in the coordinates of the run being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Content edge of the owning node.
    pub x: Mpt,
    pub y: Mpt,
    /// Content width of the owning node.
    pub width: Mpt,
    /// Size of the box.
    pub height: Mpt,
    /// The box opens the part.
    pub part_start: bool,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

pub trait LayoutNode {
    fn kind(&self) -> &'static str;

    fn meta(&self) -> &NodeMetadata;

    fn frame(&self) -> Frame;

    /// The node's element list. The natural sizes of its boxes add up to the
    /// node's unconstrained extent.
    fn collect_elements(
        &self,
        tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Vec<Element>, LayoutError>;

    /// Builds the leaf area for a box this node positioned with `index`.
    /// Boxes that only take up room return `None`.
    fn build_area(
        &self,
        _index: usize,
        _placement: Placement,
        _ctx: &mut AreaContext<'_>,
    ) -> Result<Option<Area>, LayoutError> {
        Ok(None)
    }

    /// How much of `amount` the node lets `element` grow (or shrink, when
    /// negative) by.
    fn negotiate_adjustment(&self, amount: Mpt, element: &Element) -> Mpt {
        amount.clamp(-element.shrink(), element.stretch())
    }

    /// Space before the node as seen by its previous sibling.
    fn leading_space(
        &self,
        _tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Option<(Space, OwnerHandle)>, LayoutError> {
        let space = self.meta().space_before;
        Ok((!space.is_zero()).then_some((space, handle)))
    }

    /// Space after the node as seen by its next sibling.
    fn trailing_space(
        &self,
        _tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Option<(Space, OwnerHandle)>, LayoutError> {
        let space = self.meta().space_after;
        Ok((!space.is_zero()).then_some((space, handle)))
    }
}

#[derive(Debug, Clone)]
pub enum RenderNode {
    Block(BlockNode),
    Paragraph(ParagraphNode),
    List(ListNode),
    ListItem(ListItemNode),
    Table(TableNode),
    Cell(CellNode),
    Image(ImageNode),
    PageBreak(PageBreakNode),
}

impl RenderNode {
    pub fn as_layout(&self) -> &dyn LayoutNode {
        match self {
            RenderNode::Block(n) => n,
            RenderNode::Paragraph(n) => n,
            RenderNode::List(n) => n,
            RenderNode::ListItem(n) => n,
            RenderNode::Table(n) => n,
            RenderNode::Cell(n) => n,
            RenderNode::Image(n) => n,
            RenderNode::PageBreak(n) => n,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeSlot {
    node: Option<RenderNode>,
    parent: Option<OwnerHandle>,
}

/// Arena of layout nodes. Handles are reserved before a node is built so its
/// children can point back at it.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    slots: Vec<NodeSlot>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, parent: Option<OwnerHandle>) -> OwnerHandle {
        let handle = OwnerHandle::from(self.slots.len());
        self.slots.push(NodeSlot { node: None, parent });
        handle
    }

    pub fn set(&mut self, handle: OwnerHandle, node: RenderNode) -> Result<(), LayoutError> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .ok_or(LayoutError::UnknownNode(handle))?;
        slot.node = Some(node);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, handle: OwnerHandle) -> Result<&RenderNode, LayoutError> {
        self.slots
            .get(handle.index())
            .and_then(|slot| slot.node.as_ref())
            .ok_or(LayoutError::UnknownNode(handle))
    }

    pub fn node(&self, handle: OwnerHandle) -> Result<&dyn LayoutNode, LayoutError> {
        self.get(handle).map(RenderNode::as_layout)
    }

    pub fn parent(&self, handle: OwnerHandle) -> Option<OwnerHandle> {
        self.slots.get(handle.index()).and_then(|slot| slot.parent)
    }

    /// `owner` and its ancestors strictly below `stop`, outermost first.
    pub fn path(&self, owner: OwnerHandle, stop: Option<OwnerHandle>) -> Vec<OwnerHandle> {
        let mut chain = Vec::new();
        let mut current = Some(owner);
        while let Some(handle) = current {
            if Some(handle) == stop {
                break;
            }
            chain.push(handle);
            current = self.parent(handle);
        }
        chain.reverse();
        chain
    }

    pub fn collect(&self, handle: OwnerHandle) -> Result<Vec<Element>, LayoutError> {
        self.node(handle)?.collect_elements(self, handle)
    }
}

impl AdjustmentNegotiator for NodeTree {
    fn negotiate(&self, element: &Element, amount: Mpt) -> Mpt {
        match element.position().map(|p| self.node(p.owner)) {
            Some(Ok(node)) => node.negotiate_adjustment(amount, element),
            _ => amount.clamp(-element.shrink(), element.stretch()),
        }
    }
}
