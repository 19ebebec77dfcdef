//! Turns a flow tree into a [`NodeTree`] at a known width.

use super::{
    BlockNode, CellNode, Frame, ImageNode, ListNode, NodeTree, PageBreakNode, ParagraphNode,
    RenderNode, TableNode,
};
use crate::LayoutError;
use crate::assembler::areas::last_occurrences;
use crate::config::LayoutConfig;
use crate::nodes::cell::CellSlot;
use crate::text::TextMetrics;
use folio_idf::{FlowNode, NodeMetadata};
use folio_types::{Mpt, OwnerHandle};

pub struct TreeBuilder<'a> {
    tree: NodeTree,
    metrics: &'a dyn TextMetrics,
    config: LayoutConfig,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(metrics: &'a dyn TextMetrics, config: LayoutConfig) -> Self {
        Self {
            tree: NodeTree::new(),
            metrics,
            config,
        }
    }

    pub fn metrics(&self) -> &'a dyn TextMetrics {
        self.metrics
    }

    pub fn config(&self) -> LayoutConfig {
        self.config
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn reserve(&mut self, parent: OwnerHandle) -> OwnerHandle {
        self.tree.reserve(Some(parent))
    }

    pub fn set(&mut self, handle: OwnerHandle, node: RenderNode) -> Result<(), LayoutError> {
        self.tree.set(handle, node)
    }

    /// Builds a whole flow. Returns the tree and its frameless root.
    pub fn build_flow(
        mut self,
        flow: &[FlowNode],
        width: Mpt,
    ) -> Result<(NodeTree, OwnerHandle), LayoutError> {
        let root = self.tree.reserve(None);
        let children = self.build_children(flow, root, width)?;
        self.tree
            .set(root, RenderNode::Block(BlockNode::root(width, children)))?;
        log::debug!("Built {} layout nodes at width {}", self.tree.len(), width);
        Ok((self.tree, root))
    }

    pub fn build_children(
        &mut self,
        nodes: &[FlowNode],
        parent: OwnerHandle,
        width: Mpt,
    ) -> Result<Vec<OwnerHandle>, LayoutError> {
        nodes
            .iter()
            .map(|node| self.build_node(node, parent, width))
            .collect()
    }

    pub fn build_node(
        &mut self,
        node: &FlowNode,
        parent: OwnerHandle,
        width: Mpt,
    ) -> Result<OwnerHandle, LayoutError> {
        let handle = self.tree.reserve(Some(parent));
        let built = match node {
            FlowNode::Block { .. } => BlockNode::build(node, self, handle, width)?,
            FlowNode::Paragraph { .. } => ParagraphNode::build(node, self, handle, width)?,
            FlowNode::List { .. } => ListNode::build(node, self, handle, width)?,
            FlowNode::Table { .. } => TableNode::build(node, self, handle, width)?,
            FlowNode::Image { .. } => ImageNode::build(node, self, handle, width)?,
            FlowNode::PageBreak { .. } => PageBreakNode::build(node, self, handle, width)?,
        };
        self.tree.set(handle, built)?;
        Ok(handle)
    }

    /// Builds a cell and collects its element list right away, since the
    /// stepper of the enclosing row group needs it.
    pub fn build_cell(
        &mut self,
        meta: &NodeMetadata,
        children: &[FlowNode],
        parent: OwnerHandle,
        x: Mpt,
        width: Mpt,
    ) -> Result<CellSlot, LayoutError> {
        let handle = self.tree.reserve(Some(parent));
        let content_width = Frame::from_meta(meta, width).content_width();
        let children = self.build_children(children, handle, content_width)?;
        self.tree
            .set(handle, RenderNode::Cell(CellNode::new(meta.clone(), width, children)))?;
        let elements = self.tree.collect(handle)?;
        let last_occurrence = last_occurrences(&self.tree, &elements, Some(handle));
        Ok(CellSlot {
            handle,
            x,
            width,
            elements,
            last_occurrence,
        })
    }
}
