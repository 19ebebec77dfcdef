use super::builder::TreeBuilder;
use super::{BORDER_AFTER, BORDER_BEFORE, Frame, LayoutNode, NodeTree, RenderNode};
use crate::LayoutError;
use crate::algorithms::space::{break_cost_between, keep_cost, resolve_spaces};
use crate::elements::{Element, Position, forbid_breaks, raise_break_costs};
use folio_idf::{FlowNode, NodeMetadata};
use folio_style::{Keep, Space};
use folio_types::{Mpt, OwnerHandle};

#[derive(Debug, Clone)]
pub struct BlockNode {
    meta: NodeMetadata,
    frame: Frame,
    children: Vec<OwnerHandle>,
}

impl BlockNode {
    pub fn build(
        node: &FlowNode,
        builder: &mut TreeBuilder<'_>,
        handle: OwnerHandle,
        width: Mpt,
    ) -> Result<RenderNode, LayoutError> {
        let FlowNode::Block { meta, children } = node else {
            return Err(LayoutError::BuilderMismatch("Block", node.kind().as_str()));
        };
        let frame = Frame::from_meta(meta, width);
        let children = builder.build_children(children, handle, frame.content_width())?;
        Ok(RenderNode::Block(Self {
            meta: meta.clone(),
            frame,
            children,
        }))
    }

    /// The flow root: a frameless block spanning the column.
    pub fn root(width: Mpt, children: Vec<OwnerHandle>) -> Self {
        Self {
            meta: NodeMetadata::default(),
            frame: Frame {
                width,
                ..Default::default()
            },
            children,
        }
    }

    pub fn children(&self) -> &[OwnerHandle] {
        &self.children
    }
}

impl LayoutNode for BlockNode {
    fn kind(&self) -> &'static str {
        "block"
    }

    fn meta(&self) -> &NodeMetadata {
        &self.meta
    }

    fn frame(&self) -> Frame {
        self.frame
    }

    fn collect_elements(
        &self,
        tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Vec<Element>, LayoutError> {
        let inner = stack_children(tree, &self.frame, &self.children)?;
        Ok(wrap_block(&self.meta, &self.frame, handle, inner))
    }

    fn leading_space(
        &self,
        tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Option<(Space, OwnerHandle)>, LayoutError> {
        container_leading_space(&self.meta, &self.frame, tree, handle, &self.children)
    }

    fn trailing_space(
        &self,
        tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Option<(Space, OwnerHandle)>, LayoutError> {
        container_trailing_space(&self.meta, &self.frame, tree, handle, &self.children)
    }
}

fn own_space(space: Space, handle: OwnerHandle) -> Option<(Space, OwnerHandle)> {
    (!space.is_zero()).then_some((space, handle))
}

/// Space-before of a container. Without a border or padding edge in front,
/// the first child's space-before is not separated from it and the two
/// resolve into one.
pub(crate) fn container_leading_space(
    meta: &NodeMetadata,
    frame: &Frame,
    tree: &NodeTree,
    handle: OwnerHandle,
    children: &[OwnerHandle],
) -> Result<Option<(Space, OwnerHandle)>, LayoutError> {
    let own = own_space(meta.space_before, handle);
    let Some(&first) = children.first() else {
        return Ok(own);
    };
    if frame.before_extent() > 0 || !meta.break_before.is_auto() {
        return Ok(own);
    }
    let inner = tree.node(first)?.leading_space(tree, first)?;
    Ok(resolve_spaces(own, inner).map(|r| (r.space, r.owner)))
}

pub(crate) fn container_trailing_space(
    meta: &NodeMetadata,
    frame: &Frame,
    tree: &NodeTree,
    handle: OwnerHandle,
    children: &[OwnerHandle],
) -> Result<Option<(Space, OwnerHandle)>, LayoutError> {
    let own = own_space(meta.space_after, handle);
    let Some(&last) = children.last() else {
        return Ok(own);
    };
    if frame.after_extent() > 0 || !meta.break_after.is_auto() {
        return Ok(own);
    }
    let inner = tree.node(last)?.trailing_space(tree, last)?;
    Ok(resolve_spaces(inner, own).map(|r| (r.space, r.owner)))
}

/// Stacks the element lists of block-level children: a keep penalty and
/// the resolved space between siblings. The spaces at the container's own
/// edges only appear here when a border or padding edge holds them in.
pub(crate) fn stack_children(
    tree: &NodeTree,
    frame: &Frame,
    children: &[OwnerHandle],
) -> Result<Vec<Element>, LayoutError> {
    let mut elements = Vec::new();
    let mut previous: Option<(&dyn LayoutNode, OwnerHandle)> = None;
    for &child in children {
        let node = tree.node(child)?;
        let before = node.leading_space(tree, child)?;
        match previous {
            Some((prev, prev_handle)) => {
                elements.push(Element::penalty(break_cost_between(
                    prev.meta().keep_with_next,
                    node.meta().keep_with_previous,
                )));
                let after = prev.trailing_space(tree, prev_handle)?;
                if let Some(space) = resolve_spaces(after, before) {
                    elements.push(space.element());
                }
            }
            None if frame.before_extent() > 0 => {
                if let Some(space) = resolve_spaces(None, before) {
                    elements.push(space.element());
                }
            }
            None => {}
        }
        elements.extend(node.collect_elements(tree, child)?);
        previous = Some((node, child));
    }
    if frame.after_extent() > 0
        && let Some((prev, prev_handle)) = previous
        && let Some(space) = resolve_spaces(prev.trailing_space(tree, prev_handle)?, None)
    {
        elements.push(space.element());
    }
    Ok(elements)
}

/// Surrounds a node's content with its border boxes, forced breaks and
/// keep-together handling.
pub(crate) fn wrap_block(
    meta: &NodeMetadata,
    frame: &Frame,
    handle: OwnerHandle,
    inner: Vec<Element>,
) -> Vec<Element> {
    let before = frame.before_extent();
    let after = frame.after_extent();
    let mut elements = Vec::with_capacity(inner.len() + 4);
    // A node without any box could never be located.
    if before > 0 || !inner.iter().any(Element::is_box) {
        elements.push(Element::boxed(
            before,
            Some(Position::new(handle, BORDER_BEFORE)),
        ));
    }
    elements.extend(inner);
    if after > 0 {
        elements.push(Element::boxed(
            after,
            Some(Position::new(handle, BORDER_AFTER)),
        ));
    }

    let mut elements = match meta.keep_together {
        Keep::Auto => elements,
        Keep::Always => forbid_breaks(elements),
        strength => raise_break_costs(elements, keep_cost(strength)),
    };
    if !meta.break_before.is_auto() {
        elements.insert(0, Element::forced_break(meta.break_before));
    }
    if !meta.break_after.is_auto() {
        elements.push(Element::forced_break(meta.break_after));
    }
    elements
}
