//! Lists. Every item is a one-row group of two cells, label and body,
//! stepped like a table row so that a page break cuts both at once.

use super::block::{container_leading_space, container_trailing_space, stack_children, wrap_block};
use super::builder::TreeBuilder;
use super::cell::{GroupStep, SteppedCell, build_step_area};
use super::table::grid::PrimaryId;
use super::{Frame, LayoutNode, NodeTree, Placement, RenderNode};
use crate::LayoutError;
use crate::algorithms::stepper::{RowConstraints, RowGroup, StepCell, TableStepper};
use crate::area::Area;
use crate::assembler::areas::AreaContext;
use crate::elements::Element;
use folio_idf::{FlowNode, ListItem, NodeMetadata};
use folio_style::Space;
use folio_types::{Mpt, OwnerHandle};

#[derive(Debug, Clone)]
pub struct ListNode {
    meta: NodeMetadata,
    frame: Frame,
    items: Vec<OwnerHandle>,
}

impl ListNode {
    pub fn build(
        node: &FlowNode,
        builder: &mut TreeBuilder<'_>,
        handle: OwnerHandle,
        width: Mpt,
    ) -> Result<RenderNode, LayoutError> {
        let FlowNode::List {
            meta,
            indent,
            items,
        } = node
        else {
            return Err(LayoutError::BuilderMismatch("List", node.kind().as_str()));
        };
        let frame = Frame::from_meta(meta, width);
        let mut handles = Vec::with_capacity(items.len());
        for item in items {
            let item_handle = builder.reserve(handle);
            let built = ListItemNode::build(
                item,
                builder,
                item_handle,
                indent.mpt(),
                frame.content_width(),
            )?;
            builder.set(item_handle, built)?;
            handles.push(item_handle);
        }
        Ok(RenderNode::List(Self {
            meta: meta.clone(),
            frame,
            items: handles,
        }))
    }
}

impl LayoutNode for ListNode {
    fn kind(&self) -> &'static str {
        "list"
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
        let inner = stack_children(tree, &self.frame, &self.items)?;
        Ok(wrap_block(&self.meta, &self.frame, handle, inner))
    }

    fn leading_space(
        &self,
        tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Option<(Space, OwnerHandle)>, LayoutError> {
        container_leading_space(&self.meta, &self.frame, tree, handle, &self.items)
    }

    fn trailing_space(
        &self,
        tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Option<(Space, OwnerHandle)>, LayoutError> {
        container_trailing_space(&self.meta, &self.frame, tree, handle, &self.items)
    }
}

const LABEL: usize = 0;
const BODY: usize = 1;

#[derive(Debug, Clone)]
pub struct ListItemNode {
    meta: NodeMetadata,
    frame: Frame,
    handle: OwnerHandle,
    cells: Vec<SteppedCell>,
    steps: Vec<GroupStep>,
    elements: Vec<Element>,
}

impl ListItemNode {
    pub fn build(
        item: &ListItem,
        builder: &mut TreeBuilder<'_>,
        handle: OwnerHandle,
        indent: Mpt,
        width: Mpt,
    ) -> Result<RenderNode, LayoutError> {
        let frame = Frame::from_meta(&item.meta, width);
        let available = frame.content_width();
        let indent = indent.clamp(0, available);
        let label = builder.build_cell(&NodeMetadata::default(), &item.label, handle, 0, indent)?;
        let body = builder.build_cell(
            &NodeMetadata::default(),
            &item.body,
            handle,
            indent,
            available - indent,
        )?;

        let height = label.content_length().max(body.content_length());
        let group = RowGroup {
            rows: vec![RowConstraints {
                height,
                ..Default::default()
            }],
            cells: vec![
                StepCell {
                    primary: PrimaryId(LABEL),
                    first_row: 0,
                    row_span: 1,
                    elements: &label.elements,
                },
                StepCell {
                    primary: PrimaryId(BODY),
                    first_row: 0,
                    row_span: 1,
                    elements: &body.elements,
                },
            ],
        };
        let stepped = TableStepper::combine(&group, handle, 0)?;
        let steps = stepped
            .steps
            .into_iter()
            .map(|step| GroupStep { group: 0, step })
            .collect();
        let cells = [label, body]
            .into_iter()
            .map(|slot| SteppedCell {
                slot,
                group: 0,
                top: 0,
                bottom: height,
            })
            .collect();
        Ok(RenderNode::ListItem(Self {
            meta: item.meta.clone(),
            frame,
            handle,
            cells,
            steps,
            elements: stepped.elements,
        }))
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl LayoutNode for ListItemNode {
    fn kind(&self) -> &'static str {
        "list-item"
    }

    fn meta(&self) -> &NodeMetadata {
        &self.meta
    }

    fn frame(&self) -> Frame {
        self.frame
    }

    fn collect_elements(
        &self,
        _tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Vec<Element>, LayoutError> {
        Ok(wrap_block(
            &self.meta,
            &self.frame,
            handle,
            self.elements.clone(),
        ))
    }

    fn build_area(
        &self,
        index: usize,
        placement: Placement,
        ctx: &mut AreaContext<'_>,
    ) -> Result<Option<Area>, LayoutError> {
        if index >= self.steps.len() {
            return Ok(None);
        }
        build_step_area(ctx, self.handle, &self.cells, &self.steps, index, placement).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_tree;

    fn item(label: &str, lines: usize) -> ListItem {
        ListItem {
            meta: NodeMetadata::default(),
            label: vec![FlowNode::paragraph(label)],
            body: (0..lines).map(|n| FlowNode::paragraph(format!("line {n}"))).collect(),
        }
    }

    #[test]
    fn items_step_at_body_breaks() {
        let list = FlowNode::List {
            meta: NodeMetadata::default(),
            indent: folio_style::Length::pt(18.0),
            items: vec![item("1.", 3)],
        };
        let (tree, root) = build_tree(vec![list]);
        let elements = tree.collect(root).unwrap();
        // Three one-line paragraphs in the body: three steps of one line each.
        let boxes: Vec<_> = elements.iter().filter(|e| e.is_box()).collect();
        assert_eq!(boxes.len(), 3);
        assert!(boxes.iter().all(|b| b.width() == 14_400));
    }

    #[test]
    fn items_are_separate_children() {
        let list = FlowNode::List {
            meta: NodeMetadata::default(),
            indent: folio_style::Length::pt(18.0),
            items: vec![item("a", 1), item("b", 1)],
        };
        let (tree, root) = build_tree(vec![list]);
        let elements = tree.collect(root).unwrap();
        assert_eq!(elements.iter().filter(|e| e.is_box()).count(), 2);
        assert_eq!(elements.iter().filter(|e| e.is_penalty()).count(), 1);
    }
}
