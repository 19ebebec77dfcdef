//! Cells: block containers laid out on their own and stepped together by a
//! table row group or a list item.

use super::block::{stack_children, wrap_block};
use super::{Frame, LayoutNode, NodeTree, Placement};
use crate::LayoutError;
use crate::algorithms::stepper::{CellPart, RowStep};
use crate::area::{Area, AreaKind};
use crate::assembler::areas::{AreaContext, BuiltRun, Run, build_run};
use crate::elements::Element;
use folio_idf::NodeMetadata;
use folio_types::{Mpt, OwnerHandle, Rect};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CellNode {
    meta: NodeMetadata,
    frame: Frame,
    children: Vec<OwnerHandle>,
}

impl CellNode {
    pub fn new(meta: NodeMetadata, width: Mpt, children: Vec<OwnerHandle>) -> Self {
        let frame = Frame::from_meta(&meta, width);
        Self {
            meta,
            frame,
            children,
        }
    }
}

impl LayoutNode for CellNode {
    fn kind(&self) -> &'static str {
        "cell"
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
        // Breaks and keeps of a cell belong to its row, not to its content.
        let meta = NodeMetadata {
            break_before: Default::default(),
            break_after: Default::default(),
            keep_together: Default::default(),
            ..self.meta.clone()
        };
        Ok(wrap_block(&meta, &self.frame, handle, inner))
    }
}

/// A built cell with its element list, ready to be stepped.
#[derive(Debug, Clone)]
pub struct CellSlot {
    pub handle: OwnerHandle,
    /// Offset from the stepped container's content edge.
    pub x: Mpt,
    pub width: Mpt,
    pub elements: Vec<Element>,
    pub last_occurrence: HashMap<OwnerHandle, usize>,
}

impl CellSlot {
    pub fn content_length(&self) -> Mpt {
        crate::elements::natural_extent(&self.elements, 0..self.elements.len())
    }
}

/// A cell placed in a row group: its vertical extent in group coordinates.
#[derive(Debug, Clone)]
pub struct SteppedCell {
    pub slot: CellSlot,
    pub group: usize,
    pub top: Mpt,
    pub bottom: Mpt,
}

/// A step together with the row group it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStep {
    pub group: usize,
    pub step: RowStep,
}

/// Builds the content of one cell part, top edge at `y`.
pub(crate) fn build_cell_part(
    ctx: &mut AreaContext<'_>,
    slot: &CellSlot,
    part: &CellPart,
    x: Mpt,
    y: Mpt,
) -> Result<BuiltRun, LayoutError> {
    let frame = ctx.tree.node(slot.handle)?.frame();
    ctx.located(slot.handle);
    let run = Run {
        elements: &slot.elements,
        range: part.range.clone(),
        root: Some(slot.handle),
        x: x + frame.content_offset(),
        y,
        width: frame.content_width(),
        ratio: 0.0,
        ledger: None,
        last_occurrence: &slot.last_occurrence,
        offset: 0,
    };
    let built = build_run(ctx, &run)?;
    if part.finished {
        ctx.finished(slot.handle);
    }
    Ok(built)
}

/// Builds the area of step `index` of a stepped container: one slice per
/// cell the step crosses, holding whatever content the step advanced.
pub(crate) fn build_step_area(
    ctx: &mut AreaContext<'_>,
    owner: OwnerHandle,
    cells: &[SteppedCell],
    steps: &[GroupStep],
    index: usize,
    placement: Placement,
) -> Result<Area, LayoutError> {
    let GroupStep { group, step } = steps
        .get(index)
        .ok_or_else(|| LayoutError::Internal(format!("{owner:?} has no step {index}")))?;
    let origin = ctx.step_origin(
        owner,
        *group,
        index,
        step.start,
        placement.y,
        placement.part_start,
    );
    let mut area = Area::new(
        AreaKind::RowStep,
        Rect::new(placement.x, placement.y, placement.width, step.height()),
    )
    .with_owner(owner);

    let tree = ctx.tree;
    for (primary, cell) in cells.iter().enumerate() {
        if cell.group != *group || cell.top >= step.end || cell.bottom <= step.start {
            continue;
        }
        let node = tree.node(cell.slot.handle)?;
        let frame = node.frame();
        let starts_here = step.start <= cell.top;
        let first_slice = starts_here || step.start == origin.visible_from;
        let x = placement.x + cell.slot.x;
        let mut slice = Area::new(
            AreaKind::Cell,
            Rect::new(x, placement.y, cell.slot.width, step.height()),
        )
        .with_owner(cell.slot.handle);
        slice.borders = frame.borders;
        if !first_slice {
            slice.borders.before = None;
        }
        if cell.bottom > step.end {
            slice.borders.after = None;
        }
        slice.background = frame.background;
        if starts_here && !ctx.is_quiet() {
            slice.id = node.meta().id.clone();
        }

        if let Some(part) = step.parts.iter().find(|p| p.primary.0 == primary) {
            let top = ctx
                .cell_cursor(owner, primary)
                .unwrap_or(origin.origin + cell.top.max(origin.visible_from));
            let built = build_cell_part(ctx, &cell.slot, part, x, top)?;
            ctx.set_cell_cursor(owner, primary, top + built.height);
            slice.children = built.areas;
        }
        slice.relativize_children();
        area.children.push(slice);
    }
    area.relativize_children();
    Ok(area)
}
