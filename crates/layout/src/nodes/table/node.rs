//! Tables. Each section (header, body, footer) is laid out on a grid, split
//! into row groups and stepped, so the table reaches the breaker as a plain
//! run of step boxes. Breaks inside the body carry the footer as penalty
//! width and are followed by an auxiliary box that redraws the header.

use super::grid::TableGrid;
use super::{FOOTER_INDEX, HEADER_INDEX};
use crate::LayoutError;
use crate::algorithms::space::break_cost_between;
use crate::algorithms::stepper::{RowConstraints, RowGroup, StepCell, TableStepper};
use crate::area::{Area, AreaKind};
use crate::assembler::areas::AreaContext;
use crate::elements::{Element, INFINITE, Position, forbid_breaks};
use crate::nodes::block::wrap_block;
use crate::nodes::builder::TreeBuilder;
use crate::nodes::cell::{CellSlot, GroupStep, SteppedCell, build_step_area};
use crate::nodes::{Frame, LayoutNode, NodeTree, Placement, RenderNode};
use folio_idf::{ColumnWidth, FlowNode, NodeMetadata, TableRow};
use folio_types::{Mpt, OwnerHandle, Rect};
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct TableNode {
    meta: NodeMetadata,
    frame: Frame,
    handle: OwnerHandle,
    columns: Vec<Mpt>,
    /// Cells of all sections, indexed by their primary id.
    cells: Vec<SteppedCell>,
    steps: Vec<GroupStep>,
    header: Range<usize>,
    footer: Range<usize>,
    header_height: Mpt,
    footer_height: Mpt,
    repeat: bool,
    elements: Vec<Element>,
}

/// Distributes `available` over the columns: fixed widths first, the rest
/// shared between proportional columns by weight.
pub fn column_widths(columns: &[ColumnWidth], available: Mpt) -> Vec<Mpt> {
    let fixed: Mpt = columns
        .iter()
        .map(|c| match c {
            ColumnWidth::Fixed(length) => length.mpt(),
            ColumnWidth::Proportional(_) => 0,
        })
        .sum();
    if fixed > available {
        log::warn!(
            "Fixed column widths ({}) exceed the available width ({})",
            fixed,
            available
        );
    }
    let weights: f64 = columns
        .iter()
        .map(|c| match c {
            ColumnWidth::Proportional(weight) => f64::from(weight.max(0.0)),
            ColumnWidth::Fixed(_) => 0.0,
        })
        .sum();
    let remainder = (available - fixed).max(0);
    columns
        .iter()
        .map(|c| match c {
            ColumnWidth::Fixed(length) => length.mpt(),
            ColumnWidth::Proportional(weight) if weights > 0.0 => {
                (remainder as f64 * f64::from(weight.max(0.0)) / weights).round() as Mpt
            }
            ColumnWidth::Proportional(_) => 0,
        })
        .collect()
}

/// One stepped section of a table.
#[derive(Debug, Default)]
struct BuiltSection {
    /// Elements of each row group.
    groups: Vec<Vec<Element>>,
    /// Break between group `k` and `k + 1`.
    joins: Vec<Element>,
    steps: Range<usize>,
    height: Mpt,
}

impl BuiltSection {
    fn flatten(self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut joins = self.joins.into_iter();
        for (k, group) in self.groups.into_iter().enumerate() {
            if k > 0
                && let Some(join) = joins.next()
            {
                out.push(join);
            }
            out.extend(group);
        }
        out
    }
}

struct SectionBuilder<'t> {
    handle: OwnerHandle,
    widths: &'t [Mpt],
    offsets: Vec<Mpt>,
    cells: Vec<SteppedCell>,
    steps: Vec<GroupStep>,
    groups: usize,
}

impl<'t> SectionBuilder<'t> {
    fn new(handle: OwnerHandle, widths: &'t [Mpt]) -> Self {
        let offsets = widths
            .iter()
            .scan(0, |x, w| {
                let start = *x;
                *x += w;
                Some(start)
            })
            .collect();
        Self {
            handle,
            widths,
            offsets,
            cells: Vec::new(),
            steps: Vec::new(),
            groups: 0,
        }
    }

    fn add(
        &mut self,
        builder: &mut TreeBuilder<'_>,
        rows: &[TableRow],
    ) -> Result<BuiltSection, LayoutError> {
        let first_step = self.steps.len();
        let first_id = self.cells.len();
        let grid = TableGrid::build(rows, self.widths.len(), first_id);

        let mut slots: Vec<CellSlot> = Vec::with_capacity(grid.primaries().len());
        for primary in grid.primaries() {
            let (r, c) = primary.source;
            let cell = &rows[r].cells[c];
            let x = self.offsets[primary.column];
            let width = self.widths[primary.column..primary.column + primary.col_span]
                .iter()
                .sum();
            slots.push(builder.build_cell(&cell.meta, &cell.children, self.handle, x, width)?);
        }

        let mut heights: Vec<Mpt> = rows
            .iter()
            .map(|row| row.height.map_or(0, |h| h.mpt()))
            .collect();
        for (primary, slot) in grid.primaries().iter().zip(&slots) {
            if primary.row_span == 1 {
                heights[primary.row] = heights[primary.row].max(slot.content_length());
            }
        }
        // Spanning cells that need more room stretch the last row they cover.
        for (primary, slot) in grid.primaries().iter().zip(&slots) {
            if primary.row_span > 1 {
                let rows_covered = primary.row..primary.row + primary.row_span;
                let current: Mpt = heights[rows_covered.clone()].iter().sum();
                let needed = slot.content_length();
                if needed > current {
                    heights[rows_covered.end - 1] += needed - current;
                }
            }
        }

        let mut section = BuiltSection {
            height: heights.iter().sum(),
            ..Default::default()
        };
        let mut placed: Vec<(usize, Mpt, Mpt)> = vec![(0, 0, 0); slots.len()];
        let groups = grid.row_groups();
        for (g, range) in groups.iter().enumerate() {
            let group_id = self.groups;
            self.groups += 1;

            let mut tops = Vec::with_capacity(range.len() + 1);
            let mut y = 0;
            for r in range.clone() {
                tops.push(y);
                y += heights[r];
            }
            tops.push(y);

            let constraints: Vec<RowConstraints> = range
                .clone()
                .map(|r| RowConstraints {
                    height: heights[r],
                    keep_together: !rows[r].meta.keep_together.is_auto(),
                    break_after_cost: rows.get(r + 1).map_or(0, |next| {
                        break_cost_between(rows[r].meta.keep_with_next, next.meta.keep_with_previous)
                    }),
                })
                .collect();
            let mut cells = Vec::new();
            for (k, primary) in grid.primaries().iter().enumerate() {
                if !range.contains(&primary.row) {
                    continue;
                }
                let first_row = primary.row - range.start;
                placed[k] = (
                    group_id,
                    tops[first_row],
                    tops[first_row + primary.row_span],
                );
                cells.push(StepCell {
                    primary: primary.id,
                    first_row,
                    row_span: primary.row_span,
                    elements: &slots[k].elements,
                });
            }
            let group = RowGroup {
                rows: constraints,
                cells,
            };
            let stepped = TableStepper::combine(&group, self.handle, self.steps.len())?;
            self.steps.extend(stepped.steps.into_iter().map(|step| GroupStep {
                group: group_id,
                step,
            }));
            section.groups.push(stepped.elements);

            if let Some(next) = groups.get(g + 1) {
                let last = &rows[range.end - 1].meta;
                let first = &rows[next.start].meta;
                let class = if !last.break_after.is_auto() {
                    last.break_after
                } else {
                    first.break_before
                };
                section.joins.push(if class.is_auto() {
                    Element::penalty(break_cost_between(
                        last.keep_with_next,
                        first.keep_with_previous,
                    ))
                } else {
                    Element::forced_break(class)
                });
            }
        }

        for (slot, (group, top, bottom)) in slots.into_iter().zip(placed) {
            self.cells.push(SteppedCell {
                slot,
                group,
                top,
                bottom,
            });
        }
        section.steps = first_step..self.steps.len();
        Ok(section)
    }
}

impl TableNode {
    pub fn build(
        node: &FlowNode,
        builder: &mut TreeBuilder<'_>,
        handle: OwnerHandle,
        width: Mpt,
    ) -> Result<RenderNode, LayoutError> {
        let FlowNode::Table {
            meta,
            columns,
            header,
            body,
            footer,
            repeat,
        } = node
        else {
            return Err(LayoutError::BuilderMismatch("Table", node.kind().as_str()));
        };
        if columns.is_empty() {
            return Err(LayoutError::InvalidTable(
                "a table needs at least one column".into(),
            ));
        }
        let frame = Frame::from_meta(meta, width);
        let widths = column_widths(columns, frame.content_width());

        let mut sections = SectionBuilder::new(handle, &widths);
        let header = sections.add(builder, header)?;
        let body = sections.add(builder, body)?;
        let footer = sections.add(builder, footer)?;

        let mut table = Self {
            meta: meta.clone(),
            frame,
            handle,
            columns: widths.clone(),
            cells: Vec::new(),
            steps: Vec::new(),
            header: header.steps.clone(),
            footer: footer.steps.clone(),
            header_height: header.height,
            footer_height: footer.height,
            repeat: *repeat,
            elements: Vec::new(),
        };

        let mut elements = forbid_breaks(header.flatten());
        let mut joins = body.joins.into_iter();
        for (g, group) in body.groups.into_iter().enumerate() {
            if g > 0
                && let Some(join) = joins.next()
            {
                elements.extend(table.break_with_repeats(join));
            }
            for element in group {
                if element.is_penalty() {
                    elements.extend(table.break_with_repeats(element));
                } else {
                    elements.push(element);
                }
            }
        }
        elements.extend(forbid_breaks(footer.flatten()));
        log::debug!(
            "Table {:?}: {} columns, {} steps, header {} footer {}",
            handle,
            table.columns.len(),
            sections.steps.len(),
            table.header_height,
            table.footer_height
        );

        table.cells = sections.cells;
        table.steps = sections.steps;
        table.elements = elements;
        Ok(RenderNode::Table(table))
    }

    /// The break `penalty` inside the body, widened by the footer and
    /// followed by the header's redraw.
    fn break_with_repeats(&self, penalty: Element) -> Vec<Element> {
        if !self.repeat || penalty.is_forbidden_break() {
            return vec![penalty];
        }
        let mut out = Vec::with_capacity(5);
        out.push(if self.footer_height > 0 {
            penalty
                .with_size(self.footer_height)
                .with_position(Position::new(self.handle, FOOTER_INDEX))
        } else {
            penalty
        });
        if self.header_height > 0 {
            out.push(Element::glue(-self.header_height, 0, 0));
            out.push(Element::auxiliary_box(
                0,
                Some(Position::new(self.handle, HEADER_INDEX)),
            ));
            out.push(Element::penalty(INFINITE));
            out.push(Element::glue(self.header_height, 0, 0));
        }
        out
    }

    pub fn column_widths(&self) -> &[Mpt] {
        &self.columns
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Redraws the steps of a header or footer without recording events.
    fn build_repeated(
        &self,
        ctx: &mut AreaContext<'_>,
        steps: Range<usize>,
        placement: Placement,
    ) -> Result<Option<Area>, LayoutError> {
        if steps.is_empty() {
            return Ok(None);
        }
        let height = self.steps[steps.clone()]
            .iter()
            .map(|s| s.step.height())
            .sum();
        let mut area = Area::new(
            AreaKind::Block,
            Rect::new(placement.x, placement.y, placement.width, height),
        )
        .with_owner(self.handle);
        let mut y = placement.y;
        ctx.quietly(|ctx| -> Result<(), LayoutError> {
            for (k, index) in steps.enumerate() {
                let step = build_step_area(
                    ctx,
                    self.handle,
                    &self.cells,
                    &self.steps,
                    index,
                    Placement {
                        x: placement.x,
                        y,
                        width: placement.width,
                        height: self.steps[index].step.height(),
                        part_start: k == 0,
                    },
                )?;
                y += step.rect.height;
                area.children.push(step);
            }
            Ok(())
        })?;
        area.relativize_children();
        Ok(Some(area))
    }
}

impl LayoutNode for TableNode {
    fn kind(&self) -> &'static str {
        "table"
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
        match index {
            HEADER_INDEX if placement.part_start => {
                self.build_repeated(ctx, self.header.clone(), placement)
            }
            HEADER_INDEX => Ok(None),
            FOOTER_INDEX => self.build_repeated(ctx, self.footer.clone(), placement),
            index if index < self.steps.len() => {
                build_step_area(ctx, self.handle, &self.cells, &self.steps, index, placement)
                    .map(Some)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::test_utils::build_tree;
    use crate::text::FixedMetrics;
    use folio_idf::TableCell;
    use folio_style::Length;

    fn text_row(texts: &[&str]) -> TableRow {
        TableRow {
            cells: texts
                .iter()
                .map(|t| TableCell::new(vec![FlowNode::paragraph(*t)]))
                .collect(),
            ..Default::default()
        }
    }

    fn table(header: usize, body: usize, footer: usize, repeat: bool) -> FlowNode {
        FlowNode::Table {
            meta: NodeMetadata::default(),
            columns: vec![ColumnWidth::Proportional(1.0)],
            header: (0..header).map(|_| text_row(&["head"])).collect(),
            body: (0..body).map(|_| text_row(&["row"])).collect(),
            footer: (0..footer).map(|_| text_row(&["foot"])).collect(),
            repeat,
        }
    }

    fn at_index(elements: &[Element], index: usize) -> usize {
        elements
            .iter()
            .filter(|e| e.position().is_some_and(|p| p.index == index))
            .count()
    }

    #[test]
    fn fixed_columns_come_first_and_weights_share_the_rest() {
        let widths = column_widths(
            &[
                ColumnWidth::Fixed(Length::pt(100.0)),
                ColumnWidth::Proportional(1.0),
                ColumnWidth::Proportional(3.0),
            ],
            500_000,
        );
        assert_eq!(widths, vec![100_000, 100_000, 300_000]);
    }

    #[test]
    fn body_breaks_carry_footer_and_header() {
        let (tree, root) = build_tree(vec![table(1, 3, 1, true)]);
        let elements = tree.collect(root).unwrap();
        assert_eq!(at_index(&elements, HEADER_INDEX), 2);
        assert_eq!(at_index(&elements, FOOTER_INDEX), 2);
        let footer_breaks: Vec<_> = elements
            .iter()
            .filter(|e| e.is_penalty() && e.position().is_some_and(|p| p.index == FOOTER_INDEX))
            .collect();
        assert!(footer_breaks.iter().all(|p| p.break_size() == 14_400));
        assert_eq!(footer_breaks[0].penalty_cost(), Some(0));
    }

    #[test]
    fn header_and_footer_cannot_be_split_from_the_body() {
        let (tree, root) = build_tree(vec![table(1, 1, 1, true)]);
        let elements = tree.collect(root).unwrap();
        // One step each for header, body and footer, with no break between.
        assert_eq!(elements.iter().filter(|e| e.is_box()).count(), 3);
        assert!(!elements.iter().any(Element::is_penalty));
    }

    #[test]
    fn without_repeat_breaks_stay_plain() {
        let (tree, root) = build_tree(vec![table(1, 3, 1, false)]);
        let elements = tree.collect(root).unwrap();
        assert_eq!(at_index(&elements, HEADER_INDEX), 0);
        assert_eq!(at_index(&elements, FOOTER_INDEX), 0);
        assert_eq!(elements.iter().filter(|e| e.is_penalty()).count(), 2);
    }

    #[test]
    fn spanning_cells_stretch_the_last_row() {
        let spanning = TableCell {
            row_span: 2,
            ..TableCell::new(vec![
                FlowNode::paragraph("a"),
                FlowNode::paragraph("b"),
                FlowNode::paragraph("c"),
            ])
        };
        let mut first = text_row(&["x"]);
        first.cells.insert(0, spanning);
        let node = FlowNode::Table {
            meta: NodeMetadata::default(),
            columns: vec![ColumnWidth::Proportional(1.0); 2],
            header: vec![],
            body: vec![first, text_row(&["y"])],
            footer: vec![],
            repeat: true,
        };
        let (tree, root) = build_tree(vec![node]);
        let elements = tree.collect(root).unwrap();
        let total: Mpt = elements.iter().filter(|e| e.is_box()).map(Element::width).sum();
        assert_eq!(total, 43_200);
        assert!(!elements.iter().any(Element::is_forced_break));
    }

    #[test]
    fn tables_need_columns() {
        let node = FlowNode::Table {
            meta: NodeMetadata::default(),
            columns: vec![],
            header: vec![],
            body: vec![text_row(&["x"])],
            footer: vec![],
            repeat: true,
        };
        let metrics = FixedMetrics::default();
        let result = TreeBuilder::new(&metrics, LayoutConfig::default()).build_flow(&[node], 400_000);
        assert!(matches!(result, Err(LayoutError::InvalidTable(_))));
    }
}
