//! Combines the element lists of the cells of one row group into a single
//! list the page breaker can work on.
//!
//! Every step ends at the nearest point where some cell can break (one of its
//! internal legal breaks, or the end of its rows). All cells whose next break
//! fits below that point move forward together. Breaking after a step is only
//! allowed when no unfinished cell has content running across it, so a page
//! break between two steps cuts every cell at a place it agreed to.

use crate::LayoutError;
use crate::elements::{Element, INFINITE, Position, is_legal_break, natural_extent};
use crate::nodes::table::grid::PrimaryId;
use folio_style::BreakClass;
use folio_types::{Mpt, OwnerHandle};
use std::ops::Range;

/// Height and break constraints of one row of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowConstraints {
    pub height: Mpt,
    pub keep_together: bool,
    /// Cost of breaking between this row and the next one.
    pub break_after_cost: i32,
}

/// The content of one primary cell, positioned in the group.
#[derive(Debug, Clone, Copy)]
pub struct StepCell<'a> {
    pub primary: PrimaryId,
    /// Row of the group the cell starts in.
    pub first_row: usize,
    pub row_span: usize,
    pub elements: &'a [Element],
}

#[derive(Debug, Clone, Default)]
pub struct RowGroup<'a> {
    pub rows: Vec<RowConstraints>,
    pub cells: Vec<StepCell<'a>>,
}

impl RowGroup<'_> {
    pub fn height(&self) -> Mpt {
        self.rows.iter().map(|r| r.height).sum()
    }
}

/// The slice of a cell's elements that a step hands to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPart {
    pub primary: PrimaryId,
    pub range: Range<usize>,
    /// The cell has no content left after this part.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowStep {
    /// Offset of the step from the top of the group.
    pub start: Mpt,
    pub end: Mpt,
    pub parts: Vec<CellPart>,
    /// Break after the step; `None` for the last step of the group.
    pub penalty: Option<(i32, BreakClass)>,
}

impl RowStep {
    pub fn height(&self) -> Mpt {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Default)]
pub struct StepperOutput {
    pub elements: Vec<Element>,
    pub steps: Vec<RowStep>,
}

#[derive(Debug, Clone, Copy)]
struct CellBreak {
    index: usize,
    /// Content length up to the break, measured from the top of the cell.
    length: Mpt,
    cost: i32,
    class: BreakClass,
}

struct ActiveCell<'a> {
    primary: PrimaryId,
    elements: &'a [Element],
    offset: Mpt,
    end: Mpt,
    /// Bottom of the cell's content in group coordinates.
    content_end: Mpt,
    breaks: Vec<CellBreak>,
    next_break: usize,
    start: usize,
    done: bool,
}

impl<'a> ActiveCell<'a> {
    fn new(cell: &StepCell<'a>, boundaries: &[Mpt]) -> Result<Self, LayoutError> {
        let last_row = cell.first_row + cell.row_span.max(1) - 1;
        let end = *boundaries.get(last_row).ok_or_else(|| {
            LayoutError::InvalidTable(format!(
                "cell {:?} spans past the end of its row group",
                cell.primary
            ))
        })?;
        let offset = match cell.first_row {
            0 => 0,
            r => boundaries[r - 1],
        };
        let first_box = cell.elements.iter().position(Element::is_box);
        let breaks = (0..cell.elements.len())
            .filter(|&i| first_box.is_some_and(|b| i > b) && is_legal_break(cell.elements, i))
            .map(|i| {
                let element = &cell.elements[i];
                let (cost, class) = match element {
                    Element::Penalty {
                        cost, break_class, ..
                    } => (*cost, *break_class),
                    _ => (0, BreakClass::Auto),
                };
                CellBreak {
                    index: i,
                    length: natural_extent(cell.elements, 0..i) + element.break_size(),
                    cost,
                    class,
                }
            })
            .collect();
        Ok(Self {
            primary: cell.primary,
            elements: cell.elements,
            offset,
            end,
            content_end: offset + natural_extent(cell.elements, 0..cell.elements.len()),
            breaks,
            next_break: 0,
            start: 0,
            done: false,
        })
    }

    fn next_candidate(&self) -> Option<Mpt> {
        if self.done {
            return None;
        }
        let at_break = self
            .breaks
            .get(self.next_break)
            .map(|b| self.offset + b.length);
        Some(at_break.map_or(self.end, |b| b.min(self.end)))
    }

    /// Whether the next content still to be placed starts above `step`,
    /// so cutting the cell there would split an unbreakable piece.
    fn crosses(&self, step: Mpt) -> bool {
        if self.done || self.offset >= step {
            return false;
        }
        let Some(next_box) = (self.start..self.elements.len()).find(|&i| self.elements[i].is_box())
        else {
            return false;
        };
        self.offset + natural_extent(self.elements, 0..next_box) < step
    }
}

pub struct TableStepper;

impl TableStepper {
    /// Works out the steps of a row group.
    pub fn steps(group: &RowGroup<'_>) -> Result<Vec<RowStep>, LayoutError> {
        let boundaries: Vec<Mpt> = group
            .rows
            .iter()
            .scan(0, |acc, row| {
                *acc += row.height;
                Some(*acc)
            })
            .collect();
        let mut cells = group
            .cells
            .iter()
            .map(|cell| ActiveCell::new(cell, &boundaries))
            .collect::<Result<Vec<_>, _>>()?;

        let mut steps: Vec<RowStep> = Vec::new();
        let mut previous = 0;
        loop {
            let step = cells
                .iter()
                .filter_map(ActiveCell::next_candidate)
                .chain(boundaries.iter().copied())
                .filter(|&s| s > previous)
                .min();
            let Some(step) = step else { break };

            let mut parts = Vec::new();
            let mut cell_cost: Option<i32> = None;
            let mut forced: Option<BreakClass> = None;
            let mut blocked = false;
            for cell in cells.iter_mut().filter(|c| !c.done) {
                let mut taken = None;
                while let Some(b) = cell.breaks.get(cell.next_break) {
                    if cell.offset + b.length > step {
                        break;
                    }
                    taken = Some(*b);
                    cell.next_break += 1;
                }

                if cell.end <= step || cell.content_end <= step {
                    if cell.start < cell.elements.len() {
                        parts.push(CellPart {
                            primary: cell.primary,
                            range: cell.start..cell.elements.len(),
                            finished: true,
                        });
                    }
                    cell.start = cell.elements.len();
                    cell.done = true;
                } else if let Some(b) = taken {
                    if b.index < cell.start {
                        return Err(LayoutError::Internal(format!(
                            "cell {:?} stepped back from element {} to {}",
                            cell.primary, cell.start, b.index
                        )));
                    }
                    parts.push(CellPart {
                        primary: cell.primary,
                        range: cell.start..b.index + 1,
                        finished: false,
                    });
                    cell.start = b.index + 1;
                    if b.cost <= -INFINITE {
                        forced = Some(b.class);
                    } else {
                        cell_cost = Some(cell_cost.map_or(b.cost, |c| c.max(b.cost)));
                    }
                }
                blocked |= cell.crosses(step);
            }

            let row = boundaries
                .iter()
                .position(|&b| b >= step)
                .unwrap_or(boundaries.len().saturating_sub(1));
            let row_cost = match group.rows.get(row) {
                Some(r) if boundaries[row] == step => r.break_after_cost,
                Some(r) if r.keep_together => INFINITE,
                _ => 0,
            };
            let penalty = match forced {
                Some(class) => (-INFINITE, class),
                None if blocked => (INFINITE, BreakClass::Auto),
                None => (
                    cell_cost.map_or(row_cost, |c| c.max(row_cost)).min(INFINITE),
                    BreakClass::Auto,
                ),
            };
            steps.push(RowStep {
                start: previous,
                end: step,
                parts,
                penalty: Some(penalty),
            });
            previous = step;
        }

        if let Some(last) = steps.last_mut() {
            last.penalty = None;
        }
        log::trace!(
            "Row group of {} rows stepped in {} steps",
            group.rows.len(),
            steps.len()
        );
        Ok(steps)
    }

    /// Steps a row group and turns the steps into elements owned by `owner`.
    /// Step boxes are numbered from `first_index`.
    pub fn combine(
        group: &RowGroup<'_>,
        owner: OwnerHandle,
        first_index: usize,
    ) -> Result<StepperOutput, LayoutError> {
        let steps = Self::steps(group)?;
        let mut elements = Vec::with_capacity(steps.len() * 2);
        for (k, step) in steps.iter().enumerate() {
            elements.push(Element::boxed(
                step.height(),
                Some(Position::new(owner, first_index + k)),
            ));
            match step.penalty {
                Some((cost, class)) if cost <= -INFINITE => {
                    elements.push(Element::forced_break(class));
                }
                Some((cost, _)) => elements.push(Element::penalty(cost)),
                None => {}
            }
        }
        Ok(StepperOutput { elements, steps })
    }
}
