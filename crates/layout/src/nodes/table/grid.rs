//! The slot grid of one table section, with row and column spans resolved.

use folio_idf::TableRow;
use std::ops::Range;

/// Identifies the cell that owns a run of grid slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimaryId(pub usize);

/// One slot of the grid. Slots covered by a span point back at their
/// primary cell; slots nobody claims stay empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridUnit {
    pub primary: Option<PrimaryId>,
    pub row_span_index: usize,
    pub col_span_index: usize,
}

impl GridUnit {
    pub fn is_empty(&self) -> bool {
        self.primary.is_none()
    }
}

/// A cell that starts in the grid, with its clipped spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryGridUnit {
    pub id: PrimaryId,
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub col_span: usize,
    /// Row and cell index of the source cell.
    pub source: (usize, usize),
}

#[derive(Debug, Clone, Default)]
pub struct TableGrid {
    rows: Vec<Vec<GridUnit>>,
    primaries: Vec<PrimaryGridUnit>,
}

impl TableGrid {
    /// Places the cells of `rows` left to right, skipping slots taken by
    /// row spans from above. Primary ids are numbered from `first_id`.
    pub fn build(rows: &[TableRow], columns: usize, first_id: usize) -> Self {
        let mut grid = vec![vec![GridUnit::default(); columns]; rows.len()];
        let mut primaries = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            let mut column = 0;
            for (c, cell) in row.cells.iter().enumerate() {
                while column < columns && !grid[r][column].is_empty() {
                    column += 1;
                }
                if column >= columns {
                    log::warn!(
                        "Row {} has more cells than the {} columns of its table; {} dropped",
                        r,
                        columns,
                        row.cells.len() - c
                    );
                    break;
                }
                let free = grid[r][column..]
                    .iter()
                    .take_while(|unit| unit.is_empty())
                    .count();
                let wanted_cols = cell.col_span.max(1) as usize;
                let wanted_rows = cell.row_span.max(1) as usize;
                let col_span = wanted_cols.min(free);
                let row_span = wanted_rows.min(rows.len() - r);
                if col_span < wanted_cols || row_span < wanted_rows {
                    log::warn!(
                        "Cell at row {}, column {} spans {}x{} but only {}x{} fits",
                        r,
                        column,
                        wanted_rows,
                        wanted_cols,
                        row_span,
                        col_span
                    );
                }

                let id = PrimaryId(first_id + primaries.len());
                for (dr, grid_row) in grid[r..r + row_span].iter_mut().enumerate() {
                    for (dc, unit) in grid_row[column..column + col_span].iter_mut().enumerate() {
                        *unit = GridUnit {
                            primary: Some(id),
                            row_span_index: dr,
                            col_span_index: dc,
                        };
                    }
                }
                primaries.push(PrimaryGridUnit {
                    id,
                    row: r,
                    column,
                    row_span,
                    col_span,
                    source: (r, c),
                });
                column += col_span;
            }
        }

        Self {
            rows: grid,
            primaries,
        }
    }

    pub fn rows(&self) -> &[Vec<GridUnit>] {
        &self.rows
    }

    pub fn primaries(&self) -> &[PrimaryGridUnit] {
        &self.primaries
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Splits the rows into the smallest runs no row span crosses.
    pub fn row_groups(&self) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut start = 0;
        let mut reach = 0;
        for r in 0..self.rows.len() {
            reach = self
                .primaries
                .iter()
                .filter(|p| p.row == r)
                .map(|p| r + p.row_span)
                .fold(reach.max(r + 1), usize::max);
            if reach == r + 1 {
                groups.push(start..r + 1);
                start = r + 1;
            }
        }
        groups
    }
}
