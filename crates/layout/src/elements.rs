//! Break-candidate elements.
//!
//! Content is described to the breaker as a flat list of boxes (rigid
//! material), glue (breakable, adjustable space) and penalties (candidate
//! breaks with a cost). All sizes are block-progression millipoints.

use crate::algorithms::justify::AdjustmentLedger;
use folio_style::BreakClass;
use folio_types::{Mpt, OwnerHandle};
use std::ops::Range;

/// Penalty cost at or beyond which a break is forbidden (and at or below the
/// negation of which it is forced).
pub const INFINITE: i32 = 1000;

/// Stretchability of the glue that fills the last part of a sequence.
pub const FILL_STRETCH: Mpt = 10_000_000;

/// Identifies the layout node that produced an element and an index private
/// to that node (line number, table step, border slot, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub owner: OwnerHandle,
    pub index: usize,
}

impl Position {
    pub fn new(owner: OwnerHandle, index: usize) -> Self {
        Self { owner, index }
    }
}

/// What a glue stands for, which decides how a justified page may adjust it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlueKind {
    #[default]
    Plain,
    SpaceBefore,
    SpaceAfter,
    /// Space between the lines of a paragraph, adjusted by whole lines.
    LineCount,
    /// Per-line height adjustment.
    LineHeight,
}

impl GlueKind {
    pub fn is_block_space(&self) -> bool {
        matches!(self, GlueKind::SpaceBefore | GlueKind::SpaceAfter)
    }

    pub fn is_line_adjustment(&self) -> bool {
        matches!(self, GlueKind::LineCount | GlueKind::LineHeight)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Box {
        size: Mpt,
        position: Option<Position>,
        /// Boxes that exist only to stop glue from being discarded.
        auxiliary: bool,
    },
    Glue {
        natural: Mpt,
        stretch: Mpt,
        shrink: Mpt,
        kind: GlueKind,
        position: Option<Position>,
    },
    Penalty {
        /// Extent added to the part when the break is taken here.
        size: Mpt,
        cost: i32,
        flagged: bool,
        break_class: BreakClass,
        position: Option<Position>,
    },
}

impl Element {
    pub fn boxed(size: Mpt, position: Option<Position>) -> Self {
        Element::Box {
            size,
            position,
            auxiliary: false,
        }
    }

    pub fn auxiliary_box(size: Mpt, position: Option<Position>) -> Self {
        Element::Box {
            size,
            position,
            auxiliary: true,
        }
    }

    pub fn glue(natural: Mpt, stretch: Mpt, shrink: Mpt) -> Self {
        Element::Glue {
            natural,
            stretch,
            shrink,
            kind: GlueKind::Plain,
            position: None,
        }
    }

    pub fn penalty(cost: i32) -> Self {
        Element::Penalty {
            size: 0,
            cost: cost.clamp(-INFINITE, INFINITE),
            flagged: false,
            break_class: BreakClass::Auto,
            position: None,
        }
    }

    pub fn forced_break(break_class: BreakClass) -> Self {
        Element::Penalty {
            size: 0,
            cost: -INFINITE,
            flagged: false,
            break_class,
            position: None,
        }
    }

    pub fn with_position(mut self, new_position: Position) -> Self {
        match &mut self {
            Element::Box { position, .. }
            | Element::Glue { position, .. }
            | Element::Penalty { position, .. } => *position = Some(new_position),
        }
        self
    }

    pub fn with_kind(mut self, new_kind: GlueKind) -> Self {
        if let Element::Glue { kind, .. } = &mut self {
            *kind = new_kind;
        }
        self
    }

    pub fn with_size(mut self, new_size: Mpt) -> Self {
        match &mut self {
            Element::Box { size, .. } | Element::Penalty { size, .. } => *size = new_size,
            Element::Glue { natural, .. } => *natural = new_size,
        }
        self
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Element::Box { position, .. }
            | Element::Glue { position, .. }
            | Element::Penalty { position, .. } => *position,
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Element::Box { .. })
    }

    pub fn is_glue(&self) -> bool {
        matches!(self, Element::Glue { .. })
    }

    pub fn is_penalty(&self) -> bool {
        matches!(self, Element::Penalty { .. })
    }

    /// Width that counts towards a part when the element is inside it.
    /// Penalties only count when the break is taken at them.
    pub fn width(&self) -> Mpt {
        match self {
            Element::Box { size, .. } => *size,
            Element::Glue { natural, .. } => *natural,
            Element::Penalty { .. } => 0,
        }
    }

    pub fn stretch(&self) -> Mpt {
        match self {
            Element::Glue { stretch, .. } => *stretch,
            _ => 0,
        }
    }

    pub fn shrink(&self) -> Mpt {
        match self {
            Element::Glue { shrink, .. } => *shrink,
            _ => 0,
        }
    }

    /// Extent a penalty adds to the part ending at it; zero for anything else.
    pub fn break_size(&self) -> Mpt {
        match self {
            Element::Penalty { size, .. } => *size,
            _ => 0,
        }
    }

    pub fn penalty_cost(&self) -> Option<i32> {
        match self {
            Element::Penalty { cost, .. } => Some(*cost),
            _ => None,
        }
    }

    pub fn is_forced_break(&self) -> bool {
        matches!(self, Element::Penalty { cost, .. } if *cost <= -INFINITE)
    }

    pub fn is_forbidden_break(&self) -> bool {
        matches!(self, Element::Penalty { cost, .. } if *cost >= INFINITE)
    }

    /// Glue and penalties vanish at the edges of a part.
    pub fn is_discardable(&self) -> bool {
        !self.is_box()
    }
}

/// Whether a break may be taken at `index`: a penalty with a finite cost, or
/// a glue immediately preceded by a box.
pub fn is_legal_break(elements: &[Element], index: usize) -> bool {
    match elements.get(index) {
        Some(Element::Penalty { cost, .. }) => *cost < INFINITE,
        Some(Element::Glue { .. }) => index > 0 && elements[index - 1].is_box(),
        _ => false,
    }
}

/// Sum of the natural widths of `range`.
pub fn natural_extent(elements: &[Element], range: Range<usize>) -> Mpt {
    elements[range].iter().map(Element::width).sum()
}

/// Replaces every legal break inside `elements` with a forbidden one.
/// Forced breaks are left alone.
pub fn forbid_breaks(elements: Vec<Element>) -> Vec<Element> {
    raise_break_costs(elements, INFINITE)
}

/// Raises the cost of every legal break inside `elements` to at least `cost`.
/// Glue breaks get a penalty of that cost in front of them.
pub fn raise_break_costs(elements: Vec<Element>, cost: i32) -> Vec<Element> {
    if cost <= 0 {
        return elements;
    }
    let mut out = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        match element {
            Element::Penalty { cost: c, .. } if *c > -INFINITE => {
                let raised = (*c).max(cost).min(INFINITE);
                out.push(element.clone().with_cost(raised));
            }
            Element::Glue { .. } if is_legal_break(&elements, i) => {
                out.push(Element::penalty(cost));
                out.push(element.clone());
            }
            _ => out.push(element.clone()),
        }
    }
    out
}

impl Element {
    fn with_cost(mut self, new_cost: i32) -> Self {
        if let Element::Penalty { cost, .. } = &mut self {
            *cost = new_cost;
        }
        self
    }
}

/// A run of elements between forced breaks, handed to the breaker once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockSequence {
    elements: Vec<Element>,
    /// Where the first part of the sequence has to start.
    pub start_on: BreakClass,
    /// Leading elements that can never open a part.
    pub ignore_at_start: usize,
    /// Trailing elements appended by [`BlockSequence::end_sequence`].
    pub ignore_at_end: usize,
}

impl BlockSequence {
    pub fn new(start_on: BreakClass) -> Self {
        Self {
            start_on,
            ..Default::default()
        }
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            ..Default::default()
        }
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.elements.extend(elements);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_ended(&self) -> bool {
        self.ignore_at_end > 0
            && self
                .elements
                .last()
                .is_some_and(Element::is_forced_break)
    }

    /// Closes the sequence: drops trailing glue and penalties, then appends an
    /// infinite penalty, a fill glue and a forced break of `break_class`, so
    /// the last part is never stretched. Returns `None` when the sequence
    /// holds nothing but discardable elements.
    pub fn end_sequence(mut self, break_class: BreakClass) -> Option<BlockSequence> {
        while self.elements.last().is_some_and(Element::is_discardable) {
            self.elements.pop();
        }
        if self.elements.is_empty() {
            return None;
        }
        self.ignore_at_start = self
            .elements
            .iter()
            .take_while(|e| e.is_discardable() && !e.is_forced_break())
            .count();
        self.elements.push(Element::penalty(INFINITE));
        self.elements.push(Element::glue(0, FILL_STRETCH, 0));
        self.elements.push(Element::forced_break(break_class));
        self.ignore_at_end = 3;
        Some(self)
    }

    /// Index of the first element at or after `from` that a part can start
    /// with: a box or a forced break.
    pub fn first_content_index(&self, from: usize) -> usize {
        self.elements[from.min(self.elements.len())..]
            .iter()
            .position(|e| e.is_box() || e.is_forced_break())
            .map(|offset| from + offset)
            .unwrap_or(self.elements.len())
    }

    pub fn natural_extent(&self, range: Range<usize>) -> Mpt {
        natural_extent(&self.elements, range)
    }

    /// The list as it stands after justification: glue the ledger adjusted
    /// takes its realized size and loses its remaining elasticity.
    pub fn effective(&self, ledger: &AdjustmentLedger) -> BlockSequence {
        let elements = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, element)| match (element, ledger.get(i)) {
                (
                    Element::Glue {
                        natural,
                        kind,
                        position,
                        ..
                    },
                    Some(adjustment),
                ) => Element::Glue {
                    natural: natural + adjustment,
                    stretch: 0,
                    shrink: 0,
                    kind: *kind,
                    position: *position,
                },
                _ => element.clone(),
            })
            .collect();
        BlockSequence {
            elements,
            ..self.clone()
        }
    }
}
