//! Vertical justification of a committed part.
//!
//! The difference a part still has after breaking is pushed into block
//! spaces first and into line adjustments second. Each glue is capped by its
//! own stretch or shrink and by what its owner agrees to; whatever is left
//! becomes the part's adjustment ratio for the remaining glue.

use crate::algorithms::breaking::{BreakPosition, adjustment_ratio};
use crate::elements::{Element, GlueKind};
use folio_types::Mpt;
use std::collections::BTreeMap;

/// Per-element adjustments decided by justification, keyed by element index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentLedger {
    adjustments: BTreeMap<usize, Mpt>,
}

impl AdjustmentLedger {
    pub fn record(&mut self, index: usize, amount: Mpt) {
        *self.adjustments.entry(index).or_insert(0) += amount;
    }

    pub fn get(&self, index: usize) -> Option<Mpt> {
        self.adjustments.get(&index).copied()
    }

    pub fn total(&self) -> Mpt {
        self.adjustments.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Mpt)> + '_ {
        self.adjustments.iter().map(|(i, a)| (*i, *a))
    }
}

/// Asks the component behind an element how much of a requested adjustment
/// it can honor.
pub trait AdjustmentNegotiator {
    fn negotiate(&self, element: &Element, amount: Mpt) -> Mpt;
}

impl<F> AdjustmentNegotiator for F
where
    F: Fn(&Element, Mpt) -> Mpt,
{
    fn negotiate(&self, element: &Element, amount: Mpt) -> Mpt {
        self(element, amount)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Justification {
    pub ledger: AdjustmentLedger,
    /// Ratio to apply to the glue the ledger did not touch, clamped to `[-1, 1]`.
    pub remaining_ratio: f64,
    /// Difference still unabsorbed after every adjustment.
    pub remainder: Mpt,
}

pub fn justify_part(
    elements: &[Element],
    part: &BreakPosition,
    negotiator: &dyn AdjustmentNegotiator,
) -> Justification {
    let mut ledger = AdjustmentLedger::default();
    let mut remaining = part.difference;
    // The break element itself is discarded when it is a glue.
    let body = part.content_start..part.index;

    let phases: [fn(&GlueKind) -> bool; 2] =
        [GlueKind::is_block_space, GlueKind::is_line_adjustment];
    for phase in phases {
        if remaining == 0 {
            break;
        }
        let targets: Vec<(usize, Mpt)> = body
            .clone()
            .filter_map(|i| match &elements[i] {
                Element::Glue {
                    kind,
                    stretch,
                    shrink,
                    ..
                } if phase(kind) => {
                    let capacity = if remaining > 0 { *stretch } else { *shrink };
                    (capacity > 0).then_some((i, capacity))
                }
                _ => None,
            })
            .collect();
        let total: i64 = targets.iter().map(|(_, c)| *c as i64).sum();
        if total == 0 {
            continue;
        }
        let budget = remaining;
        for (i, capacity) in targets {
            let share = (budget as i64 * capacity as i64 / total) as Mpt;
            let request = share.clamp(-capacity, capacity);
            let granted = negotiator
                .negotiate(&elements[i], request)
                .clamp(-capacity, capacity);
            // A refusal is recorded too, so the glue keeps its natural size
            // instead of soaking up the remaining ratio.
            ledger.record(i, granted);
            remaining -= granted;
        }
    }

    let (stretch, shrink) = body
        .filter(|i| ledger.get(*i).is_none())
        .fold((0i64, 0i64), |(st, sh), i| {
            (st + elements[i].stretch() as i64, sh + elements[i].shrink() as i64)
        });
    let remaining_ratio = adjustment_ratio(remaining as i64, stretch, shrink).clamp(-1.0, 1.0);
    log::trace!(
        "Justified part {}..{}: {} adjusted, {} left over",
        part.content_start,
        part.index,
        ledger.total(),
        remaining
    );
    Justification {
        ledger,
        remaining_ratio,
        remainder: remaining,
    }
}
