//! Page masters for the pages of one sequence, and the extents the breaker
//! sees for the parts it has not placed yet.

use crate::LayoutError;
use crate::algorithms::breaking::PartExtents;
use folio_style::{PageMaster, SequenceMasters};
use folio_types::Mpt;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PageProvider {
    selection: SequenceMasters,
    masters: HashMap<String, PageMaster>,
    rest: PageMaster,
}

impl PageProvider {
    /// Resolves every master the sequence can select up front.
    pub fn new<'m>(
        selection: &SequenceMasters,
        lookup: impl Fn(&str) -> Option<&'m PageMaster>,
    ) -> Result<Self, LayoutError> {
        let mut masters = HashMap::new();
        for name in selection.names() {
            let master = lookup(name).ok_or_else(|| LayoutError::UnknownMaster(name.to_string()))?;
            masters.insert(name.to_string(), master.clone());
        }
        let rest = masters
            .get(&selection.rest)
            .cloned()
            .ok_or_else(|| LayoutError::UnknownMaster(selection.rest.clone()))?;
        Ok(Self {
            selection: selection.clone(),
            masters,
            rest,
        })
    }

    pub fn master_for(&self, number: u32, first_in_sequence: bool, blank: bool) -> &PageMaster {
        let name = self.selection.select(number, first_in_sequence, blank);
        self.masters.get(name).unwrap_or(&self.rest)
    }

    pub fn by_name(&self, name: &str) -> &PageMaster {
        self.masters.get(name).unwrap_or(&self.rest)
    }

    /// Width the flow is laid out at: the column width of the sequence's
    /// first page.
    pub fn text_width(&self) -> Mpt {
        let first = self.master_for(1, true, false);
        let width = first.column_width();
        if self.masters.values().any(|m| m.column_width() != width) {
            log::warn!(
                "Page masters of one sequence differ in column width; laying out at {} from '{}'",
                width,
                first.name
            );
        }
        width
    }
}

/// A column the breaker may fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub number: u32,
    pub first_in_sequence: bool,
    pub column: usize,
}

/// Extents of the parts of one block sequence, starting at a known slot.
/// Slots are computed lazily and cached, since the breaker asks for the same
/// part many times.
pub struct SequenceExtents<'p> {
    provider: &'p PageProvider,
    slots: RefCell<Vec<(Slot, Mpt)>>,
}

impl<'p> SequenceExtents<'p> {
    pub fn new(provider: &'p PageProvider, start: Slot) -> Self {
        let extent = provider
            .master_for(start.number, start.first_in_sequence, false)
            .body_rect()
            .height;
        Self {
            provider,
            slots: RefCell::new(vec![(start, extent)]),
        }
    }

    pub fn slot(&self, part: usize) -> Slot {
        self.entry(part).0
    }

    fn entry(&self, part: usize) -> (Slot, Mpt) {
        let mut slots = self.slots.borrow_mut();
        while slots.len() <= part {
            let Some(&(last, _)) = slots.last() else {
                break;
            };
            let master = self
                .provider
                .master_for(last.number, last.first_in_sequence, false);
            let next = if last.column + 1 < master.column_count() {
                Slot {
                    column: last.column + 1,
                    ..last
                }
            } else {
                Slot {
                    number: last.number + 1,
                    first_in_sequence: false,
                    column: 0,
                }
            };
            let extent = self
                .provider
                .master_for(next.number, next.first_in_sequence, false)
                .body_rect()
                .height;
            slots.push((next, extent));
        }
        slots.get(part).copied().unwrap_or((
            Slot {
                number: 0,
                first_in_sequence: false,
                column: 0,
            },
            0,
        ))
    }
}

impl PartExtents for SequenceExtents<'_> {
    fn extent_for_part(&self, part: usize) -> Mpt {
        self.entry(part).1
    }
}
