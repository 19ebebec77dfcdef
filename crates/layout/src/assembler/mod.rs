//! The part/page assembler.
//!
//! [`PageBreaker`] drives one page sequence: it splits the flow's element
//! list at forced breaks, asks the breaking algorithm for parts of every
//! block sequence, and commits each part to a column, opening and finishing
//! pages as it goes.

pub mod areas;
pub mod provider;

pub use provider::{PageProvider, SequenceExtents, Slot};

use crate::LayoutError;
use crate::algorithms::breaking::{BreakPosition, BreakingAlgorithm, PartDiagnostic};
use crate::algorithms::justify::justify_part;
use crate::area::{Area, AreaKind, InlineArea, MarkerTable, RegionKind};
use crate::area_tree::AreaTreeModel;
use crate::config::LayoutConfig;
use crate::elements::{BlockSequence, Element};
use crate::nodes::NodeTree;
use crate::text::TextMetrics;
use areas::{AreaContext, AreaEvent, Run, build_run, last_occurrences};
use folio_idf::{PageSequence, StaticNode};
use folio_style::{BreakClass, DisplayAlign, Length};
use folio_types::{Mpt, OwnerHandle, PageIndex, Rect};
use std::collections::{HashMap, HashSet};

const STATIC_FONT_SIZE: f32 = 10.0;
const STATIC_LINE_HEIGHT: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    NoPage,
    Filling { page: PageIndex, column: usize },
    Finished,
}

/// Splits `elements` at forced breaks. Each sequence comes with the index of
/// its first element in `elements`; empty sequences are dropped.
pub fn split_sequences(elements: Vec<Element>) -> Vec<(usize, BlockSequence)> {
    let mut sequences = Vec::new();
    let mut current = BlockSequence::new(BreakClass::Auto);
    let mut offset = 0;
    for (i, element) in elements.into_iter().enumerate() {
        if let Element::Penalty { break_class, .. } = &element
            && element.is_forced_break()
        {
            let class = *break_class;
            let done = std::mem::replace(&mut current, BlockSequence::new(class));
            if let Some(sequence) = done.end_sequence(class) {
                sequences.push((offset, sequence));
            }
            offset = i + 1;
        } else {
            current.push(element);
        }
    }
    if let Some(sequence) = current.end_sequence(BreakClass::Auto) {
        sequences.push((offset, sequence));
    }
    sequences
}

pub struct PageBreaker<'a> {
    sequence: &'a PageSequence,
    provider: &'a PageProvider,
    tree: &'a NodeTree,
    root: OwnerHandle,
    config: LayoutConfig,
    metrics: &'a dyn TextMetrics,
    model: &'a mut AreaTreeModel,
    state: BreakerState,
    next_number: u32,
    pages_in_sequence: usize,
    seen: HashSet<OwnerHandle>,
    carryover: HashMap<String, String>,
}

impl<'a> PageBreaker<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: &'a PageSequence,
        provider: &'a PageProvider,
        tree: &'a NodeTree,
        root: OwnerHandle,
        config: LayoutConfig,
        metrics: &'a dyn TextMetrics,
        model: &'a mut AreaTreeModel,
        first_number: u32,
    ) -> Self {
        Self {
            sequence,
            provider,
            tree,
            root,
            config,
            metrics,
            model,
            state: BreakerState::NoPage,
            next_number: first_number,
            pages_in_sequence: 0,
            seen: HashSet::new(),
            carryover: HashMap::new(),
        }
    }

    /// Lays out the whole flow. Returns the number the page after the
    /// sequence would get.
    pub fn run(mut self) -> Result<u32, LayoutError> {
        if self.state == BreakerState::Finished {
            return Err(LayoutError::StateMismatch("NoPage", "Finished"));
        }
        let elements = self.tree.collect(self.root)?;
        let last_occurrence = last_occurrences(self.tree, &elements, Some(self.root));
        let sequences = split_sequences(elements);
        log::debug!("Flow split into {} block sequence(s)", sequences.len());

        for (offset, sequence) in &sequences {
            self.honor_start(sequence.start_on)?;
            self.layout_block_sequence(*offset, sequence, &last_occurrence)?;
        }
        if self.pages_in_sequence == 0 {
            self.open_page(false)?;
        }
        self.finalize_page()?;
        self.state = BreakerState::Finished;
        log::info!(
            "Page sequence laid out on {} page(s)",
            self.pages_in_sequence
        );
        Ok(self.next_number)
    }

    fn honor_start(&mut self, class: BreakClass) -> Result<(), LayoutError> {
        match class {
            BreakClass::Column => {
                if matches!(self.state, BreakerState::Filling { .. }) {
                    self.advance_column()?;
                }
            }
            BreakClass::Auto | BreakClass::Page => self.finalize_page()?,
            BreakClass::EvenPage | BreakClass::OddPage => {
                self.finalize_page()?;
                if !class.accepts_page_number(self.next_number) {
                    log::debug!(
                        "Inserting a blank page before {:?} start at folio {}",
                        class,
                        self.next_number
                    );
                    self.open_page(true)?;
                    self.finalize_page()?;
                }
            }
        }
        Ok(())
    }

    /// The slot the next part would land in.
    fn current_slot(&self) -> Result<Slot, LayoutError> {
        match self.state {
            BreakerState::Filling { page, column } => {
                let page = self.model.page(page)?;
                Ok(Slot {
                    number: page.number,
                    first_in_sequence: self.pages_in_sequence == 1,
                    column,
                })
            }
            BreakerState::NoPage => Ok(Slot {
                number: self.next_number,
                first_in_sequence: self.pages_in_sequence == 0,
                column: 0,
            }),
            BreakerState::Finished => Err(LayoutError::StateMismatch("Filling", "Finished")),
        }
    }

    fn layout_block_sequence(
        &mut self,
        offset: usize,
        sequence: &BlockSequence,
        last_occurrence: &HashMap<OwnerHandle, usize>,
    ) -> Result<(), LayoutError> {
        let start = self.current_slot()?;
        let extents = SequenceExtents::new(self.provider, start);
        let result = BreakingAlgorithm::new(self.config).find_breakpoints(
            sequence,
            &extents,
            self.config.breaking_mode,
        )?;
        if !result.feasible {
            log::debug!(
                "Block sequence at element {} needed the emergency pass",
                offset
            );
        }
        for (k, position) in result.positions.iter().enumerate() {
            if k > 0 {
                self.advance_column()?;
            }
            if self.state == BreakerState::NoPage {
                self.open_page(false)?;
            }
            match position.diagnostic {
                Some(PartDiagnostic::Overfull { excess }) => {
                    log::warn!("Part {} overfull by {}mpt", k, excess)
                }
                Some(PartDiagnostic::Underfull { shortfall }) => {
                    log::warn!("Part {} underfull by {}mpt", k, shortfall)
                }
                None => {}
            }
            self.commit_part(offset, sequence, position, last_occurrence)?;
        }
        Ok(())
    }

    fn commit_part(
        &mut self,
        offset: usize,
        sequence: &BlockSequence,
        position: &BreakPosition,
        last_occurrence: &HashMap<OwnerHandle, usize>,
    ) -> Result<(), LayoutError> {
        let BreakerState::Filling { page, column } = self.state else {
            return Err(LayoutError::StateMismatch("Filling", "NoPage"));
        };
        let master = self.provider.by_name(&self.model.page(page)?.master);
        let justification = (master.display_align == DisplayAlign::Justify)
            .then(|| justify_part(sequence.elements(), position, self.tree));
        // Unjustified parts may shrink but never stretch.
        let ratio = justification
            .as_ref()
            .map_or(position.ratio.min(0.0), |j| j.remaining_ratio);

        let page_ref = self.model.page_mut(page)?;
        let width = page_ref
            .column_mut(column)
            .map(|c| c.rect.width)
            .ok_or_else(|| LayoutError::Internal(format!("page {page} has no column {column}")))?;
        let run = Run {
            elements: sequence.elements(),
            range: position.range(),
            root: Some(self.root),
            x: 0,
            y: 0,
            width,
            ratio,
            ledger: justification.as_ref().map(|j| &j.ledger),
            last_occurrence,
            offset,
        };
        let mut ctx = AreaContext::new(self.tree, page_ref, &mut self.seen);
        let built = build_run(&mut ctx, &run)?;
        let events = ctx.into_events();
        if let Some(target) = self.model.page_mut(page)?.column_mut(column) {
            target.children.extend(built.areas);
        }
        log::trace!(
            "Committed elements {:?} to page {} column {} ({}mpt)",
            position.range(),
            page,
            column,
            built.height
        );
        self.dispatch(page, events)
    }

    /// Hands the ids and markers of the nodes placed on `page` on.
    fn dispatch(&mut self, page: PageIndex, events: Vec<AreaEvent>) -> Result<(), LayoutError> {
        for event in events {
            match event {
                AreaEvent::Located { owner, first } => {
                    let meta = self.tree.node(owner)?.meta();
                    if let Some(id) = &meta.id {
                        if first {
                            self.model.signal_pending(id);
                        }
                        self.model.associate(id, page);
                    }
                    self.model
                        .page_mut(page)?
                        .markers
                        .add(owner, &meta.markers, first);
                }
                AreaEvent::Finished { owner } => {
                    if let Some(id) = &self.tree.node(owner)?.meta().id {
                        self.model.signal_processed(id);
                    }
                    self.model.page_mut(page)?.markers.finish(owner);
                }
            }
        }
        Ok(())
    }

    fn open_page(&mut self, blank: bool) -> Result<PageIndex, LayoutError> {
        let number = self.next_number;
        let master = self
            .provider
            .master_for(number, self.pages_in_sequence == 0, blank);
        let index = self.model.create_page(number, master, blank);
        self.model.page_mut(index)?.markers =
            MarkerTable::with_carryover(std::mem::take(&mut self.carryover));
        self.next_number += 1;
        self.pages_in_sequence += 1;
        self.state = BreakerState::Filling {
            page: index,
            column: 0,
        };
        Ok(index)
    }

    fn advance_column(&mut self) -> Result<(), LayoutError> {
        let BreakerState::Filling { page, column } = self.state else {
            return Ok(());
        };
        if column + 1 < self.model.page(page)?.column_count() {
            self.state = BreakerState::Filling {
                page,
                column: column + 1,
            };
            Ok(())
        } else {
            self.finalize_page()
        }
    }

    /// Completes the current page: static regions, marker carryover, and
    /// release of whatever the area tree can hand on.
    fn finalize_page(&mut self) -> Result<(), LayoutError> {
        let BreakerState::Filling { page, .. } = self.state else {
            return Ok(());
        };
        self.state = BreakerState::NoPage;
        let master = self.provider.by_name(&self.model.page(page)?.master);
        let regions = [
            (RegionKind::Before, master.before_rect(), &self.sequence.before),
            (RegionKind::After, master.after_rect(), &self.sequence.after),
        ];
        let page_ref = self.model.page_mut(page)?;
        for (kind, rect, content) in regions {
            if let Some(rect) = rect
                && !content.is_empty()
            {
                let region = static_region(kind, rect, content, page_ref, self.metrics);
                page_ref.set_region(region);
            }
        }
        self.carryover = page_ref.markers.carry_forward();
        self.model.finish_page(page)?;
        let released = self.model.release_ready();
        if !released.is_empty() {
            log::debug!("Released {} page(s) for rendering", released.len());
        }
        Ok(())
    }
}

/// Lays out static content: one line per node, markers retrieved from the
/// page and `{page}` replaced by the folio.
fn static_region(
    kind: RegionKind,
    rect: Rect,
    content: &[StaticNode],
    page: &crate::area::Page,
    metrics: &dyn TextMetrics,
) -> Area {
    let font_size = Length::pt(STATIC_FONT_SIZE).mpt();
    let line_height = Length::pt(STATIC_LINE_HEIGHT).mpt();
    let mut region = Area::new(AreaKind::Region(kind), rect);
    let mut y: Mpt = 0;
    for node in content {
        let text = match node {
            StaticNode::Text { text } => text.replace("{page}", &page.number.to_string()),
            StaticNode::RetrieveMarker { class, position } => page
                .markers
                .retrieve(class, *position)
                .unwrap_or_default()
                .to_string(),
        };
        let width = metrics.text_width(&text, font_size);
        let inline = InlineArea::Text {
            x: 0,
            width,
            text,
            font_size,
            link: None,
        };
        region.children.push(Area::new(
            AreaKind::Line {
                inlines: vec![inline],
            },
            Rect::new(0, y, rect.width, line_height),
        ));
        y += line_height;
    }
    region
}
