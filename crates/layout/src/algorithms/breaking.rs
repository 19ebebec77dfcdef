//! Total-fit breaking over box/glue/penalty sequences.
//!
//! The same algorithm breaks paragraphs into lines and flows into pages or
//! columns. It keeps a set of active candidate breaks; at every legal break
//! each active node is measured against the extent of the part it would
//! close, and feasible candidates become new nodes carrying their total
//! demerits. The cheapest chain reaching the end of the sequence wins.
//!
//! The emergency pass ranks chains by part count first, so a strict solution
//! only survives when it needs no more parts than the sequence can be packed
//! into. That keeps the part count from growing when the extent grows.

use crate::LayoutError;
use crate::config::{BreakingMode, LayoutConfig};
use crate::elements::{BlockSequence, Element, INFINITE, is_legal_break};
use folio_types::Mpt;
use std::collections::BTreeMap;
use std::ops::Range;

/// Ratio reported for a part that needs stretch or shrink but has none.
pub const INFINITE_RATIO: f64 = 1000.0;

const MAX_BADNESS: f64 = 10_000.0;

/// Available extent for each part (line, column or page) of a sequence.
pub trait PartExtents {
    fn extent_for_part(&self, part: usize) -> Mpt;
}

impl PartExtents for Mpt {
    fn extent_for_part(&self, _part: usize) -> Mpt {
        *self
    }
}

/// One extent per part; the last one repeats.
impl PartExtents for [Mpt] {
    fn extent_for_part(&self, part: usize) -> Mpt {
        self.get(part).or(self.last()).copied().unwrap_or(0)
    }
}

impl PartExtents for Vec<Mpt> {
    fn extent_for_part(&self, part: usize) -> Mpt {
        self.as_slice().extent_for_part(part)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FitnessClass {
    VeryTight = 0,
    Decent = 1,
    Loose = 2,
    VeryLoose = 3,
}

impl FitnessClass {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < -0.5 {
            FitnessClass::VeryTight
        } else if ratio <= 0.5 {
            FitnessClass::Decent
        } else if ratio <= 1.0 {
            FitnessClass::Loose
        } else {
            FitnessClass::VeryLoose
        }
    }

    fn distance(self, other: FitnessClass) -> u8 {
        (self as u8).abs_diff(other as u8)
    }
}

/// Knuth's badness: `100 |r|^3`, capped at 10000.
pub fn badness(ratio: f64) -> f64 {
    uncapped_badness(ratio).min(MAX_BADNESS)
}

/// Badness without the cap, so a nearly empty part costs more than a
/// slightly loose one.
fn uncapped_badness(ratio: f64) -> f64 {
    100.0 * ratio.abs().powi(3)
}

/// Adjustment ratio of a part that is `difference` short (positive) or too
/// long (negative) given its total stretch and shrink.
pub fn adjustment_ratio(difference: i64, stretch: i64, shrink: i64) -> f64 {
    if difference > 0 {
        if stretch > 0 {
            difference as f64 / stretch as f64
        } else {
            INFINITE_RATIO
        }
    } else if difference < 0 {
        if shrink > 0 {
            difference as f64 / shrink as f64
        } else {
            -INFINITE_RATIO
        }
    } else {
        0.0
    }
}

/// Footnote and float bookkeeping carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FootnoteSpan {
    pub first_list: usize,
    pub first_element: usize,
    pub last_list: usize,
    pub last_element: usize,
}

/// Reported when a part's glue could not absorb its difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartDiagnostic {
    /// All stretch used and the part is still `shortfall` short.
    Underfull { shortfall: Mpt },
    /// All shrink used and the content is still `excess` too long.
    Overfull { excess: Mpt },
}

/// One committed part.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakPosition {
    /// The break element: the last element handed to this part.
    pub index: usize,
    /// First element of the part after discarding at the previous break.
    pub content_start: usize,
    /// Adjustment ratio clamped to `[-1, 1]`.
    pub ratio: f64,
    pub raw_ratio: f64,
    /// Available extent minus natural extent.
    pub difference: Mpt,
    pub stretch: Mpt,
    pub shrink: Mpt,
    pub footnotes: FootnoteSpan,
    pub diagnostic: Option<PartDiagnostic>,
}

impl BreakPosition {
    /// The elements belonging to the part, break element included.
    pub fn range(&self) -> Range<usize> {
        self.content_start..self.index + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakResult {
    pub positions: Vec<BreakPosition>,
    /// Whether the parts come from the strict pass.
    pub feasible: bool,
}

impl BreakResult {
    pub fn part_count(&self) -> usize {
        self.positions.len()
    }

    pub fn break_indices(&self) -> Vec<usize> {
        self.positions.iter().map(|p| p.index).collect()
    }
}

/// Prefix sums over the widths, stretch and shrink of boxes and glue.
struct Totals {
    width: Vec<i64>,
    stretch: Vec<i64>,
    shrink: Vec<i64>,
}

impl Totals {
    fn new(elements: &[Element]) -> Self {
        let mut totals = Totals {
            width: Vec::with_capacity(elements.len() + 1),
            stretch: Vec::with_capacity(elements.len() + 1),
            shrink: Vec::with_capacity(elements.len() + 1),
        };
        let (mut w, mut st, mut sh) = (0i64, 0i64, 0i64);
        for element in elements {
            totals.width.push(w);
            totals.stretch.push(st);
            totals.shrink.push(sh);
            w += element.width() as i64;
            st += element.stretch() as i64;
            sh += element.shrink() as i64;
        }
        totals.width.push(w);
        totals.stretch.push(st);
        totals.shrink.push(sh);
        totals
    }
}

#[derive(Debug, Clone)]
struct KnuthNode {
    position: Option<usize>,
    content_start: usize,
    line: usize,
    fitness: FitnessClass,
    total_demerits: f64,
    ratio: f64,
    difference: i64,
    stretch: i64,
    shrink: i64,
    flagged: bool,
    previous: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    previous: usize,
    line: usize,
    fitness: FitnessClass,
    demerits: f64,
    ratio: f64,
    difference: i64,
    stretch: i64,
    shrink: i64,
}

impl Candidate {
    fn beats(&self, other: &Candidate, fewest_parts: bool) -> bool {
        rank(self.line, self.demerits, other.line, other.demerits, fewest_parts).is_lt()
    }
}

/// Orders chains by demerits, or by part count then demerits.
fn rank(
    line: usize,
    demerits: f64,
    other_line: usize,
    other_demerits: f64,
    fewest_parts: bool,
) -> std::cmp::Ordering {
    let by_demerits = demerits.total_cmp(&other_demerits);
    if fewest_parts {
        line.cmp(&other_line).then(by_demerits)
    } else {
        by_demerits
    }
}

/// A candidate outside the tolerance, kept for recovery.
#[derive(Debug, Clone, Copy)]
struct Fallback {
    index: usize,
    flagged: bool,
    candidate: Candidate,
}

impl Fallback {
    fn replace_if_better(slot: &mut Option<Fallback>, new: Fallback, fewest_parts: bool) {
        if slot
            .as_ref()
            .is_none_or(|old| new.candidate.beats(&old.candidate, fewest_parts))
        {
            *slot = Some(new);
        }
    }
}

struct Pass<'a> {
    sequence: &'a BlockSequence,
    extents: &'a dyn PartExtents,
    totals: &'a Totals,
    mode: BreakingMode,
    threshold: f64,
    force: bool,
    nodes: Vec<KnuthNode>,
    active: Vec<usize>,
    too_short: Option<Fallback>,
    too_long: Option<Fallback>,
}

#[derive(Debug, Clone, Copy)]
pub struct BreakingAlgorithm {
    config: LayoutConfig,
}

impl BreakingAlgorithm {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Breaks `sequence` into parts. A strict pass at the configured tolerance
    /// runs first. An emergency pass with overflow recovery then finds the
    /// fewest parts the sequence fits in, flagging parts it had to over- or
    /// under-fill. The strict parts are kept unless they need more parts.
    pub fn find_breakpoints(
        &self,
        sequence: &BlockSequence,
        extents: &dyn PartExtents,
        mode: BreakingMode,
    ) -> Result<BreakResult, LayoutError> {
        if sequence.is_empty() {
            return Ok(BreakResult {
                positions: Vec::new(),
                feasible: true,
            });
        }
        if !sequence.is_ended() {
            return Err(LayoutError::Internal(
                "breaking requires a sequence closed by end_sequence".into(),
            ));
        }

        let totals = Totals::new(sequence.elements());
        let strict =
            self.run_pass(sequence, extents, &totals, mode, self.config.tolerance, false)?;
        if let Some(positions) = &strict
            && positions.len() <= 1
        {
            log::trace!("Strict pass fits everything in one part");
            return Ok(BreakResult {
                positions: positions.clone(),
                feasible: true,
            });
        }

        let fewest = self
            .run_pass(
                sequence,
                extents,
                &totals,
                mode,
                self.config.emergency_tolerance,
                true,
            )?
            .ok_or_else(|| {
                LayoutError::Internal("emergency breaking pass produced no solution".into())
            })?;
        match strict {
            Some(positions) if positions.len() <= fewest.len() => {
                log::trace!("Strict pass found {} part(s)", positions.len());
                Ok(BreakResult {
                    positions,
                    feasible: true,
                })
            }
            Some(positions) => {
                log::debug!(
                    "Strict pass needs {} parts where {} suffice; using emergency breaks",
                    positions.len(),
                    fewest.len()
                );
                Ok(BreakResult {
                    positions: fewest,
                    feasible: false,
                })
            }
            None => {
                log::debug!(
                    "No feasible breaks within tolerance {}; using emergency breaks",
                    self.config.tolerance
                );
                Ok(BreakResult {
                    positions: fewest,
                    feasible: false,
                })
            }
        }
    }

    /// A single pass with an explicit threshold. Returns `None` when no chain
    /// of feasible breaks exists and `force` is off.
    pub fn find_breakpoints_with(
        &self,
        sequence: &BlockSequence,
        extents: &dyn PartExtents,
        mode: BreakingMode,
        threshold: f64,
        force: bool,
    ) -> Result<Option<Vec<BreakPosition>>, LayoutError> {
        if !sequence.is_ended() {
            return Err(LayoutError::Internal(
                "breaking requires a sequence closed by end_sequence".into(),
            ));
        }
        let totals = Totals::new(sequence.elements());
        self.run_pass(sequence, extents, &totals, mode, threshold, force)
    }

    fn run_pass(
        &self,
        sequence: &BlockSequence,
        extents: &dyn PartExtents,
        totals: &Totals,
        mode: BreakingMode,
        threshold: f64,
        force: bool,
    ) -> Result<Option<Vec<BreakPosition>>, LayoutError> {
        let start = sequence.first_content_index(sequence.ignore_at_start);
        let mut pass = Pass {
            sequence,
            extents,
            totals,
            mode,
            threshold,
            force,
            nodes: vec![KnuthNode {
                position: None,
                content_start: start,
                line: 0,
                fitness: FitnessClass::Decent,
                total_demerits: 0.0,
                ratio: 0.0,
                difference: 0,
                stretch: 0,
                shrink: 0,
                flagged: false,
                previous: None,
            }],
            active: vec![0],
            too_short: None,
            too_long: None,
        };

        let elements = sequence.elements();
        let mut i = start;
        while i < elements.len() {
            if is_legal_break(elements, i) {
                pass.consider_break(i, &self.config);
                if pass.active.is_empty() {
                    if !force {
                        return Ok(None);
                    }
                    i = pass.recover(self.config.part_overflow_recovery)?;
                    continue;
                }
            }
            i += 1;
        }

        let last = elements.len() - 1;
        let best = pass
            .active
            .iter()
            .copied()
            .filter(|&n| pass.nodes[n].position == Some(last))
            .min_by(|&a, &b| {
                let (a, b) = (&pass.nodes[a], &pass.nodes[b]);
                rank(a.line, a.total_demerits, b.line, b.total_demerits, force)
            });
        Ok(best.map(|node| pass.positions(node)))
    }
}

impl Pass<'_> {
    fn consider_break(&mut self, index: usize, config: &LayoutConfig) {
        let element = &self.sequence.elements()[index];
        let (extra, cost, flagged) = match element {
            Element::Penalty {
                size, cost, flagged, ..
            } => (*size as i64, *cost, *flagged),
            _ => (0, 0, false),
        };
        let forced = cost <= -INFINITE;

        let mut best: BTreeMap<(usize, FitnessClass), Candidate> = BTreeMap::new();
        let mut still_active = Vec::with_capacity(self.active.len());

        for &n in &self.active {
            let node = &self.nodes[n];
            let from = node.content_start;
            let width = self.totals.width[index] - self.totals.width[from] + extra;
            let stretch = self.totals.stretch[index] - self.totals.stretch[from];
            let shrink = self.totals.shrink[index] - self.totals.shrink[from];
            let available = self.extents.extent_for_part(node.line) as i64;
            let difference = available - width;
            let ratio = adjustment_ratio(difference, stretch, shrink);

            if ratio >= -1.0 && !forced {
                still_active.push(n);
            }

            let fitness = FitnessClass::from_ratio(ratio);
            let demerits = node.total_demerits
                + demerits(
                    config,
                    ratio,
                    cost,
                    flagged && node.flagged,
                    fitness.distance(node.fitness),
                    !self.force,
                );
            let candidate = Candidate {
                previous: n,
                line: node.line + 1,
                fitness,
                demerits,
                ratio,
                difference,
                stretch,
                shrink,
            };

            if (-1.0..=self.threshold).contains(&ratio) {
                let key = match self.mode {
                    BreakingMode::AllBreaks => (candidate.line, fitness),
                    BreakingMode::BestFitness => (0, fitness),
                };
                if best
                    .get(&key)
                    .is_none_or(|existing| candidate.beats(existing, self.force))
                {
                    best.insert(key, candidate);
                }
            } else if self.force {
                let fallback = Fallback {
                    index,
                    flagged,
                    candidate,
                };
                if ratio > self.threshold {
                    Fallback::replace_if_better(&mut self.too_short, fallback, true);
                } else {
                    Fallback::replace_if_better(&mut self.too_long, fallback, true);
                }
            }
        }
        self.active = still_active;

        let mut new_nodes: Vec<Candidate> = best.into_values().collect();
        if forced && new_nodes.len() > 1 {
            let fewest_parts = self.force;
            new_nodes.sort_by(|a, b| {
                rank(a.line, a.demerits, b.line, b.demerits, fewest_parts)
            });
            new_nodes.truncate(1);
        }
        for candidate in new_nodes {
            let node = self.make_node(index, flagged, candidate);
            self.active.push(node);
        }
    }

    fn make_node(&mut self, index: usize, flagged: bool, candidate: Candidate) -> usize {
        let content_start = self.sequence.first_content_index(index + 1);
        self.nodes.push(KnuthNode {
            position: Some(index),
            content_start,
            line: candidate.line,
            fitness: candidate.fitness,
            total_demerits: candidate.demerits,
            ratio: candidate.ratio,
            difference: candidate.difference,
            stretch: candidate.stretch,
            shrink: candidate.shrink,
            flagged,
            previous: Some(candidate.previous),
        });
        self.nodes.len() - 1
    }

    /// Restarts from the best out-of-tolerance candidate after the active set
    /// ran dry. Returns the element index to resume scanning from.
    fn recover(&mut self, prefer_overflow: bool) -> Result<usize, LayoutError> {
        let short = self.too_short.take();
        let long = self.too_long.take();
        let chosen = match (short, long) {
            (Some(s), Some(l)) if prefer_overflow && l.index >= s.index => l,
            (Some(s), _) => s,
            (None, Some(l)) => l,
            (None, None) => {
                return Err(LayoutError::Internal(
                    "breaker lost every active node without a recovery candidate".into(),
                ));
            }
        };
        log::trace!(
            "Recovering at element {} with ratio {:.3}",
            chosen.index,
            chosen.candidate.ratio
        );
        let node = self.make_node(chosen.index, chosen.flagged, chosen.candidate);
        self.active = vec![node];
        Ok(chosen.index + 1)
    }

    fn positions(&self, last: usize) -> Vec<BreakPosition> {
        let mut chain = Vec::new();
        let mut current = Some(last);
        while let Some(n) = current {
            let node = &self.nodes[n];
            if let (Some(index), Some(previous)) = (node.position, node.previous) {
                chain.push(part_from(
                    node,
                    index,
                    self.nodes[previous].content_start,
                ));
            }
            current = node.previous;
        }
        chain.reverse();
        chain
    }
}

fn part_from(node: &KnuthNode, index: usize, content_start: usize) -> BreakPosition {
    let diagnostic = if node.ratio > 1.0 {
        Some(PartDiagnostic::Underfull {
            shortfall: (node.difference - node.stretch) as Mpt,
        })
    } else if node.ratio < -1.0 {
        Some(PartDiagnostic::Overfull {
            excess: (-node.difference - node.shrink) as Mpt,
        })
    } else {
        None
    };
    BreakPosition {
        index,
        content_start,
        ratio: node.ratio.clamp(-1.0, 1.0),
        raw_ratio: node.ratio,
        difference: node.difference as Mpt,
        stretch: node.stretch as Mpt,
        shrink: node.shrink as Mpt,
        footnotes: FootnoteSpan::default(),
        diagnostic,
    }
}

fn demerits(
    config: &LayoutConfig,
    ratio: f64,
    cost: i32,
    both_flagged: bool,
    fitness_distance: u8,
    capped: bool,
) -> f64 {
    let bad = if capped {
        badness(ratio)
    } else {
        uncapped_badness(ratio)
    };
    let base = 1.0 + bad;
    let cost = cost as f64;
    let mut demerits = if cost >= 0.0 {
        (base + cost).powi(2)
    } else if cost > -(INFINITE as f64) {
        base.powi(2) - cost.powi(2)
    } else {
        base.powi(2)
    };
    if both_flagged {
        demerits += config.flagged_demerits;
    }
    if fitness_distance > 1 {
        demerits += config.incompatible_fitness_demerits;
    }
    demerits
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::BreakClass;

    fn algorithm() -> BreakingAlgorithm {
        BreakingAlgorithm::new(LayoutConfig::default())
    }

    fn uniform(count: usize, size: Mpt, stretch: Mpt, shrink: Mpt) -> BlockSequence {
        let mut seq = BlockSequence::new(BreakClass::Auto);
        for i in 0..count {
            if i > 0 {
                seq.push(Element::glue(0, stretch, shrink));
            }
            seq.push(Element::boxed(size, None));
        }
        seq.end_sequence(BreakClass::Auto).unwrap()
    }

    #[test]
    fn badness_is_cubic_and_capped() {
        assert_eq!(badness(0.0), 0.0);
        assert_eq!(badness(1.0), 100.0);
        assert_eq!(badness(-1.0), 100.0);
        assert_eq!(badness(5.0), 10_000.0);
    }

    #[test]
    fn ratio_without_elasticity_is_infinite() {
        assert_eq!(adjustment_ratio(10, 0, 5), INFINITE_RATIO);
        assert_eq!(adjustment_ratio(-10, 5, 0), -INFINITE_RATIO);
        assert_eq!(adjustment_ratio(-10, 0, 20), -0.5);
        assert_eq!(adjustment_ratio(0, 0, 0), 0.0);
    }

    #[test]
    fn fitness_classes() {
        assert_eq!(FitnessClass::from_ratio(-0.7), FitnessClass::VeryTight);
        assert_eq!(FitnessClass::from_ratio(0.5), FitnessClass::Decent);
        assert_eq!(FitnessClass::from_ratio(0.9), FitnessClass::Loose);
        assert_eq!(FitnessClass::from_ratio(1.5), FitnessClass::VeryLoose);
    }

    #[test]
    fn empty_sequence_yields_no_parts() {
        let result = algorithm()
            .find_breakpoints(&BlockSequence::default(), &100, BreakingMode::AllBreaks)
            .unwrap();
        assert_eq!(result.part_count(), 0);
    }

    #[test]
    fn unended_sequence_is_rejected() {
        let seq = BlockSequence::from_elements(vec![Element::boxed(10, None)]);
        assert!(matches!(
            algorithm().find_breakpoints(&seq, &100, BreakingMode::AllBreaks),
            Err(LayoutError::Internal(_))
        ));
    }

    #[test]
    fn everything_fits_in_one_part() {
        let seq = uniform(3, 100, 10, 10);
        let result = algorithm()
            .find_breakpoints(&seq, &1000, BreakingMode::AllBreaks)
            .unwrap();
        assert!(result.feasible);
        assert_eq!(result.break_indices(), vec![seq.len() - 1]);
        assert_eq!(result.positions[0].content_start, 0);
        assert!(result.positions[0].diagnostic.is_none());
    }

    #[test]
    fn five_boxes_on_450_break_after_second_and_fourth() {
        let seq = uniform(5, 200, 20, 10);
        let result = algorithm()
            .find_breakpoints(&seq, &450, BreakingMode::AllBreaks)
            .unwrap();
        assert!(!result.feasible);
        assert_eq!(result.break_indices(), vec![3, 7, 11]);

        let first = &result.positions[0];
        assert_eq!(first.raw_ratio, 2.5);
        assert_eq!(first.ratio, 1.0);
        assert_eq!(first.diagnostic, Some(PartDiagnostic::Underfull { shortfall: 30 }));
        assert_eq!(result.positions[1].ratio, 1.0);
        assert_eq!(result.positions[1].content_start, 4);

        let last = &result.positions[2];
        assert_eq!(last.content_start, 8);
        assert!(last.ratio > 0.0 && last.ratio < 0.001);
        assert!(last.diagnostic.is_none());
    }

    #[test]
    fn every_box_lands_in_exactly_one_part() {
        let seq = uniform(23, 100, 10, 10);
        for extent in [250, 450, 1000] {
            let result = algorithm()
                .find_breakpoints(&seq, &extent, BreakingMode::AllBreaks)
                .unwrap();
            for (i, element) in seq.elements().iter().enumerate() {
                if !element.is_box() {
                    continue;
                }
                let owners = result
                    .positions
                    .iter()
                    .filter(|p| p.range().contains(&i))
                    .count();
                assert_eq!(owners, 1, "box {i} at extent {extent}");
            }
            let breaks = result.break_indices();
            assert!(breaks.windows(2).all(|w| w[0] < w[1]));
            assert!(breaks.iter().all(|&b| is_legal_break(seq.elements(), b)));
        }
    }

    #[test]
    fn oversized_box_overflows_without_failing() {
        let mut seq = BlockSequence::default();
        seq.push(Element::boxed(600, None));
        let seq = seq.end_sequence(BreakClass::Auto).unwrap();
        let result = algorithm()
            .find_breakpoints(&seq, &450, BreakingMode::AllBreaks)
            .unwrap();
        assert_eq!(result.part_count(), 1);
        assert_eq!(result.positions[0].ratio, -1.0);
        assert_eq!(
            result.positions[0].diagnostic,
            Some(PartDiagnostic::Overfull { excess: 150 })
        );
    }

    #[test]
    fn forced_break_is_always_taken() {
        for extent in [150, 250, 1000, 5000] {
            let mut seq = BlockSequence::default();
            seq.push(Element::boxed(100, None));
            seq.push(Element::glue(0, 50, 0));
            seq.push(Element::boxed(100, None));
            seq.push(Element::forced_break(BreakClass::Page));
            seq.push(Element::boxed(100, None));
            let seq = seq.end_sequence(BreakClass::Auto).unwrap();
            let result = algorithm()
                .find_breakpoints(&seq, &extent, BreakingMode::AllBreaks)
                .unwrap();
            assert!(
                result.break_indices().contains(&3),
                "extent {} gave {:?}",
                extent,
                result.break_indices()
            );
        }
    }

    #[test]
    fn per_part_extents_repeat_the_last_value() {
        let extents = vec![150, 350];
        assert_eq!(extents.extent_for_part(0), 150);
        assert_eq!(extents.extent_for_part(7), 350);
        let seq = uniform(4, 100, 0, 0);
        let result = algorithm()
            .find_breakpoints(&seq, &extents, BreakingMode::AllBreaks)
            .unwrap();
        // One box fits the first part, the other three the second.
        assert_eq!(result.break_indices(), vec![1, seq.len() - 1]);
    }

    #[test]
    fn best_fitness_mode_agrees_on_uniform_extents() {
        let seq = uniform(12, 100, 30, 10);
        let all = algorithm()
            .find_breakpoints(&seq, &420, BreakingMode::AllBreaks)
            .unwrap();
        let pruned = algorithm()
            .find_breakpoints(&seq, &420, BreakingMode::BestFitness)
            .unwrap();
        assert_eq!(all.break_indices(), pruned.break_indices());
    }

    #[test]
    fn penalty_width_counts_only_when_taken() {
        let mut seq = BlockSequence::default();
        seq.push(Element::boxed(100, None));
        seq.push(Element::Penalty {
            size: 60,
            cost: 0,
            flagged: false,
            break_class: BreakClass::Auto,
            position: None,
        });
        seq.push(Element::boxed(100, None));
        let seq = seq.end_sequence(BreakClass::Auto).unwrap();
        let result = algorithm()
            .find_breakpoints(&seq, &150, BreakingMode::AllBreaks)
            .unwrap();
        assert_eq!(result.positions[0].index, 1);
        assert_eq!(result.positions[0].difference, -10);
    }

    #[test]
    fn overflow_recovery_prefers_the_longer_part() {
        // A part of one box is underfull, two boxes overflow by 10.
        let mut config = LayoutConfig::default();
        config.emergency_tolerance = 1.0;
        let short_first = BreakingAlgorithm::new(config);
        config.part_overflow_recovery = true;
        let long_first = BreakingAlgorithm::new(config);
        let seq = uniform(3, 100, 0, 0);

        let a = short_first
            .find_breakpoints(&seq, &190, BreakingMode::AllBreaks)
            .unwrap();
        let b = long_first
            .find_breakpoints(&seq, &190, BreakingMode::AllBreaks)
            .unwrap();
        assert_eq!(a.break_indices()[0], 1);
        assert_eq!(b.break_indices()[0], 3);
        assert!(matches!(
            b.positions[0].diagnostic,
            Some(PartDiagnostic::Overfull { excess: 10 })
        ));
    }

    fn mixed_paragraphs() -> BlockSequence {
        let mut seq = BlockSequence::new(BreakClass::Auto);
        for element in [
            Element::boxed(198, None),
            Element::glue(3, 4, 4),
            Element::boxed(182, None),
            Element::penalty(0),
            Element::glue(10, 10, 5),
            Element::boxed(57, None),
            Element::penalty(0),
            Element::glue(10, 10, 5),
            Element::boxed(170, None),
            Element::penalty(0),
            Element::boxed(106, None),
            Element::glue(15, 39, 18),
            Element::boxed(162, None),
        ] {
            seq.push(element);
        }
        seq.end_sequence(BreakClass::Auto).unwrap()
    }

    #[test]
    fn a_looser_extent_never_needs_more_parts() {
        let tight = algorithm()
            .find_breakpoints(&mixed_paragraphs(), &525, BreakingMode::AllBreaks)
            .unwrap();
        let loose = algorithm()
            .find_breakpoints(&mixed_paragraphs(), &550, BreakingMode::AllBreaks)
            .unwrap();
        assert_eq!(tight.part_count(), 2);
        assert_eq!(loose.part_count(), 2);
    }

    #[test]
    fn part_count_does_not_grow_with_the_extent() {
        let sequences = [
            mixed_paragraphs(),
            uniform(12, 90, 10, 5),
            uniform(20, 40, 0, 0),
            uniform(7, 150, 30, 0),
        ];
        for mode in [BreakingMode::AllBreaks, BreakingMode::BestFitness] {
            for seq in &sequences {
                let mut previous = usize::MAX;
                for extent in (200..=1500).step_by(25) {
                    let parts = algorithm()
                        .find_breakpoints(seq, &extent, mode)
                        .unwrap()
                        .part_count();
                    assert!(
                        parts <= previous,
                        "{parts} parts at extent {extent}, {previous} just below it"
                    );
                    previous = parts;
                }
            }
        }
    }
}
