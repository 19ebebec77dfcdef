//! Area construction for a committed part.
//!
//! The builder walks an element range once. Positioned boxes reopen the
//! container chain of their owner (from [`NodeTree::path`]), so a node split
//! over several parts gets one container area per part. Containers close when
//! the chain changes, and take the bottom of their last box as their extent.

use crate::LayoutError;
use crate::algorithms::justify::AdjustmentLedger;
use crate::area::{Area, AreaKind, Page};
use crate::elements::Element;
use crate::nodes::{NodeTree, Placement};
use folio_types::{Mpt, OwnerHandle, Rect};
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// What happened to a node while areas were built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaEvent {
    /// The node produced an area on the page; `first` for its first area
    /// in the document.
    Located { owner: OwnerHandle, first: bool },
    /// The node's last element has been placed.
    Finished { owner: OwnerHandle },
}

/// Where the steps of a stepped container start on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOrigin {
    /// Run coordinate of the group's top edge.
    pub origin: Mpt,
    /// Group offset of the first step on this page.
    pub visible_from: Mpt,
}

#[derive(Debug, Clone)]
struct StepTrack {
    group: usize,
    last_step: usize,
    origin: StepOrigin,
    cursors: HashMap<usize, Mpt>,
}

pub struct AreaContext<'a> {
    pub tree: &'a NodeTree,
    pub page: &'a mut Page,
    seen: &'a mut HashSet<OwnerHandle>,
    events: Vec<AreaEvent>,
    tracks: HashMap<OwnerHandle, StepTrack>,
    quiet: u32,
}

impl<'a> AreaContext<'a> {
    pub fn new(tree: &'a NodeTree, page: &'a mut Page, seen: &'a mut HashSet<OwnerHandle>) -> Self {
        Self {
            tree,
            page,
            seen,
            events: Vec::new(),
            tracks: HashMap::new(),
            quiet: 0,
        }
    }

    pub fn located(&mut self, owner: OwnerHandle) {
        if self.quiet == 0 {
            let first = self.seen.insert(owner);
            self.events.push(AreaEvent::Located { owner, first });
        }
    }

    /// The node already has areas on an earlier part.
    pub fn continues(&self, owner: OwnerHandle) -> bool {
        self.quiet == 0 && self.seen.contains(&owner)
    }

    pub fn finished(&mut self, owner: OwnerHandle) {
        if self.quiet == 0 {
            self.events.push(AreaEvent::Finished { owner });
        }
    }

    /// Runs `f` without recording events, for content that is repeated
    /// (table headers and footers after a break).
    pub fn quietly<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.quiet += 1;
        let result = f(self);
        self.quiet -= 1;
        result
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    /// Origin of step `step` of `owner`. Steps of the same group that follow
    /// each other on the page share one origin; anything else starts afresh.
    pub fn step_origin(
        &mut self,
        owner: OwnerHandle,
        group: usize,
        step: usize,
        step_start: Mpt,
        y: Mpt,
        part_start: bool,
    ) -> StepOrigin {
        let continues = !part_start
            && self
                .tracks
                .get(&owner)
                .is_some_and(|t| t.group == group && t.last_step + 1 == step);
        if continues && let Some(track) = self.tracks.get_mut(&owner) {
            track.last_step = step;
            return track.origin;
        }
        let origin = StepOrigin {
            origin: y - step_start,
            visible_from: step_start,
        };
        self.tracks.insert(
            owner,
            StepTrack {
                group,
                last_step: step,
                origin,
                cursors: HashMap::new(),
            },
        );
        origin
    }

    pub fn cell_cursor(&self, owner: OwnerHandle, cell: usize) -> Option<Mpt> {
        self.tracks.get(&owner)?.cursors.get(&cell).copied()
    }

    pub fn set_cell_cursor(&mut self, owner: OwnerHandle, cell: usize, y: Mpt) {
        if let Some(track) = self.tracks.get_mut(&owner) {
            track.cursors.insert(cell, y);
        }
    }

    pub fn into_events(self) -> Vec<AreaEvent> {
        self.events
    }
}

/// The element range handed to the builder and how to size its glue.
#[derive(Debug, Clone)]
pub struct Run<'e> {
    pub elements: &'e [Element],
    pub range: Range<usize>,
    /// Containers at and above this node are not rebuilt.
    pub root: Option<OwnerHandle>,
    /// Content box of the root, in run coordinates.
    pub x: Mpt,
    pub y: Mpt,
    pub width: Mpt,
    pub ratio: f64,
    pub ledger: Option<&'e AdjustmentLedger>,
    /// Index of the last box of every node, counted from `offset`.
    pub last_occurrence: &'e HashMap<OwnerHandle, usize>,
    /// Index of `elements[0]` in the list `last_occurrence` was computed on.
    pub offset: usize,
}

impl Run<'_> {
    fn glue_size(&self, index: usize, element: &Element) -> Mpt {
        if let Some(adjustment) = self.ledger.and_then(|l| l.get(index)) {
            return element.width() + adjustment;
        }
        let elastic = if self.ratio > 0.0 {
            element.stretch()
        } else {
            element.shrink()
        };
        element.width() + (self.ratio * elastic as f64).round() as Mpt
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuiltRun {
    pub areas: Vec<Area>,
    /// Distance from the run's top to the end of its last element.
    pub height: Mpt,
}

struct OpenContainer {
    owner: OwnerHandle,
    area: Area,
    content_x: Mpt,
    content_width: Mpt,
    bottom: Mpt,
    finished: bool,
}

struct RunBuilder<'r, 'e> {
    run: &'r Run<'e>,
    stack: Vec<OpenContainer>,
    out: Vec<Area>,
    cursor: Mpt,
}

impl RunBuilder<'_, '_> {
    fn close_one(&mut self) {
        let Some(mut open) = self.stack.pop() else {
            return;
        };
        open.area.rect.height = open.bottom - open.area.rect.y;
        if !open.finished {
            open.area.borders.after = None;
        }
        open.area.relativize_children();
        match self.stack.last_mut() {
            Some(parent) => parent.area.children.push(open.area),
            None => self.out.push(open.area),
        }
    }

    /// Makes `chain` the open container stack, closing what no longer
    /// applies and opening the rest.
    fn enter(
        &mut self,
        ctx: &mut AreaContext<'_>,
        chain: &[OwnerHandle],
    ) -> Result<(), LayoutError> {
        let keep = self
            .stack
            .iter()
            .zip(chain)
            .take_while(|(open, owner)| open.owner == **owner)
            .count();
        while self.stack.len() > keep {
            self.close_one();
        }
        let tree = ctx.tree;
        for &owner in &chain[keep..] {
            let node = tree.node(owner)?;
            let frame = node.frame();
            let (parent_x, parent_width) = self.content_box();
            let x = parent_x + frame.x;
            let width = if frame.width > 0 {
                frame.width
            } else {
                parent_width - frame.x
            };
            let mut area = Area::new(AreaKind::Block, Rect::new(x, self.cursor, width, 0))
                .with_owner(owner);
            if !ctx.is_quiet() {
                area.id = node.meta().id.clone();
            }
            area.borders = frame.borders;
            if ctx.continues(owner) {
                area.borders.before = None;
            }
            area.background = frame.background;
            ctx.located(owner);
            self.stack.push(OpenContainer {
                owner,
                area,
                content_x: x + frame.content_offset(),
                content_width: frame.content_width(),
                bottom: self.cursor,
                finished: false,
            });
        }
        Ok(())
    }

    fn content_box(&self) -> (Mpt, Mpt) {
        self.stack
            .last()
            .map_or((self.run.x, self.run.width), |o| (o.content_x, o.content_width))
    }

    /// Places a positioned box (or a sized break penalty) of `owner` and
    /// returns the owner's container chain.
    fn place(
        &mut self,
        ctx: &mut AreaContext<'_>,
        owner: OwnerHandle,
        index: usize,
        size: Mpt,
        part_start: bool,
    ) -> Result<Vec<OwnerHandle>, LayoutError> {
        let tree = ctx.tree;
        let chain = tree.path(owner, self.run.root);
        self.enter(ctx, &chain)?;
        let (x, width) = self.content_box();
        let placement = Placement {
            x,
            y: self.cursor,
            width,
            height: size,
            part_start,
        };
        let built = tree.node(owner)?.build_area(index, placement, ctx)?;
        self.cursor += size;
        if let Some(area) = built {
            match self.stack.last_mut() {
                Some(parent) => parent.area.children.push(area),
                None => self.out.push(area),
            }
        }
        for open in &mut self.stack {
            open.bottom = self.cursor;
        }
        Ok(chain)
    }
}

/// Builds the areas of `run.range`.
pub fn build_run(ctx: &mut AreaContext<'_>, run: &Run<'_>) -> Result<BuiltRun, LayoutError> {
    let mut builder = RunBuilder {
        run,
        stack: Vec::new(),
        out: Vec::new(),
        cursor: run.y,
    };
    let range = run.range.start..run.range.end.min(run.elements.len());
    let Some(first_box) = range.clone().find(|&i| run.elements[i].is_box()) else {
        return Ok(BuiltRun::default());
    };
    let last = range.end - 1;

    for i in first_box..range.end {
        let element = &run.elements[i];
        match element {
            Element::Box { size, position, .. } => {
                let Some(position) = position else {
                    builder.cursor += size;
                    continue;
                };
                let chain = builder.place(ctx, position.owner, position.index, *size, i == first_box)?;
                for owner in chain {
                    if run.last_occurrence.get(&owner) == Some(&(run.offset + i)) {
                        ctx.finished(owner);
                        if let Some(open) = builder.stack.iter_mut().find(|o| o.owner == owner) {
                            open.finished = true;
                        }
                    }
                }
            }
            Element::Glue { .. } => {
                if i != last {
                    builder.cursor += run.glue_size(i, element);
                }
            }
            Element::Penalty {
                size,
                position: Some(position),
                ..
            } if i == last && *size > 0 => {
                builder.place(ctx, position.owner, position.index, *size, false)?;
            }
            Element::Penalty { .. } => {}
        }
    }
    while !builder.stack.is_empty() {
        builder.close_one();
    }
    Ok(BuiltRun {
        areas: builder.out,
        height: builder.cursor - run.y,
    })
}

/// Index of the last positioned box of every node below `root`.
pub fn last_occurrences(
    tree: &NodeTree,
    elements: &[Element],
    root: Option<OwnerHandle>,
) -> HashMap<OwnerHandle, usize> {
    let mut last = HashMap::new();
    for (i, element) in elements.iter().enumerate() {
        if let Element::Box {
            position: Some(position),
            ..
        } = element
        {
            for owner in tree.path(position.owner, root) {
                last.insert(owner, i);
            }
        }
    }
    last
}
