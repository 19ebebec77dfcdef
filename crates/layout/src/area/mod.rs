//! The area tree: what layout produces and renderers paint.
//!
//! Every area's rectangle is relative to its parent's origin; regions are
//! relative to the page. [`Area::walk`] hands out the accumulated transform.

pub mod markers;
pub mod page;

pub use markers::MarkerTable;
pub use page::{Page, PageState};

use folio_style::Borders;
use folio_types::{Color, Mpt, OwnerHandle, Rect, RefId, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Body,
    Before,
    After,
}

impl RegionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Body => "body",
            RegionKind::Before => "before",
            RegionKind::After => "after",
        }
    }
}

/// A placed piece of a line. `x` is relative to the line area.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineArea {
    Text {
        x: Mpt,
        width: Mpt,
        text: String,
        font_size: Mpt,
        /// Internal link target.
        link: Option<RefId>,
    },
    /// A page-number citation, patched once its target resolves.
    Citation {
        x: Mpt,
        width: Mpt,
        /// Page-local slot the resolution engine refers to.
        slot: usize,
        target: RefId,
        last: bool,
        text: String,
        font_size: Mpt,
    },
}

impl InlineArea {
    pub fn x(&self) -> Mpt {
        match self {
            InlineArea::Text { x, .. } | InlineArea::Citation { x, .. } => *x,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            InlineArea::Text { text, .. } | InlineArea::Citation { text, .. } => text,
        }
    }

    pub fn font_size(&self) -> Mpt {
        match self {
            InlineArea::Text { font_size, .. } | InlineArea::Citation { font_size, .. } => {
                *font_size
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AreaKind {
    Region(RegionKind),
    Column(usize),
    Block,
    Line { inlines: Vec<InlineArea> },
    Image,
    /// One step of a table or list row group.
    RowStep,
    Cell,
}

impl AreaKind {
    pub fn name(&self) -> &'static str {
        match self {
            AreaKind::Region(_) => "region",
            AreaKind::Column(_) => "column",
            AreaKind::Block => "block",
            AreaKind::Line { .. } => "line",
            AreaKind::Image => "image",
            AreaKind::RowStep => "row-step",
            AreaKind::Cell => "cell",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub kind: AreaKind,
    pub rect: Rect,
    pub owner: Option<OwnerHandle>,
    pub id: Option<RefId>,
    pub borders: Borders,
    pub background: Option<Color>,
    pub children: Vec<Area>,
}

impl Area {
    pub fn new(kind: AreaKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            owner: None,
            id: None,
            borders: Borders::default(),
            background: None,
            children: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: OwnerHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn has_decoration(&self) -> bool {
        self.background.is_some() || !self.borders.is_empty()
    }

    /// Visits this area and its descendants in painting order. `transform`
    /// maps this area's parent coordinates to the page.
    pub fn walk<'a, F>(&'a self, transform: Transform, visit: &mut F)
    where
        F: FnMut(&'a Area, Transform),
    {
        visit(self, transform);
        let inner = transform.then(&self.rect);
        for child in &self.children {
            child.walk(inner, visit);
        }
    }

    pub fn walk_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut Area),
    {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }

    /// Moves the origin of the direct children from absolute coordinates to
    /// coordinates relative to this area.
    pub(crate) fn relativize_children(&mut self) {
        let (x, y) = (self.rect.x, self.rect.y);
        for child in &mut self.children {
            child.rect.x -= x;
            child.rect.y -= y;
        }
    }
}
