use super::markers::MarkerTable;
use super::{Area, AreaKind, InlineArea, RegionKind};
use folio_style::PageMaster;
use folio_types::{PageIndex, Rect, RefId, Size, Transform};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Filling,
    /// All content placed; may still wait for citations to resolve.
    Complete,
    /// Handed on for rendering.
    Released,
}

/// A page-number citation placed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationSlot {
    pub slot: usize,
    pub target: RefId,
    pub last: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: PageIndex,
    /// Folio number printed on the page.
    pub number: u32,
    pub master: String,
    pub size: Size,
    pub blank: bool,
    pub state: PageState,
    pub markers: MarkerTable,
    body: Area,
    before: Option<Area>,
    after: Option<Area>,
    citations: Vec<CitationSlot>,
    unresolved: HashMap<RefId, Vec<usize>>,
}

impl Page {
    pub fn new(index: PageIndex, number: u32, master: &PageMaster, blank: bool) -> Self {
        let mut body = Area::new(AreaKind::Region(RegionKind::Body), master.body_rect());
        body.children = (0..master.column_count())
            .map(|c| Area::new(AreaKind::Column(c), master.column_rect(c)))
            .collect();
        Self {
            index,
            number,
            master: master.name.clone(),
            size: master.page_size(),
            blank,
            state: PageState::Filling,
            markers: MarkerTable::default(),
            body,
            before: None,
            after: None,
            citations: Vec::new(),
            unresolved: HashMap::new(),
        }
    }

    pub fn body(&self) -> &Area {
        &self.body
    }

    pub fn column_count(&self) -> usize {
        self.body.children.len()
    }

    pub fn column_mut(&mut self, column: usize) -> Option<&mut Area> {
        self.body.children.get_mut(column)
    }

    /// Installs a static region; `area.kind` says which one.
    pub fn set_region(&mut self, area: Area) {
        match area.kind {
            AreaKind::Region(RegionKind::Before) => self.before = Some(area),
            AreaKind::Region(RegionKind::After) => self.after = Some(area),
            _ => self.body = area,
        }
    }

    /// Regions in painting order, relative to the page.
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.before
            .iter()
            .chain(std::iter::once(&self.body))
            .chain(self.after.iter())
    }

    /// Every area with its rectangle in page coordinates.
    pub fn absolute_areas(&self) -> Vec<(Rect, &Area)> {
        let mut out = Vec::new();
        for region in self.areas() {
            region.walk(Transform::identity(), &mut |area, t| {
                out.push((area.rect.transformed(t), area));
            });
        }
        out
    }

    /// Reserves a slot for a citation about to be placed on this page.
    pub fn register_citation(&mut self, target: RefId, last: bool) -> usize {
        let slot = self.citations.len();
        self.citations.push(CitationSlot { slot, target, last });
        slot
    }

    pub fn citations(&self) -> &[CitationSlot] {
        &self.citations
    }

    pub(crate) fn mark_unresolved(&mut self, target: RefId, slot: usize) {
        self.unresolved.entry(target).or_default().push(slot);
    }

    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = (&RefId, &[usize])> {
        self.unresolved.iter().map(|(id, slots)| (id, slots.as_slice()))
    }

    /// Writes `text` into the citation occupying `slot`. Returns whether the
    /// slot was found.
    pub fn apply_resolution(&mut self, slot: usize, text: &str) -> bool {
        let mut found = None;
        self.body.walk_mut(&mut |area| {
            if let AreaKind::Line { inlines } = &mut area.kind {
                for inline in inlines {
                    if let InlineArea::Citation {
                        slot: s,
                        target,
                        text: t,
                        ..
                    } = inline
                        && *s == slot
                    {
                        *t = text.to_string();
                        found = Some(target.clone());
                    }
                }
            }
        });
        let Some(target) = found else {
            return false;
        };
        if let Some(slots) = self.unresolved.get_mut(&target) {
            slots.retain(|s| *s != slot);
            if slots.is_empty() {
                self.unresolved.remove(&target);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::{Length, PageSize};

    fn master() -> PageMaster {
        let mut master = PageMaster::new(
            "two-col",
            PageSize::Custom {
                width: Length::pt(200.0),
                height: Length::pt(300.0),
            },
        );
        master.columns = 2;
        master.column_gap = Length::pt(20.0);
        master
    }

    #[test]
    fn pages_get_one_column_area_per_column() {
        let page = Page::new(PageIndex(0), 1, &master(), false);
        assert_eq!(page.column_count(), 2);
        assert_eq!(page.body().children[1].rect.x, 110_000);
        assert_eq!(page.areas().count(), 1);
    }

    #[test]
    fn resolutions_patch_citations() {
        let mut page = Page::new(PageIndex(0), 1, &master(), false);
        let slot = page.register_citation(RefId::from("a"), false);
        let line = Area::new(
            AreaKind::Line {
                inlines: vec![InlineArea::Citation {
                    x: 0,
                    width: 10,
                    slot,
                    target: RefId::from("a"),
                    last: false,
                    text: "??".into(),
                    font_size: 10_000,
                }],
            },
            Rect::new(0, 0, 100, 12),
        );
        page.column_mut(0).unwrap().children.push(line);
        page.mark_unresolved(RefId::from("a"), slot);
        assert!(page.has_unresolved());

        assert!(page.apply_resolution(slot, "7"));
        assert!(!page.has_unresolved());
        let text = page.absolute_areas().iter().find_map(|(_, a)| match &a.kind {
            AreaKind::Line { inlines } => Some(inlines[0].text().to_string()),
            _ => None,
        });
        assert_eq!(text.as_deref(), Some("7"));
        assert!(!page.apply_resolution(99, "x"));
    }
}
