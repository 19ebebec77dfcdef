//! Owner of the pages and of the id tracker for a whole document.

use crate::LayoutError;
use crate::area::{Page, PageState};
use crate::resolution::{IdTracker, Resolution};
use folio_style::PageMaster;
use folio_types::{PageIndex, RefId};
use itertools::Itertools;
use std::collections::BTreeMap;

/// Where a citation waiting for an id sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationRef {
    pub page: PageIndex,
    pub slot: usize,
    pub last: bool,
}

/// A reference that never found its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub id: RefId,
    /// Pages holding a citation of `id`.
    pub cited_on: Vec<PageIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnresolvedReport {
    pub references: Vec<UnresolvedReference>,
}

impl UnresolvedReport {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RefId> {
        self.references.iter().map(|r| &r.id)
    }
}

/// The finished result of layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaTree {
    pages: Vec<Page>,
    locations: BTreeMap<RefId, Vec<PageIndex>>,
}

impl AreaTree {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages_for(&self, id: &RefId) -> &[PageIndex] {
        self.locations.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first page holding an area of `id`.
    pub fn page_for(&self, id: &RefId) -> Option<&Page> {
        self.pages_for(id)
            .first()
            .and_then(|index| self.pages.get(index.get()))
    }

    pub fn locations(&self) -> impl Iterator<Item = (&RefId, &[PageIndex])> {
        self.locations.iter().map(|(id, p)| (id, p.as_slice()))
    }

    pub fn has_unresolved(&self) -> bool {
        self.pages.iter().any(Page::has_unresolved)
    }
}

#[derive(Debug, Default)]
pub struct AreaTreeModel {
    pages: Vec<Page>,
    tracker: IdTracker<CitationRef>,
    released: usize,
}

impl AreaTreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_page(&mut self, number: u32, master: &PageMaster, blank: bool) -> PageIndex {
        let index = PageIndex(self.pages.len());
        self.pages.push(Page::new(index, number, master, blank));
        log::debug!("Created page {} (folio {}, master '{}')", index, number, master.name);
        index
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: PageIndex) -> Result<&Page, LayoutError> {
        self.pages
            .get(index.get())
            .ok_or_else(|| LayoutError::Internal(format!("no page {index}")))
    }

    pub fn page_mut(&mut self, index: PageIndex) -> Result<&mut Page, LayoutError> {
        self.pages
            .get_mut(index.get())
            .ok_or_else(|| LayoutError::Internal(format!("no page {index}")))
    }

    /// Marks a page complete and registers its citations. Citations of ids
    /// that are already known are filled in right away.
    pub fn finish_page(&mut self, index: PageIndex) -> Result<(), LayoutError> {
        let page = self.page_mut(index)?;
        if page.state != PageState::Filling {
            return Err(LayoutError::StateMismatch("Filling", "Complete"));
        }
        page.state = PageState::Complete;
        let citations = page.citations().to_vec();
        for citation in citations {
            let resolver = CitationRef {
                page: index,
                slot: citation.slot,
                last: citation.last,
            };
            match self.tracker.add_unresolved(&citation.target, resolver) {
                Some(resolution) => self.apply(vec![resolution]),
                None => self.page_mut(index)?.mark_unresolved(citation.target, citation.slot),
            }
        }
        Ok(())
    }

    pub fn associate(&mut self, id: &RefId, page: PageIndex) {
        let resolved = self.tracker.associate(id, page);
        self.apply(resolved);
    }

    pub fn signal_pending(&mut self, id: &RefId) {
        self.tracker.signal_pending(id);
    }

    pub fn signal_processed(&mut self, id: &RefId) {
        let resolved = self.tracker.signal_processed(id);
        self.apply(resolved);
    }

    pub fn is_resolved(&self, id: &RefId) -> bool {
        self.tracker.is_resolved(id)
    }

    fn apply(&mut self, resolutions: Vec<Resolution<CitationRef>>) {
        for resolution in resolutions {
            let target = if resolution.resolver.last {
                resolution.pages.last()
            } else {
                resolution.pages.first()
            };
            let Some(number) = target
                .and_then(|p| self.pages.get(p.get()))
                .map(|p| p.number)
            else {
                continue;
            };
            let CitationRef { page, slot, .. } = resolution.resolver;
            if let Some(citing) = self.pages.get_mut(page.get())
                && !citing.apply_resolution(slot, &number.to_string())
            {
                log::debug!("Citation slot {} vanished from page {}", slot, page);
            }
            log::trace!("Resolved '{}' to page {} for {}", resolution.id, number, page);
        }
    }

    /// Releases the complete pages at the front of the document that have
    /// nothing left to resolve, strictly in order.
    pub fn release_ready(&mut self) -> Vec<PageIndex> {
        let mut released = Vec::new();
        while let Some(page) = self.pages.get_mut(self.released) {
            if page.state != PageState::Complete || page.has_unresolved() {
                break;
            }
            page.state = PageState::Released;
            released.push(page.index);
            self.released += 1;
        }
        released
    }

    /// Releases every remaining page. References still open keep their
    /// placeholder text and are reported.
    pub fn finish(mut self) -> (AreaTree, UnresolvedReport) {
        let mut references = Vec::new();
        for (id, resolvers) in self.tracker.take_unresolved() {
            let cited_on: Vec<PageIndex> = resolvers.iter().map(|r| r.page).sorted().dedup().collect();
            log::warn!(
                "Unresolved reference to '{}' on {} page(s)",
                id,
                cited_on.len()
            );
            references.push(UnresolvedReference { id, cited_on });
        }
        for page in &mut self.pages {
            page.state = PageState::Released;
        }
        let locations = self.tracker.locations().into_iter().collect();
        (
            AreaTree {
                pages: self.pages,
                locations,
            },
            UnresolvedReport { references },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{Area, AreaKind, InlineArea};
    use folio_style::PageSize;
    use folio_types::Rect;

    fn cite(model: &mut AreaTreeModel, page: PageIndex, target: &str, last: bool) {
        let page = model.page_mut(page).unwrap();
        let slot = page.register_citation(RefId::from(target), last);
        let line = Area::new(
            AreaKind::Line {
                inlines: vec![InlineArea::Citation {
                    x: 0,
                    width: 1,
                    slot,
                    target: RefId::from(target),
                    last,
                    text: "??".into(),
                    font_size: 1,
                }],
            },
            Rect::default(),
        );
        page.column_mut(0).unwrap().children.push(line);
    }

    fn citation_texts(page: &Page) -> Vec<String> {
        page.absolute_areas()
            .iter()
            .filter_map(|(_, a)| match &a.kind {
                AreaKind::Line { inlines } => Some(inlines[0].text().to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn forward_citation_blocks_release_until_resolved() {
        let master = PageMaster::new("m", PageSize::A4);
        let mut model = AreaTreeModel::new();
        let p0 = model.create_page(1, &master, false);
        cite(&mut model, p0, "later", false);
        model.finish_page(p0).unwrap();
        assert!(model.release_ready().is_empty());

        let p1 = model.create_page(2, &master, false);
        model.associate(&RefId::from("later"), p1);
        model.finish_page(p1).unwrap();
        assert_eq!(model.release_ready(), vec![p0, p1]);

        let (tree, report) = model.finish();
        assert!(report.is_empty());
        assert_eq!(citation_texts(&tree.pages()[0]), vec!["2"]);
        assert_eq!(tree.page_for(&RefId::from("later")).map(|p| p.number), Some(2));
    }

    #[test]
    fn last_citations_use_the_last_page() {
        let master = PageMaster::new("m", PageSize::A4);
        let mut model = AreaTreeModel::new();
        let id = RefId::from("chapter");
        let p0 = model.create_page(5, &master, false);
        cite(&mut model, p0, "chapter", true);
        model.signal_pending(&id);
        model.associate(&id, p0);
        model.finish_page(p0).unwrap();
        let p1 = model.create_page(6, &master, false);
        model.associate(&id, p1);
        model.signal_processed(&id);
        model.finish_page(p1).unwrap();

        let (tree, _) = model.finish();
        assert_eq!(citation_texts(&tree.pages()[0]), vec!["6"]);
    }

    #[test]
    fn missing_targets_are_reported() {
        let master = PageMaster::new("m", PageSize::A4);
        let mut model = AreaTreeModel::new();
        let p0 = model.create_page(1, &master, false);
        cite(&mut model, p0, "nowhere", false);
        model.finish_page(p0).unwrap();
        let (tree, report) = model.finish();
        assert!(tree.has_unresolved());
        assert_eq!(report.references[0].cited_on, vec![p0]);
        assert_eq!(citation_texts(&tree.pages()[0]), vec!["??"]);
    }
}
