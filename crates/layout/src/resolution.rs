//! Tracking of forward references.
//!
//! An id resolves once the pages its object occupies are known: it has been
//! associated with at least one page and is not withheld. Objects spanning
//! pages are withheld from their first area to their last, so a resolver
//! asking for the last page never sees a partial answer.

use folio_types::{PageIndex, RefId};
use std::collections::{HashMap, HashSet};

/// Returned for every resolver whose id became known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<R> {
    pub id: RefId,
    pub resolver: R,
    pub pages: Vec<PageIndex>,
}

#[derive(Debug, Clone)]
pub struct IdTracker<R> {
    located: HashMap<RefId, Vec<PageIndex>>,
    pending: HashMap<RefId, Vec<R>>,
    withheld: HashSet<RefId>,
    processed: HashSet<RefId>,
}

impl<R> Default for IdTracker<R> {
    fn default() -> Self {
        Self {
            located: HashMap::new(),
            pending: HashMap::new(),
            withheld: HashSet::new(),
            processed: HashSet::new(),
        }
    }
}

impl<R> IdTracker<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `id` has an area on `page`. Associating the same page
    /// twice changes nothing.
    pub fn associate(&mut self, id: &RefId, page: PageIndex) -> Vec<Resolution<R>> {
        let pages = self.located.entry(id.clone()).or_default();
        if !pages.contains(&page) {
            pages.push(page);
            pages.sort();
        }
        self.drain_if_resolved(id)
    }

    /// The object behind `id` has started but not finished.
    pub fn signal_pending(&mut self, id: &RefId) {
        if !self.processed.contains(id) {
            self.withheld.insert(id.clone());
        }
    }

    /// The object behind `id` has placed its last area.
    pub fn signal_processed(&mut self, id: &RefId) -> Vec<Resolution<R>> {
        self.withheld.remove(id);
        self.processed.insert(id.clone());
        self.drain_if_resolved(id)
    }

    /// Registers a resolver. If `id` is already resolved the resolution is
    /// returned right away and nothing is stored.
    pub fn add_unresolved(&mut self, id: &RefId, resolver: R) -> Option<Resolution<R>> {
        if self.is_resolved(id) {
            return Some(Resolution {
                id: id.clone(),
                resolver,
                pages: self.located.get(id).cloned().unwrap_or_default(),
            });
        }
        self.pending.entry(id.clone()).or_default().push(resolver);
        None
    }

    pub fn is_resolved(&self, id: &RefId) -> bool {
        self.located.get(id).is_some_and(|p| !p.is_empty()) && !self.withheld.contains(id)
    }

    pub fn pages_for(&self, id: &RefId) -> &[PageIndex] {
        self.located.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids that resolvers are still waiting for.
    pub fn pending_ids(&self) -> impl Iterator<Item = &RefId> {
        self.pending.keys()
    }

    /// Every located id with its pages, in id order.
    pub fn locations(&self) -> Vec<(RefId, Vec<PageIndex>)> {
        let mut all: Vec<_> = self
            .located
            .iter()
            .map(|(id, pages)| (id.clone(), pages.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Removes and returns the resolvers that never got an answer.
    pub fn take_unresolved(&mut self) -> Vec<(RefId, Vec<R>)> {
        let mut left: Vec<_> = self.pending.drain().collect();
        left.sort_by(|a, b| a.0.cmp(&b.0));
        left
    }

    fn drain_if_resolved(&mut self, id: &RefId) -> Vec<Resolution<R>> {
        if !self.is_resolved(id) {
            return Vec::new();
        }
        let pages = self.pages_for(id).to_vec();
        self.pending
            .remove(id)
            .unwrap_or_default()
            .into_iter()
            .map(|resolver| Resolution {
                id: id.clone(),
                resolver,
                pages: pages.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> RefId {
        RefId::from(s)
    }

    #[test]
    fn forward_reference_resolves_on_association() {
        let mut tracker = IdTracker::new();
        assert!(tracker.add_unresolved(&id("a"), 1).is_none());
        let resolved = tracker.associate(&id("a"), PageIndex(3));
        assert_eq!(
            resolved,
            vec![Resolution {
                id: id("a"),
                resolver: 1,
                pages: vec![PageIndex(3)]
            }]
        );
        // Notified exactly once.
        assert!(tracker.associate(&id("a"), PageIndex(4)).is_empty());
    }

    #[test]
    fn backward_reference_resolves_immediately() {
        let mut tracker = IdTracker::new();
        tracker.associate(&id("a"), PageIndex(0));
        let r = tracker.add_unresolved(&id("a"), "slot").unwrap();
        assert_eq!(r.pages, vec![PageIndex(0)]);
        assert_eq!(tracker.pending_ids().count(), 0);
    }

    #[test]
    fn withheld_ids_wait_for_their_last_area() {
        let mut tracker = IdTracker::new();
        tracker.add_unresolved(&id("t"), 'x');
        tracker.signal_pending(&id("t"));
        assert!(tracker.associate(&id("t"), PageIndex(0)).is_empty());
        assert!(tracker.associate(&id("t"), PageIndex(1)).is_empty());
        assert!(!tracker.is_resolved(&id("t")));
        let resolved = tracker.signal_processed(&id("t"));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].pages, vec![PageIndex(0), PageIndex(1)]);
    }

    #[test]
    fn associating_twice_is_idempotent() {
        let mut tracker: IdTracker<u8> = IdTracker::new();
        tracker.associate(&id("a"), PageIndex(2));
        tracker.associate(&id("a"), PageIndex(2));
        assert_eq!(tracker.pages_for(&id("a")), &[PageIndex(2)]);
    }

    #[test]
    fn unknown_ids_stay_unresolved() {
        let mut tracker = IdTracker::new();
        tracker.add_unresolved(&id("missing"), 1);
        tracker.add_unresolved(&id("missing"), 2);
        let left = tracker.take_unresolved();
        assert_eq!(left, vec![(id("missing"), vec![1, 2])]);
        assert!(tracker.take_unresolved().is_empty());
    }

    #[test]
    fn processed_ids_are_not_withheld_again() {
        let mut tracker: IdTracker<u8> = IdTracker::new();
        tracker.associate(&id("a"), PageIndex(0));
        tracker.signal_processed(&id("a"));
        tracker.signal_pending(&id("a"));
        assert!(tracker.is_resolved(&id("a")));
    }
}
