use folio_layout::AreaTree;
use folio_types::{Mpt, PageIndex, RefId, Transform};
use std::collections::HashMap;

/// Where a link to an identifier should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTarget {
    pub page: PageIndex,
    /// Top of the first area carrying the id, in page coordinates.
    pub y: Mpt,
}

/// First placement of every identifier in an area tree.
#[derive(Debug, Clone, Default)]
pub struct IdLookup {
    targets: HashMap<RefId, LinkTarget>,
}

impl IdLookup {
    pub fn from_tree(tree: &AreaTree) -> Self {
        let mut targets = HashMap::new();
        for (id, pages) in tree.locations() {
            let Some(&first) = pages.first() else {
                continue;
            };
            let Some(page) = tree.pages().get(first.get()) else {
                continue;
            };
            let mut top = None;
            for region in page.areas() {
                region.walk(Transform::identity(), &mut |area, t| {
                    if top.is_none() && area.id.as_ref() == Some(id) {
                        top = Some(area.rect.transformed(t).y);
                    }
                });
            }
            targets.insert(
                id.clone(),
                LinkTarget {
                    page: first,
                    y: top.unwrap_or(0),
                },
            );
        }
        Self { targets }
    }

    pub fn get(&self, id: &RefId) -> Option<LinkTarget> {
        self.targets.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
