//! Page masters: page geometry, region extents and column layout.

use crate::dimension::{Edges, Length, PageSize};
use crate::text::DisplayAlign;
use folio_types::{Mpt, Rect, Size};
use serde::{Deserialize, Deserializer, Serialize};

fn one() -> u32 {
    1
}

/// A simple page master: the page size, its margins, the extents of the
/// optional before/after regions and the body's column layout.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageMaster {
    pub name: String,
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub margins: Edges,
    /// Extent of the header region, carved out of the top of the content rectangle.
    #[serde(default)]
    pub region_before: Length,
    /// Extent of the footer region.
    #[serde(default)]
    pub region_after: Length,
    #[serde(default = "one")]
    pub columns: u32,
    #[serde(default)]
    pub column_gap: Length,
    #[serde(default)]
    pub display_align: DisplayAlign,
}

impl PageMaster {
    pub fn new(name: impl Into<String>, size: PageSize) -> Self {
        Self {
            name: name.into(),
            size,
            margins: Edges::default(),
            region_before: Length::ZERO,
            region_after: Length::ZERO,
            columns: 1,
            column_gap: Length::ZERO,
            display_align: DisplayAlign::Before,
        }
    }

    pub fn page_size(&self) -> Size {
        self.size.dimensions()
    }

    /// The rectangle inside the page margins.
    pub fn content_rect(&self) -> Rect {
        let size = self.page_size();
        Rect::new(
            self.margins.start.mpt(),
            self.margins.before.mpt(),
            (size.width - self.margins.inline()).max(0),
            (size.height - self.margins.block()).max(0),
        )
    }

    /// The body region: the content rectangle minus the before/after regions.
    pub fn body_rect(&self) -> Rect {
        let content = self.content_rect();
        let before = self.region_before.mpt();
        let after = self.region_after.mpt();
        Rect::new(
            content.x,
            content.y + before,
            content.width,
            (content.height - before - after).max(0),
        )
    }

    pub fn before_rect(&self) -> Option<Rect> {
        let content = self.content_rect();
        (self.region_before.mpt() > 0)
            .then(|| Rect::new(content.x, content.y, content.width, self.region_before.mpt()))
    }

    pub fn after_rect(&self) -> Option<Rect> {
        let content = self.content_rect();
        let extent = self.region_after.mpt();
        (extent > 0).then(|| {
            Rect::new(
                content.x,
                content.bottom() - extent,
                content.width,
                extent,
            )
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.max(1) as usize
    }

    pub fn column_width(&self) -> Mpt {
        let n = self.column_count() as Mpt;
        let gaps = self.column_gap.mpt() * (n - 1);
        ((self.body_rect().width - gaps) / n).max(0)
    }

    /// Rectangle of column `index`, relative to the body region.
    pub fn column_rect(&self, index: usize) -> Rect {
        let width = self.column_width();
        let x = (width + self.column_gap.mpt()) * index as Mpt;
        Rect::new(x, 0, width, self.body_rect().height)
    }
}

/// Selects page masters by position within a page sequence.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SequenceMasters {
    pub rest: String,
    pub first: Option<String>,
    pub odd: Option<String>,
    pub even: Option<String>,
    pub blank: Option<String>,
}

impl SequenceMasters {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            rest: name.into(),
            ..Default::default()
        }
    }

    /// Name of the master for a page. `first` wins for the first page of the
    /// sequence, `blank` for inserted blank pages, then odd/even by number.
    pub fn select(&self, page_number: u32, first_in_sequence: bool, blank: bool) -> &str {
        let chosen = if blank {
            self.blank.as_ref()
        } else if first_in_sequence && self.first.is_some() {
            self.first.as_ref()
        } else if page_number % 2 == 1 {
            self.odd.as_ref()
        } else {
            self.even.as_ref()
        };
        chosen.unwrap_or(&self.rest)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.rest.as_str()).chain(
            [&self.first, &self.odd, &self.even, &self.blank]
                .into_iter()
                .filter_map(|name| name.as_deref()),
        )
    }
}

impl<'de> Deserialize<'de> for SequenceMasters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum MastersDef {
            Single(String),
            Alternatives {
                rest: String,
                #[serde(default)]
                first: Option<String>,
                #[serde(default)]
                odd: Option<String>,
                #[serde(default)]
                even: Option<String>,
                #[serde(default)]
                blank: Option<String>,
            },
        }

        Ok(match MastersDef::deserialize(deserializer)? {
            MastersDef::Single(name) => SequenceMasters::single(name),
            MastersDef::Alternatives {
                rest,
                first,
                odd,
                even,
                blank,
            } => SequenceMasters {
                rest,
                first,
                odd,
                even,
                blank,
            },
        })
    }
}
