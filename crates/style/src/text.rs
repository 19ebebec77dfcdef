use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
    Justify,
}

/// Alignment of content in the block-progression direction of a region.
/// `Justify` spreads leftover space over the adjustable spaces of a page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayAlign {
    #[default]
    Before,
    Center,
    After,
    Justify,
}
