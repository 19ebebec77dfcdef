use folio_types::OwnerHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Internal layout error: {0}")]
    Internal(String),
    #[error("Builder mismatch: Expected {0} node, got {1}.")]
    BuilderMismatch(&'static str, &'static str),
    #[error("State mismatch: Expected state for {0}, got {1}.")]
    StateMismatch(&'static str, &'static str),
    #[error("Unknown page master '{0}'.")]
    UnknownMaster(String),
    #[error("Invalid table: {0}")]
    InvalidTable(String),
    #[error("Unknown layout node {0:?}.")]
    UnknownNode(OwnerHandle),
}

// Element model and the algorithms working on it
pub mod algorithms;
pub mod config;
pub mod elements;

// Flow tree to elements, elements to areas
pub mod assembler;
pub mod nodes;
pub mod text;

// Output and forward references
pub mod area;
pub mod area_tree;
pub mod resolution;

pub(crate) mod engine;
pub use self::engine::{LayoutEngine, LayoutOutput, LayoutSession};

// Re-exports for convenience
pub use self::area::{Area, AreaKind, InlineArea, Page, RegionKind};
pub use self::area_tree::{AreaTree, UnresolvedReference, UnresolvedReport};
pub use self::config::{BreakingMode, LayoutConfig};
pub use self::elements::{BlockSequence, Element, GlueKind, INFINITE, Position};
pub use self::text::{FixedMetrics, TextMetrics};

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod pagination_test;
#[cfg(test)]
mod table_test;
