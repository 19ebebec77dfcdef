//! folio turns a tree of flow objects into paginated output.
//!
//! The heavy lifting lives in the workspace crates; this crate wires them
//! into a [`Formatter`] and ships the command line tool.

pub mod error;
pub mod pipeline;

pub use error::FormatError;
pub use pipeline::{Formatter, FormatterBuilder, FormatterConfig, HandOff, OutputFormat};

pub use folio_idf as idf;
pub use folio_layout as layout;
pub use folio_style as style;
pub use folio_types as types;
