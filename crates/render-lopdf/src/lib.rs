//! PDF renderer for folio area trees.
//!
//! Page content is streamed to the writer as each page ends; only the small
//! document-level dictionaries are buffered until `finish`.

mod painter;
mod renderer;
mod writer;

pub use renderer::LopdfRenderer;
pub use writer::StreamingPdfWriter;
