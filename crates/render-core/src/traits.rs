use crate::error::RenderError;
use crate::lookup::IdLookup;
use folio_layout::{Area, Page};
use folio_types::Transform;
use std::io::{Seek, Write};

/// What a renderer learns about the document before the first page.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub page_count: usize,
    pub targets: IdLookup,
}

/// A trait for document renderers, abstracting the output primitives.
///
/// Calls arrive in document order: `begin_document`, then for every page
/// `start_page`, one `paint_area`/`end_area` pair per area in painting
/// order, `end_page`; finally `finish`.
pub trait DocumentRenderer<W: Write + Seek + Send> {
    fn begin_document(&mut self, writer: W, info: &DocumentInfo) -> Result<(), RenderError>;

    fn start_page(&mut self, page: &Page) -> Result<(), RenderError>;

    /// `transform` maps `area.rect` to page coordinates.
    fn paint_area(&mut self, area: &Area, transform: Transform) -> Result<(), RenderError>;

    /// Called once all children of `area` have been painted.
    fn end_area(&mut self, _area: &Area) -> Result<(), RenderError> {
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), RenderError>;

    fn finish(self: Box<Self>) -> Result<W, RenderError>;
}
