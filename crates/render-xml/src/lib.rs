//! Writes a finished area tree as XML.
//!
//! One element per area with its page-relative rectangle in millipoints,
//! so two layouts can be compared with a plain text diff.

use folio_layout::{Area, AreaKind, AreaTree, InlineArea, Page};
use folio_render_core::{DocumentInfo, DocumentRenderer, RenderError, render_area_tree};
use folio_types::Transform;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Seek, Write};

fn xml_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Xml(err.to_string())
}

pub struct XmlRenderer<W: Write + Seek + Send> {
    writer: Option<Writer<W>>,
    pages: usize,
}

impl<W: Write + Seek + Send> Default for XmlRenderer<W> {
    fn default() -> Self {
        Self {
            writer: None,
            pages: 0,
        }
    }
}

impl<W: Write + Seek + Send> XmlRenderer<W> {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.writer
            .as_mut()
            .ok_or(RenderError::Sequence("document not started"))?
            .write_event(event)
            .map_err(xml_error)
    }

    fn emit_inline(&mut self, inline: &InlineArea) -> Result<(), RenderError> {
        let name = match inline {
            InlineArea::Text { .. } => "text",
            InlineArea::Citation { .. } => "citation",
        };
        let mut element = BytesStart::new(name);
        match inline {
            InlineArea::Text { link: Some(link), .. } => {
                element.push_attribute(("link", link.as_str()));
            }
            InlineArea::Citation { target, last, .. } => {
                element.push_attribute(("target", target.as_str()));
                if *last {
                    element.push_attribute(("last", "true"));
                }
            }
            _ => {}
        }
        element.push_attribute(("x", inline.x().to_string().as_str()));
        element.push_attribute(("size", inline.font_size().to_string().as_str()));
        self.emit(Event::Start(element))?;
        self.emit(Event::Text(BytesText::new(inline.text())))?;
        self.emit(Event::End(BytesEnd::new(name)))
    }
}

impl XmlRenderer<Cursor<Vec<u8>>> {
    pub fn render_to_string(tree: &AreaTree, title: Option<String>) -> Result<String, RenderError> {
        let cursor = render_area_tree(tree, title, Box::new(Self::new()), Cursor::new(Vec::new()))?;
        String::from_utf8(cursor.into_inner()).map_err(xml_error)
    }
}

impl<W: Write + Seek + Send> DocumentRenderer<W> for XmlRenderer<W> {
    fn begin_document(&mut self, writer: W, info: &DocumentInfo) -> Result<(), RenderError> {
        self.writer = Some(Writer::new_with_indent(writer, b' ', 2));
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("area-tree");
        root.push_attribute(("pages", info.page_count.to_string().as_str()));
        if let Some(title) = &info.title {
            root.push_attribute(("title", title.as_str()));
        }
        self.emit(Event::Start(root))
    }

    fn start_page(&mut self, page: &Page) -> Result<(), RenderError> {
        let mut element = BytesStart::new("page");
        element.push_attribute(("index", page.index.get().to_string().as_str()));
        element.push_attribute(("number", page.number.to_string().as_str()));
        element.push_attribute(("master", page.master.as_str()));
        element.push_attribute(("width", page.size.width.to_string().as_str()));
        element.push_attribute(("height", page.size.height.to_string().as_str()));
        if page.blank {
            element.push_attribute(("blank", "true"));
        }
        self.pages += 1;
        self.emit(Event::Start(element))
    }

    fn paint_area(&mut self, area: &Area, transform: Transform) -> Result<(), RenderError> {
        let rect = area.rect.transformed(transform);
        let mut element = BytesStart::new(area.kind.name());
        match &area.kind {
            AreaKind::Region(kind) => element.push_attribute(("kind", kind.as_str())),
            AreaKind::Column(index) => {
                element.push_attribute(("index", index.to_string().as_str()))
            }
            _ => {}
        }
        for (name, value) in [
            ("x", rect.x),
            ("y", rect.y),
            ("width", rect.width),
            ("height", rect.height),
        ] {
            element.push_attribute((name, value.to_string().as_str()));
        }
        if let Some(id) = &area.id {
            element.push_attribute(("id", id.as_str()));
        }
        if !area.borders.is_empty() {
            let sides: Vec<&str> = ["before", "end", "after", "start"]
                .into_iter()
                .zip(area.borders.sides())
                .filter_map(|(name, side)| side.map(|_| name))
                .collect();
            element.push_attribute(("borders", sides.join(" ").as_str()));
        }
        self.emit(Event::Start(element))?;
        if let AreaKind::Line { inlines } = &area.kind {
            for inline in inlines {
                self.emit_inline(inline)?;
            }
        }
        Ok(())
    }

    fn end_area(&mut self, area: &Area) -> Result<(), RenderError> {
        self.emit(Event::End(BytesEnd::new(area.kind.name())))
    }

    fn end_page(&mut self) -> Result<(), RenderError> {
        self.emit(Event::End(BytesEnd::new("page")))
    }

    fn finish(self: Box<Self>) -> Result<W, RenderError> {
        let mut renderer = *self;
        renderer.emit(Event::End(BytesEnd::new("area-tree")))?;
        let writer = renderer
            .writer
            .take()
            .ok_or(RenderError::Sequence("document not started"))?;
        let mut inner = writer.into_inner();
        inner.flush()?;
        log::debug!("Area tree dump written for {} pages", renderer.pages);
        Ok(inner)
    }
}
