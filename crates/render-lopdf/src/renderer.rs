use crate::painter::{FONT_RESOURCE, LinkSpot, PageContext};
use crate::writer::StreamingPdfWriter;
use folio_layout::{Area, AreaTree, Page};
use folio_render_core::utils::{flip_y, pdf_rect, to_win_ansi};
use folio_render_core::{DocumentInfo, DocumentRenderer, IdLookup, RenderError, render_area_tree};
use folio_types::{PageIndex, Size, Transform, to_pt};
use lopdf::{Dictionary, Object, ObjectId, StringFormat, dictionary};
use std::io::{Cursor, Seek, Write};

const BASE_FONT: &str = "Helvetica";

struct OpenPage {
    index: PageIndex,
    size: Size,
    context: PageContext,
}

/// A PDF renderer using the `lopdf` object model and a streaming writer.
///
/// Page object ids are reserved up front so link annotations can point at
/// pages that have not been written yet.
pub struct LopdfRenderer<W: Write + Seek + Send> {
    writer: Option<StreamingPdfWriter<W>>,
    page_ids: Vec<ObjectId>,
    targets: IdLookup,
    current: Option<OpenPage>,
}

impl<W: Write + Seek + Send> Default for LopdfRenderer<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Seek + Send> LopdfRenderer<W> {
    pub fn new() -> Self {
        Self {
            writer: None,
            page_ids: Vec::new(),
            targets: IdLookup::default(),
            current: None,
        }
    }

    fn writer_mut(&mut self) -> Result<&mut StreamingPdfWriter<W>, RenderError> {
        self.writer
            .as_mut()
            .ok_or(RenderError::Sequence("document not started"))
    }

    fn link_annotations(
        &mut self,
        links: Vec<LinkSpot>,
        page_height: folio_types::Mpt,
    ) -> Result<Vec<ObjectId>, RenderError> {
        let mut annotations = Vec::new();
        for link in links {
            let Some(target) = self.targets.get(&link.target) else {
                log::warn!("Link to unknown id '{}' dropped.", link.target.as_str());
                continue;
            };
            let Some(&target_page) = self.page_ids.get(target.page.get()) else {
                continue;
            };
            let [x, y, w, h] = pdf_rect(&link.rect, page_height);
            let y_dest = flip_y(to_pt(target.y), to_pt(page_height));
            let dest = vec![Object::Reference(target_page), "FitH".into(), y_dest.into()];
            let action = dictionary! { "Type" => "Action", "S" => "GoTo", "D" => dest };
            let writer = self.writer_mut()?;
            let action_id = writer.write_object(action.into())?;
            let annot = dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![x.into(), y.into(), (x + w).into(), (y + h).into()],
                "Border" => vec![0.into(), 0.into(), 0.into()],
                "A" => action_id,
            };
            annotations.push(writer.write_object(annot.into())?);
        }
        Ok(annotations)
    }
}

impl LopdfRenderer<Cursor<Vec<u8>>> {
    /// Renders `tree` into an in-memory PDF file.
    pub fn render_to_vec(tree: &AreaTree, title: Option<String>) -> Result<Vec<u8>, RenderError> {
        let cursor = render_area_tree(tree, title, Box::new(Self::new()), Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }
}

impl<W: Write + Seek + Send> DocumentRenderer<W> for LopdfRenderer<W> {
    fn begin_document(&mut self, writer: W, info: &DocumentInfo) -> Result<(), RenderError> {
        let mut font_dict = Dictionary::new();
        font_dict.set(
            FONT_RESOURCE,
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => BASE_FONT,
                "Encoding" => "WinAnsiEncoding",
            },
        );
        let mut writer = StreamingPdfWriter::new(writer, "1.7", font_dict)?;
        self.page_ids = (0..info.page_count).map(|_| writer.new_object_id()).collect();
        if let Some(title) = &info.title {
            writer.set_info(dictionary! {
                "Title" => Object::String(to_win_ansi(title), StringFormat::Literal),
                "Producer" => Object::string_literal("folio"),
            });
        }
        self.targets = info.targets.clone();
        self.writer = Some(writer);
        Ok(())
    }

    fn start_page(&mut self, page: &Page) -> Result<(), RenderError> {
        if self.current.is_some() {
            return Err(RenderError::Sequence("previous page not ended"));
        }
        self.current = Some(OpenPage {
            index: page.index,
            size: page.size,
            context: PageContext::new(page.size.height),
        });
        Ok(())
    }

    fn paint_area(&mut self, area: &Area, transform: Transform) -> Result<(), RenderError> {
        let page = self
            .current
            .as_mut()
            .ok_or(RenderError::Sequence("no page started"))?;
        page.context.draw_area(area, transform);
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), RenderError> {
        let page = self
            .current
            .take()
            .ok_or(RenderError::Sequence("no page started"))?;
        let page_id = *self
            .page_ids
            .get(page.index.get())
            .ok_or_else(|| RenderError::Other(format!("page {} was not announced", page.index.get())))?;
        let (content, links) = page.context.finish();
        let annotations = self.link_annotations(links, page.size.height)?;

        let writer = self.writer_mut()?;
        let content_id = writer.write_content_stream(content)?;
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => writer.pages_id,
            "MediaBox" => vec![
                0.0.into(),
                0.0.into(),
                to_pt(page.size.width).into(),
                to_pt(page.size.height).into(),
            ],
            "Contents" => content_id,
            "Resources" => writer.resources_id,
        };
        if !annotations.is_empty() {
            page_dict.set(
                "Annots",
                Object::Array(annotations.into_iter().map(Object::Reference).collect()),
            );
        }
        writer.write_object_at_id(page_id, &page_dict.into())?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<W, RenderError> {
        let renderer = *self;
        let mut writer = renderer
            .writer
            .ok_or(RenderError::Sequence("document was never started"))?;
        writer.set_page_ids(renderer.page_ids);
        Ok(writer.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_idf::{Document, FlowNode, InlineNode, NodeMetadata, PageSequence, ParagraphStyle};
    use folio_layout::{FixedMetrics, LayoutConfig, LayoutEngine};
    use folio_style::{PageMaster, PageSize};
    use folio_types::RefId;
    use std::sync::Arc;

    fn render(flow: Vec<FlowNode>) -> lopdf::Document {
        let document = Document {
            title: Some("Test".into()),
            sequences: vec![PageSequence::new("a4", flow)],
            masters: vec![PageMaster::new("a4", PageSize::A4)],
        };
        let tree = LayoutEngine::with_metrics(LayoutConfig::default(), Arc::new(FixedMetrics::default()))
            .layout_document(&document)
            .unwrap()
            .tree;
        let bytes = LopdfRenderer::render_to_vec(&tree, document.title.clone()).unwrap();
        lopdf::Document::load_mem(&bytes).unwrap()
    }

    #[test]
    fn every_page_is_written() {
        let flow = vec![
            FlowNode::paragraph("one"),
            FlowNode::PageBreak {
                class: folio_style::BreakClass::Page,
            },
            FlowNode::paragraph("two"),
        ];
        let pdf = render(flow);
        assert_eq!(pdf.get_pages().len(), 2);
    }

    #[test]
    fn internal_links_become_annotations() {
        let link = FlowNode::Paragraph {
            meta: NodeMetadata::default(),
            style: ParagraphStyle::default(),
            inlines: vec![InlineNode::Link {
                target: RefId::from("end"),
                children: vec![InlineNode::text("jump")],
            }],
        };
        let mut target = FlowNode::paragraph("the end");
        target.meta_mut().unwrap().id = Some(RefId::from("end"));
        let pdf = render(vec![link, target]);

        let pages = pdf.get_pages();
        let first = pages.values().next().copied().unwrap();
        let page = pdf.get_dictionary(first).unwrap();
        let annots = page.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 1);
    }
}
