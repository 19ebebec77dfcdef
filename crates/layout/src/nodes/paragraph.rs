use super::block::wrap_block;
use super::builder::TreeBuilder;
use super::{Frame, LayoutNode, NodeTree, Placement, RenderNode};
use crate::LayoutError;
use crate::area::{Area, AreaKind, InlineArea};
use crate::assembler::areas::AreaContext;
use crate::elements::{Element, GlueKind, INFINITE, Position};
use crate::text::{CITATION_PLACEHOLDER, LineItem, LineLayout, break_lines};
use folio_idf::{FlowNode, NodeMetadata, ParagraphStyle};
use folio_types::{Mpt, OwnerHandle};

/// A paragraph broken into lines at build time. Each line is one box.
#[derive(Debug, Clone)]
pub struct ParagraphNode {
    meta: NodeMetadata,
    frame: Frame,
    style: ParagraphStyle,
    lines: Vec<LineLayout>,
}

impl ParagraphNode {
    pub fn build(
        node: &FlowNode,
        builder: &mut TreeBuilder<'_>,
        _handle: OwnerHandle,
        width: Mpt,
    ) -> Result<RenderNode, LayoutError> {
        let FlowNode::Paragraph {
            meta,
            style,
            inlines,
        } = node
        else {
            return Err(LayoutError::BuilderMismatch(
                "Paragraph",
                node.kind().as_str(),
            ));
        };
        let frame = Frame::from_meta(meta, width);
        let lines = break_lines(
            inlines,
            style,
            frame.content_width(),
            builder.metrics(),
            builder.config(),
        )?;
        log::trace!("Paragraph broken into {} lines", lines.len());
        Ok(RenderNode::Paragraph(Self {
            meta: meta.clone(),
            frame,
            style: style.clone(),
            lines,
        }))
    }

    pub fn lines(&self) -> &[LineLayout] {
        &self.lines
    }

    /// Cost of breaking before line `line`: forbidden while fewer than
    /// `orphans` lines precede it or fewer than `widows` follow.
    fn line_break_cost(&self, line: usize) -> i32 {
        let count = self.lines.len();
        if line < self.style.orphans as usize || count - line < self.style.widows as usize {
            INFINITE
        } else {
            0
        }
    }
}

impl LayoutNode for ParagraphNode {
    fn kind(&self) -> &'static str {
        "paragraph"
    }

    fn meta(&self) -> &NodeMetadata {
        &self.meta
    }

    fn frame(&self) -> Frame {
        self.frame
    }

    fn collect_elements(
        &self,
        _tree: &NodeTree,
        handle: OwnerHandle,
    ) -> Result<Vec<Element>, LayoutError> {
        let line_height = self.style.resolved_line_height().mpt();
        let adjust = self.style.line_height_adjust.mpt();
        let mut inner = Vec::with_capacity(self.lines.len() * 3);
        for i in 0..self.lines.len() {
            if i > 0 {
                inner.push(Element::penalty(self.line_break_cost(i)));
                if adjust > 0 {
                    inner.push(
                        Element::glue(0, adjust, adjust)
                            .with_kind(GlueKind::LineHeight)
                            .with_position(Position::new(handle, i)),
                    );
                }
            }
            inner.push(Element::boxed(line_height, Some(Position::new(handle, i))));
        }
        Ok(wrap_block(&self.meta, &self.frame, handle, inner))
    }

    /// Line glue never shrinks a line below its font size.
    fn negotiate_adjustment(&self, amount: Mpt, element: &Element) -> Mpt {
        let shrink = match element {
            Element::Glue {
                kind: GlueKind::LineHeight,
                shrink,
                ..
            } => {
                let room = self.style.resolved_line_height().mpt() - self.style.font_size.mpt();
                (*shrink).min(room.max(0))
            }
            _ => element.shrink(),
        };
        amount.clamp(-shrink, element.stretch())
    }

    fn build_area(
        &self,
        index: usize,
        placement: Placement,
        ctx: &mut AreaContext<'_>,
    ) -> Result<Option<Area>, LayoutError> {
        let Some(line) = self.lines.get(index) else {
            return Ok(None);
        };
        let font_size = self.style.font_size.mpt();
        let inlines = line
            .items
            .iter()
            .map(|item| match item {
                LineItem::Text {
                    x,
                    width,
                    text,
                    link,
                } => InlineArea::Text {
                    x: *x,
                    width: *width,
                    text: text.clone(),
                    font_size,
                    link: link.clone(),
                },
                LineItem::Citation {
                    x,
                    width,
                    target,
                    last,
                } => InlineArea::Citation {
                    x: *x,
                    width: *width,
                    slot: ctx.page.register_citation(target.clone(), *last),
                    target: target.clone(),
                    last: *last,
                    text: CITATION_PLACEHOLDER.to_string(),
                    font_size,
                },
            })
            .collect();
        Ok(Some(Area::new(AreaKind::Line { inlines }, placement.rect())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_tree;
    use folio_idf::InlineNode;
    use folio_style::Length;

    fn five_lines(adjust: f32) -> FlowNode {
        let mut inlines = Vec::new();
        for word in ["one", "two", "three", "four", "five"] {
            if !inlines.is_empty() {
                inlines.push(InlineNode::LineBreak);
            }
            inlines.push(InlineNode::text(word));
        }
        FlowNode::Paragraph {
            meta: NodeMetadata::default(),
            style: ParagraphStyle {
                font_size: Length::pt(10.0),
                line_height_adjust: Length::pt(adjust),
                ..Default::default()
            },
            inlines,
        }
    }

    #[test]
    fn lines_are_boxes_guarded_by_widows_and_orphans() {
        let (tree, root) = build_tree(vec![five_lines(0.0)]);
        let elements = tree.collect(root).unwrap();
        let boxes: Vec<_> = elements.iter().filter(|e| e.is_box()).collect();
        assert_eq!(boxes.len(), 5);
        assert!(boxes.iter().all(|b| b.width() == 12_000));
        let costs: Vec<_> = elements.iter().filter_map(Element::penalty_cost).collect();
        assert_eq!(costs, vec![INFINITE, 0, 0, INFINITE]);
    }

    #[test]
    fn line_height_ranges_become_line_glue() {
        let (tree, root) = build_tree(vec![five_lines(1.0)]);
        let elements = tree.collect(root).unwrap();
        let glues: Vec<_> = elements
            .iter()
            .filter(|e| matches!(e, Element::Glue { kind: GlueKind::LineHeight, .. }))
            .collect();
        assert_eq!(glues.len(), 4);
        assert!(glues.iter().all(|g| g.stretch() == 1_000 && g.shrink() == 1_000));
    }

    #[test]
    fn lines_do_not_shrink_below_their_font_size() {
        use crate::algorithms::justify::AdjustmentNegotiator;

        let (tree, root) = build_tree(vec![five_lines(3.0)]);
        let elements = tree.collect(root).unwrap();
        let glue = elements
            .iter()
            .find(|e| matches!(e, Element::Glue { kind: GlueKind::LineHeight, .. }))
            .unwrap();
        // 12pt lines of 10pt text leave 2pt to give up.
        assert_eq!(tree.negotiate(glue, -3_000), -2_000);
        assert_eq!(tree.negotiate(glue, 3_000), 3_000);
    }
}
