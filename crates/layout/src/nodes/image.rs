use super::block::wrap_block;
use super::builder::TreeBuilder;
use super::{Frame, LayoutNode, NodeTree, Placement, RenderNode};
use crate::LayoutError;
use crate::area::{Area, AreaKind};
use crate::assembler::areas::AreaContext;
use crate::elements::{Element, Position};
use folio_idf::{FlowNode, NodeMetadata};
use folio_types::{Mpt, OwnerHandle, Rect};

/// Index of the box carrying the image itself.
const CONTENT_INDEX: usize = 0;

/// A replaced object of fixed size. It never breaks.
#[derive(Debug, Clone)]
pub struct ImageNode {
    meta: NodeMetadata,
    frame: Frame,
    width: Mpt,
    height: Mpt,
}

impl ImageNode {
    pub fn build(
        node: &FlowNode,
        _builder: &mut TreeBuilder<'_>,
        _handle: OwnerHandle,
        available: Mpt,
    ) -> Result<RenderNode, LayoutError> {
        let FlowNode::Image {
            meta,
            width,
            height,
        } = node
        else {
            return Err(LayoutError::BuilderMismatch("Image", node.kind().as_str()));
        };
        let mut frame = Frame::from_meta(meta, available);
        let decorated = width.mpt() + frame.width - frame.content_width();
        if decorated > available {
            log::warn!(
                "Image of {}pt is wider than the {}pt available; it will overflow",
                folio_types::to_pt(width.mpt()),
                folio_types::to_pt(available)
            );
        }
        frame.width = decorated;
        Ok(RenderNode::Image(Self {
            meta: meta.clone(),
            frame,
            width: width.mpt(),
            height: height.mpt(),
        }))
    }
}

impl LayoutNode for ImageNode {
    fn kind(&self) -> &'static str {
        "image"
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
        let content = Element::boxed(self.height, Some(Position::new(handle, CONTENT_INDEX)));
        Ok(wrap_block(&self.meta, &self.frame, handle, vec![content]))
    }

    fn build_area(
        &self,
        index: usize,
        placement: Placement,
        _ctx: &mut AreaContext<'_>,
    ) -> Result<Option<Area>, LayoutError> {
        if index != CONTENT_INDEX {
            return Ok(None);
        }
        let rect = Rect::new(placement.x, placement.y, self.width, self.height);
        Ok(Some(Area::new(AreaKind::Image, rect)))
    }
}
