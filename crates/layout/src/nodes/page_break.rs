use super::builder::TreeBuilder;
use super::{Frame, LayoutNode, NodeTree, RenderNode};
use crate::LayoutError;
use crate::elements::Element;
use folio_idf::{FlowNode, NodeMetadata};
use folio_style::BreakClass;
use folio_types::{Mpt, OwnerHandle};

/// An explicit break: a single forced penalty and nothing to place.
#[derive(Debug, Clone)]
pub struct PageBreakNode {
    class: BreakClass,
    meta: NodeMetadata,
}

impl PageBreakNode {
    pub fn build(
        node: &FlowNode,
        _builder: &mut TreeBuilder<'_>,
        _handle: OwnerHandle,
        _width: Mpt,
    ) -> Result<RenderNode, LayoutError> {
        let FlowNode::PageBreak { class } = node else {
            return Err(LayoutError::BuilderMismatch(
                "PageBreak",
                node.kind().as_str(),
            ));
        };
        Ok(RenderNode::PageBreak(Self {
            class: *class,
            meta: NodeMetadata::default(),
        }))
    }
}

impl LayoutNode for PageBreakNode {
    fn kind(&self) -> &'static str {
        "page-break"
    }

    fn meta(&self) -> &NodeMetadata {
        &self.meta
    }

    fn frame(&self) -> Frame {
        Frame::default()
    }

    fn collect_elements(
        &self,
        _tree: &NodeTree,
        _handle: OwnerHandle,
    ) -> Result<Vec<Element>, LayoutError> {
        let class = if self.class.is_auto() {
            BreakClass::Page
        } else {
            self.class
        };
        Ok(vec![Element::forced_break(class)])
    }
}
