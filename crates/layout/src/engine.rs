use crate::LayoutError;
use crate::area_tree::{AreaTree, AreaTreeModel, UnresolvedReport};
use crate::assembler::{PageBreaker, PageProvider};
use crate::config::LayoutConfig;
use crate::nodes::TreeBuilder;
use crate::text::{Base14Metrics, TextMetrics};
use folio_idf::{Document, PageSequence};
use folio_style::PageMaster;
use std::sync::Arc;

/// What a finished layout run hands to the renderers.
#[derive(Debug, Clone)]
pub struct LayoutOutput {
    pub tree: AreaTree,
    pub unresolved: UnresolvedReport,
}

/// Entry point of the layout core. Cheap to clone; holds no per-document
/// state.
#[derive(Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    metrics: Arc<dyn TextMetrics>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self::with_metrics(config, Arc::new(Base14Metrics))
    }

    pub fn with_metrics(config: LayoutConfig, metrics: Arc<dyn TextMetrics>) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Starts a document that receives its page sequences one at a time.
    pub fn start(&self) -> LayoutSession<'_> {
        LayoutSession {
            engine: self,
            model: AreaTreeModel::new(),
            next_number: 1,
            sequences: 0,
        }
    }

    pub fn layout_document(&self, document: &Document) -> Result<LayoutOutput, LayoutError> {
        let mut session = self.start();
        for sequence in &document.sequences {
            session.layout_sequence(&document.masters, sequence)?;
        }
        Ok(session.finish())
    }
}

/// Layout state carried from one page sequence to the next: the pages, the
/// id tracker and the running page number.
pub struct LayoutSession<'e> {
    engine: &'e LayoutEngine,
    model: AreaTreeModel,
    next_number: u32,
    sequences: usize,
}

impl LayoutSession<'_> {
    pub fn layout_sequence(
        &mut self,
        masters: &[PageMaster],
        sequence: &PageSequence,
    ) -> Result<(), LayoutError> {
        let provider =
            PageProvider::new(&sequence.masters, |name| masters.iter().find(|m| m.name == name))?;
        let first_number = sequence.initial_page_number.unwrap_or(self.next_number);
        let width = provider.text_width();
        let (tree, root) = TreeBuilder::new(self.engine.metrics.as_ref(), self.engine.config)
            .build_flow(&sequence.flow, width)?;
        log::debug!(
            "Sequence {}: {} nodes, first folio {}",
            self.sequences,
            tree.len(),
            first_number
        );
        self.next_number = PageBreaker::new(
            sequence,
            &provider,
            &tree,
            root,
            self.engine.config,
            self.engine.metrics.as_ref(),
            &mut self.model,
            first_number,
        )
        .run()?;
        self.sequences += 1;
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.model.page_count()
    }

    pub fn finish(self) -> LayoutOutput {
        let (tree, unresolved) = self.model.finish();
        log::info!(
            "Layout finished: {} sequence(s), {} page(s), {} unresolved reference(s)",
            self.sequences,
            tree.page_count(),
            unresolved.references.len()
        );
        LayoutOutput { tree, unresolved }
    }
}
