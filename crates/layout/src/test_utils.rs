use crate::area::{AreaKind, Page};
use crate::config::LayoutConfig;
use crate::engine::{LayoutEngine, LayoutOutput};
use crate::nodes::{NodeTree, TreeBuilder};
use crate::text::FixedMetrics;
use folio_idf::{Document, FlowNode, PageSequence};
use folio_style::{Edges, Length, PageMaster, PageSize};
use folio_types::{Mpt, OwnerHandle};
use std::sync::Arc;

/// Width flows are built at when no page master is involved.
pub const TEST_WIDTH: Mpt = 400_000;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a flow with fixed-advance metrics at [`TEST_WIDTH`].
pub fn build_tree(flow: Vec<FlowNode>) -> (NodeTree, OwnerHandle) {
    init_logger();
    let metrics = FixedMetrics::default();
    TreeBuilder::new(&metrics, LayoutConfig::default())
        .build_flow(&flow, TEST_WIDTH)
        .unwrap()
}

/// A page master whose body is exactly `body_height` points tall and 400pt
/// wide.
pub fn test_master(name: &str, body_height: f32) -> PageMaster {
    let mut master = PageMaster::new(name, PageSize::Custom {
        width: Length::pt(400.0),
        height: Length::pt(body_height),
    });
    master.margins = Edges::default();
    master
}

pub fn test_document(master: PageMaster, flow: Vec<FlowNode>) -> Document {
    Document {
        title: None,
        sequences: vec![PageSequence::new(master.name.clone(), flow)],
        masters: vec![master],
    }
}

pub fn test_engine() -> LayoutEngine {
    init_logger();
    LayoutEngine::with_metrics(LayoutConfig::default(), Arc::new(FixedMetrics::default()))
}

pub fn layout(document: &Document) -> LayoutOutput {
    test_engine().layout_document(document).unwrap()
}

/// Paragraphs of one line each.
pub fn lines(count: usize) -> Vec<FlowNode> {
    (0..count)
        .map(|n| FlowNode::paragraph(format!("line {n}")))
        .collect()
}

/// The text of every line on `page`, top to bottom.
pub fn page_texts(page: &Page) -> Vec<String> {
    let mut lines: Vec<(Mpt, Mpt, String)> = page
        .absolute_areas()
        .into_iter()
        .filter_map(|(rect, area)| match &area.kind {
            AreaKind::Line { inlines } => Some((
                rect.y,
                rect.x,
                inlines
                    .iter()
                    .map(|i| i.text())
                    .collect::<Vec<_>>()
                    .join(" "),
            )),
            _ => None,
        })
        .collect();
    lines.sort();
    lines.into_iter().map(|(_, _, text)| text).collect()
}
