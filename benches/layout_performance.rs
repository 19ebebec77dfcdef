//! Layout engine micro-benchmarks
//!
//! Measures breaking and page assembly for plain text flows, tables and
//! documents full of forward citations.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use folio::idf::{
    ColumnWidth, Document, FlowNode, InlineNode, NodeMetadata, PageSequence, ParagraphStyle,
    TableCell, TableRow,
};
use folio::layout::{LayoutConfig, LayoutEngine};
use folio::style::{PageMaster, PageSize};
use folio::types::RefId;
use std::hint::black_box;

fn document(flow: Vec<FlowNode>) -> Document {
    Document {
        title: None,
        masters: vec![PageMaster::new("a4", PageSize::A4)],
        sequences: vec![PageSequence::new("a4", flow)],
    }
}

fn paragraphs(count: usize) -> Vec<FlowNode> {
    (0..count)
        .map(|n| {
            FlowNode::paragraph(format!(
                "Paragraph {n} has enough words in it to wrap over a few lines of an A4 page \
                 so that the line breaker and the page breaker both have real work to do."
            ))
        })
        .collect()
}

fn table(rows: usize) -> FlowNode {
    let cell = |text: String| TableCell::new(vec![FlowNode::paragraph(text)]);
    FlowNode::Table {
        meta: NodeMetadata::default(),
        columns: vec![ColumnWidth::Proportional(1.0); 3],
        header: vec![TableRow {
            cells: (1..=3).map(|c| cell(format!("Col {c}"))).collect(),
            ..Default::default()
        }],
        body: (0..rows)
            .map(|r| TableRow {
                cells: (1..=3).map(|c| cell(format!("Row {r} cell {c}"))).collect(),
                ..Default::default()
            })
            .collect(),
        footer: vec![],
        repeat: true,
    }
}

fn cited(count: usize) -> Vec<FlowNode> {
    let mut flow: Vec<FlowNode> = (0..count)
        .map(|n| FlowNode::Paragraph {
            meta: NodeMetadata::default(),
            style: ParagraphStyle::default(),
            inlines: vec![
                InlineNode::text("see page"),
                InlineNode::PageCitation {
                    target: RefId::from(format!("t{n}").as_str()),
                    last: false,
                },
            ],
        })
        .collect();
    for n in 0..count {
        let mut target = FlowNode::paragraph(format!("target {n}"));
        if let Some(meta) = target.meta_mut() {
            meta.id = Some(RefId::from(format!("t{n}").as_str()));
        }
        flow.push(target);
    }
    flow
}

fn benchmark_layout_paragraphs(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_paragraphs");
    let engine = LayoutEngine::new(LayoutConfig::default());
    for count in [10, 100, 500] {
        let doc = document(paragraphs(count));
        group.bench_with_input(BenchmarkId::new("paragraphs", count), &doc, |b, doc| {
            b.iter(|| black_box(engine.layout_document(doc)))
        });
    }
    group.finish();
}

fn benchmark_layout_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_tables");
    let engine = LayoutEngine::new(LayoutConfig::default());
    for rows in [10, 100, 500] {
        let doc = document(vec![table(rows)]);
        group.bench_with_input(BenchmarkId::new("rows", rows), &doc, |b, doc| {
            b.iter(|| black_box(engine.layout_document(doc)))
        });
    }
    group.finish();
}

fn benchmark_forward_references(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_references");
    let engine = LayoutEngine::new(LayoutConfig::default());
    for count in [50, 500] {
        let doc = document(cited(count));
        group.bench_with_input(BenchmarkId::new("citations", count), &doc, |b, doc| {
            b.iter(|| black_box(engine.layout_document(doc)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_layout_paragraphs,
    benchmark_layout_tables,
    benchmark_forward_references
);
criterion_main!(benches);
