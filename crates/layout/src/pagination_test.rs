use crate::area::{AreaKind, RegionKind};
use crate::test_utils::{layout, lines, page_texts, test_document, test_master};
use folio_idf::{FlowNode, Marker, PageSequence, RetrievePosition, StaticNode};
use folio_style::{BreakClass, Keep, Length};

// Five 14.4pt lines fill a 72pt body exactly.
const FIVE_LINES: f32 = 72.0;

fn with_marker(mut node: FlowNode, text: &str) -> FlowNode {
    if let Some(meta) = node.meta_mut() {
        meta.markers.push(Marker {
            class_name: "section".into(),
            text: text.into(),
        });
    }
    node
}

#[test]
fn flow_fills_pages_in_order() {
    let output = layout(&test_document(test_master("m", FIVE_LINES), lines(12)));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 3);
    assert_eq!(page_texts(&pages[0]).len(), 5);
    assert_eq!(page_texts(&pages[1]).len(), 5);
    assert_eq!(page_texts(&pages[2]), vec!["line 10", "line 11"]);
    assert_eq!(page_texts(&pages[1])[0], "line 5");
    let numbers: Vec<u32> = pages.iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn empty_flow_still_produces_a_page() {
    let output = layout(&test_document(test_master("m", FIVE_LINES), vec![]));
    assert_eq!(output.tree.page_count(), 1);
}

#[test]
fn page_breaks_start_a_new_page() {
    let flow = vec![
        FlowNode::paragraph("before"),
        FlowNode::PageBreak {
            class: BreakClass::Page,
        },
        FlowNode::paragraph("after"),
    ];
    let output = layout(&test_document(test_master("m", FIVE_LINES), flow));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(page_texts(&pages[0]), vec!["before"]);
    assert_eq!(page_texts(&pages[1]), vec!["after"]);
}

#[test]
fn odd_page_starts_insert_a_blank_page() {
    let mut chapter = FlowNode::paragraph("chapter");
    chapter.meta_mut().unwrap().break_before = BreakClass::OddPage;
    let flow = vec![FlowNode::paragraph("preface"), chapter];
    let output = layout(&test_document(test_master("m", FIVE_LINES), flow));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 3);
    assert!(pages[1].blank);
    assert!(page_texts(&pages[1]).is_empty());
    assert_eq!(pages[2].number, 3);
    assert_eq!(page_texts(&pages[2]), vec!["chapter"]);
}

#[test]
fn even_page_start_on_an_even_folio_needs_no_blank() {
    let mut chapter = FlowNode::paragraph("chapter");
    chapter.meta_mut().unwrap().break_before = BreakClass::EvenPage;
    let flow = vec![FlowNode::paragraph("preface"), chapter];
    let output = layout(&test_document(test_master("m", FIVE_LINES), flow));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 2);
    assert!(!pages.iter().any(|p| p.blank));
}

#[test]
fn forced_breaks_give_the_same_pages_every_time() {
    let flow = || {
        let mut flow = lines(3);
        flow.push(FlowNode::PageBreak {
            class: BreakClass::Page,
        });
        flow.extend(lines(7));
        flow
    };
    let first = layout(&test_document(test_master("m", FIVE_LINES), flow()));
    let second = layout(&test_document(test_master("m", FIVE_LINES), flow()));
    assert_eq!(first.tree.page_count(), 3);
    assert_eq!(first.tree, second.tree);
}

#[test]
fn more_content_never_means_fewer_pages() {
    let mut previous = 0;
    for count in [1, 4, 5, 6, 11, 23] {
        let pages = layout(&test_document(test_master("m", FIVE_LINES), lines(count)))
            .tree
            .page_count();
        assert!(pages >= previous, "{count} lines gave {pages} pages");
        previous = pages;
    }
}

#[test]
fn columns_fill_before_pages() {
    let mut master = test_master("m", FIVE_LINES);
    master.columns = 2;
    let output = layout(&test_document(master, lines(10)));
    assert_eq!(output.tree.page_count(), 1);
    let page = &output.tree.pages()[0];
    let per_column: Vec<usize> = page
        .body()
        .children
        .iter()
        .map(|column| {
            let mut count = 0;
            column.walk(folio_types::Transform::identity(), &mut |area, _| {
                if matches!(area.kind, AreaKind::Line { .. }) {
                    count += 1;
                }
            });
            count
        })
        .collect();
    assert_eq!(per_column, vec![5, 5]);
}

#[test]
fn column_breaks_move_to_the_next_column() {
    let mut master = test_master("m", FIVE_LINES);
    master.columns = 2;
    let flow = vec![
        FlowNode::paragraph("left"),
        FlowNode::PageBreak {
            class: BreakClass::Column,
        },
        FlowNode::paragraph("right"),
    ];
    let output = layout(&test_document(master, flow));
    assert_eq!(output.tree.page_count(), 1);
    let right_column = &output.tree.pages()[0].body().children[1];
    assert_eq!(right_column.children.len(), 1);
}

#[test]
fn keep_with_next_moves_both_to_the_next_page() {
    let mut flow = lines(6);
    flow[4].meta_mut().unwrap().keep_with_next = Keep::Always;
    let output = layout(&test_document(test_master("m", FIVE_LINES), flow));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 2);
    let second = page_texts(&pages[1]);
    assert!(second.contains(&"line 4".to_string()));
    assert!(second.contains(&"line 5".to_string()));
}

#[test]
fn numbering_continues_across_sequences_unless_restarted() {
    let master = test_master("m", FIVE_LINES);
    let mut document = test_document(master.clone(), lines(7));
    document
        .sequences
        .push(PageSequence::new(master.name.clone(), lines(1)));
    let mut restarted = PageSequence::new(master.name.clone(), lines(1));
    restarted.initial_page_number = Some(10);
    document.sequences.push(restarted);
    let output = layout(&document);
    let numbers: Vec<u32> = output.tree.pages().iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 10]);
}

#[test]
fn static_regions_show_markers_and_folios() {
    let mut master = test_master("m", FIVE_LINES + 40.0);
    master.region_before = Length::pt(20.0);
    master.region_after = Length::pt(20.0);
    let flow = (0..10)
        .map(|n| with_marker(FlowNode::paragraph(format!("line {n}")), &format!("m{n}")))
        .collect();
    let mut document = test_document(master, flow);
    document.sequences[0].before = vec![StaticNode::RetrieveMarker {
        class: "section".into(),
        position: RetrievePosition::FirstStartingWithinPage,
    }];
    document.sequences[0].after = vec![StaticNode::Text {
        text: "Page {page}".into(),
    }];
    let output = layout(&document);
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 2);

    let region_text = |page: usize, kind: RegionKind| -> String {
        pages[page]
            .areas()
            .find(|a| a.kind == AreaKind::Region(kind))
            .and_then(|r| r.children.first())
            .map(|line| match &line.kind {
                AreaKind::Line { inlines } => inlines[0].text().to_string(),
                _ => String::new(),
            })
            .unwrap_or_default()
    };
    assert_eq!(region_text(0, RegionKind::Before), "m0");
    assert_eq!(region_text(1, RegionKind::Before), "m5");
    assert_eq!(region_text(1, RegionKind::After), "Page 2");
}

#[test]
fn bordered_blocks_split_with_open_edges() {
    use folio_style::{Border, BorderStyle, Borders};
    use folio_types::Color;

    let mut block = FlowNode::block(lines(8));
    let border = Border {
        width: Length::pt(1.0),
        style: BorderStyle::Solid,
        color: Color::BLACK,
    };
    block.meta_mut().unwrap().border = Borders {
        before: Some(border),
        after: Some(border),
        ..Default::default()
    };
    let output = layout(&test_document(test_master("m", FIVE_LINES), vec![block]));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 2);
    let block_on = |page: usize| {
        pages[page].body().children[0]
            .children
            .iter()
            .find(|a| a.kind == AreaKind::Block)
            .cloned()
            .unwrap()
    };
    let first = block_on(0);
    let second = block_on(1);
    assert!(first.borders.before.is_some());
    assert!(first.borders.after.is_none());
    assert!(second.borders.before.is_none());
    assert!(second.borders.after.is_some());
}
