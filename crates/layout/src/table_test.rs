use crate::area::AreaKind;
use crate::test_utils::{layout, page_texts, test_document, test_master};
use folio_idf::{ColumnWidth, FlowNode, ListItem, NodeMetadata, TableCell, TableRow};
use folio_style::{Keep, Length};
use folio_types::RefId;

fn row(texts: &[&str]) -> TableRow {
    TableRow {
        cells: texts
            .iter()
            .map(|t| TableCell::new(vec![FlowNode::paragraph(*t)]))
            .collect(),
        ..Default::default()
    }
}

fn table(header: &[&str], body: Vec<TableRow>, footer: &[&str]) -> FlowNode {
    FlowNode::Table {
        meta: NodeMetadata::default(),
        columns: vec![ColumnWidth::Proportional(1.0), ColumnWidth::Proportional(1.0)],
        header: if header.is_empty() { vec![] } else { vec![row(header)] },
        body,
        footer: if footer.is_empty() { vec![] } else { vec![row(footer)] },
        repeat: true,
    }
}

fn body_rows(count: usize) -> Vec<TableRow> {
    (0..count)
        .map(|n| row(&[format!("row {n}").as_str(), "x"]))
        .collect()
}

fn row_count(texts: &[String]) -> usize {
    texts.iter().filter(|t| t.starts_with("row")).count()
}

#[test]
fn header_repeats_on_every_page() {
    let flow = vec![table(&["head", "head"], body_rows(12), &[])];
    let output = layout(&test_document(test_master("m", 72.0), flow));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 3);
    for page in pages {
        let texts = page_texts(page);
        assert_eq!(texts[0], "head");
        assert_eq!(row_count(&texts), 4);
    }
}

#[test]
fn footer_closes_every_page() {
    let flow = vec![table(&["head", "head"], body_rows(10), &["foot", "foot"])];
    let output = layout(&test_document(test_master("m", 72.0), flow));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 4);
    let mut rows = 0;
    for page in pages {
        let texts = page_texts(page);
        assert_eq!(texts.first().map(String::as_str), Some("head"));
        assert_eq!(texts.last().map(String::as_str), Some("foot"));
        rows += row_count(&texts);
    }
    assert_eq!(rows, 10);
}

#[test]
fn tall_cells_split_between_their_lines() {
    let tall = TableRow {
        cells: vec![
            TableCell::new((0..8).map(|n| FlowNode::paragraph(format!("row {n}"))).collect()),
            TableCell::new(vec![FlowNode::paragraph("short")]),
        ],
        ..Default::default()
    };
    let output = layout(&test_document(test_master("m", 72.0), vec![table(&[], vec![tall], &[])]));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 2);
    assert_eq!(row_count(&page_texts(&pages[0])), 5);
    assert_eq!(row_count(&page_texts(&pages[1])), 3);
    assert!(page_texts(&pages[0]).contains(&"short".to_string()));
}

#[test]
fn kept_rows_are_not_split() {
    let mut rows = body_rows(6);
    rows[4].meta.keep_with_next = Keep::Always;
    let output = layout(&test_document(test_master("m", 72.0), vec![table(&[], rows, &[])]));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 2);
    let second = page_texts(&pages[1]);
    assert!(second.contains(&"row 4".to_string()));
    assert!(second.contains(&"row 5".to_string()));
}

#[test]
fn cells_are_sliced_per_page() {
    let tall = TableRow {
        cells: vec![TableCell::new(
            (0..8).map(|n| FlowNode::paragraph(format!("row {n}"))).collect(),
        )],
        ..Default::default()
    };
    let mut node = table(&[], vec![tall], &[]);
    if let FlowNode::Table { columns, body, .. } = &mut node {
        *columns = vec![ColumnWidth::Fixed(Length::pt(200.0))];
        body[0].cells[0].meta.id = Some(RefId::from("cell"));
    }
    let output = layout(&test_document(test_master("m", 72.0), vec![node]));
    let cells_with_id = output
        .tree
        .pages()
        .iter()
        .flat_map(|p| p.absolute_areas().into_iter().map(|(_, a)| a.clone()).collect::<Vec<_>>())
        .filter(|a| a.kind == AreaKind::Cell && a.id.is_some())
        .count();
    assert_eq!(cells_with_id, 1);
    assert_eq!(output.tree.pages_for(&RefId::from("cell")).len(), 2);
}

#[test]
fn list_labels_stay_with_their_bodies() {
    let item = |n: usize| ListItem {
        meta: NodeMetadata::default(),
        label: vec![FlowNode::paragraph(format!("{n}."))],
        body: vec![FlowNode::paragraph(format!("row {n}"))],
    };
    let list = FlowNode::List {
        meta: NodeMetadata::default(),
        indent: Length::pt(18.0),
        items: (0..7).map(item).collect(),
    };
    let output = layout(&test_document(test_master("m", 72.0), vec![list]));
    let pages = output.tree.pages();
    assert_eq!(pages.len(), 2);
    let second = page_texts(&pages[1]);
    assert_eq!(second, vec!["5.", "row 5", "6.", "row 6"]);
}

#[test]
fn content_after_a_split_row_clears_its_tallest_cell() {
    let row = TableRow {
        cells: vec![
            TableCell::new(vec![FlowNode::Image {
                meta: NodeMetadata::default(),
                width: Length::pt(50.0),
                height: Length::pt(55.0),
            }]),
            TableCell::new((0..5).map(|n| FlowNode::paragraph(format!("row {n}"))).collect()),
        ],
        ..Default::default()
    };
    let flow = vec![table(&[], vec![row], &[]), FlowNode::paragraph("after")];
    let output = layout(&test_document(test_master("m", 60.0), flow));
    for page in output.tree.pages() {
        let areas = page.absolute_areas();
        let images: Vec<_> = areas
            .iter()
            .filter(|(_, a)| a.kind == AreaKind::Image)
            .map(|(r, _)| *r)
            .collect();
        for image in &images {
            assert!(image.bottom() <= 60_000, "image leaves the page: {image:?}");
        }
        for (rect, area) in &areas {
            let AreaKind::Line { inlines } = &area.kind else {
                continue;
            };
            if inlines.first().map(|i| i.text()) != Some("after") {
                continue;
            }
            for image in &images {
                assert!(
                    rect.y >= image.bottom() || rect.bottom() <= image.y,
                    "line {rect:?} overlaps image {image:?}"
                );
            }
        }
    }
}
