use crate::{Document, FlowNode, InlineNode, ListItem, NodeMetadata, TableRow};
use folio_style::{FlowKind, Property, applies};
use folio_types::RefId;
use std::collections::HashSet;
use thiserror::Error;

/// A recoverable content error found in the flow tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("property {property:?} has no effect on a {}", kind.as_str())]
    InapplicableProperty { kind: FlowKind, property: Property },
    #[error("page sequence {sequence} refers to unknown page master '{name}'")]
    UnknownMaster { sequence: usize, name: String },
    #[error("id '{0}' is used more than once")]
    DuplicateId(RefId),
    #[error("table row spans {spanned} columns but the table declares {declared}")]
    RowTooWide { spanned: usize, declared: usize },
    #[error("table declares no columns")]
    NoColumns,
}

struct Validator<'a> {
    seen_ids: HashSet<&'a RefId>,
    issues: Vec<ValidationIssue>,
}

pub(crate) fn validate_document(document: &Document) -> Vec<ValidationIssue> {
    let mut v = Validator {
        seen_ids: HashSet::new(),
        issues: Vec::new(),
    };
    for (index, sequence) in document.sequences.iter().enumerate() {
        for name in sequence.masters.names() {
            if document.master(name).is_none() {
                v.issues.push(ValidationIssue::UnknownMaster {
                    sequence: index,
                    name: name.to_string(),
                });
            }
        }
        for node in &sequence.flow {
            v.node(node);
        }
    }
    log::debug!("Validation found {} issue(s)", v.issues.len());
    v.issues
}

impl<'a> Validator<'a> {
    fn meta(&mut self, kind: FlowKind, meta: &'a NodeMetadata) {
        for property in meta.specified_properties() {
            if !applies(kind, property) {
                self.issues
                    .push(ValidationIssue::InapplicableProperty { kind, property });
            }
        }
        if let Some(id) = &meta.id
            && !self.seen_ids.insert(id)
        {
            self.issues.push(ValidationIssue::DuplicateId(id.clone()));
        }
    }

    fn node(&mut self, node: &'a FlowNode) {
        if let Some(meta) = node.meta() {
            self.meta(node.kind(), meta);
        }
        match node {
            FlowNode::Block { children, .. } => children.iter().for_each(|c| self.node(c)),
            FlowNode::Paragraph { inlines, .. } => self.inlines(inlines),
            FlowNode::List { items, .. } => items.iter().for_each(|item| self.item(item)),
            FlowNode::Table {
                columns,
                header,
                body,
                footer,
                ..
            } => {
                if columns.is_empty() {
                    self.issues.push(ValidationIssue::NoColumns);
                }
                for row in header.iter().chain(body).chain(footer) {
                    self.row(row, columns.len());
                }
            }
            FlowNode::Image { .. } | FlowNode::PageBreak { .. } => {}
        }
    }

    fn inlines(&mut self, inlines: &'a [InlineNode]) {
        for inline in inlines {
            if let InlineNode::Link { children, .. } = inline {
                self.inlines(children);
            }
        }
    }

    fn item(&mut self, item: &'a ListItem) {
        self.meta(FlowKind::ListItem, &item.meta);
        item.label.iter().chain(&item.body).for_each(|c| self.node(c));
    }

    fn row(&mut self, row: &'a TableRow, declared: usize) {
        self.meta(FlowKind::TableRow, &row.meta);
        let spanned: usize = row.cells.iter().map(|c| c.col_span.max(1) as usize).sum();
        if spanned > declared && declared > 0 {
            self.issues
                .push(ValidationIssue::RowTooWide { spanned, declared });
        }
        for cell in &row.cells {
            self.meta(FlowKind::TableCell, &cell.meta);
            cell.children.iter().for_each(|c| self.node(c));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PageSequence, TableCell};
    use folio_style::{BreakClass, PageMaster, PageSize};

    fn doc(flow: Vec<FlowNode>) -> Document {
        Document {
            title: None,
            masters: vec![PageMaster::new("a4", PageSize::A4)],
            sequences: vec![PageSequence::new("a4", flow)],
        }
    }

    #[test]
    fn clean_document_has_no_issues() {
        assert!(doc(vec![FlowNode::paragraph("hello")]).validate().is_empty());
    }

    #[test]
    fn reports_duplicate_ids_and_unknown_masters() {
        let mut a = FlowNode::paragraph("a");
        let mut b = FlowNode::paragraph("b");
        a.meta_mut().unwrap().id = Some("x".into());
        b.meta_mut().unwrap().id = Some("x".into());
        let mut d = doc(vec![a, b]);
        d.sequences[0].masters.first = Some("missing".into());
        let issues = d.validate();
        assert!(issues.contains(&ValidationIssue::DuplicateId("x".into())));
        assert!(issues.contains(&ValidationIssue::UnknownMaster {
            sequence: 0,
            name: "missing".into()
        }));
    }

    #[test]
    fn reports_inapplicable_cell_properties() {
        let mut cell = TableCell::new(vec![]);
        cell.meta.break_before = BreakClass::Page;
        let table = FlowNode::Table {
            meta: NodeMetadata::default(),
            columns: vec![],
            header: vec![],
            body: vec![TableRow {
                cells: vec![cell],
                ..Default::default()
            }],
            footer: vec![],
            repeat: true,
        };
        let issues = doc(vec![table]).validate();
        assert!(issues.contains(&ValidationIssue::NoColumns));
        assert!(issues.contains(&ValidationIssue::InapplicableProperty {
            kind: FlowKind::TableCell,
            property: Property::BreakBefore
        }));
    }

    #[test]
    fn parses_json_flow() {
        let json = r#"{
            "masters": [{"name": "page", "size": "A4", "margins": "20pt"}],
            "sequences": [{
                "masters": "page",
                "flow": [
                    {"type": "paragraph", "meta": {"id": "intro", "keepWithNext": "always"},
                     "inlines": [{"type": "text", "text": "See page "},
                                 {"type": "page-citation", "target": "end"}]},
                    {"type": "page-break"},
                    {"type": "table", "columns": [100, "2*"],
                     "body": [{"cells": [{"children": []}, {"colSpan": 1, "children": []}]}]}
                ]
            }]
        }"#;
        let d = Document::from_json(json).unwrap();
        assert_eq!(d.sequences[0].flow.len(), 3);
        assert!(matches!(
            d.sequences[0].flow[1],
            FlowNode::PageBreak { class: BreakClass::Page }
        ));
        assert!(d.validate().is_empty());
    }
}
