use serde_json::{Value, json};

/// An A4 master with 2cm margins.
pub fn a4_master(name: &str) -> Value {
    json!({ "name": name, "size": "A4", "margins": "2cm" })
}

/// A small master whose body holds exactly five 12pt lines.
pub fn five_line_master(name: &str) -> Value {
    json!({
        "name": name,
        "size": { "width": "300pt", "height": "72pt" },
        "margins": 0
    })
}

pub fn document(masters: Vec<Value>, sequences: Vec<Value>) -> Value {
    json!({ "title": "Test document", "masters": masters, "sequences": sequences })
}

pub fn sequence(master: &str, flow: Vec<Value>) -> Value {
    json!({ "masters": master, "flow": flow })
}

pub fn paragraph(text: &str) -> Value {
    json!({ "type": "paragraph", "inlines": [{ "type": "text", "text": text }] })
}

pub fn paragraph_with_id(text: &str, id: &str) -> Value {
    json!({
        "type": "paragraph",
        "meta": { "id": id },
        "inlines": [{ "type": "text", "text": text }]
    })
}

/// One-word paragraphs, so each line is a single text run in the PDF.
pub fn lines(count: usize) -> Vec<Value> {
    (0..count).map(|n| paragraph(&format!("line{n}"))).collect()
}

pub fn page_break() -> Value {
    json!({ "type": "page-break" })
}

pub fn citation(target: &str) -> Value {
    json!({
        "type": "paragraph",
        "inlines": [
            { "type": "text", "text": "see page" },
            { "type": "page-citation", "target": target }
        ]
    })
}

pub fn link(text: &str, target: &str) -> Value {
    json!({
        "type": "paragraph",
        "inlines": [{
            "type": "link",
            "target": target,
            "children": [{ "type": "text", "text": text }]
        }]
    })
}

pub fn table(header: &[&str], rows: Vec<Vec<String>>) -> Value {
    let row = |cells: Vec<String>| {
        json!({
            "cells": cells
                .iter()
                .map(|c| json!({ "children": [paragraph(c)] }))
                .collect::<Vec<_>>()
        })
    };
    json!({
        "type": "table",
        "columns": vec![json!("1*"); header.len()],
        "header": [row(header.iter().map(|h| h.to_string()).collect())],
        "body": rows.into_iter().map(row).collect::<Vec<_>>()
    })
}
