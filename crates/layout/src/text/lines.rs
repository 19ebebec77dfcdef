//! Line breaking for paragraphs.
//!
//! Inline content becomes a box/glue/penalty list (words are boxes, spaces
//! glue, explicit line breaks forced penalties) that goes through the same
//! total-fit breaker the pages use, with the paragraph width as the extent
//! of every part.

use super::metrics::TextMetrics;
use crate::LayoutError;
use crate::algorithms::breaking::BreakingAlgorithm;
use crate::config::LayoutConfig;
use crate::elements::{BlockSequence, Element, FILL_STRETCH};
use folio_idf::{InlineNode, ParagraphStyle};
use folio_style::{BreakClass, TextAlign};
use folio_types::{Mpt, RefId};

/// Text shown for a page citation until its target is laid out.
pub const CITATION_PLACEHOLDER: &str = "??";

/// Text measured to reserve room for a page number.
const CITATION_MEASURE: &str = "000";

#[derive(Debug, Clone, PartialEq)]
enum InlineToken {
    Word {
        text: String,
        width: Mpt,
        link: Option<RefId>,
    },
    Citation {
        target: RefId,
        last: bool,
        width: Mpt,
    },
    Space,
    Break,
}

/// A placed piece of a line, `x` measured from the line's start edge.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItem {
    Text {
        x: Mpt,
        width: Mpt,
        text: String,
        link: Option<RefId>,
    },
    Citation {
        x: Mpt,
        width: Mpt,
        target: RefId,
        last: bool,
    },
}

impl LineItem {
    pub fn x(&self) -> Mpt {
        match self {
            LineItem::Text { x, .. } | LineItem::Citation { x, .. } => *x,
        }
    }

    pub fn width(&self) -> Mpt {
        match self {
            LineItem::Text { width, .. } | LineItem::Citation { width, .. } => *width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineLayout {
    pub items: Vec<LineItem>,
    /// Extent actually covered by the items.
    pub width: Mpt,
}

fn tokenize(
    inlines: &[InlineNode],
    font_size: Mpt,
    metrics: &dyn TextMetrics,
    link: Option<&RefId>,
    out: &mut Vec<InlineToken>,
) {
    for inline in inlines {
        match inline {
            InlineNode::Text { text } => {
                if text.starts_with(char::is_whitespace) {
                    out.push(InlineToken::Space);
                }
                let mut any = false;
                for (n, word) in text.split_whitespace().enumerate() {
                    if n > 0 {
                        out.push(InlineToken::Space);
                    }
                    out.push(InlineToken::Word {
                        text: word.to_string(),
                        width: metrics.text_width(word, font_size),
                        link: link.cloned(),
                    });
                    any = true;
                }
                if any && text.ends_with(char::is_whitespace) {
                    out.push(InlineToken::Space);
                }
            }
            InlineNode::PageCitation { target, last } => out.push(InlineToken::Citation {
                target: target.clone(),
                last: *last,
                width: metrics.text_width(CITATION_MEASURE, font_size),
            }),
            InlineNode::Link { target, children } => {
                tokenize(children, font_size, metrics, Some(target), out);
            }
            InlineNode::LineBreak => out.push(InlineToken::Break),
        }
    }
}

/// Breaks `inlines` into lines no wider than `width`.
pub fn break_lines(
    inlines: &[InlineNode],
    style: &ParagraphStyle,
    width: Mpt,
    metrics: &dyn TextMetrics,
    config: LayoutConfig,
) -> Result<Vec<LineLayout>, LayoutError> {
    let font_size = style.font_size.mpt();
    let mut tokens = Vec::new();
    tokenize(inlines, font_size, metrics, None, &mut tokens);

    let space = metrics.space_width(font_size);
    let justify = style.text_align == TextAlign::Justify;
    let mut sequence = BlockSequence::new(BreakClass::Auto);
    // Token behind every box, indexed like the element list.
    let mut origins: Vec<Option<usize>> = Vec::new();
    let mut push = |seq: &mut BlockSequence, element: Element, origin: Option<usize>| {
        seq.push(element);
        origins.push(origin);
    };

    for (t, token) in tokens.iter().enumerate() {
        match token {
            InlineToken::Word { width, .. } | InlineToken::Citation { width, .. } => {
                push(&mut sequence, Element::boxed(*width, None), Some(t));
            }
            InlineToken::Space => {
                let after_box = sequence.elements().last().is_some_and(Element::is_box);
                if after_box {
                    let glue = if justify {
                        Element::glue(space, space / 2, space / 3)
                    } else {
                        Element::glue(space, width.max(space), space / 3)
                    };
                    push(&mut sequence, glue, None);
                }
            }
            InlineToken::Break => {
                push(&mut sequence, Element::glue(0, FILL_STRETCH, 0), None);
                push(&mut sequence, Element::forced_break(BreakClass::Auto), None);
            }
        }
    }

    let Some(sequence) = sequence.end_sequence(BreakClass::Auto) else {
        return Ok(Vec::new());
    };
    let result =
        BreakingAlgorithm::new(config).find_breakpoints(&sequence, &width, config.breaking_mode)?;
    if !result.feasible {
        log::debug!(
            "Paragraph needed emergency breaking over {} lines",
            result.part_count()
        );
    }

    let elements = sequence.elements();
    let lines = result
        .positions
        .iter()
        .map(|part| {
            let ratio = if justify { part.ratio } else { part.ratio.min(0.0) };
            let mut x = 0;
            let mut items = Vec::new();
            for i in part.content_start..part.index {
                let element = &elements[i];
                match element {
                    Element::Box { size, .. } => {
                        match origins.get(i).copied().flatten().map(|t| &tokens[t]) {
                            Some(InlineToken::Word { text, link, .. }) => items.push(LineItem::Text {
                                x,
                                width: *size,
                                text: text.clone(),
                                link: link.clone(),
                            }),
                            Some(InlineToken::Citation { target, last, .. }) => {
                                items.push(LineItem::Citation {
                                    x,
                                    width: *size,
                                    target: target.clone(),
                                    last: *last,
                                })
                            }
                            _ => {}
                        }
                        x += size;
                    }
                    Element::Glue {
                        natural,
                        stretch,
                        shrink,
                        ..
                    } => {
                        let elastic = if ratio > 0.0 { *stretch } else { *shrink };
                        x += natural + (ratio * elastic as f64).round() as Mpt;
                    }
                    Element::Penalty { .. } => {}
                }
            }
            let used = items.last().map_or(0, |item| item.x() + item.width());
            let shift = match style.text_align {
                TextAlign::Center => (width - used) / 2,
                TextAlign::End => width - used,
                TextAlign::Start | TextAlign::Justify => 0,
            }
            .max(0);
            if shift > 0 {
                for item in &mut items {
                    match item {
                        LineItem::Text { x, .. } | LineItem::Citation { x, .. } => *x += shift,
                    }
                }
            }
            LineLayout { items, width: used }
        })
        .collect();
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::metrics::FixedMetrics;

    fn style(align: TextAlign) -> ParagraphStyle {
        ParagraphStyle {
            font_size: folio_style::Length(10_000),
            text_align: align,
            ..Default::default()
        }
    }

    fn words(line: &LineLayout) -> Vec<&str> {
        line.items
            .iter()
            .filter_map(|i| match i {
                LineItem::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn short_text_is_one_line() {
        let lines = break_lines(
            &[InlineNode::text("one two")],
            &style(TextAlign::Start),
            100_000,
            &FixedMetrics::default(),
            LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(words(&lines[0]), vec!["one", "two"]);
        // Three glyphs, a space, three glyphs at 5pt each.
        assert_eq!(lines[0].width, 35_000);
    }

    #[test]
    fn wraps_at_the_width() {
        // Each word is 20pt wide, a space 5pt: two words per 50pt line.
        let lines = break_lines(
            &[InlineNode::text("aaaa bbbb cccc dddd eeee")],
            &style(TextAlign::Start),
            50_000,
            &FixedMetrics::default(),
            LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(words(&lines[2]), vec!["eeee"]);
        assert!(lines.iter().all(|l| l.width <= 50_000));
    }

    #[test]
    fn explicit_breaks_end_lines() {
        let lines = break_lines(
            &[
                InlineNode::text("a"),
                InlineNode::LineBreak,
                InlineNode::text("b"),
            ],
            &style(TextAlign::Start),
            100_000,
            &FixedMetrics::default(),
            LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(words(&lines[1]), vec!["b"]);
    }

    #[test]
    fn justified_lines_fill_the_width() {
        let lines = break_lines(
            &[InlineNode::text("aaaa bbbb cccc dddd eeee")],
            &style(TextAlign::Justify),
            46_000,
            &FixedMetrics::default(),
            LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(lines.len(), 3);
        // The 1pt left over goes into the single space.
        assert_eq!(lines[0].width, 46_000);
        assert_eq!(lines[0].items[1].x(), 26_000);
        // The last line keeps its natural spacing.
        assert_eq!(lines[2].width, 20_000);
    }

    #[test]
    fn citations_and_links_keep_their_targets() {
        let lines = break_lines(
            &[
                InlineNode::text("see page "),
                InlineNode::PageCitation {
                    target: RefId::from("intro"),
                    last: false,
                },
                InlineNode::Link {
                    target: RefId::from("intro"),
                    children: vec![InlineNode::text(" here")],
                },
            ],
            &style(TextAlign::Start),
            200_000,
            &FixedMetrics::default(),
            LayoutConfig::default(),
        )
        .unwrap();
        let items = &lines[0].items;
        assert!(items.iter().any(|i| matches!(
            i,
            LineItem::Citation { target, width: 15_000, .. } if target.as_str() == "intro"
        )));
        assert!(items.iter().any(|i| matches!(
            i,
            LineItem::Text { text, link: Some(_), .. } if text == "here"
        )));
    }

    #[test]
    fn centered_lines_are_shifted() {
        let lines = break_lines(
            &[InlineNode::text("ab")],
            &style(TextAlign::Center),
            30_000,
            &FixedMetrics::default(),
            LayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(lines[0].items[0].x(), 10_000);
    }

    #[test]
    fn empty_paragraphs_have_no_lines() {
        let lines = break_lines(
            &[InlineNode::text("   ")],
            &style(TextAlign::Start),
            30_000,
            &FixedMetrics::default(),
            LayoutConfig::default(),
        )
        .unwrap();
        assert!(lines.is_empty());
    }
}
