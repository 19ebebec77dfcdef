//! Turns the areas of one page into a content stream.

use folio_layout::{Area, AreaKind, InlineArea};
use folio_render_core::utils::{flip_y, pdf_rect, to_win_ansi};
use folio_style::{Border, BorderStyle};
use folio_types::{Color, Mpt, Rect, RefId, Transform, to_pt};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

pub(crate) const FONT_RESOURCE: &str = "F1";

/// Baseline offset from the top of a line, as a fraction of the font size.
const ASCENT: f32 = 0.8;

/// A rectangle on the page that should jump to `target` when clicked.
#[derive(Debug, Clone)]
pub(crate) struct LinkSpot {
    pub rect: Rect,
    pub target: RefId,
}

#[derive(Default, Clone, PartialEq)]
struct PageRenderState {
    font_size: Option<Mpt>,
    fill_color: Option<Color>,
}

pub(crate) struct PageContext {
    page_height: Mpt,
    content: Content,
    state: PageRenderState,
    links: Vec<LinkSpot>,
}

impl PageContext {
    pub fn new(page_height: Mpt) -> Self {
        Self {
            page_height,
            content: Content { operations: vec![] },
            state: PageRenderState::default(),
            links: Vec::new(),
        }
    }

    pub fn finish(self) -> (Content, Vec<LinkSpot>) {
        (self.content, self.links)
    }

    pub fn draw_area(&mut self, area: &Area, transform: Transform) {
        let rect = area.rect.transformed(transform);
        if let Some(background) = area.background {
            self.set_fill_color(background);
            let [x, y, w, h] = pdf_rect(&rect, self.page_height);
            self.push("re", vec![x.into(), y.into(), w.into(), h.into()]);
            self.push("f", vec![]);
        }
        self.draw_borders(area, &rect);
        if let AreaKind::Line { inlines } = &area.kind {
            for inline in inlines {
                self.draw_inline(inline, &rect);
            }
        }
    }

    fn draw_borders(&mut self, area: &Area, rect: &Rect) {
        let borders = &area.borders;
        let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
        if let Some(border) = borders.before {
            let y = top + border.effective_width().mpt() / 2;
            self.stroke(&border, (left, y), (right, y));
        }
        if let Some(border) = borders.after {
            let y = bottom - border.effective_width().mpt() / 2;
            self.stroke(&border, (left, y), (right, y));
        }
        if let Some(border) = borders.start {
            let x = left + border.effective_width().mpt() / 2;
            self.stroke(&border, (x, top), (x, bottom));
        }
        if let Some(border) = borders.end {
            let x = right - border.effective_width().mpt() / 2;
            self.stroke(&border, (x, top), (x, bottom));
        }
    }

    fn stroke(&mut self, border: &Border, from: (Mpt, Mpt), to: (Mpt, Mpt)) {
        let width = border.effective_width().mpt();
        if width <= 0 {
            return;
        }
        let [r, g, b] = border.color.unit_rgb();
        self.push("w", vec![to_pt(width).into()]);
        self.push("RG", vec![r.into(), g.into(), b.into()]);
        let dash: Vec<Object> = match border.style {
            BorderStyle::Dotted => vec![Object::Integer(1), Object::Integer(2)],
            BorderStyle::Dashed => vec![Object::Integer(3), Object::Integer(3)],
            _ => vec![],
        };
        let dashed = !dash.is_empty();
        if dashed {
            self.push("d", vec![dash.into(), 0.into()]);
        }
        let height = to_pt(self.page_height);
        self.push("m", vec![to_pt(from.0).into(), flip_y(to_pt(from.1), height).into()]);
        self.push("l", vec![to_pt(to.0).into(), flip_y(to_pt(to.1), height).into()]);
        self.push("S", vec![]);
        if dashed {
            self.push("d", vec![Vec::<Object>::new().into(), 0.into()]);
        }
    }

    fn draw_inline(&mut self, inline: &InlineArea, line: &Rect) {
        let text = inline.text();
        if text.trim().is_empty() {
            return;
        }
        let x = line.x + inline.x();
        let font_size = to_pt(inline.font_size());
        let baseline = to_pt(line.y) + font_size * ASCENT;

        self.push("BT", vec![]);
        self.set_font(inline.font_size());
        self.set_fill_color(Color::BLACK);
        self.push(
            "Td",
            vec![to_pt(x).into(), flip_y(baseline, to_pt(self.page_height)).into()],
        );
        self.push(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        );
        self.push("ET", vec![]);

        if let InlineArea::Text {
            width,
            link: Some(target),
            ..
        } = inline
        {
            // Words of one link on one line share a single spot.
            if let Some(last) = self.links.last_mut()
                && last.target == *target
                && last.rect.y == line.y
                && last.rect.x <= x
            {
                last.rect.width = x + width - last.rect.x;
            } else {
                self.links.push(LinkSpot {
                    rect: Rect::new(x, line.y, *width, line.height),
                    target: target.clone(),
                });
            }
        }
    }

    fn set_font(&mut self, size: Mpt) {
        if self.state.font_size != Some(size) {
            self.push(
                "Tf",
                vec![
                    Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                    to_pt(size).into(),
                ],
            );
            self.state.font_size = Some(size);
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color != Some(color) {
            let [r, g, b] = color.unit_rgb();
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.state.fill_color = Some(color);
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::{Borders, Length};

    fn operators(context: PageContext) -> Vec<String> {
        let (content, _) = context.finish();
        content.operations.into_iter().map(|op| op.operator).collect()
    }

    #[test]
    fn lines_become_text_objects() {
        let line = Area::new(
            AreaKind::Line {
                inlines: vec![InlineArea::Text {
                    x: 0,
                    width: 20_000,
                    text: "hi".into(),
                    font_size: 12_000,
                    link: None,
                }],
            },
            Rect::new(0, 0, 100_000, 14_400),
        );
        let mut context = PageContext::new(800_000);
        context.draw_area(&line, Transform::identity());
        assert_eq!(operators(context), vec!["BT", "Tf", "rg", "Td", "Tj", "ET"]);
    }

    #[test]
    fn borders_without_style_are_not_stroked() {
        let mut block = Area::new(AreaKind::Block, Rect::new(0, 0, 100_000, 100_000));
        let mut border = Border {
            width: Length::pt(1.0),
            ..Default::default()
        };
        block.borders = Borders::uniform(border);
        let mut context = PageContext::new(800_000);
        context.draw_area(&block, Transform::identity());
        assert!(operators(context).is_empty());

        border.style = BorderStyle::Dashed;
        block.borders = Borders::uniform(border);
        let mut context = PageContext::new(800_000);
        context.draw_area(&block, Transform::identity());
        assert_eq!(operators(context).iter().filter(|op| *op == "S").count(), 4);
    }

    #[test]
    fn linked_text_leaves_a_link_spot() {
        let line = Area::new(
            AreaKind::Line {
                inlines: vec![InlineArea::Text {
                    x: 5_000,
                    width: 20_000,
                    text: "there".into(),
                    font_size: 12_000,
                    link: Some(RefId::from("t")),
                }],
            },
            Rect::new(10_000, 30_000, 100_000, 14_400),
        );
        let mut context = PageContext::new(800_000);
        context.draw_area(&line, Transform::identity());
        let second_word = InlineArea::Text {
            x: 30_000,
            width: 10_000,
            text: "again".into(),
            font_size: 12_000,
            link: Some(RefId::from("t")),
        };
        let mut next = line.clone();
        next.kind = AreaKind::Line {
            inlines: vec![second_word],
        };
        context.draw_area(&next, Transform::identity());
        let (_, links) = context.finish();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].rect, Rect::new(15_000, 30_000, 35_000, 14_400));
    }
}
