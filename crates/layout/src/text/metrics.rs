use folio_types::Mpt;

/// Horizontal advances of text. Layout never shapes; it only needs widths.
pub trait TextMetrics: Send + Sync {
    /// Advance of `ch` at `font_size`.
    fn advance(&self, ch: char, font_size: Mpt) -> Mpt;

    fn text_width(&self, text: &str, font_size: Mpt) -> Mpt {
        text.chars().map(|c| self.advance(c, font_size)).sum()
    }

    fn space_width(&self, font_size: Mpt) -> Mpt {
        self.advance(' ', font_size)
    }
}

/// Every glyph advances by the same fraction of the font size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMetrics {
    /// Advance in thousandths of an em.
    pub em_fraction: i32,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self { em_fraction: 500 }
    }
}

impl TextMetrics for FixedMetrics {
    fn advance(&self, _ch: char, font_size: Mpt) -> Mpt {
        font_size * self.em_fraction / 1000
    }
}

/// Widths of the standard Helvetica face, the font the PDF painter uses.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Base14Metrics;

// Advances for U+0020..=U+007E in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const DEFAULT_WIDTH: u16 = 556;

impl TextMetrics for Base14Metrics {
    fn advance(&self, ch: char, font_size: Mpt) -> Mpt {
        let width = (ch as u32)
            .checked_sub(0x20)
            .and_then(|i| HELVETICA_WIDTHS.get(i as usize))
            .copied()
            .unwrap_or(DEFAULT_WIDTH);
        font_size * width as Mpt / 1000
    }
}
