use folio_types::{Mpt, Rect, to_pt};

/// Convert layout Y coordinate to PDF Y coordinate (flip origin)
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// A rectangle in PDF user space: lower-left corner plus size, in points.
pub fn pdf_rect(rect: &Rect, page_height: Mpt) -> [f32; 4] {
    let height = to_pt(page_height);
    [
        to_pt(rect.x),
        flip_y(to_pt(rect.bottom()), height),
        to_pt(rect.width),
        to_pt(rect.height),
    ]
}

/// Lossy conversion to the single-byte encoding of the base-14 fonts.
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c as u32 <= 255 { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangles_flip_to_the_lower_left_corner() {
        let rect = Rect::new(10_000, 20_000, 30_000, 40_000);
        assert_eq!(pdf_rect(&rect, 100_000), [10.0, 40.0, 30.0, 40.0]);
    }

    #[test]
    fn wide_characters_degrade_to_question_marks() {
        assert_eq!(to_win_ansi("a\u{e9}\u{2014}"), vec![b'a', 0xe9, b'?']);
    }
}
