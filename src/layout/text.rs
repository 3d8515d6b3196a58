use crate::config::LayoutConfig;
use crate::font::Font;
use crate::layout::LineMeasure;
use crate::units::Px;

const TABSIZE: usize = 4;

/// Wraps `text` into display rows no wider than `max_width`.
///
/// # Wrapping Behavior
///
/// Every line terminator (`\n`, `\r\n`, or `\r`) starts a new row, and an empty
/// source line produces an empty row. Within a line, rows are broken after
/// whitespace so words stay intact; whitespace at the end of a row is dropped.
/// A single word wider than `max_width` is broken between characters instead,
/// so no row ever overflows (except a lone character wider than the area).
///
/// `width_of` measures a run of text. Tabs are expanded to spaces before
/// measuring.
pub fn wrap_text<F>(text: &str, max_width: Px, width_of: F) -> Vec<String>
where
    F: Fn(&str) -> Px,
{
    let text = text
        .replace('\t', &" ".repeat(TABSIZE))
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut rows: Vec<String> = Vec::new();
    for line in text.split('\n') {
        wrap_line(line, max_width, &width_of, &mut rows);
    }
    rows
}

fn wrap_line<F>(line: &str, max_width: Px, width_of: &F, rows: &mut Vec<String>)
where
    F: Fn(&str) -> Px,
{
    let fits = |s: &str| width_of(s.trim_end()) <= max_width;

    let mut row = String::new();
    for token in line.split_inclusive(char::is_whitespace) {
        let mut candidate = row.clone();
        candidate.push_str(token);
        if fits(&candidate) {
            row = candidate;
            continue;
        }

        if !row.trim().is_empty() {
            rows.push(row.trim_end().to_string());
            row = String::new();
        } else {
            // only indentation so far, it doesn't survive the wrap
            row.clear();
        }

        if fits(token) {
            row.push_str(token);
        } else {
            row = break_word(token, &fits, rows);
        }
    }

    rows.push(row.trim_end().to_string());
}

/// Split a word that is too wide for a row between characters, pushing every
/// full row and returning the trailing piece
fn break_word<F>(word: &str, fits: &F, rows: &mut Vec<String>) -> String
where
    F: Fn(&str) -> bool,
{
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if !fits(&piece) && piece.chars().count() > 1 {
            piece.pop();
            rows.push(piece);
            piece = ch.to_string();
        }
    }
    piece
}

/// How many rows of `line_height` fit entirely inside `area_height`. Rows that
/// would only partially fit are not counted.
pub fn rows_that_fit(line_height: Px, area_height: Px) -> usize {
    if line_height.0 <= 0.0 || area_height.0 <= 0.0 {
        return 0;
    }
    (area_height / line_height).floor() as usize
}

/// Weighs lines with the renderer's own word-wrap and real glyph advances.
///
/// Paginating with this instead of [CharWidthEstimate](crate::layout::CharWidthEstimate)
/// makes the page plan agree with what gets drawn, at the cost of producing
/// different page contents than the character-width heuristic does.
pub struct FontMeasure<'f> {
    font: &'f Font,
    size: Px,
    max_width: Px,
}

impl<'f> FontMeasure<'f> {
    pub fn new(font: &'f Font, config: &LayoutConfig) -> FontMeasure<'f> {
        FontMeasure {
            font,
            size: config.font_px(),
            max_width: config.text_area().width(),
        }
    }
}

impl LineMeasure for FontMeasure<'_> {
    fn wrapped_lines(&self, line: &str) -> usize {
        wrap_text(line, self.max_width, |s| self.font.width_of_text(s, self.size))
            .len()
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// every character is 1px wide
    fn mono(s: &str) -> Px {
        Px(s.chars().count() as f32)
    }

    #[test]
    fn short_lines_are_untouched() {
        assert_eq!(wrap_text("hello", Px(10.0), mono), vec!["hello"]);
        assert_eq!(wrap_text("", Px(10.0), mono), vec![""]);
        assert_eq!(wrap_text("a\n\nb", Px(10.0), mono), vec!["a", "", "b"]);
    }

    #[test]
    fn breaks_at_whitespace() {
        assert_eq!(
            wrap_text("the quick brown fox jumps", Px(10.0), mono),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn exact_fit_stays_on_one_row() {
        assert_eq!(wrap_text("abcde fghi", Px(10.0), mono), vec!["abcde fghi"]);
    }

    #[test]
    fn long_words_break_between_characters() {
        assert_eq!(
            wrap_text("ab abcdefghijkl", Px(5.0), mono),
            vec!["ab", "abcde", "fghij", "kl"]
        );
    }

    #[test]
    fn tabs_and_carriage_returns() {
        assert_eq!(wrap_text("\tx\r\ny", Px(20.0), mono), vec!["    x", "y"]);
    }

    #[test]
    fn line_limit() {
        assert_eq!(rows_that_fit(Px(10.0), Px(35.0)), 3);
        assert_eq!(rows_that_fit(Px(10.0), Px(30.0)), 3);
        assert_eq!(rows_that_fit(Px(10.0), Px(9.0)), 0);
        assert_eq!(rows_that_fit(Px(0.0), Px(9.0)), 0);
    }
}
