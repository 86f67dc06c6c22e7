//! Cell-grid text measurement.
//!
//! Wraps text on word boundaries using display widths from `unicode-width`.
//! The wrapped lines are kept in the returned block so the renderer draws
//! exactly what was measured.

use textwrap::{Options, WordSeparator, WrapAlgorithm};
use unicode_width::UnicodeWidthStr;

use crate::layout::{Font, TextBlock, TextMeasurer};

/// Measures text on a fixed grid: every column is `cell_width` px wide and
/// every line is the font's line height tall.
#[derive(Debug, Clone, Copy)]
pub struct CellMeasurer {
    pub cell_width: i32,
    pub message_line_height: i32,
    pub footer_line_height: i32,
}

impl CellMeasurer {
    /// One px per terminal cell.
    pub fn terminal() -> Self {
        Self {
            cell_width: 1,
            message_line_height: 1,
            footer_line_height: 1,
        }
    }

    fn line_height(&self, font: Font) -> i32 {
        match font {
            Font::Message => self.message_line_height,
            Font::Footer => self.footer_line_height,
        }
    }
}

impl TextMeasurer for CellMeasurer {
    fn measure(&self, text: &str, font: Font, max_width: i32) -> Option<TextBlock> {
        if self.cell_width <= 0 {
            return None;
        }
        let max_cols = usize::try_from(max_width / self.cell_width).ok()?;
        if max_cols == 0 {
            return None;
        }

        let lines = wrap(text, max_cols);
        let cols = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        let width = i32::try_from(cols).ok()? * self.cell_width;
        let height = i32::try_from(lines.len()).ok()? * self.line_height(font);
        Some(TextBlock {
            lines,
            width,
            height,
        })
    }
}

/// Word-wrap `text` to at most `max_cols` display columns per line.
/// Explicit newlines always break, words longer than a line are split, and
/// trailing whitespace never opens a line of its own.
pub fn wrap(text: &str, max_cols: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let options = Options::new(max_cols)
        .wrap_algorithm(WrapAlgorithm::FirstFit)
        .word_separator(WordSeparator::AsciiSpace)
        .break_words(true);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_on_word_boundaries() {
        assert_eq!(wrap("the quick brown fox", 10), vec!["the quick", "brown fox"]);
        assert_eq!(wrap("hello", 10), vec!["hello"]);
    }

    #[test]
    fn test_wrap_respects_newlines() {
        assert_eq!(wrap("How can\nI help you?", 20), vec!["How can", "I help you?"]);
        assert_eq!(wrap("a\n\nb", 5), vec!["a", "", "b"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("ab abcdefgh", 4), vec!["ab", "abcd", "efgh"]);
    }

    #[test]
    fn test_wrap_counts_wide_chars() {
        // Each CJK char is two columns wide.
        assert_eq!(wrap("日本語テキスト", 6), vec!["日本語", "テキス", "ト"]);
    }

    #[test]
    fn test_wrap_drops_trailing_space() {
        assert_eq!(wrap("hello ", 5), vec!["hello"]);
        assert_eq!(wrap("once upon ", 9), vec!["once upon"]);
    }

    #[test]
    fn test_trailing_space_does_not_change_height() {
        let m = CellMeasurer {
            cell_width: 6,
            message_line_height: 28,
            footer_line_height: 16,
        };
        // 30 px at 6 px per cell is a 5-column limit.
        let bare = m.measure("hello", Font::Message, 30).unwrap();
        let spaced = m.measure("hello ", Font::Message, 30).unwrap();
        assert_eq!(bare.height, 28);
        assert_eq!(spaced.height, bare.height);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn test_measure_scales_by_cell() {
        let m = CellMeasurer {
            cell_width: 6,
            message_line_height: 28,
            footer_line_height: 16,
        };
        let block = m.measure("the quick brown fox", Font::Message, 60).unwrap();
        assert_eq!(block.lines, vec!["the quick", "brown fox"]);
        assert_eq!(block.width, 54);
        assert_eq!(block.height, 56);

        let footer = m.measure("a\nb\nc", Font::Footer, 60).unwrap();
        assert_eq!(footer.height, 48);
    }

    #[test]
    fn test_measure_fails_without_room() {
        let m = CellMeasurer::terminal();
        assert!(m.measure("text", Font::Message, 0).is_none());
        assert!(m.measure("text", Font::Message, -4).is_none());
    }
}
