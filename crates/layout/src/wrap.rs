//! Greedy word wrapping against a fixed line width.

use crate::fonts::FontMetrics;
use std::str::{Split, SplitWhitespace};

/// Breaks `text` into physical lines no wider than `max_width` points when set
/// in `font` at `size`.
///
/// Lines break only at whitespace; runs of whitespace collapse to a single
/// space and `\n` forces a break. A token that is wider than `max_width` on its
/// own is emitted unsplit on a line of its own. Blank input produces no lines.
///
/// The returned iterator is lazy and `Clone`, so a caller can take the lines it
/// has room for and still count what was left over:
///
/// ```
/// use handreceipt_layout::{StandardFont, wrap};
///
/// let mut lines = wrap("alpha beta gamma", &StandardFont::Helvetica, 10.0, 40.0);
/// let shown: Vec<String> = lines.by_ref().take(2).collect();
/// assert_eq!(shown, ["alpha", "beta"]);
/// assert_eq!(lines.count(), 1);
/// ```
pub fn wrap<'a, M: FontMetrics>(
    text: &'a str,
    font: &'a M,
    size: f32,
    max_width: f32,
) -> WrappedLines<'a, M> {
    WrappedLines {
        paragraphs: text.split('\n'),
        words: None,
        pending: None,
        font,
        size,
        max_width,
    }
}

/// Iterator over the physical lines produced by [`wrap`].
pub struct WrappedLines<'a, M> {
    paragraphs: Split<'a, char>,
    words: Option<SplitWhitespace<'a>>,
    /// A word that did not fit on the previous line.
    pending: Option<&'a str>,
    font: &'a M,
    size: f32,
    max_width: f32,
}

// Manual impl: cloning only copies the cursor, `M` itself is borrowed.
impl<M> Clone for WrappedLines<'_, M> {
    fn clone(&self) -> Self {
        Self {
            paragraphs: self.paragraphs.clone(),
            words: self.words.clone(),
            pending: self.pending,
            font: self.font,
            size: self.size,
            max_width: self.max_width,
        }
    }
}

impl<M: FontMetrics> WrappedLines<'_, M> {
    fn fill_line(&mut self) -> Option<String> {
        let space = self.font.text_width(" ", self.size);
        let mut line = String::new();
        let mut width = 0.0f32;

        loop {
            let next = match self.pending.take() {
                Some(word) => Some(word),
                None => self.words.as_mut().and_then(Iterator::next),
            };
            let Some(word) = next else {
                self.words = None;
                break;
            };

            let word_width = self.font.text_width(word, self.size);
            if line.is_empty() {
                if word_width > self.max_width {
                    log::debug!(
                        "Token '{}' is {:.2}pt wide, exceeding the {:.2}pt line width",
                        word,
                        word_width,
                        self.max_width
                    );
                }
                line.push_str(word);
                width = word_width;
                continue;
            }

            let candidate = width + space + word_width;
            if candidate > self.max_width {
                self.pending = Some(word);
                break;
            }
            line.push(' ');
            line.push_str(word);
            width = candidate;
        }

        (!line.is_empty()).then_some(line)
    }
}

impl<M: FontMetrics> Iterator for WrappedLines<'_, M> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.words.is_none() && self.pending.is_none() {
                let paragraph = self.paragraphs.next()?;
                self.words = Some(paragraph.split_whitespace());
            }
            if let Some(line) = self.fill_line() {
                return Some(line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::StandardFont;

    const FONT: StandardFont = StandardFont::Helvetica;

    fn lines(text: &str, size: f32, max_width: f32) -> Vec<String> {
        wrap(text, &FONT, size, max_width).collect()
    }

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(lines("Laptop-X - S/N: A1", 9.0, 430.0), ["Laptop-X - S/N: A1"]);
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        assert!(lines("", 9.0, 100.0).is_empty());
        assert!(lines("   \t ", 9.0, 100.0).is_empty());
        assert!(lines("\n\n", 9.0, 100.0).is_empty());
    }

    #[test]
    fn test_every_line_fits_the_width() {
        let text =
            "Contact: SGT Example, 555-0100, building 12 room 4, alternate 555-0199 after hours";
        let max_width = 120.0;
        let wrapped = lines(text, 10.0, max_width);
        assert!(wrapped.len() > 2);
        for line in &wrapped {
            assert!(FONT.text_width(line, 10.0) <= max_width, "line too wide: {line}");
        }
        assert_eq!(wrapped.join(" "), text);
    }

    #[test]
    fn test_wide_token_is_never_split() {
        let token = "SERIAL-0123456789-ABCDEFGHIJ";
        let wrapped = lines(&format!("a {token} b"), 10.0, 30.0);
        assert_eq!(wrapped, ["a", token, "b"]);
    }

    #[test]
    fn test_whitespace_collapses_and_newline_breaks() {
        assert_eq!(lines("one   two\tthree", 10.0, 500.0), ["one two three"]);
        assert_eq!(lines("one\ntwo", 10.0, 500.0), ["one", "two"]);
        assert_eq!(lines("one\n\ntwo", 10.0, 500.0), ["one", "two"]);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let wrapped = wrap("alpha beta gamma delta", &FONT, 10.0, 40.0);
        let first: Vec<String> = wrapped.clone().collect();
        let second: Vec<String> = wrapped.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_exact_fit_stays_on_line() {
        let text = "ab cd";
        let width = FONT.text_width(text, 10.0);
        assert_eq!(lines(text, 10.0, width + 0.01), ["ab cd"]);
        assert_eq!(lines(text, 10.0, width - 0.5), ["ab", "cd"]);
    }
}
