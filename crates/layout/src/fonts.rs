//! Advance widths for the standard PDF Type1 fonts.
//!
//! Widths are expressed in thousandths of an em, exactly as listed in the Adobe
//! AFM files, for printable ASCII (0x20..=0x7E) and the Latin-1 half of
//! WinAnsiEncoding (0xA0..=0xFF). Any other character measures with a per-font
//! fallback width.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const FIRST_CHAR: u32 = 0x20;
const LATIN1_FIRST_CHAR: u32 = 0xA0;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

#[rustfmt::skip]
const HELVETICA_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

#[rustfmt::skip]
const TIMES_ROMAN_LATIN1_WIDTHS: [u16; 96] = [
    250, 333, 500, 500, 500, 500, 200, 500, 333, 760, 276, 500, 564, 333, 760, 333,
    400, 564, 300, 300, 333, 500, 453, 250, 333, 300, 310, 500, 750, 750, 750, 444,
    722, 722, 722, 722, 722, 722, 889, 667, 611, 611, 611, 611, 333, 333, 333, 333,
    722, 722, 722, 722, 722, 722, 722, 564, 722, 722, 722, 722, 722, 722, 556, 500,
    444, 444, 444, 444, 444, 444, 667, 444, 444, 444, 444, 444, 278, 278, 278, 278,
    500, 500, 500, 500, 500, 500, 500, 564, 500, 500, 500, 500, 500, 500, 500, 500,
];

/// Measures text for a single font face.
pub trait FontMetrics {
    /// Advance width of `ch` in thousandths of an em.
    fn char_width(&self, ch: char) -> u16;

    /// Width of `text` in points when set at `size`.
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

impl<M: FontMetrics + ?Sized> FontMetrics for &M {
    fn char_width(&self, ch: char) -> u16 {
        (**self).char_width(ch)
    }
}

/// The standard PDF fonts an overlay can be calibrated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardFont {
    #[default]
    Helvetica,
    HelveticaBold,
    TimesRoman,
    Courier,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported font '{0}'. Expected one of: Helvetica, Helvetica-Bold, Times-Roman, Courier")]
pub struct UnknownFontError(pub String);

impl StandardFont {
    pub const ALL: [StandardFont; 4] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::TimesRoman,
        StandardFont::Courier,
    ];

    /// The PostScript name written as the font's `/BaseFont`.
    pub fn postscript_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::Courier => "Courier",
        }
    }

    fn fallback_width(self) -> u16 {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaBold => 556,
            StandardFont::TimesRoman => 500,
            StandardFont::Courier => 600,
        }
    }
}

impl FontMetrics for StandardFont {
    fn char_width(&self, ch: char) -> u16 {
        let (ascii, latin1): (&[u16], &[u16]) = match self {
            StandardFont::Helvetica => (&HELVETICA_WIDTHS, &HELVETICA_LATIN1_WIDTHS),
            StandardFont::HelveticaBold => (&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_LATIN1_WIDTHS),
            StandardFont::TimesRoman => (&TIMES_ROMAN_WIDTHS, &TIMES_ROMAN_LATIN1_WIDTHS),
            // Monospaced.
            StandardFont::Courier => return 600,
        };
        let code = ch as u32;
        let (table, first) = match code {
            LATIN1_FIRST_CHAR.. => (latin1, LATIN1_FIRST_CHAR),
            _ => (ascii, FIRST_CHAR),
        };
        code.checked_sub(first)
            .and_then(|idx| table.get(idx as usize))
            .copied()
            .unwrap_or_else(|| self.fallback_width())
    }
}

impl FromStr for StandardFont {
    type Err = UnknownFontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StandardFont::ALL
            .into_iter()
            .find(|font| font.postscript_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownFontError(s.to_string()))
    }
}

impl fmt::Display for StandardFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.postscript_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_ascii_widths() {
        let font = StandardFont::Helvetica;
        assert_eq!(font.char_width(' '), 278);
        assert_eq!(font.char_width('0'), 556);
        assert_eq!(font.char_width('@'), 1015);
        assert_eq!(font.char_width('W'), 944);
        assert_eq!(font.char_width('i'), 222);
        assert_eq!(font.char_width('~'), 584);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let font = StandardFont::Helvetica;
        // "S/N" = 667 + 278 + 722
        assert!((font.text_width("S/N", 10.0) - 16.67).abs() < 1e-4);
        assert!((font.text_width("S/N", 20.0) - 33.34).abs() < 1e-4);
        assert_eq!(font.text_width("", 12.0), 0.0);
    }

    #[test]
    fn test_latin1_widths() {
        assert_eq!(StandardFont::Helvetica.char_width('\u{A0}'), 278);
        assert_eq!(StandardFont::Helvetica.char_width('©'), 737);
        assert_eq!(StandardFont::Helvetica.char_width('Ä'), 667);
        assert_eq!(StandardFont::Helvetica.char_width('ß'), 611);
        assert_eq!(StandardFont::Helvetica.char_width('ç'), 500);
        assert_eq!(StandardFont::HelveticaBold.char_width('Ä'), 722);
        assert_eq!(StandardFont::HelveticaBold.char_width('ü'), 611);
        assert_eq!(StandardFont::TimesRoman.char_width('æ'), 667);
        assert_eq!(StandardFont::TimesRoman.char_width('ÿ'), 500);
        // "Müller" = 833 + 556 + 222 + 222 + 556 + 333
        assert!((StandardFont::Helvetica.text_width("Müller", 10.0) - 27.22).abs() < 1e-4);
    }

    #[test]
    fn test_outside_win_ansi_uses_fallback() {
        assert_eq!(StandardFont::Helvetica.char_width('\u{7F}'), 556);
        assert_eq!(StandardFont::Helvetica.char_width('\u{9F}'), 556);
        assert_eq!(StandardFont::Helvetica.char_width('Ж'), 556);
        assert_eq!(StandardFont::TimesRoman.char_width('\u{2014}'), 500);
        assert_eq!(StandardFont::Courier.char_width('x'), 600);
    }

    #[test]
    fn test_parse_font_names() {
        assert_eq!("Helvetica".parse::<StandardFont>(), Ok(StandardFont::Helvetica));
        assert_eq!("helvetica-bold".parse::<StandardFont>(), Ok(StandardFont::HelveticaBold));
        assert_eq!(" Times-Roman ".parse::<StandardFont>(), Ok(StandardFont::TimesRoman));
        assert_eq!("Courier".parse::<StandardFont>(), Ok(StandardFont::Courier));
        assert!("Comic Sans".parse::<StandardFont>().is_err());
    }

    #[test]
    fn test_tables_cover_printable_win_ansi() {
        for font in StandardFont::ALL {
            for ch in (' '..='~').chain('\u{A0}'..='\u{FF}') {
                assert!(font.char_width(ch) > 0, "{font} has no width for {ch:?}");
            }
        }
    }
}
