//! Metrics for the two standard PDF fonts the report uses.
//!
//! Widths come from the Adobe core-14 AFM files for Helvetica and
//! Helvetica-Bold, in 1/1000 em, for the printable ASCII range. Latin-1 accented
//! letters share the width of their base letter.

use super::canvas::Area;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    pub fn base_font(&self) -> &'static [u8] {
        match self {
            Font::Regular => b"Helvetica",
            Font::Bold => b"Helvetica-Bold",
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            Font::Regular => &HELVETICA_WIDTHS,
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

const ASCENDER: f32 = 718.0;
const DESCENDER: f32 = -207.0;
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn glyph_width(font: Font, ch: char) -> u16 {
    let ch = base_letter(ch);
    let code = ch as u32;
    if (32..=126).contains(&code) {
        font.widths()[(code - 32) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

fn base_letter(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        '\u{a0}' => ' ',
        other => other,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| glyph_width(font, ch) as u32).sum();
    units as f32 * size / 1000.0
}

/// Box covered by a line of text drawn with its baseline at `(x, baseline)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextExtent {
    pub x: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl TextExtent {
    pub fn measure(text: &str, font: Font, size: f32, x: f32, baseline: f32) -> Self {
        Self {
            x,
            bottom: baseline + DESCENDER * size / 1000.0,
            width: text_width(text, font, size),
            height: (ASCENDER - DESCENDER) * size / 1000.0,
        }
    }

    pub fn area(&self) -> Area {
        Area {
            x: self.x,
            y: self.bottom,
            width: self.width,
            height: self.height,
        }
    }

    pub fn padded(&self, padding: f32) -> Area {
        Area {
            x: self.x - padding,
            y: self.bottom - padding,
            width: self.width + 2.0 * padding,
            height: self.height + 2.0 * padding,
        }
    }
}

/// Encodes text for the standard fonts' WinAnsi encoding. Characters outside
/// it become `?`.
pub fn to_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ 0x20..=0x7e => code as u8,
            code @ 0xa0..=0xff => code as u8,
            0x20ac => 0x80,
            0x2013 => 0x96,
            0x2014 => 0x97,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201c => 0x93,
            0x201d => 0x94,
            0x2022 => 0x95,
            0x2026 => 0x85,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap against a measured width. Words wider than the line are
/// split between characters.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, font, size) <= max_width {
            current = word.to_string();
        } else {
            for ch in word.chars() {
                current.push(ch);
                if text_width(&current, font, size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_known_strings() {
        // "Hi" = 722 + 222 in Helvetica
        assert!((text_width("Hi", Font::Regular, 10.0) - 9.44).abs() < 1e-4);
        // bold digits are 556 each
        assert!((text_width("100", Font::Bold, 12.0) - 20.016).abs() < 1e-4);
        assert_eq!(text_width("", Font::Regular, 12.0), 0.0);
    }

    #[test]
    fn accented_letters_use_base_width() {
        assert_eq!(
            text_width("Observação", Font::Regular, 11.0),
            text_width("Observacao", Font::Regular, 11.0)
        );
    }

    #[test]
    fn extent_spans_ascender_to_descender() {
        let extent = TextExtent::measure("Link", Font::Bold, 12.0, 50.0, 100.0);
        assert_eq!(extent.x, 50.0);
        assert!((extent.bottom - (100.0 - 2.484)).abs() < 1e-4);
        assert!((extent.height - 11.1).abs() < 1e-4);
        assert_eq!(extent.width, text_width("Link", Font::Bold, 12.0));
    }

    #[test]
    fn winansi_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(to_winansi("R$ é"), vec![b'R', b'$', b' ', 0xe9]);
        assert_eq!(to_winansi("€→"), vec![0x80, b'?']);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("alpha beta gamma delta", Font::Regular, 10.0, 60.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "alpha beta gamma delta");
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 60.0);
        }
    }

    #[test]
    fn splits_words_longer_than_the_line() {
        let lines = wrap_text("abcdefghijklmnop", Font::Regular, 10.0, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "abcdefghijklmnop");
    }
}
