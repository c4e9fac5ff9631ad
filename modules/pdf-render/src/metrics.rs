//! Helvetica advance widths in 1/1000 em units, from the Adobe core-font
//! AFM data. printpdf's builtin fonts carry no measuring API, so line
//! wrapping measures text with this table the way pdf-lib's
//! `widthOfTextAtSize` does.

/// Widths for the printable ASCII range, indexed by `code - 0x20`.
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, // space ! " # $ % & '
    333, 333, 389, 584, 278, 333, 278, 278, // ( ) * + , - . /
    556, 556, 556, 556, 556, 556, 556, 556, // 0 1 2 3 4 5 6 7
    556, 556, 278, 278, 584, 584, 584, 556, // 8 9 : ; < = > ?
    1015, 667, 667, 722, 722, 667, 611, 778, // @ A B C D E F G
    722, 278, 500, 667, 556, 833, 722, 778, // H I J K L M N O
    667, 778, 722, 667, 611, 722, 667, 944, // P Q R S T U V W
    667, 667, 611, 278, 278, 278, 469, 556, // X Y Z [ \ ] ^ _
    333, 556, 556, 500, 556, 556, 278, 556, // ` a b c d e f g
    556, 222, 222, 500, 222, 833, 556, 556, // h i j k l m n o
    556, 556, 333, 500, 278, 556, 500, 722, // p q r s t u v w
    500, 500, 500, 334, 260, 334, 584, // x y z { | } ~
];

/// Width outside the ASCII range; the digit/lowercase advance is the
/// conventional stand-in for unmeasured glyphs.
const FALLBACK_WIDTH: u16 = 556;

fn char_width(c: char) -> u16 {
    let code = c as u32;
    match code {
        0x20..=0x7e => ASCII_WIDTHS[(code - 0x20) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` at `font_size` points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    units as f32 * font_size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_is_narrower_than_em() {
        assert!(text_width(" ", 12.0) < text_width("m", 12.0));
    }

    #[test]
    fn width_scales_linearly_with_font_size() {
        let at_12 = text_width("abc", 12.0);
        let at_24 = text_width("abc", 24.0);
        assert!((at_24 - at_12 * 2.0).abs() < f32::EPSILON * 100.0);
    }

    #[test]
    fn non_ascii_uses_fallback_width() {
        assert_eq!(text_width("界", 10.0), FALLBACK_WIDTH as f32 * 10.0 / 1000.0);
    }
}
