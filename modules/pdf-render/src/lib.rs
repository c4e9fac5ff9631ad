//! Renders plain text into paginated Letter-size PDFs: fixed margins,
//! Helvetica 12pt, word-boundary wrapping against measured line widths.

pub mod error;
mod metrics;

pub use error::{RenderError, Result};
pub use metrics::text_width;

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};

const PAGE_WIDTH_PT: f32 = 612.0;
const PAGE_HEIGHT_PT: f32 = 792.0;
const MARGIN_PT: f32 = 50.0;
const FONT_SIZE_PT: f32 = 12.0;
const LINE_HEIGHT_PT: f32 = FONT_SIZE_PT + 4.0;

/// Render `content` as `{filename}.pdf` inside `folder`, creating the
/// folder if needed. A second call with the same filename overwrites.
pub fn save_pdf(filename: &str, content: &str, folder: impl AsRef<Path>) -> Result<PathBuf> {
    let folder = folder.as_ref();
    fs::create_dir_all(folder)?;

    let (doc, first_page, first_layer) = PdfDocument::new(
        filename,
        Mm::from(Pt(PAGE_WIDTH_PT)),
        Mm::from(Pt(PAGE_HEIGHT_PT)),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    let max_line_width = PAGE_WIDTH_PT - MARGIN_PT * 2.0;
    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT_PT - MARGIN_PT;

    for raw_line in content.lines() {
        let wrapped = wrap_line(raw_line, max_line_width, FONT_SIZE_PT);
        if wrapped.is_empty() {
            // Blank input line: advance one line height.
            y -= LINE_HEIGHT_PT;
            continue;
        }
        for sub_line in wrapped {
            if y - LINE_HEIGHT_PT < MARGIN_PT {
                let (page, layer_idx) = doc.add_page(
                    Mm::from(Pt(PAGE_WIDTH_PT)),
                    Mm::from(Pt(PAGE_HEIGHT_PT)),
                    "Layer 1",
                );
                layer = doc.get_page(page).get_layer(layer_idx);
                y = PAGE_HEIGHT_PT - MARGIN_PT;
            }
            layer.use_text(sub_line, FONT_SIZE_PT, Mm::from(Pt(MARGIN_PT)), Mm::from(Pt(y)), &font);
            y -= LINE_HEIGHT_PT;
        }
    }

    let path = folder.join(format!("{filename}.pdf"));
    let file = fs::File::create(&path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(path)
}

/// Wrap one input line on word boundaries so no output line measures wider
/// than `max_width` points. A line exactly at `max_width` is not split; a
/// single word wider than the limit is emitted unbroken.
pub fn wrap_line(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for (i, word) in text.split_whitespace().enumerate() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font_size) > max_width && i > 0 {
            wrapped.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_wraps_to_nothing() {
        assert!(wrap_line("", 500.0, 12.0).is_empty());
        assert!(wrap_line("   ", 500.0, 12.0).is_empty());
    }

    #[test]
    fn line_exactly_at_printable_width_is_not_split() {
        let line = "lorem ipsum dolor";
        let exact = text_width(line, 12.0);
        assert_eq!(wrap_line(line, exact, 12.0), vec![line.to_string()]);
    }

    #[test]
    fn line_one_unit_wider_splits_before_the_overflowing_word() {
        let line = "lorem ipsum dolor";
        let exact = text_width(line, 12.0);
        let wrapped = wrap_line(line, exact - 1.0, 12.0);
        assert_eq!(
            wrapped,
            vec!["lorem ipsum".to_string(), "dolor".to_string()]
        );
    }

    #[test]
    fn single_overlong_word_is_emitted_unbroken() {
        let word = "antidisestablishmentarianism";
        assert_eq!(wrap_line(word, 10.0, 12.0), vec![word.to_string()]);
    }

    #[test]
    fn words_rewrap_across_multiple_lines() {
        let line = "a bb ccc dddd eeeee";
        let narrow = text_width("dddd", 12.0) + 1.0;
        for sub in wrap_line(line, narrow, 12.0) {
            assert!(text_width(&sub, 12.0) <= narrow || !sub.contains(' '));
        }
    }

    #[test]
    fn save_creates_folder_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("job_descriptions");
        let path = save_pdf("demo", "hello world", &nested).unwrap();
        assert!(path.ends_with("job_descriptions/demo.pdf"));
        assert!(path.exists());
    }

    #[test]
    fn rewrite_overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let long = "paragraph of text\n".repeat(200);
        let first = save_pdf("same", &long, dir.path()).unwrap();
        let long_len = fs::metadata(&first).unwrap().len();

        let second = save_pdf("same", "short", dir.path()).unwrap();
        let short_len = fs::metadata(&second).unwrap().len();

        assert_eq!(first, second);
        assert!(short_len < long_len);
    }

    #[test]
    fn multi_page_content_renders() {
        let dir = tempfile::tempdir().unwrap();
        // 60+ lines at 16pt line height overflows one Letter page.
        let content = (0..80).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let path = save_pdf("pages", &content, dir.path()).unwrap();
        assert!(fs::metadata(path).unwrap().len() > 0);
    }
}
