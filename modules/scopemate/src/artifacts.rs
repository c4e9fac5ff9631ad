//! Artifact output: PDF sink and the filename convention for saved
//! descriptions and cover letters.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::traits::DocumentSink;

pub struct PdfSink;

impl DocumentSink for PdfSink {
    fn save(&self, filename: &str, content: &str, folder: &Path) -> Result<PathBuf> {
        Ok(pdf_render::save_pdf(filename, content, folder)?)
    }
}

/// Posting title to artifact filename: every non-alphanumeric character
/// becomes an underscore, the rest lowercased. No collapsing of runs —
/// consecutive punctuation yields consecutive underscores, matching the
/// filenames earlier runs produced.
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_underscores_and_case_folds() {
        assert_eq!(
            sanitize_filename("Software Developer Intern"),
            "software_developer_intern"
        );
    }

    #[test]
    fn punctuation_maps_one_to_one() {
        assert_eq!(sanitize_filename("C++ Dev (Co-op)"), "c___dev__co_op_");
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(sanitize_filename("Développeur"), "d_veloppeur");
    }
}
