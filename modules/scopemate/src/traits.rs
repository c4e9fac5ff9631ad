// Trait seams for the triage pipeline dependencies.
//
// Classifier and LetterWriter wrap the OpenRouter calls; DocumentSink wraps
// PDF rendering. The posting walk stays testable without a network or a
// browser: mock impls live next to the pipeline tests.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use scopemate_common::{FitJudgment, ScopeError};

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Judge a posting. Infallible by contract: transport and parse
    /// failures degrade to the non-fit default with a diagnostic reason.
    async fn judge(&self, title: &str, description: &str) -> FitJudgment;
}

#[async_trait]
pub trait LetterWriter: Send + Sync {
    /// Compose a cover letter for the posting. The only fatal failure is
    /// an empty job description (`ScopeError::EmptyDescription`); a model
    /// response with no content composes to the empty string.
    async fn compose(&self, company: &str, description: &str) -> Result<String, ScopeError>;
}

pub trait DocumentSink: Send + Sync {
    /// Persist `content` as `{filename}.<ext>` inside `folder`, creating
    /// the folder if needed and overwriting any previous artifact.
    fn save(&self, filename: &str, content: &str, folder: &Path) -> Result<PathBuf>;
}
