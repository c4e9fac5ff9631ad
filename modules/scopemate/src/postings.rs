//! Posting iteration: scan the listing rows in document order, honor the
//! skip-then-one traversal policy, open each selected posting's detail tab,
//! and hand exactly one posting to the triage pipeline per run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::Deserialize;
use tracing::{debug, info, warn};

use scopemate_common::{Posting, RunStats, ScopeError};

use crate::artifacts::sanitize_filename;
use crate::browser::BrowserSession;
use crate::traits::{Classifier, DocumentSink, LetterWriter};
use crate::wait;

const DESCRIPTION_SELECTOR: &str = "span.np-view-question--28";
const DESCRIPTION_TIMEOUT: Duration = Duration::from_secs(15);
/// Bound on the click-to-new-tab race. The source this replaces would hang
/// forever on a click that opened nothing.
const NEW_TAB_TIMEOUT: Duration = Duration::from_secs(10);

/// Row scan runs in-page: one evaluate call snapshots every posting row
/// instead of a CDP round-trip per cell.
const SCAN_ROWS_SCRIPT: &str = r#"(() => {
    const rows = Array.from(document.querySelectorAll('tr[id^="posting"]'));
    return rows.map((row) => {
        const cells = Array.from(row.querySelectorAll("td.orgDivTitleMaxWidth"));
        return {
            rowId: row.id,
            title: cells.length > 0 ? (cells[0].getAttribute("title") || "") : null,
            company: cells.length > 1 ? cells[1].innerText.trim() : "",
            hasAction: row.querySelector("a.btn.btn-primary") !== null,
        };
    });
})()"#;

/// What the row scan sees in one `tr[id^="posting"]` row. `title` is
/// `None` when the row lacks a title cell entirely; `company` is empty
/// when the row has fewer than two label cells.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSnapshot {
    pub row_id: String,
    pub title: Option<String>,
    pub company: String,
    pub has_action: bool,
}

/// Run-local cursor for the "skip the first K actionable rows, then
/// process exactly one" policy. Restarts at zero every run, so the same K
/// rows are skipped until the listing order or K changes.
#[derive(Debug)]
pub struct TraversalCursor {
    seen: usize,
    skip: usize,
}

impl TraversalCursor {
    pub fn new(skip: usize) -> Self {
        Self { seen: 0, skip }
    }

    /// Count one actionable row; true when the row falls past the skip
    /// budget and is selected for processing.
    pub fn advance(&mut self) -> bool {
        self.seen += 1;
        self.seen > self.skip
    }

    pub fn seen(&self) -> usize {
        self.seen
    }
}

/// Downstream half of the walk: classification, letter synthesis, and
/// artifact writes for the one selected posting.
pub struct TriagePipeline<'a> {
    classifier: &'a dyn Classifier,
    letters: &'a dyn LetterWriter,
    sink: &'a dyn DocumentSink,
    output_dir: PathBuf,
}

impl<'a> TriagePipeline<'a> {
    pub fn new(
        classifier: &'a dyn Classifier,
        letters: &'a dyn LetterWriter,
        sink: &'a dyn DocumentSink,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            classifier,
            letters,
            sink,
            output_dir: output_dir.into(),
        }
    }

    pub async fn run(&self, posting: &Posting, stats: &mut RunStats) -> Result<(), ScopeError> {
        let description = posting.description.as_deref().unwrap_or_default();

        let judgment = self.classifier.judge(&posting.title, description).await;
        stats.postings_classified += 1;
        info!(
            is_dev = judgment.is_dev,
            is_fit = judgment.is_fit,
            reason = %judgment.reason,
            "Classifier verdict"
        );

        if !(judgment.is_dev && judgment.is_fit) {
            info!(title = %posting.title, "Skipping cover letter (not a dev role or not a fit)");
            return Ok(());
        }

        let filename = sanitize_filename(&posting.title);

        match self
            .sink
            .save(&filename, description, &self.output_dir.join("job_descriptions"))
        {
            Ok(path) => {
                info!(path = %path.display(), "Saved job description");
                stats.descriptions_written += 1;
            }
            Err(e) => warn!(title = %posting.title, error = %e, "Failed to save job description"),
        }

        match self.letters.compose(&posting.company, description).await {
            Ok(letter) => {
                match self
                    .sink
                    .save(&filename, &letter, &self.output_dir.join("cover_letters"))
                {
                    Ok(path) => {
                        info!(path = %path.display(), "Saved cover letter");
                        stats.letters_written += 1;
                    }
                    Err(e) => {
                        warn!(title = %posting.title, error = %e, "Failed to save cover letter");
                    }
                }
            }
            // An empty description is the one fatal letter failure; API
            // errors just cost this posting its letter.
            Err(ScopeError::EmptyDescription) => return Err(ScopeError::EmptyDescription),
            Err(e) => warn!(title = %posting.title, error = %e, "Cover letter generation failed"),
        }

        Ok(())
    }
}

pub struct PostingIterator<'a> {
    session: &'a BrowserSession,
    pipeline: TriagePipeline<'a>,
    skip_count: usize,
}

impl<'a> PostingIterator<'a> {
    pub fn new(session: &'a BrowserSession, pipeline: TriagePipeline<'a>, skip_count: usize) -> Self {
        Self {
            session,
            pipeline,
            skip_count,
        }
    }

    pub async fn process_postings(&self, listing: &Page) -> Result<RunStats, ScopeError> {
        info!("Scanning job postings");
        let rows = scan_rows(listing).await?;
        info!(rows = rows.len(), "Found job rows");

        let mut stats = RunStats::default();
        let mut cursor = TraversalCursor::new(self.skip_count);

        for snapshot in rows {
            stats.rows_seen += 1;

            let Some(title) = snapshot.title.clone() else {
                warn!(row = %snapshot.row_id, "Row has no title cell, skipping row");
                stats.row_failures += 1;
                continue;
            };

            if !snapshot.has_action {
                debug!(title = %title, "Row has no action control, skipping");
                stats.rows_without_action += 1;
                continue;
            }

            info!(title = %title, "Opening job detail");
            let detail = match self.open_detail(listing, &snapshot.row_id).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(title = %title, error = %e, "Could not open detail view");
                    stats.row_failures += 1;
                    continue;
                }
            };

            let description = match extract_description(&detail).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(title = %title, error = %e, "Failed to extract job description");
                    capture_failure_screenshot(&detail).await;
                    stats.row_failures += 1;
                    close_detail(detail, listing).await;
                    // One selection per run, successful or not.
                    break;
                }
            };

            if !cursor.advance() {
                info!(n = cursor.seen(), title = %title, "Skipping job (within skip budget)");
                stats.rows_skipped += 1;
                close_detail(detail, listing).await;
                continue;
            }

            info!(n = cursor.seen(), title = %title, "Handling job");
            let posting = Posting {
                row: cursor.seen(),
                title,
                company: snapshot.company.clone(),
                description: Some(description),
            };
            let outcome = self.pipeline.run(&posting, &mut stats).await;
            close_detail(detail, listing).await;
            outcome?;

            // Single-item throttle: the model and rendering calls are
            // rate-limited resources, one selected posting per run.
            break;
        }

        Ok(stats)
    }

    /// Click the row's action control and adopt whichever new tab the
    /// engine creates, bringing it to the foreground.
    async fn open_detail(&self, listing: &Page, row_id: &str) -> Result<Page> {
        let known = self.session.target_ids().await?;

        let (clicked, created) = tokio::join!(
            click_row_action(listing, row_id),
            self.session.wait_for_new_page(&known, NEW_TAB_TIMEOUT),
        );

        if !clicked? {
            anyhow::bail!("action control vanished before the click");
        }
        let detail = created?;
        detail.bring_to_front().await?;
        Ok(detail)
    }
}

async fn scan_rows(listing: &Page) -> Result<Vec<RowSnapshot>, ScopeError> {
    listing
        .evaluate(SCAN_ROWS_SCRIPT)
        .await
        .map_err(|e| ScopeError::Extraction(e.to_string()))?
        .into_value()
        .map_err(|e| ScopeError::Extraction(e.to_string()))
}

async fn click_row_action(listing: &Page, row_id: &str) -> Result<bool> {
    let row_id = serde_json::Value::String(row_id.to_string());
    let script = format!(
        r#"(() => {{
            const row = document.getElementById({row_id});
            if (!row) return false;
            const action = row.querySelector("a.btn.btn-primary");
            if (!action) return false;
            action.click();
            return true;
        }})()"#
    );
    Ok(listing.evaluate(script).await?.into_value()?)
}

async fn extract_description(detail: &Page) -> Result<String> {
    let span = wait::wait_for_selector(detail, DESCRIPTION_SELECTOR, DESCRIPTION_TIMEOUT)
        .await
        .map_err(|_| {
            anyhow::anyhow!("description element {DESCRIPTION_SELECTOR} never appeared")
        })?;
    let text = span.inner_text().await?.unwrap_or_default();
    Ok(text.trim().to_string())
}

async fn close_detail(detail: Page, listing: &Page) {
    if let Err(e) = detail.close().await {
        debug!(error = %e, "Failed to close detail tab");
    }
    if let Err(e) = listing.bring_to_front().await {
        debug!(error = %e, "Failed to refocus listing tab");
    }
}

async fn capture_failure_screenshot(page: &Page) {
    let path = format!("error_{}.png", chrono::Utc::now().timestamp_millis());
    match page
        .save_screenshot(ScreenshotParams::builder().build(), &path)
        .await
    {
        Ok(_) => info!(path, "Captured failure screenshot"),
        Err(e) => debug!(error = %e, "Screenshot capture failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scopemate_common::FitJudgment;
    use std::path::Path;
    use std::sync::Mutex;

    #[test]
    fn cursor_selects_exactly_the_row_after_the_skip_budget() {
        let skip = 3;
        let mut cursor = TraversalCursor::new(skip);
        let mut classified = Vec::new();
        for row in 1..=10 {
            if cursor.advance() {
                classified.push(row);
                break;
            }
        }
        assert_eq!(classified, vec![skip + 1]);
    }

    #[test]
    fn zero_skip_selects_the_first_actionable_row() {
        let mut cursor = TraversalCursor::new(0);
        assert!(cursor.advance());
        assert_eq!(cursor.seen(), 1);
    }

    #[test]
    fn row_snapshot_with_one_cell_has_empty_company() {
        let snapshot: RowSnapshot = serde_json::from_str(
            r#"{"rowId":"posting123","title":"Dev Intern","company":"","hasAction":true}"#,
        )
        .unwrap();
        assert_eq!(snapshot.company, "");
        assert_eq!(snapshot.title.as_deref(), Some("Dev Intern"));
    }

    #[test]
    fn row_snapshot_without_title_cell_parses_as_none() {
        let snapshot: RowSnapshot = serde_json::from_str(
            r#"{"rowId":"posting9","title":null,"company":"","hasAction":false}"#,
        )
        .unwrap();
        assert!(snapshot.title.is_none());
    }

    // --- pipeline mocks ---

    struct FixedClassifier(FitJudgment);

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn judge(&self, _title: &str, _description: &str) -> FitJudgment {
            self.0.clone()
        }
    }

    struct CannedLetter;

    #[async_trait]
    impl LetterWriter for CannedLetter {
        async fn compose(&self, _company: &str, description: &str) -> Result<String, ScopeError> {
            if description.trim().is_empty() {
                return Err(ScopeError::EmptyDescription);
            }
            Ok("Dear Hiring Manager,".to_string())
        }
    }

    struct FailingLetter;

    #[async_trait]
    impl LetterWriter for FailingLetter {
        async fn compose(&self, _company: &str, _description: &str) -> Result<String, ScopeError> {
            Err(ScopeError::Model("rate limited".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<(String, PathBuf)>>);

    impl DocumentSink for RecordingSink {
        fn save(&self, filename: &str, _content: &str, folder: &Path) -> Result<PathBuf> {
            let path = folder.join(format!("{filename}.pdf"));
            self.0
                .lock()
                .unwrap()
                .push((filename.to_string(), folder.to_path_buf()));
            Ok(path)
        }
    }

    fn posting(title: &str, description: &str) -> Posting {
        Posting {
            row: 17,
            title: title.to_string(),
            company: "Example Networks".to_string(),
            description: Some(description.to_string()),
        }
    }

    fn fit() -> FitJudgment {
        FitJudgment {
            is_dev: true,
            is_fit: true,
            reason: "full stack React".to_string(),
        }
    }

    #[tokio::test]
    async fn dev_fit_posting_writes_description_and_letter() {
        let classifier = FixedClassifier(fit());
        let letters = CannedLetter;
        let sink = RecordingSink::default();
        let pipeline = TriagePipeline::new(&classifier, &letters, &sink, "out");

        let mut stats = RunStats::default();
        pipeline
            .run(
                &posting("Software Developer Intern", "full stack React work"),
                &mut stats,
            )
            .await
            .unwrap();

        let saved = sink.0.lock().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].0, "software_developer_intern");
        assert!(saved[0].1.ends_with("job_descriptions"));
        assert_eq!(saved[1].0, "software_developer_intern");
        assert!(saved[1].1.ends_with("cover_letters"));
        assert_eq!(stats.postings_classified, 1);
        assert_eq!(stats.descriptions_written, 1);
        assert_eq!(stats.letters_written, 1);
    }

    #[tokio::test]
    async fn non_dev_posting_writes_nothing() {
        let classifier = FixedClassifier(FitJudgment::non_fit("mechanical, not software"));
        let letters = CannedLetter;
        let sink = RecordingSink::default();
        let pipeline = TriagePipeline::new(&classifier, &letters, &sink, "out");

        let mut stats = RunStats::default();
        pipeline
            .run(
                &posting("Mechanical Engineering Co-op", "design of HVAC systems"),
                &mut stats,
            )
            .await
            .unwrap();

        assert!(sink.0.lock().unwrap().is_empty());
        assert_eq!(stats.postings_classified, 1);
        assert_eq!(stats.letters_written, 0);
    }

    #[tokio::test]
    async fn letter_api_failure_still_saves_the_description() {
        let classifier = FixedClassifier(fit());
        let letters = FailingLetter;
        let sink = RecordingSink::default();
        let pipeline = TriagePipeline::new(&classifier, &letters, &sink, "out");

        let mut stats = RunStats::default();
        pipeline
            .run(&posting("Web Developer Co-op", "React and Node"), &mut stats)
            .await
            .unwrap();

        let saved = sink.0.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].1.ends_with("job_descriptions"));
        assert_eq!(stats.letters_written, 0);
    }

    #[tokio::test]
    async fn empty_description_on_a_selected_posting_is_fatal() {
        let classifier = FixedClassifier(fit());
        let letters = CannedLetter;
        let sink = RecordingSink::default();
        let pipeline = TriagePipeline::new(&classifier, &letters, &sink, "out");

        let mut stats = RunStats::default();
        let result = pipeline
            .run(&posting("Software Developer Intern", ""), &mut stats)
            .await;
        assert!(matches!(result, Err(ScopeError::EmptyDescription)));
    }
}
