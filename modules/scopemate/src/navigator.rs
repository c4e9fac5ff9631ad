//! Listing navigation: activate the postings view inside the already
//! authenticated page.

use std::time::Duration;

use chromiumoxide::Page;
use tracing::{info, warn};

use scopemate_common::ScopeError;

/// Fixed settle delay after the click; the listing populates client-side
/// with nothing reliable to wait on.
const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Click the first anchor whose visible text contains `label` (exact,
/// case-sensitive substring). A missing anchor is a silent no-op: the
/// subsequent row scan simply finds zero rows.
pub async fn open_listing(page: &Page, label: &str) -> Result<(), ScopeError> {
    open_listing_with_settle(page, label, SETTLE_DELAY).await
}

pub async fn open_listing_with_settle(
    page: &Page,
    label: &str,
    settle: Duration,
) -> Result<(), ScopeError> {
    info!(label, "Opening postings listing");

    let clicked: bool = page
        .evaluate(find_and_click_script(label))
        .await
        .map_err(|e| ScopeError::Navigation(e.to_string()))?
        .into_value()
        .map_err(|e| ScopeError::Navigation(e.to_string()))?;

    if !clicked {
        warn!(label, "No anchor matched the listing label; expecting zero rows");
    }

    tokio::time::sleep(settle).await;
    Ok(())
}

fn find_and_click_script(label: &str) -> String {
    // serde_json quoting keeps arbitrary label text a valid JS literal.
    let label = serde_json::Value::String(label.to_string());
    format!(
        r#"(() => {{
            const links = Array.from(document.querySelectorAll("a"));
            const target = links.find((link) => link.textContent.includes({label}));
            if (target) {{ target.click(); return true; }}
            return false;
        }})()"#
    )
}
