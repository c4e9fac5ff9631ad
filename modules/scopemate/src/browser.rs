//! Chromium session bootstrap over CDP. One run owns the persisted
//! profile directory exclusively; the engine mutates it during login,
//! which is what lets later runs skip the SSO handshake.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::target::TargetId;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

use crate::wait::POLL_INTERVAL;

pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(profile_dir: &Path, headless: bool) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox");
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(|e| anyhow!(e))?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .context("Failed to launch Chromium")?;

        // The CDP event loop must be driven for the connection to stay alive.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!(profile = %profile_dir.display(), headless, "Chromium session started");
        Ok(Self { browser, handler })
    }

    pub async fn new_page(&self) -> Result<Page> {
        Ok(self.browser.new_page("about:blank").await?)
    }

    /// Target ids of every page currently open, used as the "before"
    /// snapshot when racing a click against new-tab creation.
    pub async fn target_ids(&self) -> Result<HashSet<TargetId>> {
        let pages = self.browser.pages().await?;
        Ok(pages.iter().map(|p| p.target_id().clone()).collect())
    }

    /// Wait for a page whose target id is not in `known`. The source this
    /// replaces would hang forever on a click that opened nothing; here the
    /// wait is bounded and the row is abandoned instead.
    pub async fn wait_for_new_page(
        &self,
        known: &HashSet<TargetId>,
        timeout: Duration,
    ) -> Result<Page> {
        let deadline = Instant::now() + timeout;
        loop {
            for page in self.browser.pages().await? {
                if !known.contains(page.target_id()) {
                    return Ok(page);
                }
            }
            if Instant::now() >= deadline {
                anyhow::bail!("No new browser tab appeared within {timeout:?}");
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        let _ = self.handler.await;
        Ok(())
    }
}
