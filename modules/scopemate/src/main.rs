use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenRouter;
use scopemate::artifacts::PdfSink;
use scopemate::browser::BrowserSession;
use scopemate::navigator;
use scopemate::postings::{PostingIterator, TriagePipeline};
use scopemate::session::SessionManager;
use scopemate::triage::TriageAdvisor;
use scopemate_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("scopemate=info".parse()?))
        .init();

    info!("scopemate starting");

    let config = Config::from_env()?;
    config.log_redacted();

    let session = BrowserSession::launch(&config.profile_dir, config.headless).await?;
    let page = session.new_page().await?;
    page.bring_to_front().await?;

    let manager = SessionManager::new(&config.base_url, config.credentials.clone());
    manager.ensure_authenticated(&page).await?;

    navigator::open_listing(&page, &config.listing_label).await?;

    let advisor = TriageAdvisor::new(
        OpenRouter::new(&config.open_router_api_key).with_app_name("scopemate"),
        &config.model,
    );
    let sink = PdfSink;
    let pipeline = TriagePipeline::new(&advisor, &advisor, &sink, &config.output_dir);
    let iterator = PostingIterator::new(&session, pipeline, config.skip_count);

    let stats = iterator.process_postings(&page).await?;

    info!("All jobs scanned");
    println!("{stats}");

    session.close().await?;
    Ok(())
}
