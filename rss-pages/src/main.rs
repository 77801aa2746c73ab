use anyhow::Context;
use chrono::Utc;
use rss_pages::{load_settings, ConfigPaths, RssAggregator, RunReport};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(report) => {
            log_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<RunReport> {
    let now = Utc::now();

    let settings = load_settings(&ConfigPaths::default()).context("Error loading configuration")?;
    let mut aggregator = RssAggregator::from_settings(settings, now).context("Error preparing run")?;

    let report = aggregator.run(now).await.context("Error publishing articles")?;
    Ok(report)
}

fn log_report(report: &RunReport) {
    for failure in &report.failures {
        warn!("Skipped feed {}: {}", failure.url, failure.error);
    }
    for failure in &report.publish.failures {
        warn!("Not written: {}: {}", failure.path.display(), failure.error);
    }
    if let Some(expired) = report.expired_entries {
        info!("Pruned {} expired fetch log entries", expired);
    }
    if let Some(e) = &report.fetch_log_error {
        warn!("Fetch log was not saved, next run will treat these articles as new: {}", e);
    }

    if report.is_clean() {
        info!(
            "Articles fetched, sorted, and saved successfully ({} articles, {} pages).",
            report.articles, report.publish.total_pages
        );
    } else {
        info!(
            "Finished with errors ({} articles, {} of {} pages written, {} feeds skipped).",
            report.articles,
            report.publish.pages_written,
            report.publish.total_pages,
            report.failures.len()
        );
    }
}
