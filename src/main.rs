// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_scraper::{
    crawl_with_transport, deliver, CommandLineInput, CrawlConfig, CrawlError, DeliveryTarget,
    NotionHttpClient, OutputPlan,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
///
/// Console output goes to stderr so extracted text on stdout stays clean.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion_scraper.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let console_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Crawls the configured roots and delivers the documents.
async fn run(config: &CrawlConfig) -> Result<(), CrawlError> {
    let base_url = config.options.resolved_base_url()?;
    let transport = Arc::new(NotionHttpClient::new(&config.api_key, &base_url)?);

    let report = crawl_with_transport(transport, &config.page_ids, &config.options).await?;
    for skipped in &report.skipped {
        log::warn!("Skipped page {}: {}", skipped.page_id, skipped.reason);
    }

    let plan = OutputPlan::for_documents(&report.documents, config.output_dir.as_deref());
    let delivery = deliver(plan);
    if !delivery.is_success() {
        return Err(CrawlError::DeliveryFailed {
            failures: delivery.failed.iter().map(|f| f.error.clone()).collect(),
        });
    }

    if config.output_dir.is_some() {
        let written = delivery
            .completed
            .iter()
            .filter(|done| matches!(done.operation, DeliveryTarget::WriteFile { .. }))
            .count();
        eprintln!(
            "✓ Wrote {} document(s) ({} skipped) in {} ms",
            written,
            report.skipped.len(),
            report.duration().num_milliseconds()
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).context("failed to initialize logging")?;

    let config = CrawlConfig::resolve(cli).context("invalid configuration")?;

    run(&config).await.context("crawl failed")?;

    Ok(())
}
