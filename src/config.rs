// src/config.rs
//! CLI input, crawl options and their resolution into a validated config.

use crate::api::{RateLimit, RetryPolicy};
use crate::constants::{
    DEFAULT_CONCURRENCY, MIN_REFILL_PER_SECOND, NOTION_API_BASE_URL, NOTION_MAX_BLOCK_DEPTH,
    RATE_LIMIT_CAPACITY, RATE_LIMIT_REFILL_PER_SECOND,
};
use crate::error::CrawlError;
use crate::formatting::ExtractOptions;
use crate::types::{ApiKey, PageId, ValidatedUrl, ValidationError};
use clap::Parser;
use std::path::PathBuf;

/// Environment variables consulted for the integration token, in order.
pub const API_KEY_VARIABLES: [&str; 2] = ["NOTION_API_KEY", "NOTION_TOKEN"];

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Notion page URLs or IDs to start crawling from
    #[arg(required = true)]
    pub page_ids: Vec<String>,

    /// Number of pages fetched concurrently (clamped to 1..=32)
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Maximum block nesting inside one page
    #[arg(long, default_value_t = NOTION_MAX_BLOCK_DEPTH)]
    pub max_depth: usize,

    /// Emit markers such as `[image: <url>]` for blocks without text
    #[arg(long, default_value_t = false)]
    pub placeholders: bool,

    /// Do not put the page title on the first line
    #[arg(long = "no-titles", action = clap::ArgAction::SetTrue)]
    pub no_titles: bool,

    /// Token bucket capacity (burst size)
    #[arg(long, default_value_t = RATE_LIMIT_CAPACITY)]
    pub rate_capacity: u32,

    /// Tokens added per second
    #[arg(long, default_value_t = RATE_LIMIT_REFILL_PER_SECOND)]
    pub rate_refill: f64,

    /// Write one doc_<page_id>.md per page into this directory instead of printing
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Notion API base URL (for proxies and testing)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Tuning knobs of a crawl.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub concurrency: usize,
    pub max_depth: usize,
    pub include_non_text_placeholders: bool,
    pub include_titles: bool,
    pub rate_limit: RateLimit,
    pub retry: RetryPolicy,
    /// `None` means the public Notion API.
    pub base_url: Option<ValidatedUrl>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_depth: NOTION_MAX_BLOCK_DEPTH,
            include_non_text_placeholders: false,
            include_titles: true,
            rate_limit: RateLimit::default(),
            retry: RetryPolicy::default(),
            base_url: None,
        }
    }
}

impl LoadOptions {
    /// Rejects settings that would stall or break a crawl.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rate_limit.capacity == 0 {
            return Err(ValidationError::OutOfBounds {
                field: "rate_limit.capacity",
                value: 0.0,
                min: 1.0,
                max: f64::from(u32::MAX),
            });
        }
        let refill = self.rate_limit.refill_per_second;
        if !refill.is_finite() || refill < MIN_REFILL_PER_SECOND {
            return Err(ValidationError::OutOfBounds {
                field: "rate_limit.refill_per_second",
                value: refill,
                min: MIN_REFILL_PER_SECOND,
                max: f64::MAX,
            });
        }
        if self.max_depth == 0 {
            return Err(ValidationError::OutOfBounds {
                field: "max_depth",
                value: 0.0,
                min: 1.0,
                max: usize::MAX as f64,
            });
        }
        if self.retry.request_timeout.is_zero() {
            return Err(ValidationError::OutOfBounds {
                field: "retry.request_timeout",
                value: 0.0,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        Ok(())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            include_titles: self.include_titles,
            include_non_text_placeholders: self.include_non_text_placeholders,
        }
    }

    /// The configured base URL, or the public API.
    pub fn resolved_base_url(&self) -> Result<ValidatedUrl, ValidationError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => ValidatedUrl::parse(NOTION_API_BASE_URL),
        }
    }
}

/// Resolved crawl configuration: validated and ready to run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub page_ids: Vec<PageId>,
    pub api_key: ApiKey,
    pub options: LoadOptions,
    pub output_dir: Option<PathBuf>,
    pub verbose: bool,
}

impl CrawlConfig {
    /// Resolves a complete configuration from CLI input and environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, CrawlError> {
        let api_key = api_key_from_env()?;

        let page_ids = cli
            .page_ids
            .iter()
            .map(|raw| PageId::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let base_url = cli
            .base_url
            .as_deref()
            .map(ValidatedUrl::parse)
            .transpose()?;

        let options = LoadOptions {
            concurrency: cli.concurrency,
            max_depth: cli.max_depth,
            include_non_text_placeholders: cli.placeholders,
            include_titles: !cli.no_titles,
            rate_limit: RateLimit {
                capacity: cli.rate_capacity,
                refill_per_second: cli.rate_refill,
            },
            retry: RetryPolicy::default(),
            base_url,
        };
        options.validate()?;

        Ok(CrawlConfig {
            page_ids,
            api_key,
            options,
            output_dir: cli.output_dir.map(PathBuf::from),
            verbose: cli.verbose,
        })
    }
}

/// Reads the integration token from the environment.
pub fn api_key_from_env() -> Result<ApiKey, CrawlError> {
    api_key_from(|name| std::env::var(name).ok())
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<ApiKey, CrawlError> {
    let raw = API_KEY_VARIABLES
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        .ok_or_else(|| {
            CrawlError::MissingConfiguration(format!(
                "set {} (or {}) to a Notion integration token",
                API_KEY_VARIABLES[0], API_KEY_VARIABLES[1]
            ))
        })?;
    Ok(ApiKey::new(raw.trim())?)
}
