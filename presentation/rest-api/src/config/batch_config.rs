use std::env;

use anyhow::Context;
use business::application::receipt::extract_batch::BatchConfig;

const DEFAULT_MAX_IMAGES: usize = 20;

/// Load batch limits from environment variables
///
/// Environment variables:
/// - BATCH_MAX_IMAGES: largest accepted batch (default: 20)
/// - BATCH_MAX_CONCURRENCY: extractions in flight at once (default: unbounded)
pub fn from_env() -> anyhow::Result<BatchConfig> {
    from_values(
        env::var("BATCH_MAX_IMAGES").ok().as_deref(),
        env::var("BATCH_MAX_CONCURRENCY").ok().as_deref(),
    )
}

fn from_values(
    max_images: Option<&str>,
    max_concurrency: Option<&str>,
) -> anyhow::Result<BatchConfig> {
    let max_images = match max_images {
        Some(raw) => parse_positive(raw).context("BATCH_MAX_IMAGES")?,
        None => DEFAULT_MAX_IMAGES,
    };
    let max_concurrency = max_concurrency
        .map(|raw| parse_positive(raw).context("BATCH_MAX_CONCURRENCY"))
        .transpose()?;

    Ok(BatchConfig {
        max_images: Some(max_images),
        max_concurrency,
    })
}

fn parse_positive(raw: &str) -> anyhow::Result<usize> {
    let value: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("expected a positive integer, got {raw:?}"))?;
    anyhow::ensure!(value > 0, "expected a positive integer, got 0");
    Ok(value)
}
