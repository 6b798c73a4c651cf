use crate::config::types::{
    Config, CrawlConfig, CrawlSettings, OutputConfig, OutputTarget, MAX_WORKERS,
};
use crate::url::{check_domain, DomainRef};
use crate::{ConfigError, ConfigResult};
use std::path::PathBuf;
use std::time::Duration;

/// Output names at or above this length are truncated
const MAX_FILENAME_LEN: usize = 255;

/// Length an over-long output name is cut down to
const TRUNCATED_FILENAME_LEN: usize = 100;

/// Validates the entire configuration and builds the crawl settings
pub fn validate(config: &Config) -> ConfigResult<CrawlSettings> {
    let domain = validate_domain(&config.crawl.url)?;
    let workers = validate_workers(config.crawl.workers)?;
    let (page_budget, time_budget) = validate_budgets(&config.crawl)?;
    let print_limit = validate_print_limit(&config.output)?;
    let output = resolve_output_target(&config.output, &domain)?;

    if config.crawl.request_timeout == 0 {
        return Err(ConfigError::InvalidBudget(
            "request_timeout must be at least 1 second".to_string(),
        ));
    }

    if config.crawl.status_interval_ms == 0 {
        return Err(ConfigError::InvalidBudget(
            "status_interval_ms must be at least 1ms".to_string(),
        ));
    }

    Ok(CrawlSettings {
        domain,
        workers,
        page_budget,
        time_budget,
        print_limit,
        output,
        request_timeout: Duration::from_secs(config.crawl.request_timeout),
        status_interval: Duration::from_millis(config.crawl.status_interval_ms),
        user_agent: config.crawl.user_agent.clone(),
    })
}

/// Parses the starting URL and normalizes it into a domain reference
fn validate_domain(url: &str) -> ConfigResult<DomainRef> {
    if url.trim().is_empty() {
        return Err(ConfigError::InvalidDomain(
            "a starting URL is required".to_string(),
        ));
    }

    let mut domain = DomainRef::parse(url.trim());
    check_domain(&mut domain).map_err(|e| ConfigError::InvalidDomain(e.to_string()))?;

    if domain.scheme != "http" && domain.scheme != "https" {
        return Err(ConfigError::InvalidDomain(format!(
            "only http and https are supported, got '{}'",
            domain.scheme
        )));
    }

    Ok(domain)
}

fn validate_workers(workers: i64) -> ConfigResult<usize> {
    match usize::try_from(workers) {
        Ok(count) if (1..=MAX_WORKERS).contains(&count) => Ok(count),
        _ => Err(ConfigError::InvalidWorkerCount {
            count: workers,
            max: MAX_WORKERS,
        }),
    }
}

fn validate_budgets(config: &CrawlConfig) -> ConfigResult<(usize, Duration)> {
    let page_budget = usize::try_from(config.max_pages).map_err(|_| {
        ConfigError::InvalidBudget(format!(
            "max_pages must be >= 0, got {}",
            config.max_pages
        ))
    })?;

    let seconds = u64::try_from(config.max_time).map_err(|_| {
        ConfigError::InvalidBudget(format!("max_time must be >= 0, got {}", config.max_time))
    })?;

    Ok((page_budget, Duration::from_secs(seconds)))
}

fn validate_print_limit(config: &OutputConfig) -> ConfigResult<usize> {
    usize::try_from(config.print_limit).map_err(|_| {
        ConfigError::InvalidBudget(format!(
            "print_limit must be >= 0, got {}",
            config.print_limit
        ))
    })
}

/// Decides where the report goes
///
/// `-` selects stdout. Without a name the report goes to `<host>.txt`.
fn resolve_output_target(
    config: &OutputConfig,
    domain: &DomainRef,
) -> ConfigResult<OutputTarget> {
    let name = match &config.filename {
        Some(name) if name == "-" => return Ok(OutputTarget::Stdout),
        Some(name) => name.clone(),
        None => format!("{}.txt", domain.hostname()),
    };

    let name = truncate_filename(&name);
    if name.trim().is_empty() {
        return Err(ConfigError::MissingOutputTarget);
    }

    Ok(OutputTarget::File(PathBuf::from(name)))
}

fn truncate_filename(name: &str) -> String {
    if name.len() < MAX_FILENAME_LEN {
        return name.to_string();
    }

    tracing::warn!(
        "Output filename is {} bytes long; truncating to {} characters",
        name.len(),
        TRUNCATED_FILENAME_LEN
    );
    name.chars().take(TRUNCATED_FILENAME_LEN).collect()
}
