use crate::config::types::{Config, CrawlSettings};
use crate::config::validation::validate;
use crate::ConfigResult;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The result is not validated yet; command-line overrides are usually
/// applied first and [`validate`] is called on the merged configuration.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully parsed configuration
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

/// Loads a configuration file and validates it in one step
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use petit_crawl::config::load_settings;
///
/// let settings = load_settings(Path::new("crawl.toml")).unwrap();
/// println!("Crawling {} with {} workers", settings.domain, settings.workers);
/// ```
pub fn load_settings(path: &Path) -> ConfigResult<CrawlSettings> {
    let config = load_config(path)?;
    validate(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputTarget;
    use crate::ConfigError;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawl]
url = "https://www.example.com"
workers = 8
max-pages = 20
max-time = 30
status-interval-ms = 250

[output]
print-limit = 3
filename = "sitemap.txt"
"#;

        let file = create_temp_config(config_content);
        let settings = load_settings(file.path()).unwrap();

        assert_eq!(settings.domain.host, "example.com");
        assert_eq!(settings.workers, 8);
        assert_eq!(settings.page_budget, 20);
        assert_eq!(settings.time_budget, Duration::from_secs(30));
        assert_eq!(settings.status_interval, Duration::from_millis(250));
        assert_eq!(settings.print_limit, 3);
        assert_eq!(settings.output, OutputTarget::File("sitemap.txt".into()));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[crawl]\nurl = \"http://example.com\"\n").unwrap();
        assert_eq!(config.crawl.workers, 100);
        assert_eq!(config.crawl.max_pages, 500);
        assert_eq!(config.crawl.max_time, 180);
        assert_eq!(config.output.print_limit, 10);
        assert!(config.output.filename.is_none());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/crawl.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_settings_with_validation_error() {
        let config_content = r#"
[crawl]
url = "http://example.com"
workers = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_settings(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidWorkerCount { count: 0, .. })
        ));
    }
}
