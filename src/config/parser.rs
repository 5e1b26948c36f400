use crate::config::types::Settings;
use crate::ConfigError;
use std::path::Path;

/// Loads and validates a settings file from the given path
///
/// The file is plain TOML; any field left out keeps its default.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    validate(&settings)?;
    Ok(settings)
}

/// Validates a settings struct, whether loaded or defaulted
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.worker_count == 0 {
        return Err(ConfigError::Validation(
            "worker-count must be at least 1".to_string(),
        ));
    }

    if settings.fetch_attempts == 0 {
        return Err(ConfigError::Validation(
            "fetch-attempts must be at least 1".to_string(),
        ));
    }

    if settings.fetch_base_delay_ms > settings.fetch_max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "fetch-base-delay-ms ({}) exceeds fetch-max-delay-ms ({})",
            settings.fetch_base_delay_ms, settings.fetch_max_delay_ms
        )));
    }

    if settings.data_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "data-root must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn load_full_config() {
        let file = create_temp_config(
            r#"
data-root = "/srv/caac"
worker-count = 4
fetch-attempts = 3
fetch-base-delay-ms = 100
fetch-max-delay-ms = 1000
fetch-timeout-ms = 5000
"#,
        );

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.data_root.to_str(), Some("/srv/caac"));
        assert_eq!(settings.worker_count, 4);
        assert_eq!(settings.fetch_attempts, 3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let file = create_temp_config("worker-count = 2\n");
        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.worker_count, 2);
        assert_eq!(settings.fetch_attempts, 5);
        assert_eq!(settings.fetch_max_delay_ms, 30_000);
    }

    #[test]
    fn nonexistent_path_is_an_io_error() {
        let result = load_settings(Path::new("/nonexistent/settings.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let file = create_temp_config("this is not TOML {{{");
        let result = load_settings(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zero_workers_fails_validation() {
        let file = create_temp_config("worker-count = 0\n");
        let result = load_settings(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn inverted_backoff_bounds_fail_validation() {
        let file = create_temp_config("fetch-base-delay-ms = 5000\nfetch-max-delay-ms = 100\n");
        let result = load_settings(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
