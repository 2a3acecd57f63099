//! Settings-file loading and validation

use std::path::Path;

use url::Url;

use crate::config::Settings;
use crate::{ConfigError, ConfigResult};

/// Loads and validates a settings record from a TOML file.
///
/// Field names match the persisted record, e.g.:
///
/// ```toml
/// base_url = "http://www.example.com"
/// keywords_to_exclude = ["logout", "signin"]
/// allow_query_parameters = false
/// ```
pub fn load_settings(path: &Path) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Checks that a settings record makes sense before it is persisted.
pub fn validate_settings(settings: &Settings) -> ConfigResult<()> {
    if settings.base_url.is_empty() {
        return Err(ConfigError::Validation("base_url must be set".to_string()));
    }

    let url = Url::parse(&settings.base_url)
        .map_err(|e| ConfigError::Validation(format!("base_url is not a valid URL: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url must be http or https, got {}",
            url.scheme()
        )));
    }

    for kw in settings
        .keywords_to_exclude
        .iter()
        .chain(&settings.keywords_to_include)
    {
        if kw.is_empty() {
            return Err(ConfigError::Validation(
                "keyword lists must not contain empty strings".to_string(),
            ));
        }
    }

    Ok(())
}
