use std::collections::HashMap;

use anyhow::Context;
use url::Url;

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".into(),
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then `miniapp.toml` in the working directory, then environment
/// overrides.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = std::fs::read_to_string("miniapp.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("backend_url") {
                settings.backend_url = v.clone();
            }
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Ok(v) = std::env::var("MINIAPP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Ok(v) = std::env::var("MINIAPP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

pub fn parse_backend_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid backend url '{raw}'"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("backend url must use http or https, got '{raw}'");
    }
    Ok(url)
}
