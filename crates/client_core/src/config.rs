use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::texts;

const DEFAULT_SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub chat_path: String,
    pub calculate_path: String,
    pub health_path: String,
    pub locale: String,
    /// Initial assistant message; empty disables it.
    pub greeting: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/v1/".into(),
            chat_path: "chat".into(),
            calculate_path: "calculate_from_form".into(),
            health_path: "/health".into(),
            locale: "ru-RU".into(),
            greeting: texts::GREETING.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub chat: Url,
    pub calculate: Url,
    pub health: Url,
}

impl ClientSettings {
    pub fn endpoints(&self) -> Result<Endpoints> {
        let raw = self.api_base_url.trim();
        let base = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let base =
            Url::parse(&base).with_context(|| format!("invalid api base url '{raw}'"))?;
        let join = |path: &str| {
            base.join(path)
                .with_context(|| format!("invalid endpoint path '{path}' for base '{base}'"))
        };

        Ok(Endpoints {
            chat: join(self.chat_path.as_str())?,
            calculate: join(self.calculate_path.as_str())?,
            health: join(self.health_path.as_str())?,
        })
    }

    pub fn greeting(&self) -> Option<&str> {
        let greeting = self.greeting.trim();
        (!greeting.is_empty()).then_some(greeting)
    }
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicitly given `path` must exist; the implicit `client.toml` is
/// optional.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                read_settings_file(default_path)?
            } else {
                ClientSettings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let settings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    debug!(path = %path.display(), "config: settings file loaded");
    Ok(settings)
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SALYQ_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__LOCALE") {
        settings.locale = v;
    }
}
