// ABOUTME: TOML configuration for the CLI and TOML job settings files
// ABOUTME: Settings files are validated into JobSettings through the same schema checks

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::RealityError;
use crate::service::Service;
use crate::settings::{JobSettings, OptionValue};

pub const TOKEN_ENV: &str = "REALITY_CAPTURE_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: Service,
    pub base_url: Option<String>,
    pub token: Option<String>,
    /// iTwin (or workspace) new jobs are created in.
    pub owner_id: Option<String>,
}

impl Config {
    /// Reads the file, then lets `REALITY_CAPTURE_TOKEN` override its token.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config.with_token_override(std::env::var(TOKEN_ENV).ok()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config")
    }

    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.service.default_base_url())
    }
}

/// A job described in TOML:
///
/// ```toml
/// type = "objects2D"
/// name = "Detect poles"
/// outputs = ["objects2D"]
///
/// [inputs]
/// photos = "b5f1..."
///
/// [options]
/// minPhotos = 10
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsFile {
    #[serde(rename = "type")]
    pub job_type: String,
    pub name: String,
    #[serde(default)]
    pub inputs: BTreeMap<String, SlotIds>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub options: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SlotIds {
    One(String),
    Many(Vec<String>),
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    pub fn to_settings(&self, service: Service) -> std::result::Result<JobSettings, RealityError> {
        let kind = service.parse_job_kind(&self.job_type)?;
        let mut settings = JobSettings::new(kind);

        for (slot, ids) in &self.inputs {
            match ids {
                SlotIds::One(id) => {
                    settings.set_input(slot, id.as_str())?;
                }
                SlotIds::Many(ids) => {
                    for id in ids {
                        settings.set_input(slot, id.as_str())?;
                    }
                }
            }
        }
        for slot in &self.outputs {
            settings.request_output(slot)?;
        }
        for (name, value) in &self.options {
            settings.set_option(name, toml_option(name, value)?)?;
        }

        Ok(settings)
    }
}

fn toml_option(name: &str, value: &toml::Value) -> std::result::Result<OptionValue, RealityError> {
    match value {
        toml::Value::Boolean(b) => Ok(OptionValue::Bool(*b)),
        toml::Value::Integer(i) => Ok(OptionValue::Int(*i)),
        toml::Value::Float(x) => Ok(OptionValue::Float(*x)),
        toml::Value::String(s) => Ok(OptionValue::Text(s.clone())),
        other => Err(RealityError::OptionParseFailure {
            option: name.to_string(),
            value: other.to_string(),
        }),
    }
}
