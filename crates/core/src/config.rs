use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// How the trigger body pair is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// `field=value` with the value copied verbatim. Values containing `&` or `=`
    /// produce a body a strict form decoder reads as more than one field.
    #[default]
    Raw,
    /// `application/x-www-form-urlencoded` escaping of both name and value.
    FormUrlEncoded,
}

/// Page configuration. Every field has a default, so a host page only needs to
/// supply the values it wants to change. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_container_id")]
    pub container_id: String,
    #[serde(default = "default_domain_input_id")]
    pub domain_input_id: String,
    #[serde(default = "default_button_label")]
    pub button_label: String,
    #[serde(default = "default_trigger_path")]
    pub trigger_path: String,
    #[serde(default = "default_trigger_field")]
    pub trigger_field: String,
    #[serde(default)]
    pub body_encoding: BodyEncoding,
    #[serde(default = "default_socket_url")]
    pub socket_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_container_id() -> String {
    "content".to_string()
}

fn default_domain_input_id() -> String {
    "domain".to_string()
}

fn default_button_label() -> String {
    "Crawl".to_string()
}

fn default_trigger_path() -> String {
    "/trigger".to_string()
}

fn default_trigger_field() -> String {
    "domain".to_string()
}

fn default_socket_url() -> String {
    "ws://localhost:3000/ws".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            container_id: default_container_id(),
            domain_input_id: default_domain_input_id(),
            button_label: default_button_label(),
            trigger_path: default_trigger_path(),
            trigger_field: default_trigger_field(),
            body_encoding: BodyEncoding::default(),
            socket_url: default_socket_url(),
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    /// Parse a JSON object of overrides. Blank input yields the defaults.
    pub fn from_json(raw: &str) -> Result<Self, ClientError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.max_level()?;
        Ok(cfg)
    }

    pub fn max_level(&self) -> Result<tracing::Level, ClientError> {
        self.log_level
            .trim()
            .parse::<tracing::Level>()
            .map_err(|_| ClientError::InvalidLogLevel(self.log_level.clone()))
    }
}
