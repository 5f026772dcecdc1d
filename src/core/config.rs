//! Replicator and state-provider settings.
//!
//! Settings are loaded from TOML documents whose section names are derived
//! from the actor service name (see [`crate::naming`]). A hosting shell keeps
//! one document per application; each service reads only its own sections,
//! and absent sections fall back to defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::naming;

/// Replication tuning for one actor service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatorConfig {
    /// Delay before a failed replication operation is retried.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// How long acknowledgements may be batched before they are sent.
    #[serde(default = "default_batch_acknowledgement_interval_ms")]
    pub batch_acknowledgement_interval_ms: u64,

    /// Initial size of the copy (state transfer) operation queue.
    #[serde(default = "default_initial_copy_queue_size")]
    pub initial_copy_queue_size: u32,

    /// Upper bound of the copy operation queue. Must be a power of two.
    #[serde(default = "default_max_copy_queue_size")]
    pub max_copy_queue_size: u32,

    /// Initial size of the replication operation queue.
    #[serde(default = "default_initial_replication_queue_size")]
    pub initial_replication_queue_size: u32,

    /// Upper bound of the replication operation queue. Must be a power of two.
    #[serde(default = "default_max_replication_queue_size")]
    pub max_replication_queue_size: u32,

    /// Largest replication message the replicator may send, in bytes.
    #[serde(default = "default_max_replication_message_size")]
    pub max_replication_message_size: u64,

    /// Whether a secondary clears operations as soon as they are acknowledged.
    #[serde(default)]
    pub secondary_clear_acknowledged_operations: bool,
}

impl Default for ReplicatorConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: default_retry_interval_ms(),
            batch_acknowledgement_interval_ms: default_batch_acknowledgement_interval_ms(),
            initial_copy_queue_size: default_initial_copy_queue_size(),
            max_copy_queue_size: default_max_copy_queue_size(),
            initial_replication_queue_size: default_initial_replication_queue_size(),
            max_replication_queue_size: default_max_replication_queue_size(),
            max_replication_message_size: default_max_replication_message_size(),
            secondary_clear_acknowledged_operations: false,
        }
    }
}

/// Transport security for the replicator channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatorSecurityConfig {
    /// Credential type: "None", "X509", or "Windows".
    #[serde(default = "default_credential_type")]
    pub credential_type: String,
}

impl Default for ReplicatorSecurityConfig {
    fn default() -> Self {
        Self {
            credential_type: default_credential_type(),
        }
    }
}

/// Tuning for the volatile state provider itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateProviderConfig {
    /// Backoff before retrying an operation that hit a transient fault.
    #[serde(default = "default_transient_error_retry_delay_ms")]
    pub transient_error_retry_delay_ms: u64,

    /// Number of entries sent per copy batch during state transfer.
    #[serde(default = "default_copy_batch_entries")]
    pub copy_batch_entries: usize,
}

impl Default for StateProviderConfig {
    fn default() -> Self {
        Self {
            transient_error_retry_delay_ms: default_transient_error_retry_delay_ms(),
            copy_batch_entries: default_copy_batch_entries(),
        }
    }
}

/// All settings sections one actor service reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Replicator tuning.
    pub replicator: ReplicatorConfig,

    /// Replicator transport security.
    pub security: ReplicatorSecurityConfig,

    /// State-provider tuning.
    pub state_provider: StateProviderConfig,
}

impl ServiceSettings {
    /// Load the service's settings sections from a TOML file.
    pub fn from_file(path: &Path, service_name: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        Self::from_toml(&content, service_name)
    }

    /// Load the service's settings sections from a TOML string.
    pub fn from_toml(content: &str, service_name: &str) -> Result<Self> {
        let doc: toml::Value =
            toml::from_str(content).with_context(|| "failed to parse settings document")?;
        let settings = Self {
            replicator: section(&doc, &naming::replicator_config_section(service_name))?,
            security: section(&doc, &naming::replicator_security_config_section(service_name))?,
            state_provider: section(&doc, &naming::state_provider_settings_section(service_name))?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings consistency.
    pub fn validate(&self) -> Result<()> {
        let replicator = &self.replicator;
        for (name, size) in [
            ("initial_copy_queue_size", replicator.initial_copy_queue_size),
            ("max_copy_queue_size", replicator.max_copy_queue_size),
            (
                "initial_replication_queue_size",
                replicator.initial_replication_queue_size,
            ),
            (
                "max_replication_queue_size",
                replicator.max_replication_queue_size,
            ),
        ] {
            if !size.is_power_of_two() {
                anyhow::bail!("{name} must be a power of two, got: {size}");
            }
        }
        if replicator.max_copy_queue_size < replicator.initial_copy_queue_size {
            anyhow::bail!("max_copy_queue_size is below initial_copy_queue_size");
        }
        if replicator.max_replication_queue_size < replicator.initial_replication_queue_size {
            anyhow::bail!("max_replication_queue_size is below initial_replication_queue_size");
        }
        if replicator.batch_acknowledgement_interval_ms == 0 {
            anyhow::bail!("batch_acknowledgement_interval_ms must be > 0");
        }
        match self.security.credential_type.as_str() {
            "None" | "X509" | "Windows" => {}
            other => anyhow::bail!("unsupported credential type: {other}"),
        }
        if self.state_provider.copy_batch_entries == 0 {
            anyhow::bail!("copy_batch_entries must be > 0");
        }
        Ok(())
    }
}

/// Deserialize one named section, falling back to defaults when absent.
fn section<S>(doc: &toml::Value, name: &str) -> Result<S>
where
    S: serde::de::DeserializeOwned + Default,
{
    match doc.get(name) {
        Some(value) => value
            .clone()
            .try_into()
            .with_context(|| format!("invalid settings section [{name}]")),
        None => Ok(S::default()),
    }
}

fn default_retry_interval_ms() -> u64 {
    5_000
}

fn default_batch_acknowledgement_interval_ms() -> u64 {
    15
}

fn default_initial_copy_queue_size() -> u32 {
    64
}

fn default_max_copy_queue_size() -> u32 {
    1_024
}

fn default_initial_replication_queue_size() -> u32 {
    64
}

fn default_max_replication_queue_size() -> u32 {
    1_024
}

fn default_max_replication_message_size() -> u64 {
    50 * 1_024 * 1_024
}

fn default_credential_type() -> String {
    "None".to_string()
}

fn default_transient_error_retry_delay_ms() -> u64 {
    1_000
}

fn default_copy_batch_entries() -> usize {
    128
}
