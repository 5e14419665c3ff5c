//! Service configuration.
//!
//! Settings are read once at startup from a config file (format picked by
//! extension) with `DYNAMO_<SECTION>__<KEY>` environment overrides on top,
//! then checked by [`Settings::validate`]. Nothing re-reads them later.

use crate::error::ConfigError;
use crate::models::{StoragePolicy, BYTES_PER_MB, DEFAULT_TYPE_PREFIX};
use crate::storage_types::{BackendConfig, BlobProvider, StorageBackend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

const ENV_PREFIX: &str = "DYNAMO";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    #[validate(nested)]
    pub server: ServerSettings,
    #[validate(nested)]
    pub video: VideoSettings,
    #[validate(nested)]
    pub cdn: CdnSettings,
    pub storage: StorageSettings,
    pub gcs: GcsSettings,
    pub s3: S3Settings,
    pub local: LocalSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerSettings {
    #[validate(range(min = 1))]
    pub http_port: Option<u16>,
    pub host: String,
    /// Upper bound on the graceful drain at shutdown.
    #[validate(range(min = 1))]
    pub drain_timeout_secs: u64,
    #[validate(range(min = 1))]
    pub max_concurrent_requests: usize,
    /// Mount `GET /meta/config`.
    pub expose_config: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_port: None,
            host: "0.0.0.0".to_string(),
            drain_timeout_secs: 10,
            max_concurrent_requests: 512,
            expose_config: true,
        }
    }
}

/// Allowed media types, either as a plain list or as a map of toggles
/// where only `true` entries count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowedTypes {
    List(Vec<String>),
    Flags(BTreeMap<String, bool>),
}

impl Default for AllowedTypes {
    fn default() -> Self {
        AllowedTypes::List(Vec::new())
    }
}

impl AllowedTypes {
    pub fn enabled(&self) -> Vec<String> {
        match self {
            AllowedTypes::List(types) => types.clone(),
            AllowedTypes::Flags(flags) => flags
                .iter()
                .filter(|(_, enabled)| **enabled)
                .map(|(name, _)| name.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VideoSettings {
    #[validate(range(min = 1))]
    pub max_size_mb: u64,
    pub allowed_types: AllowedTypes,
    pub type_prefix: String,
    /// Multipart field carrying the file.
    #[validate(length(min = 1))]
    pub form_field: String,
    #[validate(length(min = 1))]
    pub key_prefix: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            max_size_mb: 0,
            allowed_types: AllowedTypes::default(),
            type_prefix: DEFAULT_TYPE_PREFIX.to_string(),
            form_field: "video".to_string(),
            key_prefix: "raw".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CdnSettings {
    #[validate(url)]
    pub base_url: String,
}

impl Default for CdnSettings {
    fn default() -> Self {
        Self {
            base_url: "https://cdn.example.com".to_string(),
        }
    }
}

impl CdnSettings {
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Refuse to start without a real backend instead of falling back to the null store.
    pub require_backend: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsSettings {
    pub enable: bool,
    pub bucket: String,
    #[serde(skip_serializing)]
    pub service_account_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    pub enable: bool,
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub enable: bool,
    pub root: String,
}

impl Settings {
    /// Load settings from `path` with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting settings fail validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        // .env is optional
        let _ = dotenvy::dotenv();

        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Loading configuration");

        let settings: Settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(true))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("video.allowed_types")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate settings from a YAML document, without environment overrides.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings: Settings = ::config::Config::builder()
            .add_source(::config::File::from_str(yaml, ::config::FileFormat::Yaml))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Field checks followed by the storage toggle rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_port.is_none() {
            return Err(ConfigError::MissingHttpPort);
        }

        Validate::validate(self)?;

        if self.video.max_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(ConfigError::Invalid(format!(
                "video.max_size_mb must be at most {}",
                u64::MAX / BYTES_PER_MB
            )));
        }

        if self.video.allowed_types.enabled().is_empty() {
            return Err(ConfigError::Invalid(
                "video.allowed_types must enable at least one type".to_string(),
            ));
        }

        self.backend_config()?;
        Ok(())
    }

    pub fn backend_config(&self) -> Result<BackendConfig, ConfigError> {
        BackendConfig::try_from(self)
    }

    pub fn storage_policy(&self) -> StoragePolicy {
        StoragePolicy::from_mb(self.video.max_size_mb, self.video.allowed_types.enabled())
            .with_type_prefix(&self.video.type_prefix)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.server.drain_timeout_secs)
    }
}

fn required_target(value: &str, backend: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingBucket(backend));
    }
    Ok(value.to_string())
}

impl TryFrom<&Settings> for BackendConfig {
    type Error = ConfigError;

    fn try_from(settings: &Settings) -> Result<Self, Self::Error> {
        let enabled: Vec<StorageBackend> = [
            (settings.gcs.enable, StorageBackend::Gcs),
            (settings.s3.enable, StorageBackend::S3),
            (settings.local.enable, StorageBackend::Local),
        ]
        .into_iter()
        .filter_map(|(on, backend)| on.then_some(backend))
        .collect();

        match enabled.as_slice() {
            [] if settings.storage.require_backend => Err(ConfigError::NoBackend),
            [] => Ok(BackendConfig::NullStore),
            [StorageBackend::Gcs] => Ok(BackendConfig::CloudBlob {
                provider: BlobProvider::Gcs {
                    service_account_path: settings.gcs.service_account_path.clone(),
                },
                bucket: required_target(&settings.gcs.bucket, "gcs")?,
            }),
            [StorageBackend::S3] => Ok(BackendConfig::CloudBlob {
                provider: BlobProvider::S3 {
                    region: settings.s3.region.clone(),
                    endpoint: settings.s3.endpoint.clone(),
                },
                bucket: required_target(&settings.s3.bucket, "s3")?,
            }),
            [StorageBackend::Local] => Ok(BackendConfig::CloudBlob {
                provider: BlobProvider::Local,
                bucket: required_target(&settings.local.root, "local")?,
            }),
            many => Err(ConfigError::MultipleBackends(
                many.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
        }
    }
}
