use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Bucket used when running under the local functions emulator.
pub const EMULATOR_BUCKET: &str = "default-bucket";

const DEFAULT_LANGUAGE_API_BASE: &str = "https://language.googleapis.com/v1";
const DEFAULT_STORAGE_API_BASE: &str = "https://storage.googleapis.com";

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub language: LanguageApiConfig,
    pub document_source: DocumentSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Resolved once at startup; never re-read per request.
    pub bucket: String,
    pub local_path: String,
    pub api_base: String,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageApiConfig {
    pub api_base: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Gcs,
    Local,
}

/// How file endpoints hand the object to the analysis service.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    /// Read the object through the storage reader and send its text inline.
    Fetch,
    /// Send a `gs://` reference and let the analysis service read the object.
    Reference,
}

impl LanguageConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let emulated = env::var("FUNCTIONS_EMULATOR")
            .map(|v| v == "true")
            .unwrap_or(false);

        let bucket = resolve_bucket(
            env::var("STORAGE_BUCKET").ok().as_deref(),
            emulated,
            env::var("FIREBASE_CONFIG").ok().as_deref(),
        )?;

        let default_backend = if emulated { "local" } else { "gcs" };

        Ok(LanguageConfig {
            common: common_config,
            storage: StorageConfig {
                backend: get_env("STORAGE_BACKEND", Some(default_backend), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                bucket,
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
                api_base: get_env("STORAGE_API_BASE", Some(DEFAULT_STORAGE_API_BASE), is_prod)?,
                access_token: env::var("STORAGE_ACCESS_TOKEN").ok(),
            },
            language: LanguageApiConfig {
                api_base: get_env(
                    "LANGUAGE_API_BASE",
                    Some(DEFAULT_LANGUAGE_API_BASE),
                    is_prod,
                )?,
                api_key: get_env("GOOGLE_API_KEY", None, is_prod)?,
            },
            document_source: get_env("DOCUMENT_SOURCE", Some("fetch"), is_prod)?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseConfig {
    storage_bucket: Option<String>,
}

/// Pick the storage bucket: explicit override, then the emulator bucket,
/// then `storageBucket` from the deployment's `FIREBASE_CONFIG` JSON.
pub fn resolve_bucket(
    override_bucket: Option<&str>,
    emulated: bool,
    firebase_config: Option<&str>,
) -> Result<String, AppError> {
    if let Some(bucket) = override_bucket.filter(|b| !b.is_empty()) {
        return Ok(bucket.to_string());
    }

    if emulated {
        return Ok(EMULATOR_BUCKET.to_string());
    }

    let raw = firebase_config.ok_or_else(|| {
        AppError::ConfigError(anyhow::anyhow!(
            "FIREBASE_CONFIG or STORAGE_BUCKET is required outside the emulator"
        ))
    })?;

    let parsed: FirebaseConfig = serde_json::from_str(raw).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("FIREBASE_CONFIG is not valid JSON: {}", e))
    })?;

    parsed
        .storage_bucket
        .filter(|b| !b.is_empty())
        .ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("FIREBASE_CONFIG has no storageBucket"))
        })
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcs" => Ok(StorageBackend::Gcs),
            "local" => Ok(StorageBackend::Local),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

impl std::str::FromStr for DocumentSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fetch" => Ok(DocumentSource::Fetch),
            "reference" => Ok(DocumentSource::Reference),
            _ => Err(format!("Invalid document source: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
