use crate::error::{ProvisionError, ProvisionResult};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENV_FILE: &str = ".mautic_env";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PREFIX: &str = "MAUTIC_";
const MAILER_PREFIX: &str = "MAUTIC_MAILER_";

/// Connection settings for the platform instance
#[derive(Clone)]
pub struct Config {
    pub base_url: Url,
    pub user: String,
    pub password: String,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url.as_str())
            .field("user", &self.user)
            .field("password", &mask("password", &self.password))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Values given on the command line, taking precedence over everything else
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `MAUTIC_*` settings merged from the env file and the process environment.
///
/// Process environment values win over the file. The process environment is
/// never modified.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Merge `env_file` (if it exists) with the current process environment
    pub fn load(env_file: &Path) -> ProvisionResult<Self> {
        let file = read_env_file(env_file)?;
        let env = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        Ok(Self::from_sources(file, env))
    }

    /// Merge two sources, the second taking precedence
    pub fn from_sources(
        file: impl IntoIterator<Item = (String, String)>,
        env: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut values = BTreeMap::new();
        for (key, value) in file.into_iter().chain(env) {
            if key.starts_with(PREFIX) {
                values.insert(key, value);
            }
        }
        Self { values }
    }

    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Mailer settings for display, with password values masked
    pub fn mailer(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .filter(|(key, _)| key.starts_with(MAILER_PREFIX))
            .map(|(key, value)| (key.clone(), mask(key, value)))
            .collect()
    }
}

/// Read `KEY=value` pairs without exporting them; a missing file yields nothing
pub fn read_env_file(path: &Path) -> ProvisionResult<Vec<(String, String)>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "env file not found, skipping");
        return Ok(Vec::new());
    }

    let unreadable = |e: dotenvy::Error| {
        ProvisionError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    };

    dotenvy::from_path_iter(path)
        .map_err(unreadable)?
        .map(|entry| entry.map_err(unreadable))
        .collect()
}

/// Replace the value with asterisks when the key names a password
pub fn mask(key: &str, value: &str) -> String {
    if key.to_ascii_lowercase().contains("password") {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    }
}

impl Config {
    /// Resolve the connection settings: flags, then environment, then env file
    pub fn resolve(overrides: &ConfigOverrides, settings: &Settings) -> ProvisionResult<Self> {
        let url = match overrides.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => url.to_string(),
            None => settings_url(settings)?,
        };
        let base_url = Url::parse(&url).map_err(|e| {
            ProvisionError::Configuration(format!("MAUTIC_URL '{}' is not a valid URL: {}", url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ProvisionError::Configuration(format!(
                "MAUTIC_URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let user = required(overrides.user.as_deref(), settings, "MAUTIC_USER", "--user")?;
        let password = required(
            overrides.password.as_deref(),
            settings,
            "MAUTIC_PASSWORD",
            "--password",
        )?;

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => match settings.get("MAUTIC_TIMEOUT_SECS") {
                Some(raw) => raw.parse().map_err(|_| {
                    ProvisionError::Configuration(format!(
                        "MAUTIC_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?,
                None => DEFAULT_TIMEOUT_SECS,
            },
        };
        if timeout_secs == 0 {
            return Err(ProvisionError::Configuration(
                "Timeout must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            user,
            password,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Public address of the landing-page form with the given alias
    pub fn form_url(&self, alias: &str) -> String {
        format!("{}/form/{}", self.base_url.as_str().trim_end_matches('/'), alias)
    }
}

/// `MAUTIC_URL`, or one assembled from protocol, host and port
fn settings_url(settings: &Settings) -> ProvisionResult<String> {
    if let Some(url) = settings.get("MAUTIC_URL") {
        return Ok(url.to_string());
    }

    let host = settings.get("MAUTIC_HOST").ok_or_else(|| {
        ProvisionError::Configuration(
            "MAUTIC_URL is not set (pass --url, or set MAUTIC_URL or MAUTIC_HOST)".to_string(),
        )
    })?;
    let protocol = settings.get("MAUTIC_PROTOCOL").unwrap_or("http");

    Ok(match settings.get("MAUTIC_PORT") {
        Some("80") | Some("443") | None => format!("{}://{}", protocol, host),
        Some(port) => format!("{}://{}:{}", protocol, host, port),
    })
}

fn required(
    flag: Option<&str>,
    settings: &Settings,
    key: &str,
    flag_name: &str,
) -> ProvisionResult<String> {
    flag.map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| settings.get(key))
        .map(str::to_string)
        .ok_or_else(|| {
            ProvisionError::Configuration(format!(
                "{} is not set (pass {} or set it in the environment)",
                key, flag_name
            ))
        })
}
