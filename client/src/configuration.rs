// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use zeroize::Zeroizing;

use crate::constants::{
    DEFAULT_ELEVATION, ENV_DEBUG, ENV_KEY, ENV_KEY_ENCRYPTED, ENV_KEYVAULT_KEY, ENV_MAA_ENDPOINT,
    EXECUTABLE_NAME, INVOCATION_TIMEOUT, REDACTED, SUPPORTED_OS,
};
use crate::errors::SkrError;
use crate::models::Operation;

/// The command line: exactly one operation, no flags.
#[derive(Debug, Clone, Copy, Parser)]
#[command(name = "skr-client", disable_help_flag = true, disable_version_flag = true)]
pub struct ClientArgs {
    #[arg(value_enum)]
    pub operation: Operation,
}

/// Settings taken from the environment only.
///
/// Parsed from an argument list holding just the program name, so clap fills
/// every field from its `env` variable or default. Secrets never reach the
/// process list.
#[derive(Clone, Parser)]
#[command(name = "skr-client", disable_help_flag = true, disable_version_flag = true)]
pub struct ClientOptions {
    #[arg(long, env(ENV_MAA_ENDPOINT))]
    pub maa_endpoint: Option<String>,
    #[arg(long, env(ENV_KEYVAULT_KEY))]
    pub keyvault_key: Option<String>,
    #[arg(long, env(ENV_KEY), hide_env_values = true)]
    pub key: Option<String>,
    #[arg(long, env(ENV_KEY_ENCRYPTED), hide_env_values = true)]
    pub key_encrypted: Option<String>,
    #[arg(long, env(ENV_DEBUG), action = ArgAction::SetTrue, value_parser = parse_truthy)]
    pub debug: bool,
    #[arg(long, env("SKR_EXECUTABLE"))]
    pub executable: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_ELEVATION, env("SKR_ELEVATION"))]
    pub elevation: String,
    #[arg(long, env("SKR_NO_ELEVATION"), action = ArgAction::SetTrue, value_parser = parse_truthy)]
    pub no_elevation: bool,
    #[arg(long, default_value_t = INVOCATION_TIMEOUT.as_secs(), env("SKR_TIMEOUT_SECS"))]
    pub timeout_secs: u64,
    #[arg(long, env("SKR_LOG_JSON"), action = ArgAction::SetTrue, value_parser = parse_truthy)]
    pub log_json: bool,
}

impl ClientOptions {
    pub fn from_env() -> Result<Self, SkrError> {
        Self::try_parse_from(["skr-client"]).map_err(|err| {
            let rendered = err.to_string();
            let message = rendered.lines().next().unwrap_or_default();
            SkrError::InvalidConfiguration(message.trim_start_matches("error: ").to_string())
        })
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("maa_endpoint", &self.maa_endpoint)
            .field("keyvault_key", &self.keyvault_key)
            .field("key", &self.key.as_ref().map(|_| REDACTED))
            .field("key_encrypted", &self.key_encrypted)
            .field("debug", &self.debug)
            .field("executable", &self.executable)
            .field("elevation", &self.elevation)
            .field("no_elevation", &self.no_elevation)
            .field("timeout_secs", &self.timeout_secs)
            .field("log_json", &self.log_json)
            .finish()
    }
}

/// Accepts `1`, `true` and `yes` (any case) as true. Anything else is false.
pub fn parse_truthy(value: &str) -> Result<bool, String> {
    Ok(matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    ))
}

/// Text printed when the command line cannot be parsed.
pub fn usage() -> String {
    [
        "Usage: skr-client [wrap|unwrap]",
        "",
        "Variables d'environnement requises:",
        "  MAA_ENDPOINT    - URL du service d'attestation",
        "  KEYVAULT_KEY    - URL de la clé Key Vault",
        "  KEY             - Clé à chiffrer (pour wrap)",
        "  KEY_ENCRYPTED   - Clé chiffrée à déchiffrer (pour unwrap)",
        "",
        "Mode debug: DEBUG=1 skr-client wrap",
    ]
    .join("\n")
}

/// Fails unless `os` is the only platform the executable ships for.
pub fn ensure_supported_platform(os: &str) -> Result<(), SkrError> {
    if os != SUPPORTED_OS {
        return Err(SkrError::UnsupportedPlatform(os.to_string()));
    }
    Ok(())
}

/// `AzureAttestSKR` in the directory holding the running program.
pub fn default_executable_path() -> Result<PathBuf, SkrError> {
    let current = std::env::current_exe()?;
    let dir = current.parent().map(PathBuf::from).unwrap_or_default();
    Ok(dir.join(EXECUTABLE_NAME))
}

/// Validated settings for a single run.
#[derive(Clone)]
pub struct SkrConfig {
    pub attestation_endpoint: String,
    pub key_vault_key_url: String,
    pub plaintext_key: Option<Zeroizing<String>>,
    pub encrypted_key: Option<String>,
    pub executable_path: PathBuf,
    /// Command used to run the executable with elevated privileges, if any
    pub elevation: Option<String>,
    pub timeout: Duration,
}

impl SkrConfig {
    pub fn from_options(options: ClientOptions) -> Result<Self, SkrError> {
        Self::load(options, std::env::consts::OS)
    }

    /// Builds the configuration as if running on `os`.
    ///
    /// The platform is checked before anything else, then every missing
    /// required variable is reported at once.
    pub fn load(options: ClientOptions, os: &str) -> Result<Self, SkrError> {
        ensure_supported_platform(os)?;

        let maa_endpoint = non_empty(options.maa_endpoint);
        let keyvault_key = non_empty(options.keyvault_key);

        let (attestation_endpoint, key_vault_key_url) = match (maa_endpoint, keyvault_key) {
            (Some(endpoint), Some(key_url)) => (endpoint, key_url),
            (endpoint, key_url) => {
                let mut missing = Vec::with_capacity(2);
                if endpoint.is_none() {
                    missing.push(ENV_MAA_ENDPOINT);
                }
                if key_url.is_none() {
                    missing.push(ENV_KEYVAULT_KEY);
                }
                return Err(SkrError::MissingConfiguration(missing));
            }
        };

        let executable_path = match options.executable {
            Some(path) => path,
            None => default_executable_path()?,
        };

        let elevation = if options.no_elevation {
            None
        } else {
            non_empty(Some(options.elevation))
        };

        Ok(Self {
            attestation_endpoint,
            key_vault_key_url,
            plaintext_key: non_empty(options.key).map(Zeroizing::new),
            encrypted_key: non_empty(options.key_encrypted),
            executable_path,
            elevation,
            timeout: Duration::from_secs(options.timeout_secs),
        })
    }
}

impl fmt::Debug for SkrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkrConfig")
            .field("attestation_endpoint", &self.attestation_endpoint)
            .field("key_vault_key_url", &self.key_vault_key_url)
            .field("plaintext_key", &self.plaintext_key.as_ref().map(|_| REDACTED))
            .field("encrypted_key", &self.encrypted_key)
            .field("executable_path", &self.executable_path)
            .field("elevation", &self.elevation)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
