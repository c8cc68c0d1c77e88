// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Invocation of the `AzureAttestSKR` key release executable.
//!
//! [`SkrClient`] owns a validated [`SkrConfig`] and performs exactly one
//! operation per call. Both operations share [`SkrClient::run_command`]:
//!
//! 1. The executable must exist at the configured path
//! 2. The calling user must be allowed to execute it (`access(2)` with `X_OK`)
//! 3. It is started as `[elevation] <executable> -a <endpoint> -k <key url> -s <secret> -w|-u`
//! 4. The child is killed if it runs past the configured timeout
//! 5. Only the exit code decides success; stderr after a zero exit is logged
//!    as a warning
//!
//! The trimmed stdout of the child is the result of the operation. Nothing is
//! retried.

use std::ffi::{CString, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tokio::process::Command;

use crate::configuration::SkrConfig;
use crate::constants::{
    ENV_KEY, ENV_KEY_ENCRYPTED, KEY_ENCRYPTED_PREVIEW_CHARS, KEY_PREVIEW_CHARS, REDACTED,
};
use crate::errors::SkrError;
use crate::models::{CommandOutput, Operation};

/// Client for the key release executable.
pub struct SkrClient {
    config: SkrConfig,
}

impl SkrClient {
    pub fn new(config: SkrConfig) -> Self {
        tracing::info!("[skr] initialized client, MAA: {}", config.attestation_endpoint);
        tracing::info!("[skr] Key Vault key: {}", config.key_vault_key_url);
        tracing::info!("[skr] executable: {}", config.executable_path.display());
        tracing::debug!("[skr] {:?}", config);

        Self { config }
    }

    /// Runs `operation` with the secret matching it.
    pub async fn run(&self, operation: Operation) -> Result<String, SkrError> {
        match operation {
            Operation::Wrap => self.wrap_key().await,
            Operation::Unwrap => self.unwrap_key().await,
        }
    }

    /// Wraps the plaintext key, returning the base64 ciphertext.
    ///
    /// Fails with [`SkrError::MissingSecret`] before spawning anything when
    /// no plaintext key is configured.
    #[tracing::instrument(skip(self))]
    pub async fn wrap_key(&self) -> Result<String, SkrError> {
        let key = self
            .config
            .plaintext_key
            .as_deref()
            .ok_or(SkrError::MissingSecret(ENV_KEY))?;

        tracing::info!("[skr] === wrapping key ===");
        tracing::info!(
            "[skr] key to wrap: {}... (truncated)",
            preview(key, KEY_PREVIEW_CHARS)
        );

        let result = self.run_command(key, Operation::Wrap).await?;

        tracing::info!("[skr] === wrap result ===");
        tracing::info!("[skr] wrapped key: {}", result);

        Ok(result)
    }

    /// Unwraps the base64 ciphertext, returning the plaintext key.
    ///
    /// The plaintext result is logged in full at info level.
    #[tracing::instrument(skip(self))]
    pub async fn unwrap_key(&self) -> Result<String, SkrError> {
        let encrypted = self
            .config
            .encrypted_key
            .as_deref()
            .ok_or(SkrError::MissingSecret(ENV_KEY_ENCRYPTED))?;

        tracing::info!("[skr] === unwrapping key ===");
        tracing::info!(
            "[skr] wrapped key: {}... (truncated)",
            preview(encrypted, KEY_ENCRYPTED_PREVIEW_CHARS)
        );

        let result = self.run_command(encrypted, Operation::Unwrap).await?;

        tracing::info!("[skr] === unwrap result ===");
        tracing::info!("[skr] unwrapped key: {}", result);

        Ok(result)
    }

    /// Full argument vector for one invocation, program first.
    pub fn command_line(&self, secret: &str, operation: Operation) -> Vec<OsString> {
        let mut argv: Vec<OsString> = Vec::with_capacity(9);
        if let Some(elevation) = &self.config.elevation {
            argv.push(elevation.into());
        }
        argv.push(self.config.executable_path.clone().into_os_string());
        argv.extend(
            [
                "-a",
                self.config.attestation_endpoint.as_str(),
                "-k",
                self.config.key_vault_key_url.as_str(),
                "-s",
                secret,
                operation.flag(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        argv
    }

    /// Checks that the configured executable exists and that the calling user
    /// may execute it.
    pub fn check_executable(&self) -> Result<(), SkrError> {
        let path = &self.config.executable_path;
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => return Err(SkrError::ExecutableNotFound(path.clone())),
        };

        if !metadata.is_file() || !executable_by_caller(path) {
            return Err(SkrError::ExecutableNotPermitted(path.clone()));
        }

        Ok(())
    }

    /// Runs the executable once and returns its trimmed stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the executable is missing or not executable
    /// - the process cannot be spawned
    /// - it exits with a non-zero status or is killed by a signal
    /// - it is still running when the timeout elapses
    #[tracing::instrument(skip(self, secret))]
    pub async fn run_command(
        &self,
        secret: &str,
        operation: Operation,
    ) -> Result<String, SkrError> {
        self.check_executable()?;

        let argv = self.command_line(secret, operation);

        tracing::debug!(
            "[skr] command: {}",
            self.command_line(REDACTED, operation)
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let (program, args) = argv.split_at(1);
        let mut command = Command::new(&program[0]);
        command.args(args).kill_on_drop(true);

        let timeout = self.config.timeout;
        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(output) => CommandOutput::from_output(&output?),
            Err(_) => {
                tracing::error!("[skr] command timed out after {:?}", timeout);
                return Err(SkrError::ChildProcessTimeout(timeout));
            }
        };

        tracing::debug!("[skr] exit code: {:?}", output.code);
        tracing::debug!("[skr] stdout: {}", output.stdout);

        if !output.success() {
            tracing::error!("[skr] command failed with exit code {:?}", output.code);
            tracing::error!("[skr] stdout: {}", output.stdout);
            tracing::error!("[skr] stderr: {}", output.stderr);
            return Err(SkrError::ChildProcessFailed {
                code: output.code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        if !output.stderr.is_empty() {
            tracing::warn!("[skr] stderr: {}", output.stderr);
        }

        Ok(output.stdout.trim().to_string())
    }
}

/// Asks the kernel whether the real user may execute `path`.
fn executable_by_caller(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is NUL-terminated and outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 }
}

/// First `chars` characters of `value`, for logging.
pub fn preview(value: &str, chars: usize) -> String {
    value.chars().take(chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use zeroize::Zeroizing;

    fn config(key: Option<&str>, encrypted: Option<&str>) -> SkrConfig {
        SkrConfig {
            attestation_endpoint: "https://test.attest.azure.net".to_string(),
            key_vault_key_url: "https://test.vault.azure.net/keys/testkey/version".to_string(),
            plaintext_key: key.map(|k| Zeroizing::new(k.to_string())),
            encrypted_key: encrypted.map(str::to_string),
            executable_path: PathBuf::from("/nonexistent/dir/AzureAttestSKR"),
            elevation: Some("sudo".to_string()),
            timeout: Duration::from_secs(120),
        }
    }

    #[test]
    fn test_preview_truncates_by_characters() {
        assert_eq!(preview("test-secret-key-123", KEY_PREVIEW_CHARS), "test-secre");
        assert_eq!(preview("short", KEY_PREVIEW_CHARS), "short");
        assert_eq!(preview("clé-très-secrète", 5), "clé-t");
    }

    #[test]
    fn test_command_line_for_wrap() {
        let client = SkrClient::new(config(Some("secret"), None));
        let argv = client.command_line("secret", Operation::Wrap);
        let expected: Vec<OsString> = [
            "sudo",
            "/nonexistent/dir/AzureAttestSKR",
            "-a",
            "https://test.attest.azure.net",
            "-k",
            "https://test.vault.azure.net/keys/testkey/version",
            "-s",
            "secret",
            "-w",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(argv, expected);
    }

    #[test]
    fn test_command_line_for_unwrap_without_elevation() {
        let mut cfg = config(None, Some("dGVzdA=="));
        cfg.elevation = None;
        let client = SkrClient::new(cfg);
        let argv = client.command_line("dGVzdA==", Operation::Unwrap);
        assert_eq!(argv[0], OsString::from("/nonexistent/dir/AzureAttestSKR"));
        assert_eq!(argv[5], OsString::from("dGVzdA=="));
        assert_eq!(argv.last(), Some(&OsString::from("-u")));
        assert_eq!(argv.len(), 8);
    }

    #[tokio::test]
    async fn test_wrap_without_key_is_missing_secret() {
        let client = SkrClient::new(config(None, Some("dGVzdA==")));
        let err = client.wrap_key().await.unwrap_err();
        assert!(matches!(err, SkrError::MissingSecret("KEY")));
    }

    #[tokio::test]
    async fn test_unwrap_without_encrypted_key_is_missing_secret() {
        let client = SkrClient::new(config(Some("secret"), None));
        let err = client.unwrap_key().await.unwrap_err();
        assert!(matches!(err, SkrError::MissingSecret("KEY_ENCRYPTED")));
    }

    #[tokio::test]
    async fn test_missing_executable_is_reported_for_both_operations() {
        let client = SkrClient::new(config(Some("secret"), Some("dGVzdA==")));

        for operation in [Operation::Wrap, Operation::Unwrap] {
            let err = client.run(operation).await.unwrap_err();
            assert!(
                matches!(err, SkrError::ExecutableNotFound(ref path) if path == Path::new("/nonexistent/dir/AzureAttestSKR"))
            );
        }
    }
}
