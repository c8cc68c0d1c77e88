// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::time::Duration;

/// File name of the key release executable, expected next to this program.
pub const EXECUTABLE_NAME: &str = "AzureAttestSKR";
pub const DEFAULT_ELEVATION: &str = "sudo";
pub const INVOCATION_TIMEOUT: Duration = Duration::from_secs(120); // 2 minutes
pub const SUPPORTED_OS: &str = "linux";

// Number of characters of each input shown in logs
pub const KEY_PREVIEW_CHARS: usize = 10;
pub const KEY_ENCRYPTED_PREVIEW_CHARS: usize = 20;

pub const ENV_MAA_ENDPOINT: &str = "MAA_ENDPOINT";
pub const ENV_KEYVAULT_KEY: &str = "KEYVAULT_KEY";
pub const ENV_KEY: &str = "KEY";
pub const ENV_KEY_ENCRYPTED: &str = "KEY_ENCRYPTED";
pub const ENV_DEBUG: &str = "DEBUG";

pub const REDACTED: &str = "<redacted>";
