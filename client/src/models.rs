// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::fmt;

use clap::ValueEnum;

/// The two operations supported by the key release executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// Wrap the plaintext key from `KEY`
    Wrap,
    /// Unwrap the base64 ciphertext from `KEY_ENCRYPTED`
    Unwrap,
}

impl Operation {
    /// Flag passed to the executable to select the operation.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Wrap => "-w",
            Self::Unwrap => "-u",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrap => "wrap",
            Self::Unwrap => "unwrap",
        }
    }

    /// Line printed on stdout for a successful run.
    pub fn result_line(&self, result: &str) -> String {
        match self {
            Self::Wrap => format!("Key chiffrée (base64): {result}"),
            Self::Unwrap => format!("Key déchiffrée: {result}"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn from_output(output: &std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(output.stdout.as_slice()).to_string(),
            stderr: String::from_utf8_lossy(output.stderr.as_slice()).to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}
