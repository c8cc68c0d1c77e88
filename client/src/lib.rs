// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! # SKR Client
//!
//! Command-line front-end for the `AzureAttestSKR` Secure Key Release
//! executable.
//!
//! The executable performs the Azure attestation and the Key Vault wrap or
//! unwrap. This crate only validates the environment, marshals the arguments,
//! enforces a timeout and relays the output.
//!
//! ```text
//! skr-client -> sudo AzureAttestSKR -a <MAA> -k <Key Vault key> -s <secret> -w|-u
//! ```
//!
//! ## Modules
//!
//! - [`configuration`]: CLI and environment parsing with clap, validated [`configuration::SkrConfig`]
//! - [`constants`]: executable name, timeout and environment variable names
//! - [`errors`]: error taxonomy for a single run
//! - [`invoker`]: [`invoker::SkrClient`], wrap/unwrap and the child process protocol
//! - [`logging`]: tracing subscriber setup
//! - [`models`]: operations and captured process output
//!
//! ## Usage
//!
//! ```bash
//! MAA_ENDPOINT=https://sharedweu.weu.attest.azure.net \
//! KEYVAULT_KEY=https://mykv.vault.azure.net/keys/mykey/<version> \
//! KEY=my-secret skr-client wrap
//! ```
//!
//! ## Security Considerations
//!
//! - Only a prefix of the input secret is logged
//! - The unwrapped plaintext is printed and logged in full
//! - The plaintext key is zeroized on drop
//! - The child process is killed after 120 seconds by default

pub mod configuration;
pub mod constants;
pub mod errors;
pub mod invoker;
pub mod logging;
pub mod models;
