// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

use std::path::PathBuf;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum SkrError {
    #[error("ce programme ne fonctionne que sur Linux (système détecté: {0})")]
    UnsupportedPlatform(String),
    #[error("variables d'environnement manquantes: {}", .0.join(", "))]
    MissingConfiguration(Vec<&'static str>),
    #[error("configuration invalide: {0}")]
    InvalidConfiguration(String),
    #[error("variable d'environnement {0} manquante")]
    MissingSecret(&'static str),
    #[error("exécutable introuvable: {}", .0.display())]
    ExecutableNotFound(PathBuf),
    #[error("exécutable non exécutable: {}", .0.display())]
    ExecutableNotPermitted(PathBuf),
    #[error("la commande a échoué (code {code:?}): {}", .stderr.trim())]
    ChildProcessFailed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error("la commande n'a pas terminé en {}s", .0.as_secs())]
    ChildProcessTimeout(Duration),
    #[error("erreur d'entrée/sortie: {0}")]
    Io(#[from] std::io::Error),
}
