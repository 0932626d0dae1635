//! Kubeconfig file support for [`KubeConfig`].
//!
//! Only the current context is read: its cluster's `server` and CA, and its
//! user's bearer token. Client certificates and exec plugins are not
//! supported.

use crate::{
    errors::{BackendError, Result},
    kube::{KubeAuth, KubeConfig},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    current_context: Option<String>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
    #[serde(default)]
    clusters: Vec<NamedCluster>,
    #[serde(default)]
    users: Vec<NamedUser>,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: ContextEntry,
}

#[derive(Debug, Deserialize)]
struct ContextEntry {
    cluster: String,
    user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: ClusterEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ClusterEntry {
    server: String,
    certificate_authority_data: Option<String>,
    certificate_authority: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: UserEntry,
}

#[derive(Debug, Default, Deserialize)]
struct UserEntry {
    token: Option<String>,
    #[serde(rename = "tokenFile")]
    token_file: Option<String>,
    #[serde(rename = "client-certificate-data")]
    client_certificate_data: Option<String>,
}

fn invalid(path: &Path, reason: impl std::fmt::Display) -> BackendError {
    BackendError::Configuration(format!("kubeconfig {}: {}", path.display(), reason))
}

/// Resolve a path from the kubeconfig relative to the file's directory
fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// First `KUBECONFIG` entry, else `<home>/.kube/config`
pub(crate) fn kubeconfig_path(kubeconfig: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(paths) = kubeconfig.filter(|v| !v.is_empty()) {
        if let Some(first) = std::env::split_paths(&paths).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }
    home.filter(|h| !h.is_empty())
        .map(|home| PathBuf::from(home).join(".kube").join("config"))
}

impl KubeConfig {
    /// Config for the current context of a kubeconfig file
    pub fn from_kubeconfig(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| invalid(path, e))?;
        let raw: Kubeconfig = serde_yaml::from_str(&contents).map_err(|e| invalid(path, e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let context_name = raw
            .current_context
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| invalid(path, "no current-context"))?;
        let context = raw
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .map(|c| &c.context)
            .ok_or_else(|| invalid(path, format!("context {} not found", context_name)))?;
        let cluster = raw
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| invalid(path, format!("cluster {} not found", context.cluster)))?;

        let mut config = Self::new(&cluster.server)?;

        if let Some(data) = &cluster.certificate_authority_data {
            let pem = STANDARD
                .decode(data.trim())
                .map_err(|e| invalid(path, format!("certificate-authority-data: {}", e)))?;
            config.ca_cert_pem = Some(pem);
        } else if let Some(file) = &cluster.certificate_authority {
            let ca_path = resolve(base_dir, file);
            let pem = std::fs::read(&ca_path)
                .map_err(|e| invalid(path, format!("{}: {}", ca_path.display(), e)))?;
            config.ca_cert_pem = Some(pem);
        }

        let user = context
            .user
            .as_deref()
            .and_then(|name| raw.users.iter().find(|u| u.name == name))
            .map(|u| &u.user);

        config.auth = match user {
            Some(UserEntry {
                token: Some(token), ..
            }) => KubeAuth::Bearer(token.clone()),
            Some(UserEntry {
                token_file: Some(file),
                ..
            }) => KubeAuth::TokenFile(resolve(base_dir, file)),
            Some(UserEntry {
                client_certificate_data: Some(_),
                ..
            }) => {
                warn!(
                    context = context_name,
                    "Client certificate auth is not supported, sending no credentials"
                );
                KubeAuth::None
            }
            _ => KubeAuth::None,
        };

        debug!(context = context_name, api_url = %config.api_url, "Loaded kubeconfig");
        Ok(config)
    }

    /// In-cluster settings when running in a pod, otherwise the user's kubeconfig
    pub fn infer() -> Result<Self> {
        match Self::in_cluster() {
            Ok(config) => Ok(config),
            Err(in_cluster) => {
                debug!(reason = %in_cluster, "Not running in cluster, trying kubeconfig");
                let path = kubeconfig_path(std::env::var_os("KUBECONFIG"), std::env::var_os("HOME"))
                    .ok_or_else(|| {
                        BackendError::Configuration(
                            "no in-cluster service account and no kubeconfig location".to_string(),
                        )
                    })?;
                Self::from_kubeconfig(&path)
            }
        }
    }
}
