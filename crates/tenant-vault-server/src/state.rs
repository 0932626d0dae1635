use anyhow::{Context, Result};
use std::sync::Arc;
use tenant_vault_backend::{KubeAuth, KubeBackend, KubeConfig, MemoryBackend, ResourceBackend};
use tenant_vault_core::{Argon2Hasher, Vault, VaultConfig, VaultService};
use tenant_vault_sessions::{SystemClock, TokenCodec};

use crate::config::{BackendKind, Config};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub vault: Arc<dyn Vault>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let backend = build_backend(&config).await?;

        let codec = TokenCodec::new(
            &config.token_signing_key,
            config.token_algorithm,
            config.token_issuer.clone(),
            SystemClock,
        )
        .context("Failed to initialize token codec")?;

        let vault = VaultService::new(
            backend,
            codec,
            Argon2Hasher::new(config.hashing),
            VaultConfig {
                token_ttl: config.token_ttl,
                lifecycle: config.lifecycle,
            },
        );

        Ok(Self::with_vault(config, Arc::new(vault)))
    }

    /// State over an already constructed vault
    pub fn with_vault(config: Config, vault: Arc<dyn Vault>) -> Self {
        Self { config, vault }
    }
}

async fn build_backend(config: &Config) -> Result<Arc<dyn ResourceBackend>> {
    match config.backend {
        BackendKind::Memory => {
            tracing::warn!("Using in-memory backend; secrets are lost on restart");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendKind::Kubernetes => {
            let kube_config = kube_config(config).await?;
            tracing::info!(api_url = %kube_config.api_url, "Using Kubernetes backend");
            Ok(Arc::new(KubeBackend::new(kube_config)?))
        }
    }
}

/// Explicit `KUBE_*` settings, else in-cluster, else the user's kubeconfig
async fn kube_config(config: &Config) -> Result<KubeConfig> {
    let kube_config = match &config.kube_api_url {
        Some(url) => {
            let mut kube_config = KubeConfig::new(url)?;
            if let Some(token) = &config.kube_token {
                kube_config = kube_config.with_auth(KubeAuth::Bearer(token.clone()));
            }
            if let Some(path) = &config.kube_ca_cert {
                let pem = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read KUBE_CA_CERT {}", path.display()))?;
                kube_config = kube_config.with_ca_cert_pem(pem);
            }
            kube_config
        }
        None => KubeConfig::infer()
            .context("KUBE_API_URL not set and no in-cluster or kubeconfig settings found")?,
    };

    Ok(kube_config.with_request_timeout(config.kube_request_timeout))
}
