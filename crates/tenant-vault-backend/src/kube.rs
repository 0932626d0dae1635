//! Kubernetes REST API backend.
//!
//! Scopes are namespaces and secrets are `Opaque` core/v1 secrets. Values are
//! carried base64-encoded in `data` on the wire and handed to callers as
//! plain strings.

use crate::{
    errors::{BackendError, Result},
    traits::ResourceBackend,
    types::*,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
const OPAQUE: &str = "Opaque";

/// How requests authenticate against the API server
#[derive(Debug, Clone)]
pub enum KubeAuth {
    None,
    /// Static bearer token
    Bearer(String),
    /// Bearer token read from a file on every request (projected tokens rotate)
    TokenFile(PathBuf),
}

/// Connection settings for [`KubeBackend`]
#[derive(Debug, Clone)]
pub struct KubeConfig {
    pub api_url: Url,
    pub auth: KubeAuth,
    /// Extra PEM root certificate for the API server
    pub ca_cert_pem: Option<Vec<u8>>,
    pub request_timeout: Duration,
}

impl KubeConfig {
    /// Unauthenticated config for `api_url`
    pub fn new(api_url: &str) -> Result<Self> {
        let mut api_url = Url::parse(api_url)
            .map_err(|e| BackendError::Configuration(format!("invalid API URL: {}", e)))?;
        if api_url.cannot_be_a_base() {
            return Err(BackendError::Configuration(format!(
                "API URL cannot be a base: {}",
                api_url
            )));
        }
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Ok(Self {
            api_url,
            auth: KubeAuth::None,
            ca_cert_pem: None,
            request_timeout: Duration::from_secs(30),
        })
    }

    /// Config for a pod running with a mounted service account
    pub fn in_cluster() -> Result<Self> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            BackendError::Configuration("KUBERNETES_SERVICE_HOST not set".to_string())
        })?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

        // IPv6 service hosts need brackets
        let host = if host.contains(':') {
            format!("[{}]", host)
        } else {
            host
        };

        let dir = Path::new(SERVICE_ACCOUNT_DIR);
        let ca_cert_pem = std::fs::read(dir.join("ca.crt")).map_err(|e| {
            BackendError::Configuration(format!("failed to read service account CA: {}", e))
        })?;

        let mut config = Self::new(&format!("https://{}:{}", host, port))?;
        config.auth = KubeAuth::TokenFile(dir.join("token"));
        config.ca_cert_pem = Some(ca_cert_pem);
        Ok(config)
    }

    pub fn with_auth(mut self, auth: KubeAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_ca_cert_pem(mut self, pem: Vec<u8>) -> Self {
        self.ca_cert_pem = Some(pem);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// [`ResourceBackend`] over the Kubernetes core/v1 API
pub struct KubeBackend {
    client: Client,
    config: KubeConfig,
}

impl KubeBackend {
    pub fn new(config: KubeConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.request_timeout);

        if let Some(pem) = &config.ca_cert_pem {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|e| BackendError::Configuration(format!("invalid CA certificate: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| BackendError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        build_endpoint(&self.config.api_url, segments)
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let builder = self.client.request(method, url);
        Ok(match &self.config.auth {
            KubeAuth::None => builder,
            KubeAuth::Bearer(token) => builder.bearer_auth(token),
            KubeAuth::TokenFile(path) => builder.bearer_auth(read_token_file(path).await?),
        })
    }

    /// Send a request and return the body of a 2xx response
    async fn send(&self, request: RequestBuilder, resource: &str, creating: bool) -> Result<String> {
        let response = request.send().await.map_err(|e| {
            warn!(resource, error = %e, "Backend request failed");
            BackendError::Transient(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transient(e.to_string()))?;

        if status.is_success() {
            return Ok(body);
        }

        debug!(resource, status = status.as_u16(), "Backend returned error status");
        Err(status_error(status, &body, resource, creating))
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &T,
        resource: &str,
        creating: bool,
    ) -> Result<String> {
        let request = self.request(method, url).await?.json(body);
        self.send(request, resource, creating).await
    }
}

#[async_trait]
impl ResourceBackend for KubeBackend {
    async fn create_secret(&self, scope: &str, name: &str, data: &SecretData) -> Result<()> {
        let url = self.endpoint(&["api", "v1", "namespaces", scope, "secrets"])?;
        let body = SecretObject::new(scope, name, data);
        let resource = format!("secret {}/{}", scope, name);
        self.send_json(Method::POST, url, &body, &resource, true).await?;
        Ok(())
    }

    async fn get_secret(&self, scope: &str, name: &str) -> Result<SecretData> {
        let url = self.endpoint(&["api", "v1", "namespaces", scope, "secrets", name])?;
        let resource = format!("secret {}/{}", scope, name);
        let request = self.request(Method::GET, url).await?;
        let body = self.send(request, &resource, false).await?;

        let secret: SecretObject = parse(&body)?;
        secret.decode_data()
    }

    async fn update_secret(&self, scope: &str, name: &str, data: &SecretData) -> Result<()> {
        // No resourceVersion: unconditional full replace
        let url = self.endpoint(&["api", "v1", "namespaces", scope, "secrets", name])?;
        let body = SecretObject::new(scope, name, data);
        let resource = format!("secret {}/{}", scope, name);
        self.send_json(Method::PUT, url, &body, &resource, false).await?;
        Ok(())
    }

    async fn delete_secret(&self, scope: &str, name: &str) -> Result<()> {
        let url = self.endpoint(&["api", "v1", "namespaces", scope, "secrets", name])?;
        let resource = format!("secret {}/{}", scope, name);
        let request = self.request(Method::DELETE, url).await?;
        self.send(request, &resource, false).await?;
        Ok(())
    }

    async fn list_secrets(&self, scope: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["api", "v1", "namespaces", scope, "secrets"])?;
        let resource = format!("secrets in {}", scope);
        let request = self.request(Method::GET, url).await?;

        let body = match self.send(request, &resource, false).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let list: SecretList = parse(&body)?;
        Ok(list.opaque_names())
    }

    async fn create_scope(&self, name: &str) -> Result<()> {
        let url = self.endpoint(&["api", "v1", "namespaces"])?;
        let body = NamespaceObject::new(name, None);
        let resource = format!("namespace {}", name);
        self.send_json(Method::POST, url, &body, &resource, true).await?;
        Ok(())
    }

    async fn get_scope(&self, name: &str) -> Result<ScopeInfo> {
        let url = self.endpoint(&["api", "v1", "namespaces", name])?;
        let resource = format!("namespace {}", name);
        let request = self.request(Method::GET, url).await?;
        let body = self.send(request, &resource, false).await?;

        let namespace: NamespaceObject = parse(&body)?;
        Ok(namespace.into_scope_info())
    }

    async fn delete_scope(&self, name: &str) -> Result<()> {
        let url = self.endpoint(&["api", "v1", "namespaces", name])?;
        let resource = format!("namespace {}", name);
        let request = self.request(Method::DELETE, url).await?;
        self.send(request, &resource, false).await?;
        Ok(())
    }

    async fn finalize_scope(&self, scope: &ScopeInfo) -> Result<()> {
        let url = self.endpoint(&["api", "v1", "namespaces", &scope.name, "finalize"])?;
        let body = NamespaceObject::new(&scope.name, Some(scope.finalizers.clone()));
        let resource = format!("namespace {}", scope.name);
        self.send_json(Method::PUT, url, &body, &resource, false).await?;
        Ok(())
    }
}

async fn read_token_file(path: &Path) -> Result<String> {
    let token = tokio::fs::read_to_string(path).await.map_err(|e| {
        BackendError::Configuration(format!("failed to read token file {}: {}", path.display(), e))
    })?;
    Ok(token.trim().to_string())
}

fn build_endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| BackendError::Configuration(format!("API URL cannot be a base: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| BackendError::Serialization(e.to_string()))
}

/// Map a non-2xx response onto the backend error taxonomy
fn status_error(status: StatusCode, body: &str, resource: &str, creating: bool) -> BackendError {
    let message = serde_json::from_str::<StatusObject>(body)
        .ok()
        .and_then(|s| s.message)
        .unwrap_or_else(|| body.to_string());

    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound(resource.to_string()),
        StatusCode::CONFLICT if creating => BackendError::AlreadyExists(resource.to_string()),
        StatusCode::CONFLICT | StatusCode::TOO_MANY_REQUESTS => BackendError::Transient(message),
        s if s.is_server_error() => BackendError::Transient(message),
        s => BackendError::Rejected {
            status: s.as_u16(),
            message,
        },
    }
}

#[derive(Debug, Deserialize)]
struct StatusObject {
    message: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default)]
    metadata: ObjectMeta,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    secret_type: Option<String>,
    #[serde(default)]
    data: BTreeMap<String, String>,
}

impl SecretObject {
    fn new(scope: &str, name: &str, data: &SecretData) -> Self {
        Self {
            api_version: Some("v1".to_string()),
            kind: Some("Secret".to_string()),
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: Some(scope.to_string()),
            },
            secret_type: Some(OPAQUE.to_string()),
            data: data
                .iter()
                .map(|(k, v)| (k.clone(), STANDARD.encode(v.as_bytes())))
                .collect(),
        }
    }

    fn decode_data(self) -> Result<SecretData> {
        self.data
            .into_iter()
            .map(|(key, encoded)| {
                let bytes = STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| BackendError::Serialization(format!("key {}: {}", key, e)))?;
                let value = String::from_utf8(bytes)
                    .map_err(|_| BackendError::Serialization(format!("key {}: not UTF-8", key)))?;
                Ok((key, value))
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SecretList {
    #[serde(default)]
    items: Vec<SecretObject>,
}

impl SecretList {
    fn opaque_names(self) -> Vec<String> {
        self.items
            .into_iter()
            .filter(|s| s.secret_type.as_deref() == Some(OPAQUE))
            .map(|s| s.metadata.name)
            .collect()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NamespaceSpec {
    #[serde(default)]
    finalizers: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NamespaceStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phase: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default)]
    metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spec: Option<NamespaceSpec>,
    #[serde(default, skip_serializing)]
    status: NamespaceStatus,
}

impl NamespaceObject {
    fn new(name: &str, finalizers: Option<Vec<String>>) -> Self {
        Self {
            api_version: Some("v1".to_string()),
            kind: Some("Namespace".to_string()),
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: None,
            },
            spec: finalizers.map(|finalizers| NamespaceSpec { finalizers }),
            status: NamespaceStatus::default(),
        }
    }

    fn into_scope_info(self) -> ScopeInfo {
        ScopeInfo {
            phase: ScopePhase::from_phase_str(self.status.phase.as_deref()),
            finalizers: self.spec.map(|s| s.finalizers).unwrap_or_default(),
            name: self.metadata.name,
        }
    }
}
