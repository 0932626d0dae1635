use anyhow::{Context, Result};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tenant_vault_crypto::HashingParams;
use tenant_vault_lifecycle::LifecycleConfig;
use tenant_vault_sessions::{Algorithm, MIN_KEY_LENGTH};
use zeroize::Zeroizing;

/// Which resource backend the server talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Kubernetes,
    /// In-process simulation, for local development
    Memory,
}

/// Server configuration
#[derive(Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_address: SocketAddr,

    /// HMAC key for identity tokens
    pub token_signing_key: Zeroizing<Vec<u8>>,

    pub token_algorithm: Algorithm,

    pub token_issuer: String,

    /// Lifetime of tokens issued at login
    pub token_ttl: Duration,

    pub backend: BackendKind,

    /// Explicit API server URL; in-cluster settings are used when absent
    pub kube_api_url: Option<String>,

    pub kube_token: Option<String>,

    /// PEM bundle trusted for the API server
    pub kube_ca_cert: Option<PathBuf>,

    /// Timeout for each API server request
    pub kube_request_timeout: Duration,

    pub lifecycle: LifecycleConfig,

    pub hashing: HashingParams,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("token_signing_key", &"<redacted>")
            .field("token_algorithm", &self.token_algorithm)
            .field("token_issuer", &self.token_issuer)
            .field("token_ttl", &self.token_ttl)
            .field("backend", &self.backend)
            .field("kube_api_url", &self.kube_api_url)
            .field("kube_token", &self.kube_token.as_ref().map(|_| "<redacted>"))
            .field("kube_ca_cert", &self.kube_ca_cert)
            .field("kube_request_timeout", &self.kube_request_timeout)
            .field("lifecycle", &self.lifecycle)
            .field("hashing", &self.hashing)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("BIND_ADDRESS")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .context("BIND_ADDRESS must be host:port")?;

        let token_signing_key = {
            let hex_key = lookup("TOKEN_SIGNING_KEY")
                .context("TOKEN_SIGNING_KEY environment variable required")?;
            let bytes = Zeroizing::new(
                hex::decode(hex_key.trim()).context("TOKEN_SIGNING_KEY must be hex")?,
            );
            if bytes.len() < MIN_KEY_LENGTH {
                anyhow::bail!(
                    "TOKEN_SIGNING_KEY must be at least {} bytes ({} hex chars)",
                    MIN_KEY_LENGTH,
                    MIN_KEY_LENGTH * 2
                );
            }
            bytes
        };

        let token_algorithm = match lookup("TOKEN_ALGORITHM").as_deref() {
            None | Some("HS256") => Algorithm::HS256,
            Some("HS384") => Algorithm::HS384,
            Some("HS512") => Algorithm::HS512,
            Some(other) => anyhow::bail!("Unsupported TOKEN_ALGORITHM: {}", other),
        };

        let token_issuer = lookup("TOKEN_ISSUER").unwrap_or_else(|| "tenant-vault".to_string());

        let token_ttl = Duration::from_secs(parse_or(&lookup, "TOKEN_TTL_SECONDS", 86_400)?); // 24 hours
        if token_ttl.is_zero() {
            anyhow::bail!("TOKEN_TTL_SECONDS must be positive");
        }

        let backend = match lookup("BACKEND").as_deref() {
            None | Some("kubernetes") => BackendKind::Kubernetes,
            Some("memory") => BackendKind::Memory,
            Some(other) => anyhow::bail!("Unknown BACKEND: {} (expected kubernetes or memory)", other),
        };

        let kube_request_timeout =
            millis_or(&lookup, "KUBE_REQUEST_TIMEOUT_MS", Duration::from_secs(30))?;
        if kube_request_timeout.is_zero() {
            anyhow::bail!("KUBE_REQUEST_TIMEOUT_MS must be positive");
        }

        let defaults = LifecycleConfig::default();
        let lifecycle = LifecycleConfig {
            poll_interval: millis_or(&lookup, "SCOPE_POLL_INTERVAL_MS", defaults.poll_interval)?,
            create_timeout: millis_or(&lookup, "SCOPE_CREATE_TIMEOUT_MS", defaults.create_timeout)?,
            delete_timeout: millis_or(&lookup, "SCOPE_DELETE_TIMEOUT_MS", defaults.delete_timeout)?,
            finalize_timeout: millis_or(
                &lookup,
                "SCOPE_FINALIZE_TIMEOUT_MS",
                defaults.finalize_timeout,
            )?,
        };
        if lifecycle.poll_interval.is_zero() {
            anyhow::bail!("SCOPE_POLL_INTERVAL_MS must be positive");
        }

        let hashing_defaults = HashingParams::default();
        let hashing = HashingParams {
            memory_cost: parse_or(&lookup, "ARGON2_MEMORY_KIB", hashing_defaults.memory_cost)?,
            time_cost: parse_or(&lookup, "ARGON2_ITERATIONS", hashing_defaults.time_cost)?,
            parallelism: parse_or(&lookup, "ARGON2_PARALLELISM", hashing_defaults.parallelism)?,
        };

        Ok(Config {
            bind_address,
            token_signing_key,
            token_algorithm,
            token_issuer,
            token_ttl,
            backend,
            kube_api_url: lookup("KUBE_API_URL"),
            kube_token: lookup("KUBE_TOKEN"),
            kube_ca_cert: lookup("KUBE_CA_CERT").map(PathBuf::from),
            kube_request_timeout,
            lifecycle,
            hashing,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number", key)),
        None => Ok(default),
    }
}

fn millis_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let millis = parse_or(lookup, key, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}
