use std::time::Duration;
use x402::{ChainConfig, CredentialKey, X402Error};

/// Everything the interceptor needs besides a transport and a signer.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The (scheme, network) pair this client pays with, and its chain ID.
    pub chain: ChainConfig,
    /// Upper bound on the wait for a signature. `None` = the offer's timeout.
    pub signing_timeout: Option<Duration>,
    /// Secret that integrity-protects issued credentials.
    pub credential_key: CredentialKey,
}

impl ClientConfig {
    /// Polygon Amoy / `exact` defaults with the given credential secret.
    pub fn new(credential_key: CredentialKey) -> Self {
        Self {
            chain: ChainConfig::default(),
            signing_timeout: None,
            credential_key,
        }
    }

    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_signing_timeout(mut self, timeout: Duration) -> Self {
        self.signing_timeout = Some(timeout);
        self
    }

    /// Load from the process environment.
    ///
    /// - `X402_CREDENTIAL_SECRET` (required)
    /// - `X402_SCHEME`, `X402_NETWORK`, `X402_CHAIN_ID` (default: exact / polygon-amoy / 80002)
    /// - `X402_SIGNING_TIMEOUT_SECS` (optional)
    pub fn from_env() -> Result<Self, X402Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, X402Error> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let secret = var("X402_CREDENTIAL_SECRET").ok_or_else(|| {
            X402Error::ConfigError("X402_CREDENTIAL_SECRET is required".to_string())
        })?;

        let defaults = ChainConfig::default();
        let chain_id = match var("X402_CHAIN_ID") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                X402Error::ConfigError(format!("X402_CHAIN_ID must be an integer, got {raw:?}"))
            })?,
            None => defaults.chain_id,
        };
        let chain = ChainConfig {
            scheme_name: var("X402_SCHEME").unwrap_or(defaults.scheme_name),
            network: var("X402_NETWORK").unwrap_or(defaults.network),
            chain_id,
        };

        let signing_timeout = match var("X402_SIGNING_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(X402Error::ConfigError(format!(
                        "X402_SIGNING_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                    )))
                }
            },
            None => None,
        };

        tracing::debug!(
            scheme = %chain.scheme_name,
            network = %chain.network,
            chain_id = chain.chain_id,
            signing_timeout_secs = signing_timeout.map(|d| d.as_secs()),
            "loaded x402 client config"
        );

        Ok(Self {
            chain,
            signing_timeout,
            credential_key: CredentialKey::new(secret),
        })
    }
}
