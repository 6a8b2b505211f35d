/// Polygon Amoy testnet chain ID.
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80002;

/// Network identifier servers use for Polygon Amoy in `accepts` offers.
pub const POLYGON_AMOY_NETWORK: &str = "polygon-amoy";

/// x402 scheme name for EIP-3009 `transferWithAuthorization` payments.
pub const SCHEME_EXACT: &str = "exact";

/// Protocol version stamped into issued credentials.
pub const X402_VERSION: u32 = 1;

/// Request header that carries the encoded credential on the replay.
pub const PAYMENT_HEADER: &str = "X-PAYMENT";

/// HTTP status that signals a payment challenge.
pub const PAYMENT_REQUIRED_STATUS: u16 = 402;

/// Credential lifetime used when an offer declares no timeout.
pub const DEFAULT_CREDENTIAL_TTL_SECS: u64 = 300;

/// EIP-712 primary type signed for every authorization.
pub const PRIMARY_TYPE: &str = "TransferWithAuthorization";

/// Runtime chain configuration: the one (scheme, network) pair this client
/// can settle on, plus the chain ID used for EIP-712 domain separation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub scheme_name: String,
    pub network: String,
    pub chain_id: u64,
}

impl Default for ChainConfig {
    /// Defaults to the `exact` scheme on Polygon Amoy.
    fn default() -> Self {
        Self {
            scheme_name: SCHEME_EXACT.to_string(),
            network: POLYGON_AMOY_NETWORK.to_string(),
            chain_id: POLYGON_AMOY_CHAIN_ID,
        }
    }
}
