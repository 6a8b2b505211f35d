//! Offer selection and the signing capability.
//!
//! - [`select_requirements`] — picks the one offer this client can pay
//! - [`PaymentSigner`] — wallet-side: signs an EIP-712 typed-data request

use crate::error::{SignerError, X402Error};
use crate::payment::{PaymentRequiredBody, PaymentRequirements, TypedDataRequest};
use crate::ChainConfig;
use alloy::primitives::Address;

/// Signing capability: anything that holds a key and can sign typed data.
///
/// Implementations may block on a human approving the request; callers
/// bound the wait with their own timeout.
pub trait PaymentSigner: Send + Sync {
    /// The account that will sign, or `None` if no account is connected.
    fn address(&self) -> Option<Address>;

    /// Sign the typed-data request, returning the 0x-prefixed signature.
    fn sign_typed_data(
        &self,
        request: &TypedDataRequest,
    ) -> impl std::future::Future<Output = Result<String, SignerError>> + Send;
}

/// Pick the first offer whose (scheme, network) pair equals the configured
/// pair. List order decides; later matches are ignored.
pub fn select_requirements<'a>(
    body: &'a PaymentRequiredBody,
    config: &ChainConfig,
) -> Result<&'a PaymentRequirements, X402Error> {
    if body.accepts.is_empty() {
        return Err(X402Error::MalformedChallenge(
            "challenge lists no accepted payment schemes".to_string(),
        ));
    }

    let selected = body
        .accepts
        .iter()
        .position(|r| r.scheme == config.scheme_name && r.network == config.network);
    if let Some(index) = selected {
        tracing::debug!(index, offers = body.accepts.len(), "selected payment offer");
        return Ok(&body.accepts[index]);
    }

    Err(X402Error::NoCompatibleScheme(format!(
        "wanted {}/{}, offered {:?}",
        config.scheme_name,
        config.network,
        body.accepts
            .iter()
            .map(|r| format!("{}/{}", r.scheme, r.network))
            .collect::<Vec<_>>()
    )))
}
