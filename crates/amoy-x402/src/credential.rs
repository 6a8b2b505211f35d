//! Bearer credentials for the `X-PAYMENT` header.
//!
//! A credential is a compact HS256 JWS: the signed authorization and its
//! signature travel as claims, with `iat`/`exp` mirroring the offer's
//! timeout. The MAC lets the receiving server trust the claims as issued;
//! it does not replace checking the EIP-712 signature against the token
//! contract.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::eip712::effective_timeout_secs;
use crate::hmac::{compute_hmac, verify_hmac};
use crate::payment::{PaymentRequirements, TransferAuthorization};
use crate::{ChainConfig, X402Error, X402_VERSION};

const JWS_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Secret used to integrity-protect credentials. Never logged.
#[derive(Clone)]
pub struct CredentialKey(Vec<u8>);

impl CredentialKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for CredentialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CredentialKey([REDACTED])")
    }
}

/// Signature plus the authorization it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactPayload {
    pub signature: String,
    pub authorization: TransferAuthorization,
}

/// Claims carried by an encoded credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialClaims {
    pub x402_version: u32,
    pub scheme: String,
    pub network: String,
    pub payload: ExactPayload,
    pub iat: u64,
    pub exp: u64,
}

/// Claims for a freshly signed authorization, issued at `now`.
pub fn issue_claims(
    config: &ChainConfig,
    offer: &PaymentRequirements,
    authorization: TransferAuthorization,
    signature: String,
    now: u64,
) -> CredentialClaims {
    CredentialClaims {
        x402_version: X402_VERSION,
        scheme: config.scheme_name.clone(),
        network: config.network.clone(),
        payload: ExactPayload {
            signature,
            authorization,
        },
        iat: now,
        exp: now.saturating_add(effective_timeout_secs(offer)),
    }
}

/// Encode claims as `base64url(header).base64url(claims).base64url(mac)`.
pub fn encode_credential(
    key: &CredentialKey,
    claims: &CredentialClaims,
) -> Result<String, X402Error> {
    if key.is_empty() {
        return Err(X402Error::CredentialEncodingFailed(
            "credential secret is empty".to_string(),
        ));
    }

    let claims_json = serde_json::to_vec(claims)
        .map_err(|e| X402Error::CredentialEncodingFailed(format!("claims: {e}")))?;
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(JWS_HEADER),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let tag = compute_hmac(key.as_bytes(), signing_input.as_bytes())?;

    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(tag)))
}

/// Check a credential's MAC and return its claims.
///
/// Only integrity is checked; expiry and the payment itself are the
/// receiving server's business.
pub fn decode_credential(
    key: &CredentialKey,
    token: &str,
) -> Result<CredentialClaims, X402Error> {
    let mut parts = token.split('.');
    let (Some(header), Some(claims), Some(tag), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(X402Error::InvalidCredential(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let tag = URL_SAFE_NO_PAD
        .decode(tag)
        .map_err(|e| X402Error::InvalidCredential(format!("invalid base64 in MAC: {e}")))?;
    let signing_input = &token[..header.len() + 1 + claims.len()];
    if !verify_hmac(key.as_bytes(), signing_input.as_bytes(), &tag) {
        return Err(X402Error::InvalidCredential("MAC mismatch".to_string()));
    }

    let header = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| X402Error::InvalidCredential(format!("invalid base64 in header: {e}")))?;
    let header: serde_json::Value = serde_json::from_slice(&header)
        .map_err(|e| X402Error::InvalidCredential(format!("header is not JSON: {e}")))?;
    if header["alg"] != "HS256" {
        return Err(X402Error::InvalidCredential(format!(
            "unsupported alg {}",
            header["alg"]
        )));
    }

    let claims = URL_SAFE_NO_PAD
        .decode(claims)
        .map_err(|e| X402Error::InvalidCredential(format!("invalid base64 in claims: {e}")))?;
    serde_json::from_slice(&claims)
        .map_err(|e| X402Error::InvalidCredential(format!("claims do not parse: {e}")))
}
