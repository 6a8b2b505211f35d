//! EIP-712 typed-data construction, signature recovery, and nonce generation.
//!
//! Provides functions for:
//! - Building the EIP-3009 authorization for an offer ([`build_authorization`])
//! - Wrapping it in the typed-data document a wallet signs ([`build_typed_data`])
//! - Computing signing hashes ([`TypedDataRequest::signing_hash`])
//! - Recovering the signer of a signature with EIP-2 malleability protection ([`recover_signer`])
//! - Generating random nonces ([`random_nonce`])
//! - Encoding signatures to hex ([`encode_signature_hex`])

use alloy::primitives::{Address, FixedBytes, Signature, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use std::borrow::Cow;

use crate::payment::{
    transfer_with_authorization_types, PaymentRequirements, TransferAuthorization,
    TypedDataDomain, TypedDataRequest,
};
use crate::{ChainConfig, TransferWithAuthorization, X402Error, DEFAULT_CREDENTIAL_TTL_SECS};

/// Lifetime of an authorization built for `offer`, in seconds.
///
/// A zero timeout falls back to [`DEFAULT_CREDENTIAL_TTL_SECS`]. The same
/// value bounds the message window, the credential expiry and the default
/// signing wait, so the three never disagree.
pub fn effective_timeout_secs(offer: &PaymentRequirements) -> u64 {
    if offer.max_timeout_seconds == 0 {
        DEFAULT_CREDENTIAL_TTL_SECS
    } else {
        offer.max_timeout_seconds
    }
}

/// Parse a decimal token amount into a `uint256`.
pub fn parse_amount(value: &str) -> Result<U256, X402Error> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(X402Error::MalformedChallenge(format!(
            "maxAmountRequired must be a decimal integer, got {value:?}"
        )));
    }
    U256::from_str_radix(value, 10).map_err(|e| {
        X402Error::MalformedChallenge(format!("maxAmountRequired out of range: {e}"))
    })
}

/// Parse an EVM address field of the selected offer.
pub fn parse_address(field: &str, value: &str) -> Result<Address, X402Error> {
    value.parse::<Address>().map_err(|e| {
        X402Error::MalformedChallenge(format!("{field} is not an EVM address ({value:?}): {e}"))
    })
}

/// Build the authorization that pays `offer` from `from`, valid for
/// `[now, now + timeout]`.
///
/// `to` and `value` are the offer's strings, copied verbatim once they are
/// known to be a valid address and `uint256`.
pub fn build_authorization(
    from: Address,
    offer: &PaymentRequirements,
    now: u64,
    nonce: FixedBytes<32>,
) -> Result<TransferAuthorization, X402Error> {
    parse_amount(&offer.max_amount_required)?;
    parse_address("payTo", &offer.pay_to)?;

    let valid_before = now
        .checked_add(effective_timeout_secs(offer))
        .ok_or_else(|| X402Error::MalformedChallenge("maxTimeoutSeconds overflows".into()))?;

    Ok(TransferAuthorization {
        from,
        to: offer.pay_to.clone(),
        value: offer.max_amount_required.clone(),
        valid_after: now,
        valid_before,
        nonce,
    })
}

/// Wrap an authorization in the typed-data document for the offer's token.
///
/// The offer must name its token (`extra.name`, `extra.version`) and give
/// `asset` as an EVM address.
pub fn build_typed_data(
    config: &ChainConfig,
    offer: &PaymentRequirements,
    authorization: TransferAuthorization,
) -> Result<TypedDataRequest, X402Error> {
    let extra = offer.extra.clone().unwrap_or_default();
    let (Some(name), Some(version)) = (extra.name, extra.version) else {
        return Err(X402Error::MalformedChallenge(
            "offer is missing extra.name/extra.version for the token domain".to_string(),
        ));
    };

    Ok(TypedDataRequest {
        types: transfer_with_authorization_types(),
        primary_type: crate::PRIMARY_TYPE.to_string(),
        domain: TypedDataDomain {
            name,
            version,
            chain_id: config.chain_id,
            verifying_contract: parse_address("asset", &offer.asset)?,
        },
        message: authorization,
    })
}

impl TypedDataDomain {
    /// The alloy EIP-712 domain for this token.
    pub fn to_eip712(&self) -> Eip712Domain {
        Eip712Domain {
            name: Some(Cow::Owned(self.name.clone())),
            version: Some(Cow::Owned(self.version.clone())),
            chain_id: Some(U256::from(self.chain_id)),
            verifying_contract: Some(self.verifying_contract),
            salt: None,
        }
    }
}

impl TransferAuthorization {
    /// The ABI-typed struct that gets hashed and signed.
    pub fn to_sol(&self) -> Result<TransferWithAuthorization, X402Error> {
        Ok(TransferWithAuthorization {
            from: self.from,
            to: parse_address("to", &self.to)?,
            value: parse_amount(&self.value)?,
            validAfter: U256::from(self.valid_after),
            validBefore: U256::from(self.valid_before),
            nonce: self.nonce,
        })
    }
}

impl TypedDataRequest {
    /// Compute the EIP-712 signing hash of the message under its domain.
    pub fn signing_hash(&self) -> Result<B256, X402Error> {
        let message = self.message.to_sol()?;
        Ok(message.eip712_signing_hash(&self.domain.to_eip712()))
    }
}

/// secp256k1 curve order N / 2 — signatures with s > this are malleable (EIP-2).
const SECP256K1_N_DIV_2: U256 = U256::from_limbs([
    0xDFE92F46681B20A0,
    0x5D576E7357A4501D,
    0xFFFFFFFFFFFFFFFF,
    0x7FFFFFFFFFFFFFFF,
]);

/// Recover the address that signed `request`.
/// Rejects high-s signatures to prevent malleability (EIP-2).
pub fn recover_signer(
    request: &TypedDataRequest,
    signature_bytes: &[u8],
) -> Result<Address, X402Error> {
    if signature_bytes.len() != 65 {
        return Err(X402Error::InvalidCredential(format!(
            "signature must be 65 bytes, got {}",
            signature_bytes.len()
        )));
    }

    let sig = Signature::from_raw(signature_bytes)
        .map_err(|e| X402Error::InvalidCredential(format!("invalid signature: {e}")))?;

    if sig.s() > SECP256K1_N_DIV_2 {
        return Err(X402Error::InvalidCredential(
            "high-s signature rejected (EIP-2 malleability)".to_string(),
        ));
    }

    let hash = request.signing_hash()?;
    sig.recover_address_from_prehash(&hash)
        .map_err(|e| X402Error::InvalidCredential(format!("recovery failed: {e}")))
}

/// Generate a random 32-byte nonce (keccak256 of 32 random bytes).
/// Uses `rand::fill`, backed by the OS CSPRNG.
pub fn random_nonce() -> FixedBytes<32> {
    use alloy::primitives::keccak256;
    let mut bytes = [0u8; 32];
    rand::fill(&mut bytes);
    keccak256(bytes)
}

/// Encode a Signature to a hex string with 0x prefix (65 bytes -> 0x + 130 hex).
/// Uses Electrum notation: v = 27 or 28 in the last byte.
pub fn encode_signature_hex(sig: &Signature) -> String {
    let bytes = sig.as_bytes();
    format!("0x{}", alloy::hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentExtra;
    use alloy::signers::local::PrivateKeySigner;
    use alloy::signers::SignerSync;
    use std::collections::HashSet;

    const PAY_TO: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const ASSET: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    fn offer(amount: &str, timeout: u64) -> PaymentRequirements {
        PaymentRequirements {
            scheme: "exact".to_string(),
            network: "polygon-amoy".to_string(),
            max_amount_required: amount.to_string(),
            resource: None,
            description: None,
            mime_type: None,
            pay_to: PAY_TO.to_string(),
            max_timeout_seconds: timeout,
            asset: ASSET.to_string(),
            output_schema: None,
            extra: Some(PaymentExtra::new("USDC", "2")),
        }
    }

    #[test]
    fn authorization_copies_amount_and_window() {
        let from = Address::repeat_byte(0x11);
        let amount = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let auth = build_authorization(from, &offer(amount, 300), 1_700_000_000, random_nonce())
            .unwrap();

        assert_eq!(auth.value, amount);
        assert_eq!(auth.from, from);
        assert_eq!(auth.to, PAY_TO);
        assert_eq!(auth.valid_before - auth.valid_after, 300);
        assert_eq!(auth.valid_after, 1_700_000_000);
    }

    #[test]
    fn zero_timeout_uses_default_window() {
        let auth = build_authorization(Address::ZERO, &offer("1", 0), 100, random_nonce()).unwrap();
        assert_eq!(auth.valid_before - auth.valid_after, DEFAULT_CREDENTIAL_TTL_SECS);
        assert!(auth.valid_before > auth.valid_after);
    }

    #[test]
    fn non_integer_amounts_are_rejected() {
        for bad in ["", "1.5", "-1", "0x10", "1e6", " 1"] {
            let err = build_authorization(Address::ZERO, &offer(bad, 60), 0, random_nonce())
                .unwrap_err();
            assert!(matches!(err, X402Error::MalformedChallenge(_)), "{bad:?}");
        }
        // One past uint256::MAX.
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(parse_amount(too_big).is_err());
    }

    #[test]
    fn typed_data_binds_domain_to_offer_asset() {
        let o = offer("1000", 60);
        let auth = build_authorization(Address::ZERO, &o, 0, FixedBytes::ZERO).unwrap();
        let typed = build_typed_data(&ChainConfig::default(), &o, auth).unwrap();

        assert_eq!(typed.primary_type, "TransferWithAuthorization");
        assert_eq!(typed.domain.name, "USDC");
        assert_eq!(typed.domain.version, "2");
        assert_eq!(typed.domain.chain_id, 80002);
        assert_eq!(typed.domain.verifying_contract, Address::repeat_byte(0xbb));
    }

    #[test]
    fn non_evm_recipient_is_malformed() {
        let mut o = offer("1000", 60);
        o.pay_to = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string();
        let err = build_authorization(Address::ZERO, &o, 0, FixedBytes::ZERO).unwrap_err();
        assert!(matches!(err, X402Error::MalformedChallenge(_)));
    }

    #[test]
    fn token_domain_fields_are_required() {
        let o = offer("1000", 60);
        let auth = build_authorization(Address::ZERO, &o, 0, FixedBytes::ZERO).unwrap();

        let mut no_extra = o.clone();
        no_extra.extra = None;
        let mut no_version = o.clone();
        no_version.extra = Some(PaymentExtra {
            name: Some("USDC".to_string()),
            version: None,
        });
        let mut bad_asset = o;
        bad_asset.asset = "usdc".to_string();

        for bad in [no_extra, no_version, bad_asset] {
            let err = build_typed_data(&ChainConfig::default(), &bad, auth.clone()).unwrap_err();
            assert!(matches!(err, X402Error::MalformedChallenge(_)));
        }
    }

    #[test]
    fn test_sign_and_recover_roundtrip() {
        let signer = PrivateKeySigner::random();
        let o = offer("1000", 60);
        let auth = build_authorization(signer.address(), &o, 1_700_000_000, random_nonce())
            .unwrap();
        let typed = build_typed_data(&ChainConfig::default(), &o, auth).unwrap();

        let hash = typed.signing_hash().unwrap();
        let sig = signer.sign_hash_sync(&hash).unwrap();
        let sig_hex = encode_signature_hex(&sig);
        let sig_bytes = alloy::hex::decode(sig_hex.strip_prefix("0x").unwrap()).unwrap();

        assert_eq!(recover_signer(&typed, &sig_bytes).unwrap(), signer.address());
    }

    #[test]
    fn chain_id_changes_signing_hash() {
        let o = offer("1000", 60);
        let auth = build_authorization(Address::ZERO, &o, 0, FixedBytes::ZERO).unwrap();
        let amoy = build_typed_data(&ChainConfig::default(), &o, auth.clone()).unwrap();
        let other = build_typed_data(
            &ChainConfig {
                chain_id: 137,
                ..ChainConfig::default()
            },
            &o,
            auth,
        )
        .unwrap();
        assert_ne!(amoy.signing_hash().unwrap(), other.signing_hash().unwrap());
    }

    #[test]
    fn short_signature_is_rejected() {
        let o = offer("1", 60);
        let auth = build_authorization(Address::ZERO, &o, 0, FixedBytes::ZERO).unwrap();
        let typed = build_typed_data(&ChainConfig::default(), &o, auth).unwrap();
        assert!(recover_signer(&typed, &[0u8; 64]).is_err());
    }

    #[test]
    fn nonces_do_not_collide() {
        let nonces: HashSet<_> = (0..10_000).map(|_| random_nonce()).collect();
        assert_eq!(nonces.len(), 10_000);
    }
}
