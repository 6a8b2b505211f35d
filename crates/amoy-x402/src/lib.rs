//! x402 payment protocol for Polygon Amoy.
//!
//! Implements the client side of HTTP 402 pay-per-request using EIP-3009
//! `TransferWithAuthorization` messages signed as EIP-712 typed data.
//!
//! # Flow
//!
//! - **Select** ([`select_requirements`]) — pick the offer matching the configured scheme/network
//! - **Build** ([`eip712::build_authorization`], [`eip712::build_typed_data`]) — fix nonce and validity window
//! - **Sign** ([`PaymentSigner`]) — hand the typed data to a wallet
//! - **Encode** ([`credential::encode_credential`]) — pack signature and claims into an HS256 token
//!
//! The HTTP side (transport, interceptor, concrete signers) lives in the
//! `amoy-x402-client` crate.

// Core types and traits
pub mod constants;
pub mod error;
pub mod hmac;
pub mod payment;
pub mod scheme;

// EIP-712 and credential encoding
pub mod credential;
pub mod eip712;

use alloy::sol;

// EIP-3009 authorization, as signed for USDC-style tokens.
// The sol! macro derives SolStruct which provides eip712_signing_hash().
sol! {
    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
}

// Re-exports
pub use constants::*;
pub use credential::{CredentialClaims, CredentialKey};
pub use error::{ReplayFailure, SignerError, TransportError, X402Error};
pub use payment::*;
pub use scheme::*;
