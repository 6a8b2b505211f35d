//! x402 client: pays HTTP 402 challenges transparently.
//!
//! The interceptor handles the whole payment round:
//! request -> 402 -> pick offer -> sign EIP-3009 authorization -> replay once.
//!
//! # Quick Example
//!
//! ```no_run
//! use alloy::signers::local::PrivateKeySigner;
//! use x402_client::{ClientConfig, LocalWalletSigner, PaymentInterceptor, ReqwestTransport};
//! use x402::CredentialKey;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), x402::X402Error> {
//! let signer: PrivateKeySigner = "0xYOUR_KEY".parse().unwrap();
//! let config = ClientConfig::new(CredentialKey::new("shared-secret"));
//! let client = PaymentInterceptor::new(
//!     ReqwestTransport::new()?,
//!     LocalWalletSigner::new(signer),
//!     config,
//! );
//!
//! let resp = client
//!     .fetch(reqwest::Method::GET, "https://api.example.com/data/42")
//!     .await?;
//! println!("{}: {}", resp.status, resp.text());
//! # Ok(())
//! # }
//! ```

mod approval;
mod config;
mod interceptor;
mod transport;
mod wallet;

pub use approval::{ApprovalPrompt, ApprovalSigner, Decision};
pub use config::ClientConfig;
pub use interceptor::{AttemptState, PaymentInterceptor};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use wallet::LocalWalletSigner;

// Re-export commonly needed types from core
pub use x402::{
    ChainConfig, CredentialClaims, CredentialKey, PaymentRequiredBody, PaymentRequirements,
    PaymentSigner, ReplayFailure, SignerError, TransportError, TypedDataRequest, X402Error,
    PAYMENT_HEADER, POLYGON_AMOY_CHAIN_ID, POLYGON_AMOY_NETWORK, SCHEME_EXACT,
};
