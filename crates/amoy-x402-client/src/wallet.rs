use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use x402::eip712::encode_signature_hex;
use x402::{PaymentSigner, SignerError, TypedDataRequest, X402Error};

/// Signs payment authorizations with a local private key, no prompt.
///
/// Use this with [`PaymentInterceptor`](crate::PaymentInterceptor) for
/// headless clients; wrap it in [`ApprovalSigner`](crate::ApprovalSigner)
/// when a person has to confirm each payment.
pub struct LocalWalletSigner {
    signer: PrivateKeySigner,
}

impl LocalWalletSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Parse a hex private key (with or without 0x).
    pub fn from_private_key(key: &str) -> Result<Self, X402Error> {
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|e| X402Error::ConfigError(format!("invalid private key: {e}")))?;
        Ok(Self::new(signer))
    }

    /// Get the address of the signer.
    pub fn account(&self) -> Address {
        self.signer.address()
    }
}

impl std::fmt::Debug for LocalWalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWalletSigner")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

impl PaymentSigner for LocalWalletSigner {
    fn address(&self) -> Option<Address> {
        Some(self.signer.address())
    }

    async fn sign_typed_data(&self, request: &TypedDataRequest) -> Result<String, SignerError> {
        if request.message.from != self.signer.address() {
            return Err(SignerError::Failed(format!(
                "authorization is from {}, wallet is {}",
                request.message.from,
                self.signer.address()
            )));
        }

        let hash = request
            .signing_hash()
            .map_err(|e| SignerError::Failed(e.to_string()))?;
        let sig = self
            .signer
            .sign_hash_sync(&hash)
            .map_err(|e| SignerError::Failed(format!("signing failed: {e}")))?;

        Ok(encode_signature_hex(&sig))
    }
}
