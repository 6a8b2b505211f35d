//! Human-in-the-loop signing.
//!
//! [`ApprovalSigner`] forwards every signature request to whoever holds the
//! prompt receiver (a UI, a CLI confirmation) and only signs once they
//! approve. The interceptor's signing timeout bounds how long it waits.

use alloy::primitives::Address;
use tokio::sync::{mpsc, oneshot};
use x402::{PaymentSigner, SignerError, TypedDataRequest};

/// The user's answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

/// One pending signature request awaiting a decision.
///
/// Dropping it without answering fails the payment.
#[derive(Debug)]
pub struct ApprovalPrompt {
    request: TypedDataRequest,
    responder: oneshot::Sender<Decision>,
}

impl ApprovalPrompt {
    /// What the wallet is being asked to sign.
    pub fn request(&self) -> &TypedDataRequest {
        &self.request
    }

    pub fn respond(self, decision: Decision) {
        // The requester may have timed out already.
        let _ = self.responder.send(decision);
    }

    pub fn approve(self) {
        self.respond(Decision::Approve);
    }

    pub fn decline(self) {
        self.respond(Decision::Decline);
    }
}

/// Wraps a signer so each signature needs explicit approval.
pub struct ApprovalSigner<S> {
    inner: S,
    prompts: mpsc::Sender<ApprovalPrompt>,
}

impl<S: PaymentSigner> ApprovalSigner<S> {
    /// Returns the signer and the receiving end of its prompt queue.
    pub fn new(inner: S, buffer: usize) -> (Self, mpsc::Receiver<ApprovalPrompt>) {
        let (prompts, rx) = mpsc::channel(buffer.max(1));
        (Self { inner, prompts }, rx)
    }
}

impl<S: PaymentSigner> PaymentSigner for ApprovalSigner<S> {
    fn address(&self) -> Option<Address> {
        self.inner.address()
    }

    async fn sign_typed_data(&self, request: &TypedDataRequest) -> Result<String, SignerError> {
        let (responder, answer) = oneshot::channel();
        self.prompts
            .send(ApprovalPrompt {
                request: request.clone(),
                responder,
            })
            .await
            .map_err(|_| SignerError::Failed("approval channel closed".to_string()))?;

        tracing::debug!(to = %request.message.to, value = %request.message.value, "awaiting payment approval");

        match answer.await {
            Ok(Decision::Approve) => self.inner.sign_typed_data(request).await,
            Ok(Decision::Decline) => Err(SignerError::Rejected),
            Err(_) => Err(SignerError::Failed(
                "approval prompt dropped without an answer".to_string(),
            )),
        }
    }
}
