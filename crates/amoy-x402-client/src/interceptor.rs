use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Url};
use std::time::Duration;
use x402::eip712::{build_authorization, build_typed_data, effective_timeout_secs, random_nonce};
use x402::credential::{encode_credential, issue_claims};
use x402::{
    select_requirements, PaymentRequiredBody, PaymentSigner, ReplayFailure, TransportError,
    X402Error, PAYMENT_HEADER, PAYMENT_REQUIRED_STATUS,
};

use crate::config::ClientConfig;
use crate::transport::{HttpRequest, HttpResponse, Transport};

const X_PAYMENT: HeaderName = HeaderName::from_static("x-payment");

/// Where a single intercepted request is in the payment round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Sent,
    ChallengeReceived,
    Signing,
    Encoding,
    Retrying,
    Done,
}

fn enter(state: AttemptState) {
    tracing::trace!(?state, "x402 attempt state");
}

/// Wraps a [`Transport`] and pays 402 challenges on the fly.
///
/// On a 402 response it parses the offers, picks the one matching the
/// configured scheme/network, has the [`PaymentSigner`] sign an EIP-3009
/// authorization, and replays the original request once with an
/// `X-PAYMENT` credential. The replay is never intercepted again.
///
/// Holds no per-request state; share it behind an `Arc` freely.
pub struct PaymentInterceptor<T: Transport, S: PaymentSigner> {
    transport: T,
    signer: S,
    config: ClientConfig,
}

impl<T: Transport, S: PaymentSigner> PaymentInterceptor<T, S> {
    pub fn new(transport: T, signer: S, config: ClientConfig) -> Self {
        Self {
            transport,
            signer,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Make a request, automatically handling 402 payment responses.
    pub async fn fetch(&self, method: Method, url: &str) -> Result<HttpResponse, X402Error> {
        self.fetch_with_body(method, url, None).await
    }

    /// Make a request with an optional body, automatically handling 402 payment responses.
    pub async fn fetch_with_body(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, X402Error> {
        let url = Url::parse(url)
            .map_err(|e| TransportError::new(format!("invalid url {url:?}: {e}")))?;
        let mut request = HttpRequest::new(method, url);
        if let Some(b) = body {
            request = request.with_body(b);
        }
        self.intercept(request).await
    }

    /// Send `request`; if the server answers 402, pay and replay it once.
    pub async fn intercept(&self, request: HttpRequest) -> Result<HttpResponse, X402Error> {
        enter(AttemptState::Sent);
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let response = self.transport.send(request.clone()).await.map_err(|e| {
            enter(AttemptState::Done);
            tracing::warn!(url = %request.url, error = %e, "request failed");
            X402Error::Transport(e)
        })?;

        if response.status.as_u16() != PAYMENT_REQUIRED_STATUS {
            tracing::debug!(status = %response.status, "no payment required");
            enter(AttemptState::Done);
            return Ok(response);
        }

        enter(AttemptState::ChallengeReceived);
        tracing::info!(url = %request.url, "received 402 Payment Required");

        let credential = self.pay(&response).await.inspect_err(|e| {
            enter(AttemptState::Done);
            tracing::warn!(url = %request.url, error = %e, "payment round failed");
        })?;

        let header = HeaderValue::from_str(&credential).map_err(|e| {
            enter(AttemptState::Done);
            X402Error::CredentialEncodingFailed(format!("credential is not a valid header: {e}"))
        })?;
        let mut paid = request;
        paid.headers.insert(X_PAYMENT, header);

        enter(AttemptState::Retrying);
        tracing::info!(url = %paid.url, header = PAYMENT_HEADER, "retrying with payment credential");

        let replay = self.transport.send(paid).await.map_err(|e| {
            enter(AttemptState::Done);
            tracing::warn!(error = %e, "paid request failed");
            X402Error::ReplayFailed(ReplayFailure::Transport(e))
        })?;

        enter(AttemptState::Done);
        if replay.status.as_u16() == PAYMENT_REQUIRED_STATUS {
            tracing::warn!("server challenged the paid request again; not retrying");
            return Err(X402Error::ReplayFailed(ReplayFailure::Challenged {
                status: replay.status.as_u16(),
                body: replay.text(),
            }));
        }

        tracing::info!(status = %replay.status, "paid request completed");
        Ok(replay)
    }

    /// Turn a 402 response into an encoded credential.
    async fn pay(&self, response: &HttpResponse) -> Result<String, X402Error> {
        let body: PaymentRequiredBody = serde_json::from_slice(&response.body)
            .map_err(|e| X402Error::MalformedChallenge(format!("failed to parse 402 body: {e}")))?;

        tracing::info!(
            x402_version = body.x402_version,
            reason = %body.error,
            offers = body.accepts.len(),
            "payment challenge"
        );

        let offer = select_requirements(&body, &self.config.chain)?;
        tracing::info!(
            scheme = %offer.scheme,
            network = %offer.network,
            amount = %offer.max_amount_required,
            pay_to = %offer.pay_to,
            asset = %offer.asset,
            "using payment offer"
        );

        let from = self
            .signer
            .address()
            .ok_or_else(|| X402Error::SigningFailed("wallet account not found".to_string()))?;

        let authorization = build_authorization(from, offer, unix_now()?, random_nonce())?;
        let typed = build_typed_data(&self.config.chain, offer, authorization)?;

        enter(AttemptState::Signing);
        let wait = self
            .config
            .signing_timeout
            .unwrap_or_else(|| Duration::from_secs(effective_timeout_secs(offer)));
        tracing::info!(from = %from, timeout_secs = wait.as_secs(), "requesting signature from wallet");

        let signature = match tokio::time::timeout(wait, self.signer.sign_typed_data(&typed)).await {
            Ok(Ok(signature)) => signature,
            Ok(Err(e)) => return Err(X402Error::from_signer(e, wait.as_secs())),
            Err(_) => return Err(X402Error::SigningTimedOut(wait.as_secs())),
        };

        enter(AttemptState::Encoding);
        let claims = issue_claims(
            &self.config.chain,
            offer,
            typed.message,
            signature,
            unix_now()?,
        );
        let token = encode_credential(&self.config.credential_key, &claims)?;
        tracing::debug!(exp = claims.exp, len = token.len(), "payment credential encoded");

        Ok(token)
    }
}

fn unix_now() -> Result<u64, X402Error> {
    Ok(std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| X402Error::ConfigError(format!("system time error: {e}")))?
        .as_secs())
}
