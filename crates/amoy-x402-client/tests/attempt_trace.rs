//! Every exit from a payment round, successful or not, ends in the `Done`
//! state trace.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use reqwest::{StatusCode, Url};
use serde_json::json;
use x402_client::{
    ClientConfig, CredentialKey, HttpRequest, HttpResponse, PaymentInterceptor, PaymentSigner,
    SignerError, Transport, TransportError, TypedDataRequest,
};

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn take(&self) -> String {
        String::from_utf8(std::mem::take(&mut *self.0.lock().unwrap())).unwrap()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Replies(Mutex<VecDeque<Result<HttpResponse, TransportError>>>);

impl Replies {
    fn new(replies: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self(Mutex::new(replies.into()))
    }
}

impl Transport for Replies {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted reply left")))
    }
}

struct Wallet {
    reject: bool,
}

impl PaymentSigner for Wallet {
    fn address(&self) -> Option<Address> {
        Some(Address::repeat_byte(0x11))
    }

    async fn sign_typed_data(&self, _request: &TypedDataRequest) -> Result<String, SignerError> {
        if self.reject {
            Err(SignerError::Rejected)
        } else {
            Ok("0xSIG".to_string())
        }
    }
}

fn challenge() -> Result<HttpResponse, TransportError> {
    let body = json!({
        "x402Version": 1,
        "accepts": [{
            "scheme": "exact",
            "network": "polygon-amoy",
            "maxAmountRequired": "1000",
            "payTo": "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
            "maxTimeoutSeconds": 60,
            "asset": "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
            "extra": { "name": "USDC", "version": "2" }
        }]
    });
    Ok(HttpResponse::new(
        StatusCode::PAYMENT_REQUIRED,
        serde_json::to_vec(&body).unwrap(),
    ))
}

async fn run(replies: Vec<Result<HttpResponse, TransportError>>, reject: bool) {
    let client = PaymentInterceptor::new(
        Replies::new(replies),
        Wallet { reject },
        ClientConfig::new(CredentialKey::new("trace-secret")),
    );
    let request = HttpRequest::get(Url::parse("https://api.example.com/data").unwrap());
    let _ = client.intercept(request).await;
}

#[tokio::test]
async fn every_exit_traces_done() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer({
            let logs = logs.clone();
            move || logs.clone()
        })
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let cases: Vec<(&str, Vec<Result<HttpResponse, TransportError>>, bool)> = vec![
        ("free", vec![Ok(HttpResponse::new(StatusCode::OK, "ok"))], false),
        ("unreachable", vec![Err(TransportError::new("refused"))], false),
        (
            "malformed",
            vec![Ok(HttpResponse::new(StatusCode::PAYMENT_REQUIRED, "<html>"))],
            false,
        ),
        ("declined", vec![challenge()], true),
        (
            "replay unreachable",
            vec![challenge(), Err(TransportError::new("reset"))],
            false,
        ),
        ("paid", vec![challenge(), Ok(HttpResponse::new(StatusCode::OK, "ok"))], false),
    ];

    for (name, replies, reject) in cases {
        run(replies, reject).await;
        let output = logs.take();
        assert_eq!(output.matches("state=Done").count(), 1, "{name}: {output}");
    }
}
