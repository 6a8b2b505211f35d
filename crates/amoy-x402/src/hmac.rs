use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::X402Error;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 over `message` with `secret`. Returns the raw MAC.
pub fn compute_hmac(secret: &[u8], message: &[u8]) -> Result<Vec<u8>, X402Error> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| X402Error::CredentialEncodingFailed(format!("bad HMAC key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify an HMAC-SHA256 tag over `message`.
///
/// The hmac crate's `verify_slice` compares in constant time.
pub fn verify_hmac(secret: &[u8], message: &[u8], tag: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(tag).is_ok()
}
