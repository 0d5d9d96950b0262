use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_HEADER: &str = "x-signature";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("malformed timestamp")]
    BadTimestamp,
    #[error("timestamp outside tolerance")]
    Expired,
    #[error("signature mismatch")]
    Mismatch,
}

/// Hex HMAC-SHA256 over `"{timestamp}.{order_id}.{status}"`.
pub fn sign_payload(secret: &str, timestamp: i64, order_id: i32, status: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(format!("{timestamp}.{order_id}.{status}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks the `x-timestamp`/`x-signature` pair against the reported values.
pub fn verify_signature(
    headers: &HeaderMap,
    secret: &str,
    order_id: i32,
    status: &str,
    tolerance_secs: u64,
    now: i64,
) -> Result<(), SignatureError> {
    let ts = header(headers, TIMESTAMP_HEADER)?;
    let sig = header(headers, SIGNATURE_HEADER)?;

    let ts: i64 = ts.trim().parse().map_err(|_| SignatureError::BadTimestamp)?;
    if (now - ts).unsigned_abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let expected = sign_payload(secret, ts, order_id, status);
    if expected.is_empty() || !constant_time_eq(&expected, sig.trim()) {
        return Err(SignatureError::Mismatch);
    }
    Ok(())
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::MissingHeader(name))
}

pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}
