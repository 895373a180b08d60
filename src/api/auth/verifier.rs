//! RFC 2617 digest computation and response verification.
//!
//! Pure functions, no side effects. The qop branch binds the client nonce
//! count and client nonce into the hash; the legacy branch is kept for
//! clients that predate qop.

use md5::{Digest, Md5};
use subtle::ConstantTimeEq;

use super::parser::DigestCredential;

fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

/// `HA1 = hex(MD5(username:realm:secret))`
#[must_use]
pub fn ha1(username: &str, realm: &str, secret: &str) -> String {
    md5_hex(&format!("{username}:{realm}:{secret}"))
}

/// `HA2 = hex(MD5(method:uri))`
#[must_use]
pub fn ha2(method: &str, uri: &str) -> String {
    md5_hex(&format!("{method}:{uri}"))
}

/// Recompute the response the client should have sent.
///
/// Returns `None` when `qop` is present without `cnonce` or `nc`; the
/// credential cannot be checked in that state.
#[must_use]
pub fn expected_response(
    credential: &DigestCredential,
    secret: &str,
    method: &str,
) -> Option<String> {
    let ha1 = ha1(&credential.username, &credential.realm, secret);
    let ha2 = ha2(method, &credential.uri);

    match credential.qop.as_deref() {
        Some(qop) => {
            let cnonce = credential.cnonce.as_deref()?;
            let nc = credential.nc.as_deref()?;
            Some(md5_hex(&format!(
                "{ha1}:{nonce}:{nc}:{cnonce}:{qop}:{ha2}",
                nonce = credential.nonce
            )))
        }
        None => Some(md5_hex(&format!(
            "{ha1}:{nonce}:{ha2}",
            nonce = credential.nonce
        ))),
    }
}

/// Whether the client-supplied response matches the recomputed one.
///
/// Comparison is constant-time; any missing prerequisite yields `false`,
/// never an error.
#[must_use]
pub fn verify(credential: &DigestCredential, secret: &str, method: &str) -> bool {
    expected_response(credential, secret, method).map_or(false, |expected| {
        expected
            .as_bytes()
            .ct_eq(credential.response.as_bytes())
            .into()
    })
}
