//! Session token signing and verification for player connections (§4.13).
//!
//! A session token is minted by the out-of-scope HTTP registration
//! surface when a resident registers, and presented back to this gateway
//! either as a `token` query parameter or in the first `auth` message on
//! a player `WebSocket` connection. The gateway only verifies; minting is
//! exposed here too, since a registration surface sharing this binary's
//! secret needs the exact same scheme.
//!
//! Token shape: `base64url(json_claims).base64url(hmac_sha256(secret,
//! base64url(json_claims)))`. The signing secret is the same
//! `REGISTRATION_TOKEN` the core already uses to gate the registration
//! endpoint, so no second shared secret needs distributing.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use oakhaven_types::protocol::SessionClaims;
use sha2::Sha256;

use crate::error::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Sign a session token for `claims` under `secret`.
///
/// # Errors
///
/// Returns [`GatewayError::Auth`] if `secret` cannot key an HMAC
/// instance, or [`GatewayError::Serialization`] if `claims` cannot be
/// encoded.
pub fn sign_session_token(secret: &[u8], claims: &SessionClaims) -> Result<String, GatewayError> {
    let payload = serde_json::to_vec(claims)?;
    let encoded_payload = URL_SAFE_NO_PAD.encode(payload);
    let signature = sign(secret, encoded_payload.as_bytes())?;
    Ok(format!("{encoded_payload}.{signature}"))
}

/// Verify a session token's signature and decode its claims.
///
/// # Errors
///
/// Returns [`GatewayError::Auth`] if the token is malformed, the
/// signature does not match, or the claims cannot be decoded.
pub fn verify_session_token(secret: &[u8], token: &str) -> Result<SessionClaims, GatewayError> {
    let (encoded_payload, encoded_signature) =
        token.split_once('.').ok_or_else(|| GatewayError::Auth("malformed session token".to_owned()))?;

    let signature = URL_SAFE_NO_PAD
        .decode(encoded_signature)
        .map_err(|err| GatewayError::Auth(format!("bad token signature encoding: {err}")))?;

    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret)
        .map_err(|_err| GatewayError::Auth("invalid session secret".to_owned()))?;
    mac.update(encoded_payload.as_bytes());
    mac.verify_slice(&signature).map_err(|_err| GatewayError::Auth("session token signature mismatch".to_owned()))?;

    let payload = URL_SAFE_NO_PAD
        .decode(encoded_payload)
        .map_err(|err| GatewayError::Auth(format!("bad token payload encoding: {err}")))?;
    serde_json::from_slice(&payload).map_err(|err| GatewayError::Auth(format!("bad token claims: {err}")))
}

fn sign(secret: &[u8], message: &[u8]) -> Result<String, GatewayError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret)
        .map_err(|_err| GatewayError::Auth("invalid session secret".to_owned()))?;
    mac.update(message);
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}
