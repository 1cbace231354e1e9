//! Credential issuer abstraction for atrium.
//!
//! The server never trusts a caller-supplied identity directly; it goes
//! through the [`CredentialIssuer`] trait: verify an identity assertion once,
//! mint a signed session token, verify that token on every privileged
//! operation. [`TokenSigner`] is the self-hosted implementation: Ed25519
//! signatures over base64url-encoded JSON claims.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verification failures. Callers treat all of these as "not authenticated";
/// the distinction exists for logs.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("wrong token kind")]
    WrongKind,
}

/// What a token may be used for.
///
/// An assertion proves a fresh authentication and is exchanged exactly once
/// for a session; the kind claim keeps one from standing in for the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Assertion,
    Session,
}

/// Signed claims embedded in a token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Principal identifier in the issuer's namespace.
    pub sub: String,
    pub email: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Verifies identity assertions and mints/verifies session tokens.
#[async_trait::async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Verify a client-supplied identity assertion.
    async fn verify_assertion(&self, token: &str) -> Result<Claims, IdentityError>;

    /// Mint a signed, time-bounded session token for an authenticated
    /// principal.
    async fn mint_session_token(
        &self,
        sub: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<String, IdentityError>;

    /// Verify a previously minted session token.
    async fn verify_session_token(&self, token: &str) -> Result<Claims, IdentityError>;
}

/// Self-hosted Ed25519 token signer.
///
/// Token format: `base64url(claims JSON) "." base64url(signature)`, signing
/// the encoded payload so verification needs no canonical JSON form.
pub struct TokenSigner {
    key: SigningKey,
}

impl TokenSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Build a signer from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&seed),
        }
    }

    /// Generate a signer with a fresh random key.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut rand_core::OsRng),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Mint an identity assertion. Assertions normally come from the identity
    /// provider after a login; this is the local issuance path (bootstrap
    /// tooling and tests).
    pub fn mint_assertion(&self, sub: &str, email: &str, ttl: Duration) -> String {
        self.sign_claims(sub, email, TokenKind::Assertion, ttl)
    }

    fn sign_claims(&self, sub: &str, email: &str, kind: TokenKind, ttl: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            email: email.to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).expect("claims serialize"));
        let signature = self.key.sign(payload.as_bytes());
        format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature.to_bytes()))
    }

    fn parse_and_verify(&self, token: &str, want: TokenKind) -> Result<Claims, IdentityError> {
        let (payload, signature_b64) = token.split_once('.').ok_or(IdentityError::Malformed)?;

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| IdentityError::Malformed)?;
        let signature =
            Signature::from_slice(&signature_bytes).map_err(|_| IdentityError::Malformed)?;
        self.key
            .verifying_key()
            .verify(payload.as_bytes(), &signature)
            .map_err(|_| IdentityError::BadSignature)?;

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| IdentityError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&claims_bytes).map_err(|_| IdentityError::Malformed)?;

        if claims.kind != want {
            return Err(IdentityError::WrongKind);
        }
        if claims.exp < Utc::now().timestamp() {
            return Err(IdentityError::Expired);
        }
        Ok(claims)
    }
}

#[async_trait::async_trait]
impl CredentialIssuer for TokenSigner {
    async fn verify_assertion(&self, token: &str) -> Result<Claims, IdentityError> {
        self.parse_and_verify(token, TokenKind::Assertion)
    }

    async fn mint_session_token(
        &self,
        sub: &str,
        email: &str,
        ttl: Duration,
    ) -> Result<String, IdentityError> {
        Ok(self.sign_claims(sub, email, TokenKind::Session, ttl))
    }

    async fn verify_session_token(&self, token: &str) -> Result<Claims, IdentityError> {
        self.parse_and_verify(token, TokenKind::Session)
    }
}
