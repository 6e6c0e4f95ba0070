use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PrimaryKey;

/// Issues and verifies the signed bearer tokens that act as login sessions.
///
/// A token is valid as long as its signature matches the configured secret
/// and it hasn't passed its expiry. Nothing is stored server side, so
/// rotating the secret invalidates every previously issued token at once.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// The token was well-formed, but is past its expiry
    #[error("Token has expired")]
    Expired,
    /// The signature doesn't match the current secret
    #[error("Token signature is invalid")]
    Invalid,
    /// The token couldn't be parsed at all
    #[error("Token is malformed")]
    Malformed,
    #[error("SigningError: {0}")]
    Signing(String),
}

/// The payload encoded into every token
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// The id of the user the token was issued for
    sub: String,
    /// When the token was issued, as a unix timestamp
    iat: i64,
    /// When the token expires, as a unix timestamp
    exp: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, validity: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            validity,
        }
    }

    /// Issues a new token for a user, expiring after the validity window
    pub fn issue(&self, user_id: PrimaryKey) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(
        &self,
        user_id: PrimaryKey,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = issued_at + self.validity;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies a token, returning the id of the user it was issued for
    pub fn verify(&self, token: &str) -> Result<PrimaryKey, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::Invalid,
                    ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_)
                    | ErrorKind::InvalidToken => TokenError::Malformed,
                    _ => TokenError::Invalid,
                }
            })?;

        data.claims.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(secret, Duration::days(7))
    }

    /// Flips a character in the middle of the signature segment
    fn tamper(token: &str) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let signature = parts.last_mut().unwrap();

        let mut bytes = signature.clone().into_bytes();
        let middle = bytes.len() / 2;
        bytes[middle] = if bytes[middle] == b'A' { b'B' } else { b'A' };

        *signature = String::from_utf8(bytes).unwrap();
        parts.join(".")
    }

    #[test]
    fn issued_tokens_verify() {
        let codec = codec("test-secret");
        let token = codec.issue(42).unwrap();

        assert_eq!(codec.verify(&token).unwrap(), 42);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let codec = codec("test-secret");
        let token = codec.issue_at(42, Utc::now() - Duration::days(8)).unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn tampered_signatures_are_rejected() {
        let codec = codec("test-secret");
        let token = codec.issue(42).unwrap();

        assert!(matches!(
            codec.verify(&tamper(&token)),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn foreign_secrets_are_rejected() {
        let token = codec("test-secret").issue(42).unwrap();

        assert!(matches!(
            codec("other-secret").verify(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec("test-secret");

        assert!(matches!(
            codec.verify("not-a-token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            codec.verify("still.not.a-token"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn non_numeric_subjects_are_malformed() {
        let codec = codec("test-secret");

        let claims = Claims {
            sub: "not-a-user-id".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &codec.encoding).unwrap();

        assert!(matches!(
            codec.verify(&token),
            Err(TokenError::Malformed)
        ));
    }
}
