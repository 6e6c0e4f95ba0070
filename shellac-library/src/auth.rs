use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use log::debug;
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;

use crate::{Database, DatabaseError, NewUser, PrimaryKey, TokenCodec, TokenError, UserData};

/// The credential store and login flow of shellac.
///
/// Passwords only ever exist in plaintext between the incoming request and
/// the hashing below. Everything downstream of here sees the hash.
pub struct Auth<Db> {
    db: Arc<Db>,
    argon: Argon2<'static>,
    tokens: TokenCodec,
    /// Verified against when an identifier matches no user, so that branch
    /// costs the same as a wrong password
    placeholder_hash: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Another account already uses this username or email
    #[error("An account with this {field} already exists")]
    DuplicateCredential { field: &'static str },
    /// The token was valid, but its user no longer exists
    #[error("Unknown subject")]
    UnknownSubject,
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    const PLACEHOLDER_PASSWORD: &'static str = "placeholder-password";

    pub fn new(db: &Arc<Db>, tokens: TokenCodec) -> Self {
        let argon = Argon2::default();

        let salt = SaltString::generate(&mut OsRng);
        let placeholder_hash = argon
            .hash_password(Self::PLACEHOLDER_PASSWORD.as_bytes(), &salt)
            .expect("placeholder hash is computed")
            .to_string();

        Self {
            db: db.clone(),
            argon,
            tokens,
            placeholder_hash,
        }
    }

    /// Registers a new account, returning a logged in session for it
    pub async fn register(&self, new_user: NewRegistration) -> Result<SessionData, AuthError> {
        let hashed_password = self.hash_password(&new_user.password)?;

        let user = self
            .db
            .create_user(NewUser {
                username: normalize(&new_user.username),
                email: normalize(&new_user.email),
                password: hashed_password,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict { field, .. } => {
                    debug!("Registration conflict on {}", field);
                    AuthError::DuplicateCredential { field }
                }
                err => AuthError::Db(err),
            })?;

        self.issue_session(user)
    }

    /// Logs in a user, returning a new session
    pub async fn login(&self, credentials: Credentials) -> Result<SessionData, AuthError> {
        let identifier = normalize(&credentials.identifier);

        let user = match self.db.user_by_identifier(&identifier).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound { .. }) => {
                // Burn a verification anyway, so an unknown identifier takes
                // as long as a wrong password
                let _ = self.verify_password(&self.placeholder_hash, &credentials.password);
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(AuthError::Db(e)),
        };

        if !self.verify_password(&user.password, &credentials.password)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(user)
    }

    /// Resolves the session a token belongs to, if the token is valid.
    ///
    /// A cryptographically valid token whose user has since disappeared is
    /// still rejected. Token validity doesn't imply the subject exists.
    pub async fn session(&self, token: &str) -> Result<SessionData, AuthError> {
        let user_id: PrimaryKey = self.tokens.verify(token)?;

        let user = self.db.user_by_id(user_id).await.map_err(|e| match e {
            DatabaseError::NotFound { .. } => AuthError::UnknownSubject,
            err => AuthError::Db(err),
        })?;

        Ok(SessionData {
            token: token.to_string(),
            user,
        })
    }

    fn issue_session(&self, user: UserData) -> Result<SessionData, AuthError> {
        let token = self.tokens.issue(user.id)?;

        Ok(SessionData { token, user })
    }

    fn hash_password(&self, raw: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hashed = self
            .argon
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        Ok(hashed)
    }

    fn verify_password(&self, stored: &str, incoming: &str) -> Result<bool, AuthError> {
        let stored_password = PasswordHash::parse(stored, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        Ok(self
            .argon
            .verify_password(incoming.as_bytes(), &stored_password)
            .is_ok())
    }
}

/// The fixed case policy: usernames, emails, and login identifiers are
/// compared and stored in this form
fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A logged in user, along with the token that authenticates them
#[derive(Debug)]
pub struct SessionData {
    pub token: String,
    pub user: UserData,
}

#[derive(Debug)]
pub struct Credentials {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
}
