use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    routing::{get, post},
    Json,
};
use log::{error, warn};
use shellac_library::{AuthError, Credentials, NewRegistration, SessionData, TokenError, UserData};

use crate::{
    context::ServerContext,
    errors::ServerResult,
    schemas::{LoginSchema, RegisterSchema, ValidatedJson},
    serialized::{LoginResult, ToSerialized, User},
    Router,
};

/// Wraps [SessionData] so [FromRequestParts] can be implemented for it
pub struct Session(SessionData);

impl Session {
    /// Returns the user of the session
    pub fn user(&self) -> UserData {
        self.0.user.clone()
    }
}

/// Pulls the token out of a `Bearer <token>` authorization header
fn bearer_token(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split_whitespace();

    let scheme = parts.next()?;
    let token = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return None;
    }

    Some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    ServerContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = ServerContext::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|x| x.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing authorization"))?;

        let token = bearer_token(header_value)
            .ok_or((StatusCode::UNAUTHORIZED, "Authorization must be Bearer"))?;

        // Every rejection looks the same to the client. The logs are the
        // only place that distinguishes why a token was refused.
        let session = match context.library.auth.session(token).await {
            Ok(session) => session,
            Err(AuthError::Db(e)) => {
                error!("Session lookup failed: {}", e);
                return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"));
            }
            Err(e) => {
                match &e {
                    AuthError::Token(TokenError::Expired) => warn!("Rejected expired token"),
                    AuthError::Token(TokenError::Malformed) => warn!("Rejected malformed token"),
                    AuthError::Token(_) => warn!("Rejected token with invalid signature"),
                    AuthError::UnknownSubject => {
                        warn!("Rejected token for a user that no longer exists")
                    }
                    other => warn!("Rejected session: {}", other),
                }

                return Err((StatusCode::UNAUTHORIZED, "Invalid or expired token"));
            }
        };

        Ok(Self(session))
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "auth",
    request_body = RegisterSchema,
    responses(
        (status = 201, body = LoginResult),
        (status = 400, description = "A field is invalid, or the username or email is already taken")
    )
)]
async fn register(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> ServerResult<(StatusCode, Json<LoginResult>)> {
    let session = context
        .library
        .auth
        .register(NewRegistration {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session.to_serialized())))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginSchema,
    responses(
        (status = 200, body = LoginResult),
        (status = 401, description = "Invalid credentials")
    )
)]
async fn login(
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> ServerResult<Json<LoginResult>> {
    let session = context
        .library
        .auth
        .login(Credentials {
            identifier: body.username_or_email,
            password: body.password,
        })
        .await?;

    Ok(Json(session.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/auth/user",
    tag = "auth",
    security(("BearerAuth" = [])),
    responses((status = 200, body = User))
)]
async fn user(session: Session) -> Json<User> {
    Json(session.user().to_serialized())
}

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/user", get(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_tokens_are_extracted() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("bearer abc123"), Some("abc123"));
    }

    #[test]
    fn other_header_shapes_are_refused() {
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer abc 123"), None);
        assert_eq!(bearer_token(""), None);
    }
}
