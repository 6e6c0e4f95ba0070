use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterSchema {
    #[validate(length(min = 2, max = 128))]
    pub username: String,
    #[validate(email, length(max = 128))]
    pub email: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(length(min = 1, max = 128))]
    pub username_or_email: String,
    #[validate(length(max = 64))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewSongSchema {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1, max = 256))]
    pub artist: String,
    /// Length of the song in seconds
    #[validate(range(min = 1))]
    pub duration: Option<i32>,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "JSON parse failed"))?;

        extracted_json
            .0
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body is invalid"))?;

        Ok(Self(extracted_json.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_schema_requires_sane_fields() {
        let valid = RegisterSchema {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "a decent password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterSchema {
            email: "not-an-email".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterSchema {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn songs_require_title_and_artist() {
        let missing_artist = NewSongSchema {
            title: "X".to_string(),
            artist: "".to_string(),
            duration: None,
        };
        assert!(missing_artist.validate().is_err());

        let complete = NewSongSchema {
            title: "X".to_string(),
            artist: "Y".to_string(),
            duration: Some(245),
        };
        assert!(complete.validate().is_ok());
    }

    #[test]
    fn login_body_is_camel_cased() {
        let body: LoginSchema =
            serde_json::from_str(r#"{"usernameOrEmail": "alice", "password": "pw123456"}"#)
                .unwrap();

        assert_eq!(body.username_or_email, "alice");
    }
}
