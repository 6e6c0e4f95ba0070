//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from library data

use chrono::{DateTime, Utc};
use serde::Serialize;
use shellac_library::{SessionData, SongData, UserData};
use utoipa::ToSchema;

/// The public shape of an account. The password hash never leaves the
/// library crate.
#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    id: i32,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResult {
    token: String,
    user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Song {
    id: i32,
    title: String,
    artist: String,
    duration: Option<i32>,
    user_id: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Confirmation {
    message: String,
}

impl Confirmation {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            user: self.user.to_serialized(),
        }
    }
}

impl ToSerialized<Song> for SongData {
    fn to_serialized(&self) -> Song {
        Song {
            id: self.id,
            title: self.title.clone(),
            artist: self.artist.clone(),
            duration: self.duration,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn login_results_never_contain_the_password_hash() {
        let session = SessionData {
            token: "some-token".to_string(),
            user: UserData {
                id: 1,
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "$argon2id$v=19$...".to_string(),
                created_at: Utc::now(),
            },
        };

        let serialized = serde_json::to_value(session.to_serialized()).unwrap();

        assert_eq!(serialized["token"], "some-token");
        assert_eq!(serialized["user"]["username"], "alice");
        assert!(serialized["user"].get("password").is_none());
    }
}
