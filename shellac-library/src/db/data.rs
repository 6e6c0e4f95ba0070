use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// A shellac account
#[derive(Debug, Clone, FromRow)]
pub struct UserData {
    pub id: PrimaryKey,
    pub username: String,
    pub email: String,
    /// The argon2 hash of the account password
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// A song on a user's shelf
#[derive(Debug, Clone, FromRow)]
pub struct SongData {
    pub id: PrimaryKey,
    pub title: String,
    pub artist: String,
    /// Length of the song in seconds, if known
    pub duration: Option<i32>,
    /// The user that owns this song
    pub user_id: PrimaryKey,
    pub created_at: DateTime<Utc>,
}
