use async_trait::async_trait;
use thiserror::Error;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type BoxedDatabase = Box<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    /// Turns a unique constraint violation into a conflict error
    fn conflict_or(self, resource: &'static str, field: &'static str, value: &str)
        -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Represents a type that can fetch and store shellac data in a database
#[async_trait]
pub trait Database: Send + Sync {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData>;
    /// Returns the user matching the identifier by username or email
    async fn user_by_identifier(&self, identifier: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;

    /// Returns the songs owned by a user, newest first
    async fn list_songs(&self, user_id: PrimaryKey) -> Result<Vec<SongData>>;
    async fn create_song(&self, new_song: NewSong) -> Result<SongData>;
    /// Deletes a song, where the owner is part of the lookup filter
    async fn delete_song(&self, user_id: PrimaryKey, song_id: PrimaryKey) -> Result<()>;
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// The hash of the new user's password, never the plaintext
    pub password: String,
}

#[derive(Debug)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    /// Length of the song in seconds, if known
    pub duration: Option<i32>,
    /// The owner of the new song
    pub user_id: PrimaryKey,
}
