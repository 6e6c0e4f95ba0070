use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Error as SqlxError, PgPool};

use crate::{
    Database, DatabaseError, IntoDatabaseError, NewSong, NewUser, PrimaryKey, Result, SongData,
    UserData,
};

/// A postgres database implementation for shellac
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        sqlx::query_as::<_, UserData>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))
    }

    async fn user_by_identifier(&self, identifier: &str) -> Result<UserData> {
        sqlx::query_as::<_, UserData>("SELECT * FROM users WHERE username = $1 OR email = $1")
            .bind(identifier)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "identifier"))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        sqlx::query_as::<_, UserData>(
            "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The violated constraint decides which field conflicted
            let field = match e.as_database_error().and_then(|d| d.constraint()) {
                Some("users_email_key") => "email",
                _ => "username",
            };

            let value = if field == "email" {
                &new_user.email
            } else {
                &new_user.username
            };

            e.conflict_or("user", field, value)
        })
    }

    async fn list_songs(&self, user_id: PrimaryKey) -> Result<Vec<SongData>> {
        sqlx::query_as::<_, SongData>(
            "SELECT * FROM songs WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn create_song(&self, new_song: NewSong) -> Result<SongData> {
        sqlx::query_as::<_, SongData>(
            "INSERT INTO songs (title, artist, duration, user_id) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&new_song.title)
        .bind(&new_song.artist)
        .bind(new_song.duration)
        .bind(new_song.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn delete_song(&self, user_id: PrimaryKey, song_id: PrimaryKey) -> Result<()> {
        // Both the id and the owner are part of the filter, so a song owned
        // by someone else is indistinguishable from one that doesn't exist
        let result = sqlx::query("DELETE FROM songs WHERE id = $1 AND user_id = $2")
            .bind(song_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                resource: "song",
                identifier: "id",
            });
        }

        Ok(())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }

    fn conflict_or(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> DatabaseError {
        let is_unique_violation = self
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation());

        if is_unique_violation {
            DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }
        } else {
            self.any()
        }
    }
}
