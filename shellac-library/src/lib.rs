mod auth;
mod db;
mod songs;
mod token;

use std::sync::Arc;

pub use auth::*;
pub use db::*;
pub use songs::*;
pub use token::*;

/// The shellac library system, facilitating accounts, authentication, and
/// the per-user song shelves.
pub struct Library<Db> {
    pub auth: Auth<Db>,
    pub songs: SongManager<Db>,
}

impl<Db> Library<Db>
where
    Db: Database,
{
    pub fn new(database: Db, tokens: TokenCodec) -> Self {
        let database = Arc::new(database);

        Self {
            auth: Auth::new(&database, tokens),
            songs: SongManager::new(&database),
        }
    }
}

/// [Library] backed by the postgres database implementation
pub type PgLibrary = Library<PgDatabase>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn library() -> Library<MemoryDatabase> {
        Library::new(
            MemoryDatabase::default(),
            TokenCodec::new("test-secret", Duration::days(7)),
        )
    }

    async fn register(library: &Library<MemoryDatabase>, name: &str) -> SessionData {
        library
            .auth
            .register(NewRegistration {
                username: name.to_string(),
                email: format!("{}@example.com", name),
                password: "a decent password".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn two_users_cannot_touch_each_others_shelves() {
        let library = library();

        let alice = register(&library, "alice").await;
        let bob = register(&library, "bob").await;

        let song = library
            .songs
            .add(NewSong {
                title: "X".to_string(),
                artist: "Y".to_string(),
                duration: None,
                user_id: alice.user.id,
            })
            .await
            .unwrap();

        assert_eq!(song.user_id, alice.user.id);

        // Bob's shelf doesn't show it, and he can't delete it
        assert!(library.songs.list(bob.user.id).await.unwrap().is_empty());
        assert!(matches!(
            library.songs.remove(bob.user.id, song.id).await,
            Err(DatabaseError::NotFound { .. })
        ));

        // Alice still can
        library.songs.remove(alice.user.id, song.id).await.unwrap();
        assert!(library.songs.list(alice.user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_round_trip_through_the_facade() {
        let library = library();

        let alice = register(&library, "alice").await;

        let session = library
            .auth
            .login(Credentials {
                identifier: "alice".to_string(),
                password: "a decent password".to_string(),
            })
            .await
            .unwrap();

        let resolved = library.auth.session(&session.token).await.unwrap();
        assert_eq!(resolved.user.id, alice.user.id);
    }
}
