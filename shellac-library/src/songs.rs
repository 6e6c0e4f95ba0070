use std::sync::Arc;

use crate::{Database, DatabaseError, NewSong, PrimaryKey, SongData};

/// Manages the per-user song shelves.
///
/// Every operation takes the owner as part of the lookup, so one user's
/// songs are invisible to every other user, no matter what ids are passed.
pub struct SongManager<Db> {
    db: Arc<Db>,
}

impl<Db> SongManager<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Returns the songs on a user's shelf, newest first
    pub async fn list(&self, user_id: PrimaryKey) -> Result<Vec<SongData>, DatabaseError> {
        self.db.list_songs(user_id).await
    }

    /// Adds a song to a user's shelf
    pub async fn add(&self, new_song: NewSong) -> Result<SongData, DatabaseError> {
        self.db.create_song(new_song).await
    }

    /// Removes a song from a user's shelf.
    ///
    /// A song owned by someone else fails with the same error as a song
    /// that doesn't exist at all.
    pub async fn remove(
        &self,
        user_id: PrimaryKey,
        song_id: PrimaryKey,
    ) -> Result<(), DatabaseError> {
        self.db.delete_song(user_id, song_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDatabase;

    fn songs(db: &Arc<MemoryDatabase>) -> SongManager<MemoryDatabase> {
        SongManager::new(db)
    }

    fn new_song(title: &str, user_id: PrimaryKey) -> NewSong {
        NewSong {
            title: title.to_string(),
            artist: "Some Artist".to_string(),
            duration: Some(180),
            user_id,
        }
    }

    #[tokio::test]
    async fn shelves_are_isolated_per_user() {
        let db = Arc::new(MemoryDatabase::default());
        let songs = songs(&db);

        songs.add(new_song("Mine", 1)).await.unwrap();
        songs.add(new_song("Theirs", 2)).await.unwrap();

        let mine = songs.list(1).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Mine");
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let db = Arc::new(MemoryDatabase::default());
        let songs = songs(&db);

        songs.add(new_song("First", 1)).await.unwrap();
        songs.add(new_song("Second", 1)).await.unwrap();
        songs.add(new_song("Third", 1)).await.unwrap();

        let titles: Vec<_> = songs
            .list(1)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();

        assert_eq!(titles, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn removing_anothers_song_is_not_found() {
        let db = Arc::new(MemoryDatabase::default());
        let songs = songs(&db);

        let theirs = songs.add(new_song("Theirs", 2)).await.unwrap();
        let result = songs.remove(1, theirs.id).await;

        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));

        // Still on the owner's shelf
        assert_eq!(songs.list(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn owners_can_remove_their_songs() {
        let db = Arc::new(MemoryDatabase::default());
        let songs = songs(&db);

        let song = songs.add(new_song("Mine", 1)).await.unwrap();
        songs.remove(1, song.id).await.unwrap();

        assert!(songs.list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removing_a_missing_song_is_not_found() {
        let db = Arc::new(MemoryDatabase::default());
        let songs = songs(&db);

        let result = songs.remove(1, 999).await;

        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
