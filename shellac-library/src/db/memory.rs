use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::{Database, DatabaseError, NewSong, NewUser, PrimaryKey, Result, SongData, UserData};

/// An in-memory database implementation, backing the tests
#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    users: Vec<UserData>,
    songs: Vec<SongData>,
    last_user_id: PrimaryKey,
    last_song_id: PrimaryKey,
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })
    }

    async fn user_by_identifier(&self, identifier: &str) -> Result<UserData> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "identifier",
            })
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let mut state = self.state.lock();

        // Mirrors the unique constraints on the users table. The single lock
        // makes the check and the insert one atomic step.
        let conflict = state.users.iter().find_map(|u| {
            if u.username == new_user.username {
                Some(("username", u.username.clone()))
            } else if u.email == new_user.email {
                Some(("email", u.email.clone()))
            } else {
                None
            }
        });

        if let Some((field, value)) = conflict {
            return Err(DatabaseError::Conflict {
                resource: "user",
                field,
                value,
            });
        }

        state.last_user_id += 1;

        let user = UserData {
            id: state.last_user_id,
            username: new_user.username,
            email: new_user.email,
            password: new_user.password,
            created_at: Utc::now(),
        };

        state.users.push(user.clone());

        Ok(user)
    }

    async fn list_songs(&self, user_id: PrimaryKey) -> Result<Vec<SongData>> {
        let mut songs: Vec<_> = self
            .state
            .lock()
            .songs
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();

        songs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(songs)
    }

    async fn create_song(&self, new_song: NewSong) -> Result<SongData> {
        let mut state = self.state.lock();

        state.last_song_id += 1;

        let song = SongData {
            id: state.last_song_id,
            title: new_song.title,
            artist: new_song.artist,
            duration: new_song.duration,
            user_id: new_song.user_id,
            created_at: Utc::now(),
        };

        state.songs.push(song.clone());

        Ok(song)
    }

    async fn delete_song(&self, user_id: PrimaryKey, song_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        let index = state
            .songs
            .iter()
            .position(|s| s.id == song_id && s.user_id == user_id)
            .ok_or(DatabaseError::NotFound {
                resource: "song",
                identifier: "id",
            })?;

        state.songs.remove(index);

        Ok(())
    }
}

#[cfg(test)]
impl MemoryDatabase {
    /// Removes a user out-of-band, to exercise tokens that outlive their user
    pub fn remove_user(&self, user_id: PrimaryKey) {
        self.state.lock().users.retain(|u| u.id != user_id);
    }
}
