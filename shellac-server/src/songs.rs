use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, post},
    Json,
};
use shellac_library::{NewSong, PrimaryKey};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewSongSchema, ValidatedJson},
    serialized::{Confirmation, Song, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/songs",
    tag = "songs",
    security(("BearerAuth" = [])),
    responses((status = 200, body = Vec<Song>))
)]
async fn list_songs(session: Session, context: ServerContext) -> ServerResult<Json<Vec<Song>>> {
    let songs = context.library.songs.list(session.user().id).await?;

    Ok(Json(songs.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/songs",
    tag = "songs",
    request_body = NewSongSchema,
    security(("BearerAuth" = [])),
    responses(
        (status = 201, body = Song),
        (status = 400, description = "Title or artist is missing")
    )
)]
async fn add_song(
    session: Session,
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<NewSongSchema>,
) -> ServerResult<(StatusCode, Json<Song>)> {
    let song = context
        .library
        .songs
        .add(NewSong {
            title: body.title,
            artist: body.artist,
            duration: body.duration,
            user_id: session.user().id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(song.to_serialized())))
}

#[utoipa::path(
    delete,
    path = "/v1/songs/{id}",
    tag = "songs",
    security(("BearerAuth" = [])),
    responses(
        (status = 200, body = Confirmation),
        (status = 404, description = "No such song on the caller's shelf")
    )
)]
async fn remove_song(
    session: Session,
    context: ServerContext,
    Path(song_id): Path<PrimaryKey>,
) -> ServerResult<Json<Confirmation>> {
    context
        .library
        .songs
        .remove(session.user().id, song_id)
        .await?;

    Ok(Json(Confirmation::new("Song deleted successfully")))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_songs))
        .route("/", post(add_song))
        .route("/:id", delete(remove_song))
}
