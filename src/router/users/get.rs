//! Get a profile and its listings.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::find;
use crate::follow::Relation;
use crate::pagination::{Page, PageQuery};
use crate::post::Post;
use crate::{AppState, ServerError};

const AVATAR_SIZE: u32 = 128;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub about_me: Option<String>,
    pub last_seen: DateTime<Utc>,
    pub avatar: String,
    pub followers: i64,
    pub followed: i64,
}

pub async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Profile>, ServerError> {
    let mut conn = state.db.acquire().await?;
    let user = find(&mut conn, &username).await?;

    Ok(Json(Profile {
        avatar: user.avatar(&state.avatar, AVATAR_SIZE),
        followers: user.follower_count(&mut conn).await?,
        followed: user.followed_count(&mut conn).await?,
        id: user.id,
        username: user.username,
        about_me: user.about_me,
        last_seen: user.last_seen,
    }))
}

pub async fn posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
    query: PageQuery,
) -> Result<Json<Page<Post>>, ServerError> {
    let mut conn = state.db.acquire().await?;
    let user = find(&mut conn, &username).await?;

    let page = Post::by_author(
        &mut conn,
        user.id,
        query.page(),
        state.config.posts_per_page,
    )
    .await?;
    Ok(Json(page))
}

pub async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    query: PageQuery,
) -> Result<Json<Page<Relation>>, ServerError> {
    let mut conn = state.db.acquire().await?;
    let user = find(&mut conn, &username).await?;

    let page = user
        .followers(&mut conn, query.page(), state.config.posts_per_page)
        .await?;
    Ok(Json(page))
}

pub async fn followed(
    State(state): State<AppState>,
    Path(username): Path<String>,
    query: PageQuery,
) -> Result<Json<Page<Relation>>, ServerError> {
    let mut conn = state.db.acquire().await?;
    let user = find(&mut conn, &username).await?;

    let page = user
        .followed(&mut conn, query.page(), state.config.posts_per_page)
        .await?;
    Ok(Json(page))
}
