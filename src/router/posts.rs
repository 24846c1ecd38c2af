//! Write posts and browse every post.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pagination::{Page, PageQuery};
use crate::post::{NewPost, Post};
use crate::router::Valid;
use crate::telemetry::POSTS_CREATED;
use crate::user::User;
use crate::{AppState, ServerError};

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(min = 1, max = 140, message = "Post must be 1 to 140 characters long."))]
    pub body: String,
}

/// Publish a post as the caller.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Post>), ServerError> {
    let draft = NewPost::new(user.id, body.body);

    let mut tx = state.db.begin().await?;
    let post = draft.insert(&mut tx).await?;
    tx.commit().await?;

    metrics::counter!(POSTS_CREATED).increment(1);

    Ok((StatusCode::CREATED, Json(post)))
}

/// Every post, newest first.
pub async fn explore(
    State(state): State<AppState>,
    query: PageQuery,
) -> Result<Json<Page<Post>>, ServerError> {
    let mut conn = state.db.acquire().await?;
    let page =
        Post::explore(&mut conn, query.page(), state.config.posts_per_page).await?;

    Ok(Json(page))
}
