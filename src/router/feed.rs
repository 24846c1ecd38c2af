//! Timeline of the caller.

use axum::extract::State;
use axum::{Extension, Json};

use crate::pagination::{Page, PageQuery};
use crate::post::Post;
use crate::user::User;
use crate::{AppState, ServerError};

pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    query: PageQuery,
) -> Result<Json<Page<Post>>, ServerError> {
    let mut conn = state.db.acquire().await?;
    let page = user
        .followed_posts()
        .page(&mut conn, query.page(), state.config.posts_per_page)
        .await?;

    Ok(Json(page))
}
