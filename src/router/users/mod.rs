//! Users-related HTTP API.
mod delete;
mod follow;
mod get;
mod update;

use axum::routing::{delete, get, patch, post};
use axum::{Router, middleware};
use sqlx::SqliteConnection;

use crate::error::{Result, ServerError};
use crate::user::User;
use crate::{AppState, middleware::authenticate};

/// Routes readable by anyone.
pub fn public() -> Router<AppState> {
    Router::new()
        // `GET /users/{username}` goes to `get::profile`.
        .route("/{username}", get(get::profile))
        .route("/{username}/posts", get(get::posts))
        .route("/{username}/followers", get(get::followers))
        .route("/{username}/followed", get(get::followed))
}

/// Routes acting as the caller. Authorization required.
pub fn private(state: AppState) -> Router<AppState> {
    Router::new()
        // `PATCH /users/@me` goes to `update`.
        .route("/@me", patch(update::handler))
        // `DELETE /users/@me` goes to `delete`.
        .route("/@me", delete(delete::handler))
        .route("/{username}/follow", post(follow::follow))
        .route("/{username}/unfollow", post(follow::unfollow))
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}

/// Find `username` or answer 404.
async fn find(conn: &mut SqliteConnection, username: &str) -> Result<User> {
    User::find_by_username(conn, username)
        .await?
        .ok_or(ServerError::UserNotFound)
}
