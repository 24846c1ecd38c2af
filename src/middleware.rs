//! Middlewares for routes.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::user::User;

const BEARER: &str = "Bearer ";

/// Resolve the `Authorization` bearer token into a [`User`] extension.
///
/// Refreshes `last_seen` of the caller.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix(BEARER))
        .ok_or(ServerError::Unauthorized)?;

    let user_id = state.token.decode(token)?.user_id()?;

    let mut conn = state.db.acquire().await?;
    let mut user = User::find_by_id(&mut conn, user_id)
        .await?
        .ok_or(ServerError::Unauthorized)?;
    user.touch(&mut conn).await?;
    drop(conn);

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
