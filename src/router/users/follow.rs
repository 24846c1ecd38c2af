//! Follow and unfollow another user.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::find;
use crate::telemetry::FOLLOWS;
use crate::user::User;
use crate::{AppState, ServerError};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub username: String,
    pub following: bool,
}

pub async fn follow(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(username): Path<String>,
) -> Result<Json<Response>, ServerError> {
    let mut tx = state.db.begin().await?;
    let target = find(&mut tx, &username).await?;
    if target.id == user.id {
        return Err(ServerError::SelfFollow);
    }

    if user.follow(&mut tx, &target).await? {
        tx.commit().await?;
        metrics::counter!(FOLLOWS).increment(1);
    }

    Ok(Json(Response {
        username: target.username,
        following: true,
    }))
}

pub async fn unfollow(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(username): Path<String>,
) -> Result<Json<Response>, ServerError> {
    let mut tx = state.db.begin().await?;
    let target = find(&mut tx, &username).await?;
    if target.id == user.id {
        return Err(ServerError::SelfFollow);
    }

    if user.unfollow(&mut tx, &target).await? {
        tx.commit().await?;
    }

    Ok(Json(Response {
        username: target.username,
        following: false,
    }))
}
