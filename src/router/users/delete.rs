//! Delete caller account with its posts and follow edges.

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::router::Valid;
use crate::user::User;
use crate::{AppState, ServerError};

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<StatusCode, ServerError> {
    if !user.validate_password(&state.pwd, &body.password) {
        return Err(ServerError::InvalidCredentials);
    }

    let mut tx = state.db.begin().await?;
    let user_id = user.id;
    user.delete(&mut tx).await?;
    tx.commit().await?;

    tracing::info!(user_id, "user deleted");

    Ok(StatusCode::NO_CONTENT)
}
