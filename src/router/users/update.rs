//! Update caller profile and password.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::router::{Valid, validate_username};
use crate::user::User;
use crate::{AppState, ServerError};

#[derive(Debug, Default, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(
        length(min = 1, max = 64, message = "Username must be 1 to 64 characters long."),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,
    #[validate(length(max = 140, message = "About me must be at most 140 characters long."))]
    pub about_me: Option<String>,
    /// Current password, required to set `new_password`.
    pub password: Option<String>,
    #[validate(length(min = 1, message = "Password is required."))]
    pub new_password: Option<String>,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(mut user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<Json<User>, ServerError> {
    let mut tx = state.db.begin().await?;
    let mut errors = ValidationErrors::new();

    if let Some(username) = body.username {
        if username != user.username {
            if User::username_exists(&mut tx, &username).await? {
                errors.add(
                    "username",
                    ValidationError::new("taken")
                        .with_message("Please use a different username.".into()),
                );
            } else {
                user.username = username;
            }
        }
    }

    if let Some(about_me) = body.about_me {
        user.about_me = Some(about_me).filter(|s| !s.trim().is_empty());
    }

    let mut password_changed = false;
    match (body.password, body.new_password) {
        (Some(current), Some(new)) => {
            if user.validate_password(&state.pwd, &current) {
                user.set_password(&state.pwd, &new)?;
                password_changed = true;
            } else {
                errors.add(
                    "password",
                    ValidationError::new("pwd")
                        .with_message("Invalid password.".into()),
                );
            }
        },
        (None, Some(_)) => errors.add(
            "password",
            ValidationError::new("pwd")
                .with_message("Missing 'password' field.".into()),
        ),
        (Some(_), None) => errors.add(
            "new_password",
            ValidationError::new("pwd")
                .with_message("Missing 'new_password' field.".into()),
        ),
        (None, None) => (),
    }

    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    user.update_profile(&mut tx).await?;
    if password_changed {
        user.update_password(&mut tx).await?;
    }
    tx.commit().await?;

    Ok(Json(user))
}
