//! Registration and login.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::router::{Valid, validate_username};
use crate::telemetry::USERS_REGISTERED;
use crate::token::EXPIRATION_TIME;
use crate::user::User;
use crate::{AppState, ServerError};

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct RegisterBody {
    #[validate(
        length(min = 1, max = 64, message = "Username must be 1 to 64 characters long."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(
        email(message = "Invalid email address."),
        length(max = 120, message = "Email must be at most 120 characters long.")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct LoginBody {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Create an account.
pub async fn register(
    State(state): State<AppState>,
    Valid(body): Valid<RegisterBody>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    let mut tx = state.db.begin().await?;

    let mut errors = ValidationErrors::new();
    if User::username_exists(&mut tx, &body.username).await? {
        errors.add(
            "username",
            ValidationError::new("taken")
                .with_message("Please use a different username.".into()),
        );
    }
    if User::email_exists(&mut tx, &body.email).await? {
        errors.add(
            "email",
            ValidationError::new("taken")
                .with_message("Please use a different email address.".into()),
        );
    }
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    let user = User::builder()
        .username(body.username)
        .email(body.email)
        .create(&mut tx, &state.pwd, &body.password)
        .await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    metrics::counter!(USERS_REGISTERED).increment(1);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange credentials for an access token.
pub async fn login(
    State(state): State<AppState>,
    Valid(body): Valid<LoginBody>,
) -> Result<Json<TokenResponse>, ServerError> {
    let mut conn = state.db.acquire().await?;

    let user = User::find_by_username(&mut conn, &body.username)
        .await?
        .filter(|user| user.validate_password(&state.pwd, &body.password))
        .ok_or(ServerError::InvalidCredentials)?;

    Ok(Json(TokenResponse {
        access_token: state.token.create(user.id)?,
        token_type: "Bearer".to_owned(),
        expires_in: EXPIRATION_TIME,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::SqlitePool;

    use super::*;
    use crate::*;

    fn jane() -> String {
        json!({
            "username": "jane",
            "email": "jane@email.com",
            "password": "StRong_PaÂ§$W0rD",
        })
        .to_string()
    }

    #[sqlx::test]
    async fn test_register_handler(pool: SqlitePool) {
        let state = test_state(pool);
        let app = app(state.clone());

        let response = make_request(app, Method::POST, "/auth/register", None, jane()).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["username"], "jane");
        assert!(body.get("email").is_none());
        assert!(body.get("password_hash").is_none());

        let mut conn = state.db.acquire().await.unwrap();
        let user = user::User::find_by_username(&mut conn, "jane")
            .await
            .unwrap()
            .unwrap();
        assert!(user.validate_password(&state.pwd, "StRong_PaÂ§$W0rD"));
    }

    #[sqlx::test]
    async fn test_register_taken(pool: SqlitePool) {
        let app = app(test_state(pool));

        let response = make_request(app.clone(), Method::POST, "/auth/register", None, jane()).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = make_request(app, Method::POST, "/auth/register", None, jane()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["errors"][0]["field"], "email");
        assert_eq!(body["errors"][1]["field"], "username");
        assert_eq!(body["errors"][1]["message"], "Please use a different username.");
    }

    #[sqlx::test]
    async fn test_register_invalid_body(pool: SqlitePool) {
        let app = app(test_state(pool));

        let body = json!({
            "username": "jane doe",
            "email": "not an email",
            "password": "secret",
        })
        .to_string();
        let response = make_request(app.clone(), Method::POST, "/auth/register", None, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = make_request(app, Method::POST, "/auth/register", None, "{}".into()).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test]
    async fn test_login_handler(pool: SqlitePool) {
        let state = test_state(pool);
        let app = app(state.clone());
        make_request(app.clone(), Method::POST, "/auth/register", None, jane()).await;

        let body = json!({ "username": "jane", "password": "StRong_PaÂ§$W0rD" }).to_string();
        let response = make_request(app.clone(), Method::POST, "/auth/login", None, body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: TokenResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.token_type, "Bearer");
        assert!(state.token.decode(&body.access_token).is_ok());

        let body = json!({ "username": "jane", "password": "wrong" }).to_string();
        let response = make_request(app.clone(), Method::POST, "/auth/login", None, body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json!({ "username": "nobody", "password": "wrong" }).to_string();
        let response = make_request(app, Method::POST, "/auth/login", None, body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
