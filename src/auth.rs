use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use chrono::{Duration, Utc};
use sqlx::FromRow;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{session::Session, user::User},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "trip_planner_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

/// The session user, if the request carries a live session cookie.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };
        Ok(Self(load_session(state, cookie.value()).await?))
    }
}

impl CurrentUser {
    pub fn require_user(&self) -> Result<&AuthenticatedUser, AppError> {
        self.0.as_ref().ok_or(AppError::Unauthorized)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Other(anyhow::anyhow!("password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| AppError::Other(anyhow::anyhow!("stored hash is malformed: {err}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AppError::Other(anyhow::anyhow!(
            "password verification failed: {err}"
        ))),
    }
}

pub async fn register_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let password_hash = hash_password(password)?;
    let id = sqlx::query(
        "INSERT INTO users (username, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    info!(user_id = id, username, "user registered");
    Ok(AuthenticatedUser {
        id,
        username: username.to_string(),
    })
}

pub async fn authenticate_user(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let user: Option<User> = sqlx::query_as(
        "SELECT user_id, username, email, password, created_at FROM users WHERE email = ?1",
    )
    .bind(email)
    .fetch_optional(&state.db)
    .await?;

    let Some(user) = user else {
        debug!(email, "login for unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(password, &user.password_hash)? {
        debug!(user_id = user.user_id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = user.user_id, username = %user.username, "user logged in");
    Ok(AuthenticatedUser {
        id: user.user_id,
        username: user.username,
    })
}

pub async fn create_session(state: &AppState, user_id: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let session = Session {
        id: Uuid::new_v4().to_string(),
        user_id,
        created_at: now,
        last_seen_at: now,
        expires_at: Some(now + Duration::hours(state.config.session_ttl_hours)),
    };
    sqlx::query(
        "INSERT INTO sessions (id, user_id, created_at, last_seen_at, expires_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&session.id)
    .bind(session.user_id)
    .bind(session.created_at)
    .bind(session.last_seen_at)
    .bind(session.expires_at)
    .execute(&state.db)
    .await?;
    Ok(session.id)
}

#[derive(FromRow)]
struct SessionRow {
    #[sqlx(flatten)]
    session: Session,
    username: String,
}

pub async fn load_session(
    state: &AppState,
    session_id: &str,
) -> Result<Option<AuthenticatedUser>, AppError> {
    let row: Option<SessionRow> = sqlx::query_as(
        r#"SELECT s.id, s.user_id, s.created_at, s.last_seen_at, s.expires_at, u.username
           FROM sessions s JOIN users u ON u.user_id = s.user_id
           WHERE s.id = ?1"#,
    )
    .bind(session_id)
    .fetch_optional(&state.db)
    .await?;

    let Some(SessionRow { session, username }) = row else {
        return Ok(None);
    };
    let now = Utc::now();
    if session.is_expired(now) {
        destroy_session(state, &session.id).await?;
        return Ok(None);
    }

    sqlx::query("UPDATE sessions SET last_seen_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(&session.id)
        .execute(&state.db)
        .await?;

    Ok(Some(AuthenticatedUser {
        id: session.user_id,
        username,
    }))
}

pub async fn destroy_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?1")
        .bind(session_id)
        .execute(&state.db)
        .await?;
    Ok(())
}

/// Deletes every session whose expiry has passed. Returns the number removed.
pub async fn prune_expired_sessions(state: &AppState) -> Result<u64, AppError> {
    let removed = sqlx::query("DELETE FROM sessions WHERE expires_at IS NOT NULL AND expires_at <= ?1")
        .bind(Utc::now())
        .execute(&state.db)
        .await?
        .rows_affected();
    if removed > 0 {
        debug!(removed, "pruned expired sessions");
    }
    Ok(removed)
}

pub fn apply_session_cookie(jar: PrivateCookieJar, session_id: &str) -> PrivateCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, session_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
