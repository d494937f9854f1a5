use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::warn;

use crate::{auth, error::AppError, extract::JsonOrForm, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login_submit))
        .route("/signup", get(signup_form).post(signup_submit))
        .route("/logout", get(logout))
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate;

async fn login_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(LoginTemplate)
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

async fn login_submit(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    JsonOrForm(form): JsonOrForm<LoginForm>,
) -> Result<Response, AppError> {
    let user = auth::authenticate_user(&state, &form.email, &form.password).await?;
    if let Some(previous) = jar.get(auth::SESSION_COOKIE) {
        auth::destroy_session(&state, previous.value()).await?;
    }
    auth::prune_expired_sessions(&state).await?;
    let session_id = auth::create_session(&state, user.id).await?;
    Ok((
        auth::apply_session_cookie(jar, &session_id),
        Redirect::to("/startplanning"),
    )
        .into_response())
}

#[derive(Template)]
#[template(path = "signup.html")]
struct SignupTemplate;

async fn signup_form() -> impl IntoResponse {
    AskamaTemplateResponse::into_response(SignupTemplate)
}

#[derive(Deserialize)]
struct SignupForm {
    username: String,
    email: String,
    password: String,
}

async fn signup_submit(
    State(state): State<AppState>,
    JsonOrForm(form): JsonOrForm<SignupForm>,
) -> Result<Redirect, AppError> {
    if let Err(err) = auth::register_user(&state, &form.username, &form.email, &form.password).await {
        warn!(email = %form.email, "signup rejected: {err}");
        return Err(err);
    }
    Ok(Redirect::to("/login"))
}

async fn logout(State(state): State<AppState>, jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    if let Some(cookie) = jar.get(auth::SESSION_COOKIE) {
        // The cookie is cleared even when the row cannot be deleted.
        if let Err(err) = auth::destroy_session(&state, cookie.value()).await {
            warn!(error = ?err, "failed to delete session on logout");
        }
    }
    (auth::clear_session_cookie(jar), Redirect::to("/"))
}
