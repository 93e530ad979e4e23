//! Login and logout

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::FormErrors, AppState};

use super::{session_cookie, CurrentSession};

/// Shown when the credentials do not match an active account
pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Where to go after logging in
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login form as submitted
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: String,
}

/// Login page; the password is never echoed back
#[derive(Serialize, ToSchema)]
pub struct LoginContext {
    pub username: String,
    pub next: String,
    /// Field errors; `__all__` holds errors not tied to one field
    #[schema(value_type = Object)]
    pub errors: FormErrors,
}

/// Local paths only, so the login page cannot bounce visitors off-site
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

/// Login form
#[utoipa::path(
    get,
    path = "/accounts/login/",
    tag = "accounts",
    params(NextQuery),
    responses(
        (status = 200, description = "Login form", body = LoginContext)
    )
)]
pub async fn login_form(Query(query): Query<NextQuery>) -> Json<LoginContext> {
    Json(LoginContext {
        username: String::new(),
        next: query.next.unwrap_or_default(),
        errors: FormErrors::default(),
    })
}

/// Log in and start an authenticated session
#[utoipa::path(
    post,
    path = "/accounts/login/",
    tag = "accounts",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirect to next"),
        (status = 200, description = "Login form with errors", body = LoginContext)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    session: CurrentSession,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let user = state
        .services
        .auth
        .authenticate(&form.username, &form.password)
        .await?;

    let Some(user) = user else {
        tracing::info!("Failed login attempt for {}", form.username.trim());
        let mut errors = FormErrors::default();
        errors.add("__all__", INVALID_LOGIN);
        return Ok(Json(LoginContext {
            username: form.username,
            next: form.next,
            errors,
        })
        .into_response());
    };

    let key = state
        .services
        .sessions
        .login(session.key.as_deref(), session.data, user.id)
        .await?;
    tracing::info!("User {} logged in", user.id);

    let jar = jar.add(session_cookie(&state.config.session, key));
    Ok((jar, Redirect::to(safe_next(&form.next))).into_response())
}

/// Log out and forget the session
#[utoipa::path(
    post,
    path = "/accounts/logout/",
    tag = "accounts",
    responses(
        (status = 303, description = "Logged out, redirect to the home page")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    session: CurrentSession,
) -> AppResult<(CookieJar, Redirect)> {
    if let Some(key) = session.key.as_deref() {
        state.services.sessions.flush(key).await?;
    }
    if let Some(user_id) = session.data.user_id {
        tracing::info!("User {} logged out", user_id);
    }

    let removal = Cookie::build(state.config.session.cookie_name.clone()).path("/");
    Ok((jar.remove(removal), Redirect::to("/")))
}
