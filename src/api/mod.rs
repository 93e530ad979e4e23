//! HTTP handlers for the catalog site

pub mod accounts;
pub mod authors;
pub mod books;
pub mod health;
pub mod index;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::SessionConfig,
    error::AppError,
    models::{Identity, SessionData},
    AppState,
};

/// The visitor's session as found in the store.
///
/// `key` is `None` when the request carried no cookie, or one whose record
/// has expired; saving such a session issues a fresh key.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub key: Option<String>,
    pub data: SessionData,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<CurrentSession>() {
            return Ok(session.clone());
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let key = jar
            .get(&state.config.session.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|key| !key.is_empty());

        let session = match key {
            Some(key) => match state.services.sessions.load(&key).await? {
                Some(data) => CurrentSession {
                    key: Some(key),
                    data,
                },
                None => CurrentSession::default(),
            },
            None => CurrentSession::default(),
        };

        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

/// Extractor for the logged-in user; anonymous visitors are sent to the login page
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::from_request_parts(parts, state).await?;

        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let Some(user_id) = session.data.user_id else {
            return Err(AppError::LoginRequired { next });
        };

        let identity = state
            .services
            .auth
            .identity(user_id)
            .await?
            .ok_or(AppError::LoginRequired { next })?;

        Ok(AuthenticatedUser(identity))
    }
}

/// Cookie carrying the session key
pub fn session_cookie(config: &SessionConfig, key: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .build()
}

/// Primary keys come from the path as text; anything that is not one is a missing page
pub fn parse_pk<T: std::str::FromStr>(raw: &str) -> Result<T, AppError> {
    let not_found = || AppError::NotFound(format!("No object with id {}", raw));

    // Integer parsing accepts a sign, which no route pattern allows
    if raw.starts_with(['+', '-']) {
        return Err(not_found());
    }
    raw.parse().map_err(|_| not_found())
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let site = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home
        .route("/", get(index::index))
        // Books
        .route("/books/", get(books::list_books))
        .route(
            "/book/create/",
            get(books::create_book_form).post(books::create_book),
        )
        .route("/book/:id/", get(books::get_book))
        .route(
            "/book/:id/update/",
            get(books::update_book_form).post(books::update_book),
        )
        .route(
            "/book/:id/delete/",
            get(books::delete_book_confirm).post(books::delete_book),
        )
        .route(
            "/book/:id/renew/",
            get(loans::renew_form).post(loans::renew),
        )
        // Authors
        .route("/authors/", get(authors::list_authors))
        .route(
            "/author/create/",
            get(authors::create_author_form).post(authors::create_author),
        )
        .route("/author/:id/", get(authors::get_author))
        .route(
            "/author/:id/update/",
            get(authors::update_author_form).post(authors::update_author),
        )
        .route(
            "/author/:id/delete/",
            get(authors::delete_author_confirm).post(authors::delete_author),
        )
        // Loans
        .route("/mybooks/", get(loans::my_borrowed))
        .route("/borrowed/", get(loans::all_borrowed))
        // Accounts
        .route(
            "/accounts/login/",
            get(accounts::login_form).post(accounts::login),
        )
        .route("/accounts/logout/", post(accounts::logout))
        .with_state(state);

    Router::new()
        .merge(site)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
