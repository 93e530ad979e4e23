//! Home page

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, services::catalog::CatalogCounts, AppState};

use super::{session_cookie, CurrentSession};

/// Home page figures plus the visitor's previous visit count
#[derive(Serialize, ToSchema)]
pub struct IndexContext {
    #[serde(flatten)]
    pub counts: CatalogCounts,
    /// Home page loads by this session before the current one
    pub num_visits: u64,
}

/// Catalog summary and per-session visit counter
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog summary", body = IndexContext)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
    session: CurrentSession,
) -> AppResult<(CookieJar, Json<IndexContext>)> {
    let counts = state.services.catalog.counts(&state.config.catalog).await?;

    let num_visits = session.data.num_visits;
    let mut data = session.data;
    data.num_visits = num_visits + 1;
    let key = state
        .services
        .sessions
        .save(session.key.as_deref(), &data)
        .await?;

    Ok((
        jar.add(session_cookie(&state.config.session, key)),
        Json(IndexContext { counts, num_visits }),
    ))
}
