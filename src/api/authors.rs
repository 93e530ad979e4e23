//! Author browsing and editing endpoints

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{Author, AuthorDetail, AuthorForm, FormErrors, PageInfo, PageQuery, Permission},
    AppState,
};

use super::{parse_pk, AuthenticatedUser};

/// One page of the author list
#[derive(Serialize, ToSchema)]
pub struct AuthorListContext {
    pub authors: Vec<Author>,
    pub page: PageInfo,
}

/// Author create/update form
#[derive(Serialize, ToSchema)]
pub struct AuthorFormContext {
    /// Author being edited; absent on create
    pub author: Option<Author>,
    pub form: AuthorForm,
    #[schema(value_type = Object)]
    pub errors: FormErrors,
}

/// List authors
#[utoipa::path(
    get,
    path = "/authors/",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of authors", body = AuthorListContext),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<AuthorListContext>> {
    let (authors, page) = state
        .services
        .catalog
        .list_authors(query.page.as_deref())
        .await?;
    Ok(Json(AuthorListContext { authors, page }))
}

/// Get author details
#[utoipa::path(
    get,
    path = "/author/{id}/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author with their books", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AuthorDetail>> {
    let detail = state
        .services
        .catalog
        .get_author_detail(parse_pk(&id)?)
        .await?;
    Ok(Json(detail))
}

/// Blank author form
#[utoipa::path(
    get,
    path = "/author/create/",
    tag = "catalog",
    responses(
        (status = 200, description = "Author form with proposed date of death", body = AuthorFormContext),
        (status = 303, description = "Login required"),
        (status = 403, description = "Missing catalog.add_author")
    )
)]
pub async fn create_author_form(
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<AuthorFormContext>> {
    identity.require(Permission::AddAuthor)?;

    Ok(Json(AuthorFormContext {
        author: None,
        form: AuthorForm::initial(),
        errors: FormErrors::default(),
    }))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/author/create/",
    tag = "catalog",
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created, redirect to the author page"),
        (status = 200, description = "Form with field errors", body = AuthorFormContext),
        (status = 403, description = "Missing catalog.add_author")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Form(form): Form<AuthorForm>,
) -> AppResult<Response> {
    identity.require(Permission::AddAuthor)?;

    match state.services.catalog.create_author(&form).await? {
        Ok(author) => Ok(Redirect::to(&author.absolute_url()).into_response()),
        Err(errors) => Ok(Json(AuthorFormContext {
            author: None,
            form,
            errors,
        })
        .into_response()),
    }
}

/// Author form pre-filled from the stored author
#[utoipa::path(
    get,
    path = "/author/{id}/update/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Pre-filled author form", body = AuthorFormContext),
        (status = 403, description = "Missing catalog.change_author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author_form(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<AuthorFormContext>> {
    identity.require(Permission::ChangeAuthor)?;

    let author = state.services.catalog.get_author(parse_pk(&id)?).await?;
    Ok(Json(AuthorFormContext {
        form: AuthorForm::from_author(&author),
        author: Some(author),
        errors: FormErrors::default(),
    }))
}

/// Update an author
#[utoipa::path(
    post,
    path = "/author/{id}/update/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body(content = AuthorForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirect to the author page"),
        (status = 200, description = "Form with field errors", body = AuthorFormContext),
        (status = 403, description = "Missing catalog.change_author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<AuthorForm>,
) -> AppResult<Response> {
    identity.require(Permission::ChangeAuthor)?;

    let id = parse_pk(&id)?;
    match state.services.catalog.update_author(id, &form).await? {
        Ok(author) => Ok(Redirect::to(&author.absolute_url()).into_response()),
        Err(errors) => {
            let author = state.services.catalog.get_author(id).await?;
            Ok(Json(AuthorFormContext {
                author: Some(author),
                form,
                errors,
            })
            .into_response())
        }
    }
}

/// Author shown for delete confirmation
#[utoipa::path(
    get,
    path = "/author/{id}/delete/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author to delete", body = Author),
        (status = 403, description = "Missing catalog.delete_author"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author_confirm(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Author>> {
    identity.require(Permission::DeleteAuthor)?;

    let author = state.services.catalog.get_author(parse_pk(&id)?).await?;
    Ok(Json(author))
}

/// Delete an author
#[utoipa::path(
    post,
    path = "/author/{id}/delete/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirect to the author list"),
        (status = 403, description = "Missing catalog.delete_author"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still referenced by books")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    identity.require(Permission::DeleteAuthor)?;

    state.services.catalog.delete_author(parse_pk(&id)?).await?;
    Ok(Redirect::to("/authors/"))
}
