//! Book browsing and editing endpoints

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::Form;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        Author, Book, BookDetail, BookForm, BookSummary, FormErrors, Genre, PageInfo, PageQuery,
        Permission,
    },
    AppState,
};

use super::{parse_pk, AuthenticatedUser};

/// One page of the book list
#[derive(Serialize, ToSchema)]
pub struct BookListContext {
    pub books: Vec<BookSummary>,
    pub page: PageInfo,
}

/// Book create/update form with the select box choices
#[derive(Serialize, ToSchema)]
pub struct BookFormContext {
    /// Book being edited; absent on create
    pub book: Option<Book>,
    pub form: BookForm,
    #[schema(value_type = Object)]
    pub errors: FormErrors,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

impl BookFormContext {
    async fn build(
        state: &AppState,
        book: Option<Book>,
        form: BookForm,
        errors: FormErrors,
    ) -> AppResult<Self> {
        let choices = state.services.catalog.book_choices().await?;
        Ok(Self {
            book,
            form,
            errors,
            authors: choices.authors,
            genres: choices.genres,
        })
    }
}

/// List books
#[utoipa::path(
    get,
    path = "/books/",
    tag = "catalog",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of books", body = BookListContext),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<BookListContext>> {
    let (books, page) = state
        .services
        .catalog
        .list_books(query.page.as_deref())
        .await?;
    Ok(Json(BookListContext { books, page }))
}

/// Get book details
#[utoipa::path(
    get,
    path = "/book/{id}/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book with author, genres and copies", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookDetail>> {
    let detail = state.services.catalog.get_book_detail(parse_pk(&id)?).await?;
    Ok(Json(detail))
}

/// Blank book form
#[utoipa::path(
    get,
    path = "/book/create/",
    tag = "catalog",
    responses(
        (status = 200, description = "Empty book form", body = BookFormContext),
        (status = 303, description = "Login required"),
        (status = 403, description = "Missing catalog.add_book")
    )
)]
pub async fn create_book_form(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<BookFormContext>> {
    identity.require(Permission::AddBook)?;

    let context =
        BookFormContext::build(&state, None, BookForm::default(), FormErrors::default()).await?;
    Ok(Json(context))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/book/create/",
    tag = "catalog",
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Created, redirect to the book page"),
        (status = 200, description = "Form with field errors", body = BookFormContext),
        (status = 403, description = "Missing catalog.add_book")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Form(form): Form<BookForm>,
) -> AppResult<Response> {
    identity.require(Permission::AddBook)?;

    match state.services.catalog.create_book(&form).await? {
        Ok(book) => Ok(Redirect::to(&book.absolute_url()).into_response()),
        Err(errors) => {
            let context = BookFormContext::build(&state, None, form, errors).await?;
            Ok(Json(context).into_response())
        }
    }
}

/// Book form pre-filled from the stored book
#[utoipa::path(
    get,
    path = "/book/{id}/update/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Pre-filled book form", body = BookFormContext),
        (status = 403, description = "Missing catalog.change_book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book_form(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<BookFormContext>> {
    identity.require(Permission::ChangeBook)?;

    let book = state.services.catalog.get_book(parse_pk(&id)?).await?;
    let form = BookForm::from_book(&book);
    let context = BookFormContext::build(&state, Some(book), form, FormErrors::default()).await?;
    Ok(Json(context))
}

/// Update a book
#[utoipa::path(
    post,
    path = "/book/{id}/update/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirect to the book page"),
        (status = 200, description = "Form with field errors", body = BookFormContext),
        (status = 403, description = "Missing catalog.change_book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<BookForm>,
) -> AppResult<Response> {
    identity.require(Permission::ChangeBook)?;

    let id = parse_pk(&id)?;
    match state.services.catalog.update_book(id, &form).await? {
        Ok(book) => Ok(Redirect::to(&book.absolute_url()).into_response()),
        Err(errors) => {
            let book = state.services.catalog.get_book(id).await?;
            let context = BookFormContext::build(&state, Some(book), form, errors).await?;
            Ok(Json(context).into_response())
        }
    }
}

/// Book shown for delete confirmation
#[utoipa::path(
    get,
    path = "/book/{id}/delete/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book to delete", body = Book),
        (status = 403, description = "Missing catalog.delete_book"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book_confirm(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    identity.require(Permission::DeleteBook)?;

    let book = state.services.catalog.get_book(parse_pk(&id)?).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    post,
    path = "/book/{id}/delete/",
    tag = "catalog",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Deleted, redirect to the book list"),
        (status = 403, description = "Missing catalog.delete_book"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    identity.require(Permission::DeleteBook)?;

    state.services.catalog.delete_book(parse_pk(&id)?).await?;
    Ok(Redirect::to("/books/"))
}
