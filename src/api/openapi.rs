//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{accounts, authors, books, health, index, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Local library catalog: books, authors, copies and loans",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home
        index::index,
        // Books
        books::list_books,
        books::get_book,
        books::create_book_form,
        books::create_book,
        books::update_book_form,
        books::update_book,
        books::delete_book_confirm,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author_form,
        authors::create_author,
        authors::update_author_form,
        authors::update_author,
        authors::delete_author_confirm,
        authors::delete_author,
        // Loans
        loans::my_borrowed,
        loans::all_borrowed,
        loans::renew_form,
        loans::renew,
        // Accounts
        accounts::login_form,
        accounts::login,
        accounts::logout,
    ),
    components(
        schemas(
            // Catalog
            crate::models::Author,
            crate::models::AuthorDetail,
            crate::models::AuthorForm,
            crate::models::Book,
            crate::models::BookSummary,
            crate::models::BookDetail,
            crate::models::BookForm,
            crate::models::Genre,
            crate::models::BookInstance,
            crate::models::LoanStatus,
            crate::models::LoanedCopy,
            crate::models::RenewalForm,
            crate::models::PageInfo,
            crate::services::catalog::CatalogCounts,
            // Contexts
            index::IndexContext,
            books::BookListContext,
            books::BookFormContext,
            authors::AuthorListContext,
            authors::AuthorFormContext,
            loans::LoanedCopiesContext,
            loans::RenewalContext,
            accounts::LoginForm,
            accounts::LoginContext,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Books and authors"),
        (name = "loans", description = "Borrowed copies and renewals"),
        (name = "accounts", description = "Login and logout")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
