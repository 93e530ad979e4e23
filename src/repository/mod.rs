//! Repository layer for database operations
//!
//! Each aggregate is reached through a trait so the services can run against
//! PostgreSQL in production and against in-memory doubles in tests.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        Author, AuthorData, Book, BookData, BookInstance, BookSummary, Genre, LoanStatus,
        LoanedCopy, User,
    },
};

/// A delete refused by a foreign key is a protected object, not a storage failure
pub(crate) fn restricted_delete(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenresRepository: Send + Sync {
    /// Genres whose name contains `fragment` (case-sensitive)
    async fn count_name_contains(&self, fragment: &str) -> AppResult<i64>;

    /// All genres ordered by name
    async fn list_all(&self) -> AppResult<Vec<Genre>>;

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<Genre>>;

    /// The subset of `ids` that exist
    async fn find_existing(&self, ids: &[i32]) -> AppResult<Vec<i32>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorsRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// One page of authors ordered by last name, first name
    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<Author>>;

    async fn list_all(&self) -> AppResult<Vec<Author>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Author>>;

    async fn create(&self, data: &AuthorData) -> AppResult<Author>;

    /// `None` when no author has this id
    async fn update(&self, id: i32, data: &AuthorData) -> AppResult<Option<Author>>;

    /// `false` when no author has this id
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// Books whose title contains `fragment` (case-sensitive)
    async fn count_title_contains(&self, fragment: &str) -> AppResult<i64>;

    /// One page of books ordered by id
    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<BookSummary>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Book>>;

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<Book>>;

    async fn count_by_author(&self, author_id: i32) -> AppResult<i64>;

    async fn create(&self, data: &BookData) -> AppResult<Book>;

    async fn update(&self, id: i32, data: &BookData) -> AppResult<Option<Book>>;

    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstancesRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BookInstance>>;

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>>;

    async fn count_for_book(&self, book_id: i32) -> AppResult<i64>;

    /// On-loan copies, all of them or only those lent to `borrower_id`
    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64>;

    /// One page of on-loan copies, soonest due first, undated last.
    /// A copy is overdue when it was due before `today`.
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        today: NaiveDate,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<LoanedCopy>>;

    /// `false` when no copy has this id
    async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Permission codenames granted to the user
    async fn permissions(&self, user_id: i32) -> AppResult<Vec<String>>;
}

/// Main repository struct holding one handle per aggregate
#[derive(Clone)]
pub struct Repository {
    pub genres: Arc<dyn GenresRepository>,
    pub authors: Arc<dyn AuthorsRepository>,
    pub books: Arc<dyn BooksRepository>,
    pub book_instances: Arc<dyn BookInstancesRepository>,
    pub users: Arc<dyn UsersRepository>,
}

impl Repository {
    /// Create a PostgreSQL-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            genres: Arc::new(genres::PgGenresRepository::new(pool.clone())),
            authors: Arc::new(authors::PgAuthorsRepository::new(pool.clone())),
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            book_instances: Arc::new(book_instances::PgBookInstancesRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool)),
        }
    }
}
