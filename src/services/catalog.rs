//! Catalog service: home page counts, book and author browsing and editing

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        form::INVALID_CHOICE, Author, AuthorDetail, AuthorForm, Book, BookData, BookDetail,
        BookForm, BookSummary, FormErrors, FormResult, Genre, LoanStatus, PageInfo, PAGE_SIZE,
    },
    repository::Repository,
};

/// Figures shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_books_filter: i64,
    pub num_genres_filter: i64,
}

/// Choices offered by the book form's select boxes
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookChoices {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self, config: &CatalogConfig) -> AppResult<CatalogCounts> {
        let repo = &self.repository;
        let (
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
            num_books_filter,
            num_genres_filter,
        ) = tokio::try_join!(
            repo.books.count(),
            repo.book_instances.count(),
            repo.book_instances.count_by_status(LoanStatus::Available),
            repo.authors.count(),
            repo.books.count_title_contains(&config.index_title_filter),
            repo.genres.count_name_contains(&config.index_genre_filter),
        )?;

        Ok(CatalogCounts {
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
            num_books_filter,
            num_genres_filter,
        })
    }

    /// Storage round-trip used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.count().await.map(|_| ())
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, page: Option<&str>) -> AppResult<(Vec<BookSummary>, PageInfo)> {
        let total = self.repository.books.count().await?;
        let page = PageInfo::resolve(page, total, PAGE_SIZE)?;
        let books = self
            .repository
            .books
            .list(page.offset(), page.limit())
            .await?;
        Ok((books, page))
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn get_book_detail(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.get_book(id).await?;

        let author = match book.author_id {
            Some(author_id) => self.repository.authors.get_by_id(author_id).await?,
            None => None,
        };
        let genres = self.repository.genres.list_for_book(id).await?;
        let instances = self.repository.book_instances.list_for_book(id).await?;

        Ok(BookDetail {
            book,
            author,
            genres,
            instances,
        })
    }

    pub async fn book_choices(&self) -> AppResult<BookChoices> {
        Ok(BookChoices {
            authors: self.repository.authors.list_all().await?,
            genres: self.repository.genres.list_all().await?,
        })
    }

    /// Shape checks from the form, then the author and genres must exist
    async fn clean_book_form(&self, form: &BookForm) -> AppResult<FormResult<BookData>> {
        let data = match form.clean() {
            Ok(data) => data,
            Err(errors) => return Ok(Err(errors)),
        };

        let mut errors = FormErrors::default();

        if self
            .repository
            .authors
            .get_by_id(data.author_id)
            .await?
            .is_none()
        {
            errors.add("author", INVALID_CHOICE);
        }

        let existing = self.repository.genres.find_existing(&data.genre_ids).await?;
        for id in data.genre_ids.iter().filter(|id| !existing.contains(id)) {
            errors.add(
                "genre",
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    id
                ),
            );
        }

        Ok(errors.into_result(data))
    }

    pub async fn create_book(&self, form: &BookForm) -> AppResult<FormResult<Book>> {
        let data = match self.clean_book_form(form).await? {
            Ok(data) => data,
            Err(errors) => return Ok(Err(errors)),
        };

        let book = self.repository.books.create(&data).await?;
        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(Ok(book))
    }

    pub async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<FormResult<Book>> {
        self.get_book(id).await?;

        let data = match self.clean_book_form(form).await? {
            Ok(data) => data,
            Err(errors) => return Ok(Err(errors)),
        };

        let book = self
            .repository
            .books
            .update(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        tracing::info!("Updated book {}", id);
        Ok(Ok(book))
    }

    /// Delete a book that no copy refers to
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let book = self.get_book(id).await?;

        let copies = self.repository.book_instances.count_for_book(id).await?;
        if copies > 0 {
            return Err(AppError::Conflict(format!(
                "Book \"{}\" still has {} cop{} and cannot be deleted",
                book.title,
                copies,
                if copies == 1 { "y" } else { "ies" }
            )));
        }

        if !self.repository.books.delete(id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        tracing::info!("Deleted book {}", id);
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, page: Option<&str>) -> AppResult<(Vec<Author>, PageInfo)> {
        let total = self.repository.authors.count().await?;
        let page = PageInfo::resolve(page, total, PAGE_SIZE)?;
        let authors = self
            .repository
            .authors
            .list(page.offset(), page.limit())
            .await?;
        Ok((authors, page))
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository
            .authors
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    pub async fn get_author_detail(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.get_author(id).await?;
        let books = self.repository.books.list_by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    pub async fn create_author(&self, form: &AuthorForm) -> AppResult<FormResult<Author>> {
        let data = match form.clean() {
            Ok(data) => data,
            Err(errors) => return Ok(Err(errors)),
        };

        let author = self.repository.authors.create(&data).await?;
        tracing::info!("Created author {} ({})", author.id, author.display_name());
        Ok(Ok(author))
    }

    pub async fn update_author(&self, id: i32, form: &AuthorForm) -> AppResult<FormResult<Author>> {
        self.get_author(id).await?;

        let data = match form.clean() {
            Ok(data) => data,
            Err(errors) => return Ok(Err(errors)),
        };

        let author = self
            .repository
            .authors
            .update(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;
        tracing::info!("Updated author {}", id);
        Ok(Ok(author))
    }

    /// Delete an author that no book refers to
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        let author = self.get_author(id).await?;

        let books = self.repository.books.count_by_author(id).await?;
        if books > 0 {
            return Err(AppError::Conflict(format!(
                "Author \"{}\" is referenced by {} book(s) and cannot be deleted",
                author.display_name(),
                books
            )));
        }

        if !self.repository.authors.delete(id).await? {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        tracing::info!("Deleted author {}", id);
        Ok(())
    }
}
