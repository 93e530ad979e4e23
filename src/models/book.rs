//! Book model, list rows, edit form and the data a valid form yields

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::author::Author;
use super::book_instance::BookInstance;
use super::form::{required_text, FormErrors, FormResult, INVALID_CHOICE};
use super::genre::Genre;

/// Book row with the ids of its genres
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

impl Book {
    pub fn absolute_url(&self) -> String {
        format!("/book/{}/", self.id)
    }
}

/// Book as listed on `/books/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "Last, First" of the author, if any
    pub author_name: Option<String>,
    /// First three genre names joined by ", "
    pub display_genre: String,
}

/// Book with its author, genres and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstance>,
}

/// First three genre names joined by ", "
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(3)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Book create/update form as submitted; `genre` may repeat
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub title: String,
    /// Author id
    pub author: String,
    #[validate(length(max = 1000, message = "Ensure this value has at most 1000 characters."))]
    pub summary: String,
    #[validate(length(max = 13, message = "Ensure this value has at most 13 characters."))]
    pub isbn: String,
    /// Genre ids
    pub genre: Vec<String>,
}

/// Validated book fields, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookData {
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

impl BookForm {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author_id.map(|id| id.to_string()).unwrap_or_default(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genre_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Check field shapes only; whether the referenced author and genres
    /// exist is left to the catalog service.
    pub fn clean(&self) -> FormResult<BookData> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        let title = required_text(&mut errors, "title", &self.title);
        let summary = required_text(&mut errors, "summary", &self.summary);
        let isbn = required_text(&mut errors, "isbn", &self.isbn);

        let author = required_text(&mut errors, "author", &self.author);
        let author_id = if author.is_empty() {
            0
        } else {
            author.parse::<i32>().unwrap_or_else(|_| {
                errors.add("author", INVALID_CHOICE);
                0
            })
        };

        let mut genre_ids = Vec::new();
        for raw in self.genre.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
            match raw.parse::<i32>() {
                Ok(id) if !genre_ids.contains(&id) => genre_ids.push(id),
                Ok(_) => {}
                Err(_) => errors.add(
                    "genre",
                    format!("\u{201c}{}\u{201d} is not a valid value.", raw),
                ),
            }
        }
        if genre_ids.is_empty() && !errors.contains("genre") {
            errors.add("genre", super::form::REQUIRED);
        }

        errors.into_result(BookData {
            title,
            author_id,
            summary,
            isbn,
            genre_ids,
        })
    }
}
