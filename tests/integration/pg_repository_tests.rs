//! Repository tests against PostgreSQL.
//!
//! Each test gets a fresh database with `migrations/` applied. They need a
//! server reachable through `DATABASE_URL` and are ignored by default.
//! Run with: cargo test -- --ignored

use chrono::{Duration, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use catalog_server::error::AppError;
use catalog_server::models::{AuthorData, BookData, LoanStatus};
use catalog_server::repository::Repository;
use catalog_server::services::today;

// =============================================================================
// Seeding
// =============================================================================

async fn insert_user(pool: &PgPool, username: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO users (username, password_hash) VALUES ($1, 'x') RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_genre(pool: &PgPool, name: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO genres (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn insert_author(pool: &PgPool, last_name: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO authors (first_name, last_name) VALUES ('', $1) RETURNING id",
    )
    .bind(last_name)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_book(pool: &PgPool, title: &str, author_id: i32) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO books (title, author_id, summary, isbn) VALUES ($1, $2, '', '') RETURNING id",
    )
    .bind(title)
    .bind(author_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_copy(
    pool: &PgPool,
    id: Uuid,
    book_id: i32,
    status: LoanStatus,
    due_back: Option<NaiveDate>,
    borrower_id: Option<i32>,
) {
    sqlx::query(
        "INSERT INTO book_instances (id, book_id, imprint, status, due_back, borrower_id)
         VALUES ($1, $2, 'First edition', $3, $4, $5)",
    )
    .bind(id)
    .bind(book_id)
    .bind(status)
    .bind(due_back)
    .bind(borrower_id)
    .execute(pool)
    .await
    .unwrap();
}

fn book_data(title: &str, author_id: i32, genre_ids: Vec<i32>) -> BookData {
    BookData {
        title: title.to_string(),
        author_id,
        summary: "Summary".to_string(),
        isbn: "9780000000000".to_string(),
        genre_ids,
    }
}

// =============================================================================
// Loans
// =============================================================================

struct Loans {
    reader: i32,
    overdue: Uuid,
    soon: Uuid,
    later_low: Uuid,
    later_high: Uuid,
    undated: Uuid,
}

/// Five copies on loan to two users, plus one on the shelf
async fn seed_loans(pool: &PgPool) -> Loans {
    let reader = insert_user(pool, "reader").await;
    let other = insert_user(pool, "other").await;
    let author = insert_author(pool, "Tolkien").await;
    let book = insert_book(pool, "The Hobbit", author).await;
    let today = today();

    let loans = Loans {
        reader,
        overdue: Uuid::new_v4(),
        soon: Uuid::new_v4(),
        later_low: Uuid::from_u128(1),
        later_high: Uuid::from_u128(2),
        undated: Uuid::new_v4(),
    };

    let on_loan = [
        (loans.undated, None, reader),
        (loans.later_high, Some(today + Duration::days(5)), reader),
        (loans.overdue, Some(today - Duration::days(2)), reader),
        (loans.later_low, Some(today + Duration::days(5)), other),
        (loans.soon, Some(today + Duration::days(1)), other),
    ];
    for (id, due_back, borrower) in on_loan {
        insert_copy(pool, id, book, LoanStatus::OnLoan, due_back, Some(borrower)).await;
    }
    insert_copy(pool, Uuid::new_v4(), book, LoanStatus::Available, None, None).await;

    loans
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_on_loan_orders_by_due_date_with_undated_last(pool: PgPool) {
    let loans = seed_loans(&pool).await;
    let repository = Repository::new(pool);

    assert_eq!(repository.book_instances.count_on_loan(None).await.unwrap(), 5);

    let copies = repository
        .book_instances
        .list_on_loan(None, today(), 0, 10)
        .await
        .unwrap();
    let ids: Vec<Uuid> = copies.iter().map(|c| c.id).collect();
    assert_eq!(
        ids,
        vec![
            loans.overdue,
            loans.soon,
            loans.later_low,
            loans.later_high,
            loans.undated
        ]
    );
    assert!(copies.iter().all(|c| c.status == LoanStatus::OnLoan));
    assert_eq!(copies[0].book_title.as_deref(), Some("The Hobbit"));
    assert_eq!(copies[0].borrower_username.as_deref(), Some("reader"));
    assert_eq!(copies[1].borrower_username.as_deref(), Some("other"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_on_loan_pages_use_offset_and_limit(pool: PgPool) {
    let loans = seed_loans(&pool).await;
    let repository = Repository::new(pool);

    let copies = repository
        .book_instances
        .list_on_loan(None, today(), 3, 2)
        .await
        .unwrap();
    let ids: Vec<Uuid> = copies.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![loans.later_high, loans.undated]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_on_loan_is_scoped_to_borrower(pool: PgPool) {
    let loans = seed_loans(&pool).await;
    let repository = Repository::new(pool);

    assert_eq!(
        repository
            .book_instances
            .count_on_loan(Some(loans.reader))
            .await
            .unwrap(),
        3
    );

    let copies = repository
        .book_instances
        .list_on_loan(Some(loans.reader), today(), 0, 10)
        .await
        .unwrap();
    let ids: Vec<Uuid> = copies.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![loans.overdue, loans.later_high, loans.undated]);
    assert!(copies.iter().all(|c| c.borrower_id == Some(loans.reader)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_overdue_is_relative_to_the_given_day(pool: PgPool) {
    let loans = seed_loans(&pool).await;
    let repository = Repository::new(pool);

    let copies = repository
        .book_instances
        .list_on_loan(Some(loans.reader), today(), 0, 10)
        .await
        .unwrap();
    let overdue: Vec<Uuid> = copies.iter().filter(|c| c.is_overdue).map(|c| c.id).collect();
    assert_eq!(overdue, vec![loans.overdue]);

    let copies = repository
        .book_instances
        .list_on_loan(Some(loans.reader), today() + Duration::days(10), 0, 10)
        .await
        .unwrap();
    let overdue: Vec<Uuid> = copies.iter().filter(|c| c.is_overdue).map(|c| c.id).collect();
    assert_eq!(overdue, vec![loans.overdue, loans.later_high]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_update_due_back_touches_only_the_date(pool: PgPool) {
    let loans = seed_loans(&pool).await;
    let repository = Repository::new(pool);
    let new_date = today() + Duration::days(20);

    assert!(repository
        .book_instances
        .update_due_back(loans.undated, new_date)
        .await
        .unwrap());
    assert!(!repository
        .book_instances
        .update_due_back(Uuid::new_v4(), new_date)
        .await
        .unwrap());

    let copy = repository
        .book_instances
        .get_by_id(loans.undated)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(copy.due_back, Some(new_date));
    assert_eq!(copy.status, LoanStatus::OnLoan);
    assert_eq!(copy.borrower_id, Some(loans.reader));
}

// =============================================================================
// Books and genres
// =============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_book_update_replaces_genres(pool: PgPool) {
    let fantasy = insert_genre(&pool, "Fantasy").await;
    let classic = insert_genre(&pool, "Classic").await;
    let novel = insert_genre(&pool, "Novel").await;
    let author = insert_author(&pool, "Tolkien").await;
    let repository = Repository::new(pool);

    let book = repository
        .books
        .create(&book_data("The Hobbit", author, vec![classic, fantasy]))
        .await
        .unwrap();
    assert_eq!(book.genre_ids, vec![fantasy, classic]);

    let updated = repository
        .books
        .update(book.id, &book_data("The Hobbit", author, vec![novel]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.genre_ids, vec![novel]);

    let stored = repository.books.get_by_id(book.id).await.unwrap().unwrap();
    assert_eq!(stored.genre_ids, vec![novel]);
    let genres = repository.genres.list_for_book(book.id).await.unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].name, "Novel");

    let missing = repository
        .books
        .update(9999, &book_data("Ghost", author, vec![novel]))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_contains_counts_are_case_sensitive(pool: PgPool) {
    for name in ["Роман", "Любовный Роман", "роман", "Романтика"] {
        insert_genre(&pool, name).await;
    }
    let author = insert_author(&pool, "Роулинг").await;
    for title in [
        "Гарри Поттер и философский камень",
        "Гарри Поттер и Тайная комната",
        "гарри",
        "The Hobbit",
    ] {
        insert_book(&pool, title, author).await;
    }
    let repository = Repository::new(pool);

    assert_eq!(repository.genres.count_name_contains("Роман").await.unwrap(), 3);
    assert_eq!(repository.books.count_title_contains("Гарри").await.unwrap(), 2);
    assert_eq!(repository.books.count_title_contains("Nothing").await.unwrap(), 0);
}

// =============================================================================
// Restricted deletes
// =============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_delete_refused_by_foreign_key_is_conflict(pool: PgPool) {
    let author = insert_author(&pool, "Herbert").await;
    let book = insert_book(&pool, "Dune", author).await;
    insert_copy(&pool, Uuid::new_v4(), book, LoanStatus::Available, None, None).await;
    let repository = Repository::new(pool);

    let result = repository.authors.delete(author).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    let result = repository.books.delete(book).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    assert!(repository.authors.get_by_id(author).await.unwrap().is_some());
    assert!(repository.books.get_by_id(book).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Run with: cargo test -- --ignored
async fn test_delete_unreferenced_rows(pool: PgPool) {
    let repository = Repository::new(pool);
    let author = repository
        .authors
        .create(&AuthorData {
            first_name: "Nobody".to_string(),
            last_name: "Atall".to_string(),
            date_of_birth: None,
            date_of_death: None,
        })
        .await
        .unwrap();

    assert!(repository.authors.delete(author.id).await.unwrap());
    assert!(!repository.authors.delete(author.id).await.unwrap());
    assert!(!repository.books.delete(9999).await.unwrap());
}
