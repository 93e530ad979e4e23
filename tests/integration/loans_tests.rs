//! Borrowed-copy lists and renewal tests.

use axum::http::StatusCode;
use chrono::Duration;
use uuid::Uuid;

use catalog_server::models::{LoanStatus, Permission};
use catalog_server::services::today;

use super::test_utils::{body_json, location, MemoryCatalog, TestApp};

struct Fixture {
    app: TestApp,
    reader: i32,
    librarian: i32,
    loaned: Uuid,
}

/// A reader holding three copies, another reader holding one, and a librarian
fn fixture() -> Fixture {
    let catalog = MemoryCatalog::new();
    let author = catalog.add_author("Mary", "Shelley");
    let book = catalog.add_book("Frankenstein", author, &[]);

    let reader = catalog.add_user("reader", "reader-pass", &[]);
    let other = catalog.add_user("other", "other-pass", &[]);
    let librarian = catalog.add_user("librarian", "librarian-pass", &[Permission::CanMarkReturned]);

    let loaned = catalog.add_instance(
        book,
        LoanStatus::OnLoan,
        Some(today() - Duration::days(4)),
        Some(reader),
    );
    catalog.add_instance(book, LoanStatus::OnLoan, None, Some(reader));
    catalog.add_instance(
        book,
        LoanStatus::OnLoan,
        Some(today() + Duration::days(10)),
        Some(reader),
    );
    catalog.add_instance(
        book,
        LoanStatus::OnLoan,
        Some(today() + Duration::days(1)),
        Some(other),
    );
    catalog.add_instance(book, LoanStatus::Available, None, None);

    Fixture {
        app: TestApp::new(catalog),
        reader,
        librarian,
        loaned,
    }
}

// =============================================================================
// My borrowed books
// =============================================================================

#[tokio::test]
async fn test_mybooks_requires_login() {
    let f = fixture();

    let response = f.app.get("/mybooks/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/accounts/login/?next=%2Fmybooks%2F");
}

#[tokio::test]
async fn test_mybooks_lists_own_loans_soonest_first() {
    let f = fixture();
    let session = f.app.session_for(f.reader);

    let response = f.app.get("/mybooks/", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let copies = json["copies"].as_array().unwrap();
    assert_eq!(copies.len(), 3);
    assert!(copies.iter().all(|c| c["borrower_id"] == f.reader));
    assert_eq!(copies[0]["id"], f.loaned.to_string());
    assert_eq!(copies[0]["is_overdue"], true);
    assert_eq!(copies[1]["is_overdue"], false);
    assert!(copies[2]["due_back"].is_null());
}

// =============================================================================
// All borrowed books
// =============================================================================

#[tokio::test]
async fn test_borrowed_requires_permission() {
    let f = fixture();

    let anonymous = f.app.get("/borrowed/", None).await;
    assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);

    let session = f.app.session_for(f.reader);
    let response = f.app.get("/borrowed/", Some(&session)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_borrowed_lists_every_loan_with_borrower() {
    let f = fixture();
    let session = f.app.session_for(f.librarian);

    let json = body_json(f.app.get("/borrowed/", Some(&session)).await).await;
    let copies = json["copies"].as_array().unwrap();
    assert_eq!(copies.len(), 4);
    assert_eq!(copies[0]["borrower_username"], "reader");
    assert_eq!(copies[1]["borrower_username"], "other");
    assert!(copies[3]["due_back"].is_null());
    assert_eq!(json["page"]["count"], 4);
}

// =============================================================================
// Renewal
// =============================================================================

#[tokio::test]
async fn test_renew_form_proposes_three_weeks() {
    let f = fixture();
    let session = f.app.session_for(f.librarian);

    let response = f
        .app
        .get(&format!("/book/{}/renew/", f.loaned), Some(&session))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["form"]["renewal_date"],
        (today() + Duration::days(21)).to_string()
    );
    assert_eq!(json["instance"]["id"], f.loaned.to_string());
}

#[tokio::test]
async fn test_renew_checks_permission_before_the_copy() {
    let f = fixture();

    let anonymous = f
        .app
        .get(&format!("/book/{}/renew/", Uuid::new_v4()), None)
        .await;
    assert_eq!(anonymous.status(), StatusCode::SEE_OTHER);

    let session = f.app.session_for(f.reader);
    let response = f
        .app
        .get(&format!("/book/{}/renew/", Uuid::new_v4()), Some(&session))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_renew_unknown_or_malformed_copy_is_not_found() {
    let f = fixture();
    let session = f.app.session_for(f.librarian);

    let unknown = format!("/book/{}/renew/", Uuid::new_v4());
    for uri in [unknown.as_str(), "/book/12/renew/", "/book/not-a-uuid/renew/"] {
        let response = f.app.get(uri, Some(&session)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_renew_within_four_weeks_updates_due_date() {
    let f = fixture();
    let session = f.app.session_for(f.librarian);
    let target = today() + Duration::days(5);

    let response = f
        .app
        .post_form(
            &format!("/book/{}/renew/", f.loaned),
            &format!("renewal_date={}", target),
            Some(&session),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/borrowed/");

    let copy = f.app.catalog.instance(f.loaned).unwrap();
    assert_eq!(copy.due_back, Some(target));
    assert_eq!(copy.status, LoanStatus::OnLoan);
    assert_eq!(copy.borrower_id, Some(f.reader));
}

#[tokio::test]
async fn test_renew_accepts_both_boundaries() {
    let f = fixture();
    let session = f.app.session_for(f.librarian);

    for target in [today(), today() + Duration::days(28)] {
        let response = f
            .app
            .post_form(
                &format!("/book/{}/renew/", f.loaned),
                &format!("renewal_date={}", target),
                Some(&session),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", target);
        assert_eq!(f.app.catalog.instance(f.loaned).unwrap().due_back, Some(target));
    }
}

#[tokio::test]
async fn test_renew_in_past_is_rejected_without_change() {
    let f = fixture();
    let session = f.app.session_for(f.librarian);
    let before = f.app.catalog.instance(f.loaned).unwrap().due_back;

    let response = f
        .app
        .post_form(
            &format!("/book/{}/renew/", f.loaned),
            &format!("renewal_date={}", today() - Duration::days(3)),
            Some(&session),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["errors"]["renewal_date"][0],
        "Invalid date - renewal in past"
    );
    assert_eq!(f.app.catalog.instance(f.loaned).unwrap().due_back, before);
}

#[tokio::test]
async fn test_renew_beyond_four_weeks_is_rejected() {
    let f = fixture();
    let session = f.app.session_for(f.librarian);
    let before = f.app.catalog.instance(f.loaned).unwrap().due_back;

    let response = f
        .app
        .post_form(
            &format!("/book/{}/renew/", f.loaned),
            &format!("renewal_date={}", today() + Duration::days(29)),
            Some(&session),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["errors"]["renewal_date"][0],
        "Invalid date - renewal more than 4 weeks ahead"
    );
    assert_eq!(f.app.catalog.instance(f.loaned).unwrap().due_back, before);
}

#[tokio::test]
async fn test_renew_with_garbage_date_is_rejected() {
    let f = fixture();
    let session = f.app.session_for(f.librarian);

    let response = f
        .app
        .post_form(
            &format!("/book/{}/renew/", f.loaned),
            "renewal_date=next+tuesday",
            Some(&session),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["errors"]["renewal_date"][0], "Enter a valid date.");
    assert_eq!(json["form"]["renewal_date"], "next tuesday");
}
