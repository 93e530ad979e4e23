//! Loan listing and renewal endpoints

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        BookInstance, FormErrors, LoanedCopy, PageInfo, PageQuery, Permission, RenewalForm,
    },
    services::today,
    AppState,
};

use super::{parse_pk, AuthenticatedUser};

/// One page of on-loan copies
#[derive(Serialize, ToSchema)]
pub struct LoanedCopiesContext {
    pub copies: Vec<LoanedCopy>,
    pub page: PageInfo,
}

/// Renewal form for one copy
#[derive(Serialize, ToSchema)]
pub struct RenewalContext {
    pub instance: BookInstance,
    pub form: RenewalForm,
    #[schema(value_type = Object)]
    pub errors: FormErrors,
}

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks/",
    tag = "loans",
    params(PageQuery),
    responses(
        (status = 200, description = "Current user's loans, soonest due first", body = LoanedCopiesContext),
        (status = 303, description = "Login required"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn my_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanedCopiesContext>> {
    let (copies, page) = state
        .services
        .loans
        .list_borrowed_by(identity.user_id, query.page.as_deref())
        .await?;
    Ok(Json(LoanedCopiesContext { copies, page }))
}

/// Every copy on loan, for librarians
#[utoipa::path(
    get,
    path = "/borrowed/",
    tag = "loans",
    params(PageQuery),
    responses(
        (status = 200, description = "All loans with borrowers, soonest due first", body = LoanedCopiesContext),
        (status = 303, description = "Login required"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn all_borrowed(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanedCopiesContext>> {
    identity.require(Permission::CanMarkReturned)?;

    let (copies, page) = state
        .services
        .loans
        .list_all_borrowed(query.page.as_deref())
        .await?;
    Ok(Json(LoanedCopiesContext { copies, page }))
}

/// Renewal form proposing a date three weeks ahead
#[utoipa::path(
    get,
    path = "/book/{id}/renew/",
    tag = "loans",
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalContext),
        (status = 303, description = "Login required"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_form(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<RenewalContext>> {
    identity.require(Permission::CanMarkReturned)?;

    let instance = state.services.loans.get_instance(parse_pk(&id)?).await?;
    Ok(Json(RenewalContext {
        instance,
        form: RenewalForm::initial(today()),
        errors: FormErrors::default(),
    }))
}

/// Renew a loaned copy
#[utoipa::path(
    post,
    path = "/book/{id}/renew/",
    tag = "loans",
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body(content = RenewalForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Renewed, redirect to all borrowed copies"),
        (status = 200, description = "Form with field errors", body = RenewalContext),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<RenewalForm>,
) -> AppResult<Response> {
    identity.require(Permission::CanMarkReturned)?;

    let id: Uuid = parse_pk(&id)?;
    match state.services.loans.renew(id, &form).await? {
        Ok(_) => Ok(Redirect::to("/borrowed/").into_response()),
        Err(errors) => {
            let instance = state.services.loans.get_instance(id).await?;
            Ok(Json(RenewalContext {
                instance,
                form,
                errors,
            })
            .into_response())
        }
    }
}
