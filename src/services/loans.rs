//! Loans service: who holds which copy, and librarian renewals

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{BookInstance, FormResult, LoanedCopy, PageInfo, RenewalForm, PAGE_SIZE},
    repository::Repository,
};

use super::today;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copies on loan to `user_id`, soonest due first
    pub async fn list_borrowed_by(
        &self,
        user_id: i32,
        page: Option<&str>,
    ) -> AppResult<(Vec<LoanedCopy>, PageInfo)> {
        self.list_on_loan(Some(user_id), page).await
    }

    /// Every copy on loan, with its borrower
    pub async fn list_all_borrowed(
        &self,
        page: Option<&str>,
    ) -> AppResult<(Vec<LoanedCopy>, PageInfo)> {
        self.list_on_loan(None, page).await
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        page: Option<&str>,
    ) -> AppResult<(Vec<LoanedCopy>, PageInfo)> {
        let instances = &self.repository.book_instances;
        let total = instances.count_on_loan(borrower_id).await?;
        let page = PageInfo::resolve(page, total, PAGE_SIZE)?;
        let copies = instances
            .list_on_loan(borrower_id, today(), page.offset(), page.limit())
            .await?;
        Ok((copies, page))
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository
            .book_instances
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Move the copy's due date to the submitted renewal date.
    ///
    /// An invalid date leaves the copy untouched and hands the form errors
    /// back. Only `due_back` changes: status and borrower are kept as they are.
    pub async fn renew(&self, id: Uuid, form: &RenewalForm) -> AppResult<FormResult<BookInstance>> {
        let mut instance = self.get_instance(id).await?;

        let due_back = match form.clean(today()) {
            Ok(date) => date,
            Err(errors) => return Ok(Err(errors)),
        };

        if !self
            .repository
            .book_instances
            .update_due_back(id, due_back)
            .await?
        {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }

        tracing::info!("Renewed book instance {} until {}", id, due_back);
        instance.due_back = Some(due_back);
        Ok(Ok(instance))
    }
}
