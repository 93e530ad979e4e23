//! Librarian renewal of a loaned copy

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::form::{parse_date, FormErrors, FormResult, INVALID_DATE};

/// Days from today proposed as the new due date
pub const RENEWAL_PROPOSAL_DAYS: i64 = 21;
/// Furthest a due date may be pushed, in days from today
pub const RENEWAL_MAX_DAYS: i64 = 28;

pub const RENEWAL_IN_PAST: &str = "Invalid date - renewal in past";
pub const RENEWAL_TOO_FAR: &str = "Invalid date - renewal more than 4 weeks ahead";

/// Renewal form: a single `renewal_date` (YYYY-MM-DD)
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RenewalForm {
    pub renewal_date: String,
}

impl RenewalForm {
    /// Form offered on GET, proposing three weeks from `today`
    pub fn initial(today: NaiveDate) -> Self {
        Self {
            renewal_date: (today + Duration::days(RENEWAL_PROPOSAL_DAYS)).to_string(),
        }
    }

    pub fn clean(&self, today: NaiveDate) -> FormResult<NaiveDate> {
        let mut errors = FormErrors::default();
        match parse_date(&self.renewal_date) {
            Some(date) => {
                if let Err(message) = check_renewal_date(date, today) {
                    errors.add("renewal_date", message);
                }
                errors.into_result(date)
            }
            None => {
                errors.add("renewal_date", INVALID_DATE);
                Err(errors)
            }
        }
    }
}

/// A renewal date must fall within `today..=today + 4 weeks`
pub fn check_renewal_date(date: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if date < today {
        return Err(RENEWAL_IN_PAST);
    }
    if date > today + Duration::days(RENEWAL_MAX_DAYS) {
        return Err(RENEWAL_TOO_FAR);
    }
    Ok(())
}
