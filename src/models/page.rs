//! Page-number pagination for list views

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// Rows per page on every list view
pub const PAGE_SIZE: i64 = 10;

/// `?page=` query parameter: a 1-based number or `last`
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (1-based) or "last"
    pub page: Option<String>,
}

/// Position of the current page within the whole result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    /// Current page number (1-based)
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    /// Total number of rows across all pages
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub is_paginated: bool,
}

impl PageInfo {
    /// Resolve the requested page against `count` rows.
    ///
    /// The first page always exists, even for an empty result. Any other page
    /// outside `1..=num_pages`, or a value that is neither a number nor `last`,
    /// is reported as not found.
    pub fn resolve(requested: Option<&str>, count: i64, per_page: i64) -> AppResult<Self> {
        let num_pages = if count <= 0 {
            1
        } else {
            (count + per_page - 1) / per_page
        };

        let number = match requested.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::NotFound(format!("Invalid page ({})", raw)))?,
        };

        if number < 1 || number > num_pages {
            return Err(AppError::NotFound(format!("Invalid page ({})", number)));
        }

        Ok(Self {
            number,
            num_pages,
            per_page,
            count: count.max(0),
            has_next: number < num_pages,
            has_previous: number > 1,
            is_paginated: num_pages > 1,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}
