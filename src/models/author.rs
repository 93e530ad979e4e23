//! Author model, its edit form and the data a valid form yields

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;
use super::form::{optional_date, required_text, FormErrors, FormResult};

/// Date of death proposed on a blank author form
pub const DEFAULT_DATE_OF_DEATH: &str = "2016-10-12";

/// Author row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First" as shown in lists
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    pub fn absolute_url(&self) -> String {
        format!("/author/{}/", self.id)
    }
}

/// Author with the books that reference it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Author create/update form as submitted (urlencoded, all fields as text)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct AuthorForm {
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub last_name: String,
    /// YYYY-MM-DD, blank for unknown
    pub date_of_birth: String,
    /// YYYY-MM-DD, blank while alive
    pub date_of_death: String,
}

/// Validated author fields, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorData {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorForm {
    /// Blank form offered on the create page
    pub fn initial() -> Self {
        Self {
            date_of_death: DEFAULT_DATE_OF_DEATH.to_string(),
            ..Self::default()
        }
    }

    /// Form pre-filled from a stored author, for the update page
    pub fn from_author(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author
                .date_of_birth
                .map(|d| d.to_string())
                .unwrap_or_default(),
            date_of_death: author
                .date_of_death
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn clean(&self) -> FormResult<AuthorData> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::default(),
            Err(e) => FormErrors::from(e),
        };

        let data = AuthorData {
            first_name: required_text(&mut errors, "first_name", &self.first_name),
            last_name: required_text(&mut errors, "last_name", &self.last_name),
            date_of_birth: optional_date(&mut errors, "date_of_birth", &self.date_of_birth),
            date_of_death: optional_date(&mut errors, "date_of_death", &self.date_of_death),
        };

        errors.into_result(data)
    }
}
