//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod form;
pub mod genre;
pub mod loan;
pub mod page;
pub mod session;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorData, AuthorDetail, AuthorForm};
pub use book::{Book, BookData, BookDetail, BookForm, BookSummary};
pub use book_instance::{BookInstance, LoanStatus, LoanedCopy};
pub use form::{FormErrors, FormResult};
pub use genre::Genre;
pub use loan::RenewalForm;
pub use page::{PageInfo, PageQuery, PAGE_SIZE};
pub use session::SessionData;
pub use user::{Identity, Permission, User};
