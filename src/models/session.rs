//! Per-visitor session record

use serde::{Deserialize, Serialize};

/// What the server remembers about a visitor between requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionData {
    /// Logged-in user, if any
    pub user_id: Option<i32>,
    /// Home page loads so far
    pub num_visits: u64,
}
