//! Group keys tie a case's jobs of one category together for bulk removal.

use std::fmt::Display;

/// `"{case_id}_{category}"`.
pub fn group_key(case_id: impl Display, category: impl Display) -> String {
    format!("{case_id}_{category}")
}
