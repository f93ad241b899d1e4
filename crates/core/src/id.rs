//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a case on the external case-management platform.
///
/// The platform hands out numeric references (typically 16 digits). They are
/// rendered without padding or separators, which is also the form used when
/// building job group keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(u64);

impl CaseId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for CaseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for CaseId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<CaseId> for u64 {
    fn from(value: CaseId) -> Self {
        value.0
    }
}

impl FromStr for CaseId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_id(format!("CaseId: not a case reference: {s:?}")));
        }
        let value = trimmed
            .parse::<u64>()
            .map_err(|_| DomainError::validation(format!("CaseId: out of range: {trimmed}")))?;
        Ok(Self(value))
    }
}
