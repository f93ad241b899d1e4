//! Domain primitives shared by every tribunal crate. No infrastructure here.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::CaseId;
