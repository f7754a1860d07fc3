//! Loan application data model
//!
//! The single persisted entity and its owned value objects, plus the field
//! rules every committed record must satisfy.

mod model;
mod status;
pub mod validation;

pub use model::{ApplicationInput, LoanApplication, LoanTerms, Name, PersonalInformation};
pub use status::ApplicationStatus;
pub use validation::{validate, FieldViolation};
