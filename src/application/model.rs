//! Loan application records
//!
//! `LoanApplication` is the persisted shape. `ApplicationInput` is what a
//! caller submits: it never carries `dateApplied`, which only the store
//! assigns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::ApplicationStatus;

/// Applicant name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub first: String,
    pub last: String,
}

/// Loan amount and repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    /// Total loan amount
    pub amount: f64,
    /// Monthly payment amount
    pub monthly_payment: f64,
    /// Length of the loan in whole months
    pub terms: i32,
}

/// Applicant contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
    pub name: Name,
    pub phone_number: String,
    pub email: String,
}

/// A stored loan application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    /// Caller-assigned primary key
    pub application_number: String,
    pub loan_terms: LoanTerms,
    pub personal_information: PersonalInformation,
    /// Set once by the store at creation
    pub date_applied: DateTime<Utc>,
    pub status: ApplicationStatus,
}

/// A record as submitted by a caller.
///
/// Any `dateApplied` in the payload is ignored. `applicationNumber` may be
/// omitted on update, where the path key is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInput {
    #[serde(default)]
    pub application_number: String,
    pub loan_terms: LoanTerms,
    pub personal_information: PersonalInformation,
    #[serde(default)]
    pub status: ApplicationStatus,
}

impl ApplicationInput {
    /// Attach the store-assigned creation time.
    pub fn into_application(self, date_applied: DateTime<Utc>) -> LoanApplication {
        LoanApplication {
            application_number: self.application_number,
            loan_terms: self.loan_terms,
            personal_information: self.personal_information,
            date_applied,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "applicationNumber": "A-1001",
            "status": 1,
            "dateApplied": "2024-03-01T12:30:00Z",
            "loanTerms": { "amount": 15000.0, "monthlyPayment": 500.0, "terms": 36 },
            "personalInformation": {
                "name": { "first": "Jane", "last": "Doe" },
                "phoneNumber": "555-0100",
                "email": "jane@example.com"
            }
        })
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let app: LoanApplication = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(app.application_number, "A-1001");
        assert_eq!(app.status, ApplicationStatus::Approved);
        assert_eq!(app.loan_terms.monthly_payment, 500.0);
        assert_eq!(app.personal_information.phone_number, "555-0100");
        assert_eq!(
            app.date_applied,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
        );

        let back = serde_json::to_value(&app).unwrap();
        assert_eq!(back["loanTerms"]["monthlyPayment"], 500.0);
        assert_eq!(back["personalInformation"]["name"]["first"], "Jane");
        assert_eq!(back["status"], 1);
    }

    #[test]
    fn test_input_ignores_date_applied() {
        let input: ApplicationInput = serde_json::from_value(sample_json()).unwrap();
        let stamp = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let app = input.into_application(stamp);
        assert_eq!(app.date_applied, stamp);
    }

    #[test]
    fn test_input_defaults_key_and_status() {
        let mut value = sample_json();
        let obj = value.as_object_mut().unwrap();
        obj.remove("applicationNumber");
        obj.remove("status");

        let input: ApplicationInput = serde_json::from_value(value).unwrap();
        assert_eq!(input.application_number, "");
        assert_eq!(input.status, ApplicationStatus::New);
    }

    #[test]
    fn test_input_requires_nested_objects() {
        let mut value = sample_json();
        value.as_object_mut().unwrap().remove("loanTerms");
        assert!(serde_json::from_value::<ApplicationInput>(value).is_err());
    }

    #[test]
    fn test_fractional_terms_rejected() {
        let mut value = sample_json();
        value["loanTerms"]["terms"] = json!(12.5);
        assert!(serde_json::from_value::<ApplicationInput>(value).is_err());
    }
}
