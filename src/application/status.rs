//! Application status
//!
//! Stored and transmitted as its numeric code. No transition order is
//! enforced: any status may follow any other.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Lifecycle status of a loan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApplicationStatus {
    #[default]
    New = 0,
    Approved = 1,
    Funded = 2,
}

impl ApplicationStatus {
    /// Numeric wire code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Parse a numeric wire code
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(ApplicationStatus::New),
            1 => Some(ApplicationStatus::Approved),
            2 => Some(ApplicationStatus::Funded),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "New",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Funded => "Funded",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

struct StatusVisitor;

impl<'de> Visitor<'de> for StatusVisitor {
    type Value = ApplicationStatus;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an application status code (0 = New, 1 = Approved, 2 = Funded)")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        ApplicationStatus::from_code(v)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .ok()
            .and_then(ApplicationStatus::from_code)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_u64(StatusVisitor)
    }
}
