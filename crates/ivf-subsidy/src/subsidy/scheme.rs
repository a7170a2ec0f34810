use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Program generation an amount belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeVersion {
    /// Scheme "2.0".
    Legacy,
    /// Scheme "3.0".
    Current,
}

impl SchemeVersion {
    pub const ALL: [SchemeVersion; 2] = [SchemeVersion::Legacy, SchemeVersion::Current];

    pub const fn label(self) -> &'static str {
        match self {
            SchemeVersion::Legacy => "2.0",
            SchemeVersion::Current => "3.0",
        }
    }
}

impl fmt::Display for SchemeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First date on which applications fall under scheme 3.0.
pub const DEFAULT_CURRENT_SCHEME_START: (i32, u32, u32) = (2025, 1, 1);

/// Date rule deciding which scheme a caller should treat as authoritative.
///
/// The evaluator always returns both amounts; this only tells the
/// presentation layer which one to highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeCutover {
    pub current_from: NaiveDate,
}

impl Default for SchemeCutover {
    fn default() -> Self {
        let (year, month, day) = DEFAULT_CURRENT_SCHEME_START;
        Self {
            current_from: NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl SchemeCutover {
    pub fn new(current_from: NaiveDate) -> Self {
        Self { current_from }
    }

    pub fn governing(&self, first_application_date: NaiveDate) -> SchemeVersion {
        if first_application_date >= self.current_from {
            SchemeVersion::Current
        } else {
            SchemeVersion::Legacy
        }
    }

    pub fn note(&self, first_application_date: NaiveDate) -> String {
        match self.governing(first_application_date) {
            SchemeVersion::Current => format!(
                "first application on {first_application_date} falls under scheme 3.0 (applications from {})",
                self.current_from
            ),
            SchemeVersion::Legacy => format!(
                "first application on {first_application_date} predates scheme 3.0 (starts {}); scheme 2.0 applies",
                self.current_from
            ),
        }
    }
}
