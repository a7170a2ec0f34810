use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Applicant facts collected by the intake form for a single calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub birth_date: NaiveDate,
    pub is_low_income: bool,
    #[serde(default = "default_first_application")]
    pub is_first_application: bool,
    pub treatment_count: u8,
    pub stage: TreatmentStage,
    pub first_application_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_date: Option<NaiveDate>,
}

fn default_first_application() -> bool {
    true
}

impl ApplicantRecord {
    /// Form-level checks that must pass before the record reaches the evaluator.
    ///
    /// Counts above the program maximum are left alone: the evaluator answers
    /// them with an ineligible result rather than an input error.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.treatment_count == 0 {
            return Err(InputError::TreatmentCount);
        }

        if self.birth_date > self.first_application_date {
            return Err(InputError::BirthAfterApplication {
                birth_date: self.birth_date,
                first_application_date: self.first_application_date,
            });
        }

        if let Some(transfer_date) = self.transfer_date {
            if transfer_date < self.birth_date {
                return Err(InputError::TransferBeforeBirth {
                    birth_date: self.birth_date,
                    transfer_date,
                });
            }
        }

        Ok(())
    }

    pub fn income_tier(&self) -> IncomeTier {
        if self.is_low_income {
            IncomeTier::LowIncome
        } else {
            IncomeTier::General
        }
    }

    pub fn cycle_tier(&self) -> CycleTier {
        CycleTier::from_count(self.treatment_count)
    }
}

/// Completed years between `birth` and `on`, using the birthday-anniversary rule.
///
/// Saturates at zero when `birth` falls after `on`.
pub fn completed_years(birth: NaiveDate, on: NaiveDate) -> u32 {
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Treatment stage covered by a single subsidy claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentStage {
    /// Egg retrieval through embryo transfer.
    #[serde(alias = "取卵至形成胚胎植入")]
    FullCycle,
    /// Egg retrieval where transfer is not possible.
    #[serde(alias = "僅取卵 (因特定因素無法植入)")]
    RetrievalOnly,
    /// Transfer of previously stored embryos.
    #[serde(alias = "僅胚胎植入")]
    TransferOnly,
}

impl TreatmentStage {
    pub const ALL: [TreatmentStage; 3] = [
        TreatmentStage::FullCycle,
        TreatmentStage::RetrievalOnly,
        TreatmentStage::TransferOnly,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            TreatmentStage::FullCycle => "full_cycle",
            TreatmentStage::RetrievalOnly => "retrieval_only",
            TreatmentStage::TransferOnly => "transfer_only",
        }
    }

    /// Label printed on the program's own application form.
    pub const fn program_label(self) -> &'static str {
        match self {
            TreatmentStage::FullCycle => "取卵至形成胚胎植入",
            TreatmentStage::RetrievalOnly => "僅取卵 (因特定因素無法植入)",
            TreatmentStage::TransferOnly => "僅胚胎植入",
        }
    }
}

impl fmt::Display for TreatmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TreatmentStage {
    type Err = InputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        TreatmentStage::ALL
            .into_iter()
            .find(|stage| {
                stage.label().eq_ignore_ascii_case(trimmed)
                    || stage.label().replace('_', "-").eq_ignore_ascii_case(trimmed)
                    || stage.program_label() == trimmed
            })
            .ok_or_else(|| InputError::UnknownStage(trimmed.to_string()))
    }
}

/// Household income classification used by the amount tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTier {
    General,
    LowIncome,
}

impl IncomeTier {
    pub const ALL: [IncomeTier; 2] = [IncomeTier::General, IncomeTier::LowIncome];
}

/// Age band that decides cycle caps, transfer limits and current-scheme amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    /// 39 and under.
    Standard,
    /// 40 up to the age ceiling.
    Senior,
}

impl AgeBand {
    pub const ALL: [AgeBand; 2] = [AgeBand::Standard, AgeBand::Senior];
}

/// Grouping of the treatment ordinal used by the current scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTier {
    First,
    SecondToThird,
    FourthOnward,
}

impl CycleTier {
    pub const ALL: [CycleTier; 3] = [
        CycleTier::First,
        CycleTier::SecondToThird,
        CycleTier::FourthOnward,
    ];

    pub const fn from_count(count: u8) -> Self {
        match count {
            0 | 1 => CycleTier::First,
            2 | 3 => CycleTier::SecondToThird,
            _ => CycleTier::FourthOnward,
        }
    }

    pub const fn is_first(self) -> bool {
        matches!(self, CycleTier::First)
    }
}

/// Rejections raised before a record is handed to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("treatment count must be at least 1")]
    TreatmentCount,
    #[error("birth date {birth_date} is after first application date {first_application_date}")]
    BirthAfterApplication {
        birth_date: NaiveDate,
        first_application_date: NaiveDate,
    },
    #[error("transfer date {transfer_date} is before birth date {birth_date}")]
    TransferBeforeBirth {
        birth_date: NaiveDate,
        transfer_date: NaiveDate,
    },
    #[error("unknown treatment stage '{0}' (expected full_cycle, retrieval_only or transfer_only)")]
    UnknownStage(String),
}
