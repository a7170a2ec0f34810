use serde::{Deserialize, Serialize};

use super::domain::AgeBand;

/// Statutory thresholds applied before any amount is looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPolicy {
    /// Applicants at or above this age are not covered.
    pub age_ceiling: u32,
    /// First age of the senior band.
    pub senior_band_start: u32,
    pub standard_cycle_limit: u8,
    pub senior_cycle_limit: u8,
    pub standard_transfer_limit: u8,
    pub senior_transfer_limit: u8,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            age_ceiling: 45,
            senior_band_start: 40,
            standard_cycle_limit: 6,
            senior_cycle_limit: 3,
            standard_transfer_limit: 1,
            senior_transfer_limit: 2,
        }
    }
}

impl EligibilityPolicy {
    pub fn band_for(&self, age: u32) -> AgeBand {
        if age >= self.senior_band_start {
            AgeBand::Senior
        } else {
            AgeBand::Standard
        }
    }

    pub fn cycle_limit(&self, band: AgeBand) -> u8 {
        match band {
            AgeBand::Standard => self.standard_cycle_limit,
            AgeBand::Senior => self.senior_cycle_limit,
        }
    }

    pub fn transfer_limit(&self, band: AgeBand) -> u8 {
        match band {
            AgeBand::Standard => self.standard_transfer_limit,
            AgeBand::Senior => self.senior_transfer_limit,
        }
    }

    /// Human readable age range for a band, e.g. `40-44`.
    pub fn band_label(&self, band: AgeBand) -> String {
        match band {
            AgeBand::Standard => format!("{} and under", self.senior_band_start.saturating_sub(1)),
            AgeBand::Senior => format!(
                "{}-{}",
                self.senior_band_start,
                self.age_ceiling.saturating_sub(1)
            ),
        }
    }
}

/// Why a record was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IneligibilityReason {
    AgeCeiling {
        age: u32,
        ceiling: u32,
    },
    CycleLimitExceeded {
        band: AgeBand,
        band_label: String,
        limit: u8,
        requested: u8,
    },
}

impl IneligibilityReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibilityReason::AgeCeiling { age, ceiling } => format!(
                "applicant must be under {ceiling} at first application (age {age})"
            ),
            IneligibilityReason::CycleLimitExceeded {
                band_label,
                limit,
                requested,
                ..
            } => format!(
                "applicants aged {band_label} are limited to {limit} subsidized cycles (requested cycle {requested})"
            ),
        }
    }
}

/// Runs the age ceiling and the banded cycle-count gates in order.
pub(crate) fn check_gates(
    policy: &EligibilityPolicy,
    age: u32,
    treatment_count: u8,
) -> Result<AgeBand, IneligibilityReason> {
    if age >= policy.age_ceiling {
        return Err(IneligibilityReason::AgeCeiling {
            age,
            ceiling: policy.age_ceiling,
        });
    }

    let band = policy.band_for(age);
    let limit = policy.cycle_limit(band);
    if treatment_count > limit {
        return Err(IneligibilityReason::CycleLimitExceeded {
            band,
            band_label: policy.band_label(band),
            limit,
            requested: treatment_count,
        });
    }

    Ok(band)
}
