//! Subsidy determination rules: age gating, banded cycle caps, and the
//! dual-scheme amount lookup.

pub mod domain;
pub mod policy;
pub mod schedule;
pub mod scheme;

#[cfg(test)]
mod tests;

pub use domain::{
    completed_years, AgeBand, ApplicantRecord, CycleTier, IncomeTier, InputError, TreatmentStage,
};
pub use policy::{EligibilityPolicy, IneligibilityReason};
pub use schedule::{ScheduleEntry, ScheduleError, ScheduleKey, SubsidySchedule};
pub use scheme::{SchemeCutover, SchemeVersion};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stateless evaluator applying the eligibility policy and amount schedule to a record.
#[derive(Debug, Clone, Default)]
pub struct SubsidyEvaluator {
    policy: EligibilityPolicy,
    schedule: SubsidySchedule,
}

impl SubsidyEvaluator {
    pub fn new(policy: EligibilityPolicy, schedule: SubsidySchedule) -> Self {
        Self { policy, schedule }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    pub fn schedule(&self) -> &SubsidySchedule {
        &self.schedule
    }

    /// Never fails: rejections come back as `eligible == false` with a message.
    pub fn evaluate(&self, record: &ApplicantRecord) -> EvaluationResult {
        let age = completed_years(record.birth_date, record.first_application_date);

        let band = match policy::check_gates(&self.policy, age, record.treatment_count) {
            Ok(band) => band,
            Err(reason) => {
                debug!(age, treatment_count = record.treatment_count, ?reason, "record ineligible");
                return EvaluationResult::ineligible(age, reason);
            }
        };

        let key = ScheduleKey {
            scheme: SchemeVersion::Legacy,
            income_tier: record.income_tier(),
            stage: record.stage,
            age_band: band,
            cycle_tier: record.cycle_tier(),
        };
        let legacy_amount = self.schedule.amount(key);
        let current_amount = self.schedule.amount(ScheduleKey {
            scheme: SchemeVersion::Current,
            ..key
        });

        debug!(
            age,
            ?band,
            stage = %record.stage,
            legacy_amount,
            current_amount,
            "record eligible"
        );

        EvaluationResult {
            age,
            eligible: true,
            message: None,
            reason: None,
            legacy_amount,
            current_amount,
            transfer_limit: Some(self.policy.transfer_limit(band)),
        }
    }
}

/// Verdict and amounts for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub age: u32,
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibilityReason>,
    /// Scheme 2.0 amount in whole TWD.
    pub legacy_amount: u32,
    /// Scheme 3.0 amount in whole TWD.
    pub current_amount: u32,
    /// Embryos permitted per transfer; absent for ineligible records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_limit: Option<u8>,
}

impl EvaluationResult {
    fn ineligible(age: u32, reason: IneligibilityReason) -> Self {
        Self {
            age,
            eligible: false,
            message: Some(reason.summary()),
            reason: Some(reason),
            legacy_amount: 0,
            current_amount: 0,
            transfer_limit: None,
        }
    }

    pub fn amount_for(&self, scheme: SchemeVersion) -> u32 {
        match scheme {
            SchemeVersion::Legacy => self.legacy_amount,
            SchemeVersion::Current => self.current_amount,
        }
    }
}
