use chrono::NaiveDate;

use crate::subsidy::domain::{ApplicantRecord, TreatmentStage};
use crate::subsidy::SubsidyEvaluator;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Record whose applicant is exactly `age` on the application date.
pub(super) fn record_aged(age: i32) -> ApplicantRecord {
    ApplicantRecord {
        birth_date: date(2025 - age, 3, 10),
        is_low_income: false,
        is_first_application: true,
        treatment_count: 1,
        stage: TreatmentStage::FullCycle,
        first_application_date: date(2025, 6, 1),
        transfer_date: Some(date(2025, 7, 15)),
    }
}

pub(super) fn record(age: i32, stage: TreatmentStage, treatment_count: u8) -> ApplicantRecord {
    ApplicantRecord {
        stage,
        treatment_count,
        ..record_aged(age)
    }
}

pub(super) fn evaluator() -> SubsidyEvaluator {
    SubsidyEvaluator::default()
}
