use super::common::*;
use crate::calculator::{CalculatorError, SubsidyCalculator};
use crate::history::{EntryId, HistoryStore};
use crate::subsidy::{InputError, SchemeVersion, SubsidyEvaluator};
use std::sync::Arc;

#[test]
fn preview_does_not_record_history() {
    let (calculator, store) = build_calculator();

    let assessment = calculator.preview(&record()).expect("preview succeeds");

    assert!(assessment.result.eligible);
    assert_eq!(assessment.result.age, 34);
    assert_eq!(assessment.result.legacy_amount, 100_000);
    assert_eq!(assessment.result.current_amount, 150_000);
    assert!(store.entries().expect("entries").is_empty());
}

#[test]
fn preview_rejects_invalid_input() {
    let (calculator, _) = build_calculator();
    let mut record = record();
    record.treatment_count = 0;

    match calculator.preview(&record) {
        Err(CalculatorError::Input(InputError::TreatmentCount)) => {}
        other => panic!("expected input error, got {other:?}"),
    }
}

#[test]
fn governing_scheme_follows_the_cutover_date() {
    let (calculator, _) = build_calculator();

    let current = calculator.preview(&record()).expect("preview");
    assert_eq!(current.governing_scheme, SchemeVersion::Current);
    assert_eq!(current.governing_amount(), 150_000);

    let mut earlier = record();
    earlier.first_application_date = date(2024, 12, 31);
    let legacy = calculator.preview(&earlier).expect("preview");
    assert_eq!(legacy.governing_scheme, SchemeVersion::Legacy);
    assert_eq!(legacy.governing_amount(), 100_000);
    assert_eq!(legacy.result.current_amount, 150_000);
    assert!(legacy.scheme_note.contains("2.0"));
}

#[test]
fn calculate_records_newest_first() {
    let (calculator, store) = build_calculator();

    let first = calculator.calculate(record()).expect("first");
    let mut second_record = record();
    second_record.treatment_count = 2;
    let second = calculator.calculate(second_record).expect("second");

    assert!(first.persisted);
    assert!(second.persisted);
    let entries = store.entries().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, second.entry.id);
    assert_eq!(entries[1].id, first.entry.id);
    assert_eq!(entries[0].result.current_amount, 100_000);
}

#[test]
fn calculate_keeps_ten_entries() {
    let (calculator, store) = build_calculator();
    let oldest = calculator.calculate(record()).expect("oldest");
    for _ in 0..9 {
        calculator.calculate(record()).expect("fill");
    }

    let newest = calculator.calculate(record()).expect("eleventh");

    let entries = store.entries().expect("entries");
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0].id, newest.entry.id);
    assert!(entries.iter().all(|entry| entry.id != oldest.entry.id));
}

#[test]
fn calculate_honours_configured_capacity() {
    let (calculator, store) = build_calculator();
    let calculator = calculator.with_capacity(3);

    for _ in 0..5 {
        calculator.calculate(record()).expect("calculate");
    }

    assert_eq!(store.entries().expect("entries").len(), 3);
}

#[test]
fn calculate_survives_unavailable_storage() {
    let calculator = SubsidyCalculator::new(SubsidyEvaluator::default(), Arc::new(UnavailableStore));

    let calculation = calculator.calculate(record()).expect("evaluation still returned");

    assert!(!calculation.persisted);
    assert!(calculation.entry.result.eligible);
    assert_eq!(calculation.entry.result.current_amount, 150_000);
}

#[test]
fn ineligible_calculations_are_recorded_too() {
    let (calculator, store) = build_calculator();
    let mut record = record();
    record.birth_date = date(1979, 1, 1);

    let calculation = calculator.calculate(record).expect("calculate");

    assert!(!calculation.entry.result.eligible);
    assert_eq!(calculation.entry.result.age, 46);
    assert_eq!(store.entries().expect("entries").len(), 1);
}

#[test]
fn recall_and_replay_return_the_stored_record() {
    let (calculator, _) = build_calculator();
    let calculation = calculator.calculate(record()).expect("calculate");

    let recalled = calculator.recall(&calculation.entry.id).expect("recall");
    assert_eq!(recalled.record, record());

    let replayed = calculator.replay(&calculation.entry.id).expect("replay");
    assert_eq!(replayed.result, calculation.entry.result);
}

#[test]
fn recall_reports_unknown_ids() {
    let (calculator, _) = build_calculator();

    match calculator.recall(&EntryId("missing".to_string())) {
        Err(CalculatorError::NotFound(id)) => assert_eq!(id.0, "missing"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn clear_history_empties_the_store() {
    let (calculator, store) = build_calculator();
    calculator.calculate(record()).expect("calculate");

    calculator.clear_history().expect("clear");

    assert!(store.entries().expect("entries").is_empty());
}

#[test]
fn history_errors_propagate_from_reads() {
    let calculator = SubsidyCalculator::new(SubsidyEvaluator::default(), Arc::new(UnavailableStore));

    assert!(matches!(
        calculator.history(),
        Err(CalculatorError::History(_))
    ));
}
