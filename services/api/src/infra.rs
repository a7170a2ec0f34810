use chrono::NaiveDate;
use ivf_subsidy::calculator::SubsidyCalculator;
use ivf_subsidy::config::AppConfig;
use ivf_subsidy::error::AppError;
use ivf_subsidy::history::JsonFileHistoryStore;
use ivf_subsidy::subsidy::{EligibilityPolicy, SubsidyEvaluator, SubsidySchedule};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Active amount schedule: the configured override when present, otherwise the published tables.
pub(crate) fn load_schedule(config: &AppConfig) -> Result<SubsidySchedule, AppError> {
    match &config.rules.schedule_path {
        Some(path) => {
            let schedule = SubsidySchedule::from_path(path)?;
            info!(path = %path.display(), "loaded subsidy schedule override");
            Ok(schedule)
        }
        None => Ok(SubsidySchedule::standard()),
    }
}

pub(crate) fn build_calculator(
    config: &AppConfig,
) -> Result<SubsidyCalculator<JsonFileHistoryStore>, AppError> {
    let schedule = load_schedule(config)?;
    let evaluator = SubsidyEvaluator::new(EligibilityPolicy::default(), schedule);
    let store = Arc::new(JsonFileHistoryStore::new(&config.history.path));

    Ok(SubsidyCalculator::new(evaluator, store)
        .with_capacity(config.history.capacity)
        .with_cutover(config.rules.cutover))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Whole-currency amount with thousands separators, e.g. `150,000`.
pub(crate) fn format_amount(amount: u32) -> String {
    let digits = amount.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2025-06-15 "),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
        );
        assert!(parse_date("15/06/2025").is_err());
    }

    #[test]
    fn format_amount_groups_thousands() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(60_000), "60,000");
        assert_eq!(format_amount(150_000), "150,000");
        assert_eq!(format_amount(1_234_567), "1,234,567");
    }
}
