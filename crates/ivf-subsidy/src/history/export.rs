use std::io::Write;

use serde::Serialize;

use super::HistoryEntry;

/// Flattened row written for each history entry.
#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    id: &'a str,
    created_at: String,
    birth_date: String,
    first_application_date: String,
    transfer_date: String,
    stage: &'static str,
    treatment_count: u8,
    low_income: bool,
    age: u32,
    eligible: bool,
    legacy_amount: u32,
    current_amount: u32,
    transfer_limit: Option<u8>,
    message: &'a str,
}

impl<'a> From<&'a HistoryEntry> for HistoryRow<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        Self {
            id: &entry.id.0,
            created_at: entry.created_at.to_rfc3339(),
            birth_date: entry.record.birth_date.to_string(),
            first_application_date: entry.record.first_application_date.to_string(),
            transfer_date: entry
                .record
                .transfer_date
                .map(|date| date.to_string())
                .unwrap_or_default(),
            stage: entry.record.stage.label(),
            treatment_count: entry.record.treatment_count,
            low_income: entry.record.is_low_income,
            age: entry.result.age,
            eligible: entry.result.eligible,
            legacy_amount: entry.result.legacy_amount,
            current_amount: entry.result.current_amount,
            transfer_limit: entry.result.transfer_limit,
            message: entry.result.message.as_deref().unwrap_or_default(),
        }
    }
}

/// Writes the log as CSV with a header row, in log order.
pub fn write_csv<W: Write>(entries: &[HistoryEntry], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(HistoryRow::from(entry))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::entry;

    #[test]
    fn writes_header_and_one_row_per_entry() {
        let entries = vec![entry(2, 1), entry(1, 0)];
        let mut buffer = Vec::new();

        write_csv(&entries, &mut buffer).expect("csv written");

        let text = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,created_at,birth_date"));
        assert!(lines[1].contains("full_cycle"));
        assert!(lines[1].contains(",60000,100000,1,"));
        assert!(lines[2].contains(",100000,150000,1,"));
    }

    #[test]
    fn empty_log_writes_nothing() {
        let mut buffer = Vec::new();

        write_csv(&[], &mut buffer).expect("csv written");

        assert!(buffer.is_empty());
    }
}
