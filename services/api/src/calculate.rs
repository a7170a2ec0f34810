use crate::infra::{build_calculator, format_amount, load_schedule, parse_date};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use ivf_subsidy::calculator::Assessment;
use ivf_subsidy::config::AppConfig;
use ivf_subsidy::error::AppError;
use ivf_subsidy::history::{export, EntryId, HistoryEntry};
use ivf_subsidy::subsidy::{
    ApplicantRecord, EvaluationResult, ScheduleEntry, SchemeVersion, TreatmentStage,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Applicant birth date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) birth_date: NaiveDate,
    /// First application date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) first_application_date: Option<NaiveDate>,
    /// Planned embryo transfer date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) transfer_date: Option<NaiveDate>,
    /// Ordinal of this treatment cycle (1-based)
    #[arg(long, default_value_t = 1)]
    pub(crate) treatment_count: u8,
    /// Treatment stage: full_cycle, retrieval_only or transfer_only
    #[arg(long, default_value = "full_cycle")]
    pub(crate) stage: TreatmentStage,
    /// Household is low-income or near-low-income
    #[arg(long)]
    pub(crate) low_income: bool,
    /// This is not the applicant's first subsidy application
    #[arg(long)]
    pub(crate) repeat_application: bool,
    /// Append the calculation to the history log
    #[arg(long)]
    pub(crate) record: bool,
    /// Print the result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum HistoryCommand {
    /// List recorded calculations, newest first
    List,
    /// Show one recorded calculation, including the inputs that produced it
    Show {
        /// Entry identifier as printed by `history list`
        id: String,
    },
    /// Remove every recorded calculation
    Clear,
    /// Export the history log as CSV
    Export {
        /// Destination file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ScheduleArgs {
    /// Print the schedule as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        birth_date,
        first_application_date,
        transfer_date,
        treatment_count,
        stage,
        low_income,
        repeat_application,
        record,
        json,
    } = args;

    let config = AppConfig::load()?;
    let calculator = build_calculator(&config)?;

    let applicant = ApplicantRecord {
        birth_date,
        is_low_income: low_income,
        is_first_application: !repeat_application,
        treatment_count,
        stage,
        first_application_date: first_application_date
            .unwrap_or_else(|| Local::now().date_naive()),
        transfer_date,
    };

    if record {
        let calculation = calculator.calculate(applicant)?;
        if json {
            print_json(&calculation)?;
        } else {
            render_result(
                &calculation.entry.record,
                &calculation.entry.result,
                calculation.governing_scheme,
                &calculation.scheme_note,
            );
            if calculation.persisted {
                println!(
                    "\nRecorded as {} in {}",
                    calculation.entry.id,
                    config.history.path.display()
                );
            } else {
                println!("\nHistory unavailable: calculation was not recorded");
            }
        }
        return Ok(());
    }

    let assessment: Assessment = calculator.preview(&applicant)?;
    if json {
        print_json(&assessment)?;
    } else {
        render_result(
            &applicant,
            &assessment.result,
            assessment.governing_scheme,
            &assessment.scheme_note,
        );
    }

    Ok(())
}

pub(crate) fn run_history(command: HistoryCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let calculator = build_calculator(&config)?;

    match command {
        HistoryCommand::List => {
            let entries = calculator.history()?;
            if entries.is_empty() {
                println!("No calculations recorded");
                return Ok(());
            }
            println!("Calculation history ({} of {} kept)", entries.len(), calculator.capacity());
            for entry in &entries {
                render_history_line(entry);
            }
        }
        HistoryCommand::Show { id } => {
            let entry = calculator.recall(&EntryId(id))?;
            println!(
                "Entry {} recorded {}",
                entry.id,
                entry.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
            let assessment = calculator.replay(&entry.id)?;
            render_result(
                &entry.record,
                &entry.result,
                assessment.governing_scheme,
                &assessment.scheme_note,
            );
            if assessment.result != entry.result {
                println!("\nNote: the active rules now give a different result:");
                render_amounts(&assessment.result);
            }
        }
        HistoryCommand::Clear => {
            calculator.clear_history()?;
            println!("Calculation history cleared");
        }
        HistoryCommand::Export { output } => {
            let entries = calculator.history()?;
            match output {
                Some(path) => {
                    let file = File::create(&path)?;
                    export::write_csv(&entries, BufWriter::new(file))?;
                    println!("Exported {} entries to {}", entries.len(), path.display());
                }
                None => export::write_csv(&entries, io::stdout().lock())?,
            }
        }
    }

    Ok(())
}

pub(crate) fn run_schedule(args: ScheduleArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let schedule = load_schedule(&config)?;
    let entries = schedule.entries();

    if args.json {
        return print_json(&entries);
    }

    render_schedule(&entries);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).map_err(io::Error::from)?;
    writeln!(handle)?;
    Ok(())
}

pub(crate) fn render_result(
    record: &ApplicantRecord,
    result: &EvaluationResult,
    governing_scheme: SchemeVersion,
    scheme_note: &str,
) {
    println!("IVF subsidy estimate");
    println!(
        "Applicant age {} at first application ({}) | cycle {} | {}",
        result.age,
        record.first_application_date,
        record.treatment_count,
        record.stage.program_label()
    );
    println!(
        "Household: {}",
        if record.is_low_income {
            "low or near-low income"
        } else {
            "general"
        }
    );

    if !result.eligible {
        println!("\nNot eligible");
        if let Some(message) = &result.message {
            println!("- {}", message);
        }
        return;
    }

    println!();
    render_amounts(result);
    if let Some(limit) = result.transfer_limit {
        println!("Embryos per transfer: up to {}", limit);
    }
    println!(
        "Governing scheme: {} ({})",
        governing_scheme.label(),
        scheme_note
    );
}

fn render_amounts(result: &EvaluationResult) {
    for scheme in SchemeVersion::ALL {
        println!(
            "- Subsidy {}: NT${}",
            scheme.label(),
            format_amount(result.amount_for(scheme))
        );
    }
}

fn render_history_line(entry: &HistoryEntry) {
    let verdict = if entry.result.eligible {
        format!("3.0: NT${}", format_amount(entry.result.current_amount))
    } else {
        "not eligible".to_string()
    };
    println!(
        "- {} | {} | {} cycle {} | {}",
        entry.id,
        entry.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        entry.record.stage,
        entry.record.treatment_count,
        verdict
    );
}

fn render_schedule(entries: &[ScheduleEntry]) {
    println!("Subsidy schedule (NT$)");
    let mut current_group = None;
    for entry in entries {
        let group = (entry.key.scheme, entry.key.income_tier);
        if current_group != Some(group) {
            println!(
                "\nScheme {} / {:?} households",
                entry.key.scheme.label(),
                entry.key.income_tier
            );
            current_group = Some(group);
        }
        println!(
            "- {:<15} {:<9} {:<14} {:>8}",
            entry.key.stage.label(),
            format!("{:?}", entry.key.age_band),
            format!("{:?}", entry.key.cycle_tier),
            format_amount(entry.amount)
        );
    }
}
