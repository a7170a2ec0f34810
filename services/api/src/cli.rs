use crate::calculate::{
    run_evaluate, run_history, run_schedule, EvaluateArgs, HistoryCommand, ScheduleArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use ivf_subsidy::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "IVF Subsidy Calculator",
    about = "Estimate IVF financial-assistance eligibility and amounts for schemes 2.0 and 3.0",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one applicant and print both scheme amounts
    Evaluate(EvaluateArgs),
    /// Inspect or manage the calculation history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Print the active amount schedule
    Schedule(ScheduleArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::History { command } => run_history(command),
        Command::Schedule(args) => run_schedule(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_evaluate_arguments() {
        let cli = Cli::try_parse_from([
            "ivf-subsidy-api",
            "evaluate",
            "--birth-date",
            "1988-02-10",
            "--first-application-date",
            "2025-05-01",
            "--treatment-count",
            "2",
            "--stage",
            "retrieval-only",
            "--low-income",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Evaluate(args)) => {
                assert_eq!(args.treatment_count, 2);
                assert!(args.low_income);
                assert!(!args.record);
                assert_eq!(
                    args.stage,
                    ivf_subsidy::subsidy::TreatmentStage::RetrievalOnly
                );
            }
            other => panic!("expected evaluate command, got {other:?}"),
        }
    }

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["ivf-subsidy-api"]).expect("parses");
        assert!(cli.command.is_none());
    }
}
