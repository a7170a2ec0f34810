mod calculate;
mod cli;
mod infra;
mod routes;
mod server;

use ivf_subsidy::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
