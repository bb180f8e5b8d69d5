mod check;
mod cli;
mod infra;
mod routes;
mod server;

use ncc_compliance::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
