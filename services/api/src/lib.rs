mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use deposit_disposition::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
