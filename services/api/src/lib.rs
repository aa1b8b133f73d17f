mod cli;
mod demo;
mod infra;
mod routes;
mod server;
mod stripe;

use tutorhive::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
