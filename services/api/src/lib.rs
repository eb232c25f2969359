mod cli;
mod infra;
mod plan;
mod routes;
mod server;

use mealwise::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
