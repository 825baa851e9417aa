use std::process::ExitCode;

use schema_extract::ExtractError;

#[tokio::main]
async fn main() -> ExitCode {
    match schema_extract::app::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            match err.downcast_ref::<ExtractError>() {
                Some(ExtractError::EmptySchema { .. }) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
