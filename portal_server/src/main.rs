use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // `run` logs its own failures.
    match portal_server::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
