use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match filament_tracker::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("filament-tracker failed to start: {}", e);
            ExitCode::FAILURE
        }
    }
}
