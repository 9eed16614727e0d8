use std::process::ExitCode;

use daybook::cli::{error_line, run_cli};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let result = run_cli().await.inspect_err(|e| {
        error!("Error running cli {e:?}");
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}
