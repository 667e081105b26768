use std::process::ExitCode;

use colored::Colorize;
use sage_chat::config::EnvConfig;
use sage_chat::controller::SessionController;
use sage_chat::{logging, repl, services};
use transcript_store::CONVERSATION_HISTORY_KEY;

fn main() -> ExitCode {
    let config = EnvConfig::from_env();
    logging::init(&config.log_filter);

    let service = match services::service_from_env(&config) {
        Ok(service) => service,
        Err(error) => {
            tracing::error!(%error, "failed to select generation service");
            eprintln!("{}", error.red());
            return ExitCode::FAILURE;
        }
    };
    let store = services::store_from_env(&config);
    let controller = SessionController::new(service, store, CONVERSATION_HISTORY_KEY);

    match repl::run(&controller) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "terminal session ended with an error");
            eprintln!("{}", format!("Error: {error}").red());
            ExitCode::FAILURE
        }
    }
}
