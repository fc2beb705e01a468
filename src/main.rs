use std::process::ExitCode;

use ghat::core::errors::GhatError;
use ghat::ui::output;

fn main() -> ExitCode {
    match ghat::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<GhatError>() {
                Some(ghat_err) if ghat_err.is_user_error() => output::error(ghat_err),
                _ => output::error(format!("{:?}", err)),
            }
            ExitCode::FAILURE
        }
    }
}
