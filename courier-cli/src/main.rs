//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use courier_cli::CliError;

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on standard error"
)]
fn main() {
    match courier_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("courier: {err}");
            std::process::exit(1);
        }
    }
}
