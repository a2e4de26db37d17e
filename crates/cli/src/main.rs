use std::process::ExitCode;

fn main() -> ExitCode {
    salesai_cli::run()
}
