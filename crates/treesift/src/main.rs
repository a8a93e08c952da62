use std::process::ExitCode;

use clap::Parser;
use treesift::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    treesift::init(cli.log_level);

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(cli::exit_code(&err))
        }
    }
}
