use std::process::ExitCode;

use clap::Parser;
use stacksmith::cli::{check, modes, optimize, output, Cli, Commands};
use stacksmith::domain::PortfolioStatus;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Optimize(args) => optimize::execute(args).map(|status| match status {
            PortfolioStatus::Complete | PortfolioStatus::Partial => ExitCode::SUCCESS,
            PortfolioStatus::Infeasible => ExitCode::from(2),
        }),
        Commands::Check(args) => check::execute(args).map(|()| ExitCode::SUCCESS),
        Commands::Modes(args) => modes::execute(args).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
