//! Strategy mode listing.

use tabled::{Table, Tabled};

use crate::cli::optimize::load_config;
use crate::cli::{output, ConfigPathArg};
use crate::domain::StrategyMode;
use crate::error::Result;

#[derive(Tabled)]
struct ModeRow {
    #[tabled(rename = "Mode")]
    name: &'static str,
    #[tabled(rename = "Projection")]
    projection: &'static str,
    #[tabled(rename = "Leverage λ")]
    lambda: String,
}

/// List strategy modes with the coefficients from the given config.
pub fn execute(args: &ConfigPathArg) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    output::section("Strategy modes");
    let rows = StrategyMode::ALL.into_iter().map(|mode| ModeRow {
        name: mode.as_str(),
        projection: match mode {
            StrategyMode::Tournament => "ceiling",
            _ => "objective",
        },
        lambda: format!("{:.1}", config.leverage.lambda(mode)),
    });
    output::table(&Table::new(rows).to_string());
    println!();
    println!("  weight = projection - λ × ownership");
    println!();

    Ok(())
}
