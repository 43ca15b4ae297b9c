//! Handler for the `check` command.

use crate::cli::optimize::{load_config, load_pool};
use crate::cli::{output, CheckArgs};
use crate::error::Result;

/// Validate configuration, and the configured rules against a pool when one is given.
pub fn execute(args: &CheckArgs) -> Result<()> {
    println!("Checking configuration: {}", args.config.display());

    let config = load_config(Some(args.config.as_path()))?;
    output::ok("Configuration file is valid");

    output::section("Summary");
    let rules = &config.contest.rules;
    output::key_value("Structure:", rules.structure);
    output::key_value("Mode:", rules.strategy_mode);
    output::key_value("Lineups:", config.contest.lineups);
    output::key_value("Salary cap:", rules.salary_cap);
    output::key_value(
        "Time budget:",
        format!(
            "{}s soft / {}s hard",
            config.optimizer.soft_time_limit_secs, config.optimizer.hard_time_limit_secs
        ),
    );
    output::key_value("Captains (K):", config.optimizer.captain_candidates);

    if let Some(ref path) = args.pool {
        println!();
        let pool = load_pool(path)?;
        rules.validate(&pool, config.contest.lineups)?;
        crate::engine::check_pool_coverage(&pool, rules.structure.groups())?;
        output::ok(&format!(
            "Rules are valid for {} players in {}",
            pool.len(),
            path.display()
        ));
    }

    println!();
    Ok(())
}
