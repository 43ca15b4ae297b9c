//! Handler for the `optimize` command.

use std::path::Path;

use tabled::{Table, Tabled};
use tracing::info;

use crate::cli::{output, OptimizeArgs};
use crate::config::Config;
use crate::domain::{Lineup, LineupPortfolio, PlayerId, PlayerPool, PortfolioStatus};
use crate::engine::PortfolioGenerator;
use crate::error::Result;

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Player")]
    name: String,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "Pos")]
    position: String,
    #[tabled(rename = "Salary")]
    salary: u32,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Own%")]
    ownership: String,
}

/// Load a configuration file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Read a player pool from a JSON file.
pub fn load_pool(path: &Path) -> Result<PlayerPool> {
    let content = std::fs::read_to_string(path)?;
    PlayerPool::from_json(&content)
}

/// Execute the optimize command and return the portfolio's status.
pub fn execute(args: &OptimizeArgs) -> Result<PortfolioStatus> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(lineups) = args.lineups {
        config.contest.lineups = lineups;
    }
    if let Some(mode) = args.mode {
        config.contest.rules.strategy_mode = mode;
    }
    if let Some(structure) = args.structure {
        config.contest.rules.structure = structure;
    }
    if let Some(ref captain) = args.captain {
        config.contest.rules.locked_captain_id = Some(PlayerId::from(captain.as_str()));
    }

    config.init_logging();

    let pool = load_pool(&args.pool)?;
    info!(
        pool = %args.pool.display(),
        players = pool.len(),
        lineups = config.contest.lineups,
        "optimize starting"
    );

    let generator = PortfolioGenerator::with_highs(config.engine_settings())?;
    let portfolio = generator.generate(
        &pool,
        &config.contest.rules,
        config.contest.lineups,
        config.optimizer.time_budget(),
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&portfolio)?);
    } else {
        print_portfolio(&portfolio);
    }

    Ok(portfolio.status)
}

fn print_portfolio(portfolio: &LineupPortfolio) {
    for (i, lineup) in portfolio.lineups.iter().enumerate() {
        output::section(&format!(
            "Lineup {} · salary {} · score {:.2} · avg own {:.1}%",
            i + 1,
            lineup.total_salary,
            lineup.total_score,
            lineup.avg_ownership * 100.0
        ));
        output::table(&lineup_table(lineup));
    }

    println!();
    let summary = format!(
        "{} of {} lineups ({}) in {} ms",
        portfolio.count, portfolio.requested, portfolio.status, portfolio.elapsed_ms
    );
    match portfolio.status {
        PortfolioStatus::Complete => output::ok(&summary),
        PortfolioStatus::Partial => {
            output::warn(&summary);
            output::key_value("Stopped:", portfolio.stop_reason);
        }
        PortfolioStatus::Infeasible => {
            output::error(&summary);
            output::key_value("Reason:", portfolio.stop_reason);
        }
    }
}

fn lineup_table(lineup: &Lineup) -> String {
    let rows = lineup.slots.iter().map(|s| SlotRow {
        slot: s.slot.clone(),
        name: s.name.clone(),
        team: s.team.to_string(),
        position: s.position.to_string(),
        salary: s.salary,
        score: format!("{:.2}", s.score),
        ownership: format!("{:.1}", s.ownership * 100.0),
    });
    Table::new(rows).to_string()
}
