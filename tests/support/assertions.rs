use std::collections::{HashMap, HashSet};

use stacksmith::domain::{
    captain_salary, ContestRules, Lineup, LineupPortfolio, PlayerPool, Position,
    CAPTAIN_MULTIPLIER,
};

const TOLERANCE: f64 = 1e-6;

/// Check every hard rule a single lineup must satisfy.
pub fn assert_valid_lineup(lineup: &Lineup, pool: &PlayerPool, rules: &ContestRules) {
    let slots = rules.structure.slots();
    assert_eq!(lineup.len(), slots.len(), "wrong slot count: {lineup:?}");
    assert!(
        lineup.total_salary <= rules.salary_cap,
        "salary {} over cap {}",
        lineup.total_salary,
        rules.salary_cap
    );

    let distinct: HashSet<_> = lineup.player_ids().collect();
    assert_eq!(distinct.len(), lineup.len(), "player used twice: {lineup:?}");

    let mut salary = 0;
    let mut score = 0.0;
    for (slot, filled) in slots.iter().zip(&lineup.slots) {
        assert_eq!(slot.name, filled.slot);
        let player = pool.get(&filled.player_id).expect("lineup player in pool");
        assert!(
            slot.accepts(player.position),
            "{} not eligible for {}",
            player.id,
            slot.name
        );
        if slot.captain {
            assert_eq!(filled.salary, captain_salary(player.salary));
            assert!((filled.score - player.objective_score * CAPTAIN_MULTIPLIER).abs() < TOLERANCE);
        } else {
            assert_eq!(filled.salary, player.salary);
            assert!((filled.score - player.objective_score).abs() < TOLERANCE);
        }
        salary += filled.salary;
        score += filled.score;
    }
    assert_eq!(lineup.total_salary, salary);
    assert!((lineup.total_score - score).abs() < TOLERANCE);

    assert!(
        lineup.avg_ownership <= rules.max_avg_ownership + TOLERANCE,
        "avg ownership {} over cap {}",
        lineup.avg_ownership,
        rules.max_avg_ownership
    );

    if let Some(limit) = rules.team_limit() {
        let mut per_team: HashMap<_, usize> = HashMap::new();
        for slot in &lineup.slots {
            *per_team.entry(slot.team.clone()).or_default() += 1;
        }
        assert!(per_team.values().all(|&n| n <= limit), "team cap broken: {per_team:?}");
    }

    if let Some(limit) = rules.game_limit() {
        let mut per_game: HashMap<_, usize> = HashMap::new();
        for id in lineup.player_ids() {
            let game = pool.get(id).expect("lineup player in pool").game_id();
            *per_game.entry(game).or_default() += 1;
        }
        assert!(per_game.values().all(|&n| n <= limit), "game cap broken: {per_game:?}");
    }

    if rules.stacking_rules().any() {
        assert_stacked(lineup, pool, rules);
    }
}

fn assert_stacked(lineup: &Lineup, pool: &PlayerPool, rules: &ContestRules) {
    let qb = lineup
        .slots
        .iter()
        .find(|s| s.position == Position::QB)
        .expect("classic lineup has a QB");
    let qb_player = pool.get(&qb.player_id).expect("QB in pool");

    if rules.stacking.qb_wr_stack_enabled {
        assert!(
            lineup
                .slots
                .iter()
                .any(|s| s.position.is_pass_catcher() && s.team == qb.team),
            "no pass catcher stacked with {}",
            qb.player_id
        );
    }
    if rules.stacking.bring_back_enabled {
        assert!(
            lineup.slots.iter().any(|s| s.team == qb_player.opponent),
            "no bring-back from {}",
            qb_player.opponent
        );
    }
}

/// Check the portfolio-level invariants plus every lineup.
pub fn assert_valid_portfolio(portfolio: &LineupPortfolio, pool: &PlayerPool, rules: &ContestRules) {
    assert_eq!(portfolio.count, portfolio.lineups.len());
    assert!(portfolio.count <= portfolio.requested);
    assert!(portfolio.all_distinct(), "duplicate lineups in portfolio");
    for lineup in &portfolio.lineups {
        assert_valid_lineup(lineup, pool, rules);
    }
}
