//! Portfolio generation: distinctness, captain rotation and the anytime contract.

mod support;

use std::thread;
use std::time::Duration;

use stacksmith::domain::{
    ContestRules, PlayerId, PortfolioStatus, StackingRules, StopReason, StrategyMode,
};
use stacksmith::engine::{CancelFlag, EngineSettings, PortfolioGenerator, TimeBudget};
use stacksmith::error::{Error, InfeasibleReason, SettingsError};
use stacksmith::solver::{HiGHSSolver, IlpProblem, LpSolution, SolutionStatus, Solver};
use support::assertions::assert_valid_portfolio;
use support::pool::{classic_pool, narrow_showdown_pool, showdown_pool, tight_classic_pool};

fn generator() -> PortfolioGenerator {
    PortfolioGenerator::with_highs(EngineSettings::default()).expect("generator")
}

#[test]
fn classic_slate_fills_ten_distinct_lineups() {
    let pool = classic_pool();
    assert_eq!(pool.len(), 150);
    assert_eq!(pool.teams().len(), 5);

    let rules = ContestRules {
        salary_cap: 50_000,
        strategy_mode: StrategyMode::Balanced,
        ..ContestRules::classic()
    };
    let portfolio = generator()
        .generate(&pool, &rules, 10, TimeBudget::default())
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Complete);
    assert_eq!(portfolio.stop_reason, StopReason::Filled);
    assert_eq!(portfolio.count, 10);
    for lineup in &portfolio.lineups {
        assert_eq!(lineup.len(), 9);
        assert!(lineup.total_salary <= 50_000);
    }
    assert_valid_portfolio(&portfolio, &pool, &rules);
}

#[test]
fn classic_lineups_come_in_objective_order() {
    let pool = classic_pool();
    let rules = ContestRules::classic();
    let portfolio = generator()
        .generate(&pool, &rules, 5, TimeBudget::default())
        .unwrap();

    for pair in portfolio.lineups.windows(2) {
        assert!(pair[1].objective <= pair[0].objective + 1e-6);
    }
}

#[test]
fn showdown_portfolio_rotates_captains() {
    let pool = showdown_pool(6);
    assert_eq!(pool.len(), 12);

    let rules = ContestRules::showdown();
    let portfolio = generator()
        .generate(&pool, &rules, 5, TimeBudget::default())
        .unwrap();

    assert!(matches!(
        portfolio.status,
        PortfolioStatus::Complete | PortfolioStatus::Partial
    ));
    assert!(portfolio.count > 0);
    assert_valid_portfolio(&portfolio, &pool, &rules);
    for lineup in &portfolio.lineups {
        assert_eq!(lineup.len(), 6);
        assert_eq!(lineup.slots[0].slot, "CPT");
        assert!(lineup.captain_id.is_some());
    }

    // Five lineups over five candidates: nobody captains twice while others are unused.
    if portfolio.count == 5 {
        let mut captains: Vec<&PlayerId> = portfolio
            .lineups
            .iter()
            .filter_map(|l| l.captain_id.as_ref())
            .collect();
        captains.sort();
        captains.dedup();
        assert_eq!(captains.len(), 5);
    }
}

#[test]
fn locked_captain_anchors_every_lineup() {
    let pool = showdown_pool(6);
    let captain = pool.players()[3].id.clone();
    let rules = ContestRules {
        locked_captain_id: Some(captain.clone()),
        ..ContestRules::showdown()
    };
    let portfolio = generator()
        .generate(&pool, &rules, 4, TimeBudget::default())
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Complete);
    assert_valid_portfolio(&portfolio, &pool, &rules);
    assert!(portfolio
        .lineups
        .iter()
        .all(|l| l.captain_id.as_ref() == Some(&captain)));
}

#[test]
fn ownership_cap_below_pool_is_infeasible() {
    let pool = tight_classic_pool(0.20);
    let rules = ContestRules {
        max_avg_ownership: 0.05,
        ..ContestRules::classic()
    };
    let portfolio = generator()
        .generate(&pool, &rules, 3, TimeBudget::default())
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Infeasible);
    assert_eq!(portfolio.count, 0);
    assert_eq!(
        portfolio.stop_reason,
        StopReason::Infeasible(InfeasibleReason::Ownership)
    );
    assert_eq!(portfolio.infeasible_reason(), Some(InfeasibleReason::Ownership));
}

#[test]
fn narrow_showdown_pool_runs_out_of_lineups() {
    let pool = narrow_showdown_pool();
    assert_eq!(pool.len(), 8);

    let rules = ContestRules::showdown();
    let portfolio = generator()
        .generate(&pool, &rules, 20, TimeBudget::default())
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Partial);
    assert!(portfolio.count > 0 && portfolio.count < 20);
    assert_eq!(portfolio.stop_reason, StopReason::Exhausted);
    assert_valid_portfolio(&portfolio, &pool, &rules);
}

#[test]
fn classic_pool_with_one_lineup_stops_exhausted() {
    let pool = tight_classic_pool(0.1);
    let rules = ContestRules::classic();
    let portfolio = generator()
        .generate(&pool, &rules, 3, TimeBudget::default())
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Partial);
    assert_eq!(portfolio.count, 1);
    assert_eq!(portfolio.stop_reason, StopReason::Exhausted);
}

#[test]
fn stacked_portfolio_keeps_every_stack() {
    let pool = classic_pool();
    let rules = ContestRules {
        stacking: StackingRules {
            qb_wr_stack_enabled: true,
            bring_back_enabled: true,
        },
        max_players_per_team: Some(4),
        max_players_per_game: Some(6),
        ..ContestRules::classic()
    };
    let portfolio = generator()
        .generate(&pool, &rules, 4, TimeBudget::default())
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Complete);
    assert_valid_portfolio(&portfolio, &pool, &rules);
}

#[test]
fn repeated_requests_agree_on_first_lineup() {
    let pool = classic_pool();
    let rules = ContestRules {
        strategy_mode: StrategyMode::Tournament,
        ..ContestRules::classic()
    };
    let generator = generator();
    let first = generator
        .generate(&pool, &rules, 2, TimeBudget::default())
        .unwrap();
    let second = generator
        .generate(&pool, &rules, 2, TimeBudget::default())
        .unwrap();

    assert_eq!(first.lineups[0].key(), second.lineups[0].key());
    assert_eq!(first.lineups[0].slots, second.lineups[0].slots);
}

#[test]
fn cancelled_request_returns_empty_partial() {
    let pool = classic_pool();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let portfolio = generator()
        .generate_with_cancel(&pool, &ContestRules::classic(), 5, TimeBudget::default(), &cancel)
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Partial);
    assert_eq!(portfolio.count, 0);
    assert_eq!(portfolio.stop_reason, StopReason::Cancelled);
}

#[test]
fn expired_budget_returns_partial() {
    let pool = showdown_pool(6);
    let portfolio = generator()
        .generate(
            &pool,
            &ContestRules::showdown(),
            5,
            TimeBudget::fixed(Duration::from_nanos(1)),
        )
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Partial);
    assert_eq!(portfolio.stop_reason, StopReason::TimeBudget);
    assert!(portfolio.count < 5);
}

#[test]
fn invalid_settings_fail_before_solving() {
    let pool = classic_pool();
    let generator = generator();

    let err = generator
        .generate(&pool, &ContestRules::classic(), 0, TimeBudget::default())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Settings(SettingsError::LineupCountOutOfRange { requested: 0, .. })
    ));

    let rules = ContestRules {
        locked_captain_id: Some(pool.players()[0].id.clone()),
        ..ContestRules::classic()
    };
    let err = generator
        .generate(&pool, &rules, 1, TimeBudget::default())
        .unwrap_err();
    assert!(matches!(err, Error::Settings(SettingsError::LockedCaptainOnClassic)));

    let err = generator
        .generate(
            &pool,
            &ContestRules::classic(),
            1,
            TimeBudget::new(Duration::from_secs(10), Duration::from_secs(1)),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Settings(SettingsError::TimeBudget { .. })));
}

#[test]
fn concurrent_requests_share_a_generator() {
    let pool = showdown_pool(6);
    let rules = ContestRules::showdown();
    let generator = generator();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..3)
            .map(|_| s.spawn(|| generator.generate(&pool, &rules, 3, TimeBudget::default())))
            .collect();
        for handle in handles {
            let portfolio = handle.join().expect("thread").unwrap();
            assert_valid_portfolio(&portfolio, &pool, &rules);
        }
    });
}

#[test]
fn unaffordable_locked_captain_names_captain() {
    let pool = narrow_showdown_pool();
    let rules = ContestRules {
        locked_captain_id: Some(PlayerId::from("pricey0")),
        ..ContestRules::showdown()
    };
    let portfolio = generator()
        .generate(&pool, &rules, 3, TimeBudget::default())
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Infeasible);
    assert_eq!(portfolio.count, 0);
    assert_eq!(
        portfolio.stop_reason,
        StopReason::Infeasible(InfeasibleReason::Captain)
    );
}

#[test]
fn bring_back_only_portfolio_is_valid() {
    let pool = classic_pool();
    let rules = ContestRules {
        stacking: StackingRules {
            qb_wr_stack_enabled: false,
            bring_back_enabled: true,
        },
        ..ContestRules::classic()
    };
    let portfolio = generator()
        .generate(&pool, &rules, 4, TimeBudget::default())
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Complete);
    assert_valid_portfolio(&portfolio, &pool, &rules);
}

/// HiGHS backend that raises the cancel flag once its first solve returns.
struct CancelAfterFirstSolve {
    inner: HiGHSSolver,
    cancel: CancelFlag,
}

impl Solver for CancelAfterFirstSolve {
    fn name(&self) -> &'static str {
        "cancel-after-first"
    }

    fn solve_ilp(&self, problem: &IlpProblem) -> stacksmith::Result<LpSolution> {
        let solution = self.inner.solve_ilp(problem);
        self.cancel.cancel();
        solution
    }
}

#[test]
fn cancel_between_rounds_keeps_accepted_lineups() {
    let pool = classic_pool();
    let rules = ContestRules::classic();
    let cancel = CancelFlag::new();
    let backend = CancelAfterFirstSolve {
        inner: HiGHSSolver::new(),
        cancel: cancel.clone(),
    };
    let generator = PortfolioGenerator::new(Box::new(backend), EngineSettings::default()).unwrap();

    let portfolio = generator
        .generate_with_cancel(&pool, &rules, 5, TimeBudget::default(), &cancel)
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Partial);
    assert_eq!(portfolio.count, 1);
    assert_eq!(portfolio.stop_reason, StopReason::Cancelled);
    assert_valid_portfolio(&portfolio, &pool, &rules);
}

/// Backend that needs 80ms to prove infeasibility and honors its time limit.
struct SlowInfeasible;

const SLOW_SOLVE: Duration = Duration::from_millis(80);

impl Solver for SlowInfeasible {
    fn name(&self) -> &'static str {
        "slow-infeasible"
    }

    fn solve_ilp(&self, problem: &IlpProblem) -> stacksmith::Result<LpSolution> {
        let limit = problem.time_limit.unwrap_or(SLOW_SOLVE);
        thread::sleep(limit.min(SLOW_SOLVE));
        let status = if limit >= SLOW_SOLVE {
            SolutionStatus::Infeasible
        } else {
            SolutionStatus::TimeLimit
        };
        Ok(LpSolution {
            status,
            ..LpSolution::infeasible(problem.lp.num_vars())
        })
    }
}

#[test]
fn diagnosis_stops_at_hard_deadline() {
    let pool = tight_classic_pool(0.1);
    let generator = PortfolioGenerator::new(Box::new(SlowInfeasible), EngineSettings::default())
        .unwrap();

    let portfolio = generator
        .generate(
            &pool,
            &ContestRules::classic(),
            2,
            TimeBudget::fixed(Duration::from_millis(120)),
        )
        .unwrap();

    assert_eq!(portfolio.status, PortfolioStatus::Partial);
    assert_eq!(portfolio.count, 0);
    assert_eq!(portfolio.stop_reason, StopReason::TimeBudget);
    assert!(
        portfolio.elapsed_ms < 250,
        "ran {}ms past a 120ms budget",
        portfolio.elapsed_ms
    );
}
