//! 0/1 integer program for a single lineup.
//!
//! One binary variable exists per (player, slot group) pair the player is
//! eligible for; ineligible pairs are simply absent, which fixes them at 0.
//! Constraints are grouped into [`ConstraintFamily`] values so the solver
//! can rebuild the program with a prefix of families enabled when it needs
//! to name the family responsible for an infeasible request.

use crate::domain::{
    captain_salary, ContestRules, Lineup, LineupSlot, PlayerPool, Position, SlotGroup,
    CAPTAIN_MULTIPLIER,
};
use crate::error::{Error, InfeasibleReason, Result};
use crate::solver::{Constraint, IlpProblem, LpProblem, LpSolution};

use super::scoring::LeverageConfig;

const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Largest objective bonus any one player gets for sorting early by id.
/// Small enough to only separate lineups whose scores tie.
const ID_TIE_BREAK: f64 = 1e-4;

/// A family of related hard constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    /// Slot counts and one-slot-per-player.
    Positions,
    Salary,
    /// Per-team and per-game caps.
    Exposure,
    Ownership,
    Stacking,
    /// Pinned captain.
    Captain,
    /// No-good cuts against earlier lineups.
    Exclusions,
}

impl ConstraintFamily {
    /// Order in which families are layered during diagnosis.
    pub const ORDER: [ConstraintFamily; 7] = [
        ConstraintFamily::Positions,
        ConstraintFamily::Salary,
        ConstraintFamily::Exposure,
        ConstraintFamily::Ownership,
        ConstraintFamily::Stacking,
        ConstraintFamily::Captain,
        ConstraintFamily::Exclusions,
    ];

    pub fn reason(&self) -> InfeasibleReason {
        match self {
            Self::Positions => InfeasibleReason::PositionCoverage,
            Self::Salary => InfeasibleReason::Salary,
            Self::Exposure => InfeasibleReason::Exposure,
            Self::Ownership => InfeasibleReason::Ownership,
            Self::Stacking => InfeasibleReason::Stacking,
            Self::Captain => InfeasibleReason::Captain,
            Self::Exclusions => InfeasibleReason::Exhausted,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Var {
    player: usize,
    group: usize,
}

/// Fail fast when the pool cannot fill the roster at all.
///
/// For every slot group, the players eligible for it must cover that group
/// plus every other group whose eligible positions are a subset of it.
pub fn check_pool_coverage(pool: &PlayerPool, groups: &[SlotGroup]) -> Result<()> {
    for group in groups {
        let available = pool.iter().filter(|p| group.accepts(p.position)).count();
        let required: usize = groups
            .iter()
            .filter(|other| other.eligible.iter().all(|pos| group.eligible.contains(pos)))
            .map(|other| other.count)
            .sum();

        if available < required {
            return Err(Error::PoolInsufficient {
                slot: group.name.to_string(),
                required,
                available,
            });
        }
    }
    Ok(())
}

/// Variable layout and coefficients for one request's lineup program.
///
/// Built once per request; [`LineupModel::build`] then produces a fresh
/// [`IlpProblem`] for every solve.
pub struct LineupModel<'a> {
    pool: &'a PlayerPool,
    rules: &'a ContestRules,
    groups: &'static [SlotGroup],
    vars: Vec<Var>,
    by_player: Vec<Vec<usize>>,
    weights: Vec<f64>,
}

impl<'a> LineupModel<'a> {
    pub fn new(pool: &'a PlayerPool, rules: &'a ContestRules, leverage: &LeverageConfig) -> Self {
        let groups = rules.structure.groups();
        let mut vars = Vec::new();
        let mut by_player = vec![Vec::new(); pool.len()];

        for (p, player) in pool.iter().enumerate() {
            for (g, group) in groups.iter().enumerate() {
                if group.accepts(player.position) {
                    by_player[p].push(vars.len());
                    vars.push(Var { player: p, group: g });
                }
            }
        }

        let weights = pool
            .iter()
            .map(|p| leverage.objective_weight(p, rules.strategy_mode))
            .collect();

        Self {
            pool,
            rules,
            groups,
            vars,
            by_player,
            weights,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn pool(&self) -> &PlayerPool {
        self.pool
    }

    pub fn rules(&self) -> &ContestRules {
        self.rules
    }

    fn captain_group(&self) -> Option<usize> {
        self.groups.iter().position(|g| g.captain)
    }

    fn cost(&self, var: &Var) -> f64 {
        let salary = self.pool.players()[var.player].salary;
        if self.groups[var.group].captain {
            f64::from(captain_salary(salary))
        } else {
            f64::from(salary)
        }
    }

    fn objective_coefficient(&self, var: &Var) -> f64 {
        let weight = self.weights[var.player];
        if self.groups[var.group].captain {
            weight * CAPTAIN_MULTIPLIER
        } else {
            weight
        }
    }

    /// Terms selecting player `p` in any group, with coefficient `coef`.
    fn player_terms(&self, p: usize, coef: f64) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.by_player[p].iter().map(move |&v| (v, coef))
    }

    /// Build the program with `families` enabled.
    ///
    /// `exclusions` are earlier lineups the result must differ from;
    /// `fixed_captain` is a pool index pinned to the captain slot.
    pub fn build(
        &self,
        families: &[ConstraintFamily],
        exclusions: &[&Lineup],
        fixed_captain: Option<usize>,
    ) -> IlpProblem {
        let mut lp = LpProblem::new(self.vars.len()).maximize();
        let n = self.pool.len() as f64;
        lp.objective = self
            .vars
            .iter()
            .map(|v| self.objective_coefficient(v) + ID_TIE_BREAK * (n - v.player as f64) / n)
            .collect();

        for family in families {
            match family {
                ConstraintFamily::Positions => self.add_position_constraints(&mut lp),
                ConstraintFamily::Salary => self.add_salary_constraint(&mut lp),
                ConstraintFamily::Exposure => self.add_exposure_constraints(&mut lp),
                ConstraintFamily::Ownership => self.add_ownership_constraint(&mut lp),
                ConstraintFamily::Stacking => self.add_stacking_constraints(&mut lp),
                ConstraintFamily::Captain => self.add_captain_constraint(&mut lp, fixed_captain),
                ConstraintFamily::Exclusions => self.add_exclusion_cuts(&mut lp, exclusions),
            }
        }

        IlpProblem::all_binary(lp)
    }

    fn add_position_constraints(&self, lp: &mut LpProblem) {
        for (g, group) in self.groups.iter().enumerate() {
            let terms: Vec<(usize, f64)> = self
                .vars
                .iter()
                .enumerate()
                .filter(|(_, var)| var.group == g)
                .map(|(i, _)| (i, 1.0))
                .collect();
            lp.add_constraint(Constraint::eq(terms, group.count as f64));
        }

        for vars in self.by_player.iter().filter(|v| v.len() > 1) {
            let terms = vars.iter().map(|&v| (v, 1.0)).collect();
            lp.add_constraint(Constraint::leq(terms, 1.0));
        }
    }

    fn add_salary_constraint(&self, lp: &mut LpProblem) {
        let terms = self
            .vars
            .iter()
            .enumerate()
            .map(|(i, var)| (i, self.cost(var)))
            .collect();
        lp.add_constraint(Constraint::leq(terms, f64::from(self.rules.salary_cap)));
    }

    fn add_exposure_constraints(&self, lp: &mut LpProblem) {
        if let Some(limit) = self.rules.team_limit() {
            for team in self.pool.teams() {
                let terms: Vec<(usize, f64)> = self
                    .pool
                    .iter()
                    .enumerate()
                    .filter(|(_, player)| player.team == team)
                    .flat_map(|(p, _)| self.player_terms(p, 1.0))
                    .collect();
                if !terms.is_empty() {
                    lp.add_constraint(Constraint::leq(terms, limit as f64));
                }
            }
        }

        if let Some(limit) = self.rules.game_limit() {
            for game in self.pool.games() {
                let terms: Vec<(usize, f64)> = self
                    .pool
                    .iter()
                    .enumerate()
                    .filter(|(_, player)| player.game_id() == game)
                    .flat_map(|(p, _)| self.player_terms(p, 1.0))
                    .collect();
                if !terms.is_empty() {
                    lp.add_constraint(Constraint::leq(terms, limit as f64));
                }
            }
        }
    }

    fn add_ownership_constraint(&self, lp: &mut LpProblem) {
        if self.rules.max_avg_ownership >= 1.0 {
            return;
        }
        let slot_count = self.rules.structure.slot_count() as f64;
        let terms = self
            .vars
            .iter()
            .enumerate()
            .map(|(i, var)| (i, self.pool.players()[var.player].ownership_fraction))
            .collect();
        lp.add_constraint(Constraint::leq(
            terms,
            self.rules.max_avg_ownership * slot_count,
        ));
    }

    /// For each QB q: `y[q] <= sum(y[p])` over its stack partners, where
    /// `y[p]` is the sum of p's slot variables.
    fn add_stacking_constraints(&self, lp: &mut LpProblem) {
        let stacking = self.rules.stacking_rules();
        if !stacking.any() {
            return;
        }

        let players = self.pool.players();
        for (q, qb) in players.iter().enumerate() {
            if qb.position != Position::QB || self.by_player[q].is_empty() {
                continue;
            }

            if stacking.qb_wr_stack_enabled {
                let mut terms: Vec<(usize, f64)> = self.player_terms(q, 1.0).collect();
                for (p, mate) in players.iter().enumerate() {
                    if mate.team == qb.team && mate.position.is_pass_catcher() {
                        terms.extend(self.player_terms(p, -1.0));
                    }
                }
                lp.add_constraint(Constraint::leq(terms, 0.0));
            }

            if stacking.bring_back_enabled {
                let mut terms: Vec<(usize, f64)> = self.player_terms(q, 1.0).collect();
                for (p, opp) in players.iter().enumerate() {
                    if opp.team == qb.opponent {
                        terms.extend(self.player_terms(p, -1.0));
                    }
                }
                lp.add_constraint(Constraint::leq(terms, 0.0));
            }
        }
    }

    fn add_captain_constraint(&self, lp: &mut LpProblem, fixed_captain: Option<usize>) {
        let (Some(captain), Some(group)) = (fixed_captain, self.captain_group()) else {
            return;
        };
        match self.var_index(captain, group) {
            Some(v) => lp.add_constraint(Constraint::eq(vec![(v, 1.0)], 1.0)),
            // Captain has no captain-eligible variable: force infeasibility.
            None => lp.add_constraint(Constraint::eq(vec![], 1.0)),
        }
    }

    /// No-good cut per earlier lineup: at most `len - 1` of its
    /// (player, role) selections may repeat. The captain's role is the
    /// captain group; every other player counts in any non-captain group.
    fn add_exclusion_cuts(&self, lp: &mut LpProblem, exclusions: &[&Lineup]) {
        let captain_group = self.captain_group();
        for lineup in exclusions {
            let mut terms = Vec::with_capacity(lineup.len());
            for slot in &lineup.slots {
                let Some(p) = self.pool.index_of(&slot.player_id) else {
                    continue;
                };
                if slot.captain {
                    if let Some(v) = captain_group.and_then(|g| self.var_index(p, g)) {
                        terms.push((v, 1.0));
                    }
                } else {
                    terms.extend(
                        self.by_player[p]
                            .iter()
                            .filter(|&&v| Some(self.vars[v].group) != captain_group)
                            .map(|&v| (v, 1.0)),
                    );
                }
            }
            lp.add_constraint(Constraint::leq(terms, lineup.len() as f64 - 1.0));
        }
    }

    fn var_index(&self, player: usize, group: usize) -> Option<usize> {
        self.by_player[player]
            .iter()
            .copied()
            .find(|&v| self.vars[v].group == group)
    }

    /// Turn a solver solution into a lineup, re-checking it against every
    /// constraint of `problem`.
    pub fn decode(&self, problem: &IlpProblem, solution: &LpSolution) -> Result<Lineup> {
        let values: Vec<f64> = solution
            .values
            .iter()
            .map(|v| if *v > 0.5 { 1.0 } else { 0.0 })
            .collect();

        if values.len() != self.vars.len() {
            return Err(Error::Solver(format!(
                "solution has {} values, model has {} variables",
                values.len(),
                self.vars.len()
            )));
        }

        if let Some(violated) = problem
            .lp
            .constraints
            .iter()
            .find(|c| !c.is_satisfied(&values, FEASIBILITY_TOLERANCE))
        {
            return Err(Error::Solver(format!(
                "rounded solution violates a {:?} constraint (lhs {:.4}, rhs {:.4})",
                violated.sense,
                violated.lhs(&values),
                violated.rhs
            )));
        }

        let slots = self.rules.structure.slots();
        let players = self.pool.players();
        let mut filled = Vec::with_capacity(slots.len());
        let mut objective = 0.0;
        let mut slot_iter = slots.iter();

        for (g, group) in self.groups.iter().enumerate() {
            // Vars are laid out player-major, so this is already id order.
            let chosen: Vec<&Var> = self
                .vars
                .iter()
                .zip(&values)
                .filter(|(var, value)| var.group == g && **value > 0.5)
                .map(|(var, _)| var)
                .collect();

            if chosen.len() != group.count {
                return Err(Error::Solver(format!(
                    "group {} decoded {} players, expected {}",
                    group.name,
                    chosen.len(),
                    group.count
                )));
            }

            for var in chosen {
                let slot = slot_iter.next().ok_or_else(|| {
                    Error::Solver("decoded more players than roster slots".to_string())
                })?;
                objective += self.objective_coefficient(var);
                filled.push(LineupSlot::new(slot, &players[var.player]));
            }
        }

        Ok(Lineup::new(filled, objective))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContestStructure, Player, StackingRules};

    fn classic_pool() -> PlayerPool {
        let mut players = vec![
            Player::new("qb1", "qb1", "KC", "BUF", Position::QB, 7000, 22.0, 0.2),
            Player::new("dst1", "dst1", "BUF", "KC", Position::DST, 3000, 8.0, 0.1),
            Player::new("k1", "k1", "KC", "BUF", Position::K, 4500, 8.0, 0.1),
        ];
        for i in 0..3 {
            players.push(Player::new(
                format!("rb{i}"),
                "rb",
                "KC",
                "BUF",
                Position::RB,
                5000,
                14.0,
                0.1,
            ));
            players.push(Player::new(
                format!("wr{i}"),
                "wr",
                "BUF",
                "KC",
                Position::WR,
                5000,
                13.0,
                0.1,
            ));
        }
        players.push(Player::new("wr9", "wr", "KC", "BUF", Position::WR, 4000, 9.0, 0.1));
        players.push(Player::new("te1", "te1", "KC", "BUF", Position::TE, 4000, 9.0, 0.1));
        PlayerPool::new(players).unwrap()
    }

    #[test]
    fn test_variables_only_for_eligible_pairs() {
        let pool = classic_pool();
        let rules = ContestRules::classic();
        let model = LineupModel::new(&pool, &rules, &LeverageConfig::default());
        // qb 1 + dst 1 + k 0 + 3 rb * 2 + 4 wr * 2 + te 2
        assert_eq!(model.num_vars(), 1 + 1 + 6 + 8 + 2);
    }

    #[test]
    fn test_pool_coverage_flags_flex_shortfall() {
        let pool = PlayerPool::new(vec![
            Player::new("qb1", "qb1", "KC", "BUF", Position::QB, 7000, 22.0, 0.2),
            Player::new("rb1", "rb1", "KC", "BUF", Position::RB, 7000, 22.0, 0.2),
        ])
        .unwrap();
        let err = check_pool_coverage(&pool, ContestStructure::Classic.groups()).unwrap_err();
        assert!(matches!(
            err,
            Error::PoolInsufficient { ref slot, required: 2, available: 1 } if slot == "RB"
        ));
    }

    #[test]
    fn test_pool_coverage_showdown_needs_six() {
        let players = (0..5)
            .map(|i| Player::new(format!("p{i}"), "p", "KC", "BUF", Position::WR, 5000, 10.0, 0.1))
            .collect();
        let pool = PlayerPool::new(players).unwrap();
        let err = check_pool_coverage(&pool, ContestStructure::Showdown.groups()).unwrap_err();
        assert!(matches!(err, Error::PoolInsufficient { required: 6, available: 5, .. }));
    }

    #[test]
    fn test_build_counts_constraints_per_family() {
        let pool = classic_pool();
        let rules = ContestRules {
            max_players_per_team: Some(4),
            max_avg_ownership: 0.5,
            stacking: StackingRules {
                qb_wr_stack_enabled: true,
                bring_back_enabled: true,
            },
            ..ContestRules::classic()
        };
        let model = LineupModel::new(&pool, &rules, &LeverageConfig::default());

        let positions = model.build(&[ConstraintFamily::Positions], &[], None);
        // 6 group equalities + one-slot rows for 3 rb, 4 wr, 1 te
        assert_eq!(positions.lp.constraints.len(), 6 + 8);

        let all = model.build(&ConstraintFamily::ORDER, &[], None);
        // + salary + 2 teams + ownership + 2 stacking rows for the single QB
        assert_eq!(all.lp.constraints.len(), 14 + 1 + 2 + 1 + 2);
        assert_eq!(all.integer_vars.len(), model.num_vars());
    }

    #[test]
    fn test_captain_coefficients_scaled() {
        let players = (0..6)
            .map(|i| {
                Player::new(format!("p{i}"), "p", "KC", "BUF", Position::WR, 10_000, 10.0, 0.0)
            })
            .collect();
        let pool = PlayerPool::new(players).unwrap();
        let rules = ContestRules {
            strategy_mode: crate::domain::StrategyMode::Chalk,
            ..ContestRules::showdown()
        };
        let model = LineupModel::new(&pool, &rules, &LeverageConfig::default());
        let problem = model.build(&[ConstraintFamily::Salary], &[], None);

        // p0 CPT var is index 0, p0 FLEX var index 1
        assert!((problem.lp.objective[0] - 15.0).abs() < 1e-3);
        assert!((problem.lp.objective[1] - 10.0).abs() < 1e-3);
        let salary = &problem.lp.constraints[0];
        assert!(salary.terms.contains(&(0, 15_000.0)));
        assert!(salary.terms.contains(&(1, 10_000.0)));
    }

    #[test]
    fn test_equal_players_favor_lower_id() {
        let players = (0..6)
            .map(|i| {
                Player::new(format!("p{i}"), "p", "KC", "BUF", Position::WR, 10_000, 10.0, 0.0)
            })
            .collect();
        let pool = PlayerPool::new(players).unwrap();
        let rules = ContestRules {
            strategy_mode: crate::domain::StrategyMode::Chalk,
            ..ContestRules::showdown()
        };
        let model = LineupModel::new(&pool, &rules, &LeverageConfig::default());
        let problem = model.build(&[], &[], None);

        // p0 FLEX is index 1, p1 FLEX is index 3
        assert!(problem.lp.objective[1] > problem.lp.objective[3]);
        assert!(problem.lp.objective[0] > problem.lp.objective[2]);
    }
}
