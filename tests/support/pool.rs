use std::io::Write;

use stacksmith::domain::{Player, PlayerPool, Position};
use tempfile::NamedTempFile;

/// (position, count per team, base salary, salary step)
const CLASSIC_DEPTH: [(Position, u32, u32, u32); 6] = [
    (Position::QB, 3, 5_400, 700),
    (Position::RB, 8, 4_000, 600),
    (Position::WR, 10, 3_500, 550),
    (Position::TE, 4, 3_000, 800),
    (Position::K, 2, 4_000, 300),
    (Position::DST, 3, 2_500, 500),
];

const CLASSIC_MATCHUPS: [(&str, &str); 5] = [
    ("KC", "BUF"),
    ("BUF", "KC"),
    ("PHI", "DAL"),
    ("DAL", "PHI"),
    ("SF", "KC"),
];

/// 150 players across 5 teams, 30 per team.
///
/// Scores scale with salary plus a deterministic spread so that no two
/// players share a projection.
pub fn classic_pool() -> PlayerPool {
    let mut players = Vec::new();
    for (t, (team, opponent)) in CLASSIC_MATCHUPS.iter().enumerate() {
        for (position, count, base, step) in CLASSIC_DEPTH {
            for i in 0..count {
                let salary = base + step * i + 100 * t as u32;
                let spread = ((t as u32 * 7 + i * 13) % 11) as f64 * 0.37;
                let score = f64::from(salary) / 400.0 + spread;
                let ownership = 0.02 + ((t as u32 * 5 + i * 3) % 9) as f64 * 0.04;
                let id = format!("{team}-{position}{i}");
                players.push(
                    Player::new(
                        id.clone(),
                        id,
                        *team,
                        *opponent,
                        position,
                        salary,
                        score,
                        ownership,
                    )
                    .with_ceiling(score * 1.4),
                );
            }
        }
    }
    PlayerPool::new(players).expect("classic pool is valid")
}

/// Single-game pool: `per_team` players on each of KC and BUF.
pub fn showdown_pool(per_team: usize) -> PlayerPool {
    const POSITIONS: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::WR,
        Position::TE,
        Position::K,
    ];
    let mut players = Vec::new();
    for (t, (team, opponent)) in [("KC", "BUF"), ("BUF", "KC")].iter().enumerate() {
        for i in 0..per_team {
            let position = POSITIONS[i % POSITIONS.len()];
            let salary = 4_000 + 900 * i as u32 + 200 * t as u32;
            let score = f64::from(salary) / 450.0 + (i % 3) as f64 * 0.8 + t as f64 * 0.3;
            let id = format!("{team}-{position}{i}");
            players.push(Player::new(
                id.clone(),
                id,
                *team,
                *opponent,
                position,
                salary,
                score,
                0.05 + 0.03 * i as f64,
            ));
        }
    }
    PlayerPool::new(players).expect("showdown pool is valid")
}

/// Eight showdown players of which only the six cheap ones fit under a
/// 50,000 cap together, so at most six distinct lineups exist.
pub fn narrow_showdown_pool() -> PlayerPool {
    let mut players = Vec::new();
    for i in 0..6 {
        let team = if i % 2 == 0 { "KC" } else { "BUF" };
        let opponent = if i % 2 == 0 { "BUF" } else { "KC" };
        players.push(Player::new(
            format!("cheap{i}"),
            format!("Cheap {i}"),
            team,
            opponent,
            Position::WR,
            7_500,
            15.0 + i as f64,
            0.1,
        ));
    }
    for i in 0..2 {
        players.push(Player::new(
            format!("pricey{i}"),
            format!("Pricey {i}"),
            "KC",
            "BUF",
            Position::RB,
            9_000,
            5.0,
            0.1,
        ));
    }
    PlayerPool::new(players).expect("narrow pool is valid")
}

/// Minimal classic pool: exactly one legal roster shape, every player at
/// the same ownership.
pub fn tight_classic_pool(ownership: f64) -> PlayerPool {
    let mut players = vec![
        Player::new("qb", "QB", "KC", "BUF", Position::QB, 6_000, 20.0, ownership),
        Player::new("te", "TE", "KC", "BUF", Position::TE, 4_000, 9.0, ownership),
        Player::new("dst", "DST", "BUF", "KC", Position::DST, 3_000, 7.0, ownership),
    ];
    for i in 0..3 {
        players.push(Player::new(
            format!("rb{i}"),
            "RB",
            "BUF",
            "KC",
            Position::RB,
            5_000,
            12.0,
            ownership,
        ));
        players.push(Player::new(
            format!("wr{i}"),
            "WR",
            "KC",
            "BUF",
            Position::WR,
            5_000,
            11.0,
            ownership,
        ));
    }
    PlayerPool::new(players).expect("tight pool is valid")
}

/// Write `pool` to a temporary JSON file.
pub fn write_pool(pool: &PlayerPool) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp pool");
    let json = serde_json::to_string(pool).expect("serialize pool");
    file.write_all(json.as_bytes()).expect("write temp pool");
    file
}

/// Write TOML content to a temporary config file.
pub fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}
