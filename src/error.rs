use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Malformed or out-of-range optimization settings.
///
/// These are raised before any solve is attempted and are always
/// recoverable by the caller correcting its input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("salary cap must be positive")]
    NonPositiveSalaryCap,

    #[error("lineup count {requested} is outside [{min}, {max}]")]
    LineupCountOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },

    #[error("max average ownership {value} is outside [0, 1]")]
    OwnershipCapOutOfRange { value: f64 },

    #[error("max players per team {limit} is below the required minimum {required}")]
    TeamLimitTooLow { limit: usize, required: usize },

    #[error("max players per game {limit} is below the required minimum {required}")]
    GameLimitTooLow { limit: usize, required: usize },

    #[error("locked captain '{id}' is not in the player pool")]
    UnknownLockedCaptain { id: String },

    #[error("a locked captain only applies to showdown contests")]
    LockedCaptainOnClassic,

    #[error("player id '{id}' appears more than once in the pool")]
    DuplicatePlayer { id: String },

    #[error("player '{id}' is invalid: {reason}")]
    InvalidPlayer { id: String, reason: String },

    #[error("invalid time budget: {reason}")]
    TimeBudget { reason: String },
}

/// The constraint family that made a lineup impossible to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// Required slots cannot be filled with eligible, distinct players.
    PositionCoverage,
    /// Every position-valid roster exceeds the salary cap.
    Salary,
    /// Per-team or per-game player caps cannot be met.
    Exposure,
    /// Every remaining roster exceeds the average ownership cap.
    Ownership,
    /// QB stack or bring-back requirements cannot be met.
    Stacking,
    /// The pinned captain cannot anchor any valid lineup.
    Captain,
    /// No lineup distinct from the ones already produced remains.
    Exhausted,
}

impl InfeasibleReason {
    /// Short machine-readable label used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PositionCoverage => "position_coverage",
            Self::Salary => "salary",
            Self::Exposure => "exposure",
            Self::Ownership => "ownership",
            Self::Stacking => "stacking",
            Self::Captain => "captain",
            Self::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("no valid lineup: {reason} constraint cannot be satisfied")]
    Infeasible { reason: InfeasibleReason },

    #[error("pool has {available} players eligible for {slot}, {required} required")]
    PoolInsufficient {
        slot: String,
        required: usize,
        available: usize,
    },

    #[error("solver error: {0}")]
    Solver(String),

    /// The hard time limit passed before a solve could prove its result.
    #[error("hard time limit reached before the solve finished")]
    DeadlineExceeded,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The infeasibility category, if this error is one.
    pub fn infeasible_reason(&self) -> Option<InfeasibleReason> {
        match self {
            Self::Infeasible { reason } => Some(*reason),
            _ => None,
        }
    }
}

impl From<InfeasibleReason> for Error {
    fn from(reason: InfeasibleReason) -> Self {
        Error::Infeasible { reason }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
