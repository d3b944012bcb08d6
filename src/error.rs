//! Unified error types for the sweepstakes engine.

use thiserror::Error;

/// Unified error type for the sweepstakes engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Market data error.
    #[error("market error: {0}")]
    Market(#[from] MarketError),

    /// Probability derivation error.
    #[error("probability error: {0}")]
    Probability(#[from] ProbabilityError),

    /// Allocation error.
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),

    /// Reconciliation error.
    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Market fetch and parse errors.
#[derive(Error, Debug)]
pub enum MarketError {
    /// The market does not exist or is no longer resolvable.
    #[error("market {market_id} not found")]
    MarketNotFound {
        /// The market identifier that failed to resolve.
        market_id: String,
    },

    /// Failed to fetch market data.
    #[error("failed to fetch market {market_id}: {reason}")]
    FetchFailed {
        /// The market identifier that failed.
        market_id: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to parse market data.
    #[error("failed to parse market data: {0}")]
    ParseError(String),

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Probability derivation errors.
///
/// Insufficient liquidity on a single selection is not an error — it is
/// absorbed as zero probability mass. Only a market where nothing at all
/// can be priced fails, since normalization would divide by zero.
#[derive(Error, Debug)]
pub enum ProbabilityError {
    /// Every selection in the market was unpriceable.
    #[error("market overround is zero: none of the {num_selections} selections could be priced")]
    UnpriceableMarket {
        /// How many selections the market had.
        num_selections: usize,
    },
}

/// Allocation precondition and dispatch errors.
#[derive(Error, Debug)]
pub enum AllocationError {
    /// Fewer selections than participants.
    #[error("not enough selections for the number of participants: {num_selections} < {num_participants}")]
    NotEnoughSelections {
        /// Selections available.
        num_selections: usize,
        /// Participants requested.
        num_participants: usize,
    },

    /// Unrecognized allocation policy identifier.
    #[error("unknown allocation policy: {0:?}")]
    UnknownPolicy(String),

    /// No participants supplied.
    #[error("no participants supplied")]
    NoParticipants,

    /// Participant names must be unique within one allocation run.
    #[error("duplicate participant name: {0:?}")]
    DuplicateParticipant(String),
}

/// Reconciliation errors. Individual vanished selections are absorbed with a
/// zero probability record; only structural failures abort the cycle.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Refresh found no current market data; the sweepstake is left as-is.
    #[error("no market data for {market_id}; sweepstake left unmodified")]
    MarketNotFound {
        /// The market identifier the sweepstake tracks.
        market_id: String,
    },

    /// The sweepstake is closed and can no longer be refreshed.
    #[error("sweepstake {id} is not active")]
    Inactive {
        /// The inactive sweepstake identifier.
        id: String,
    },

    /// The sweepstake is not in the store.
    #[error("sweepstake {id} not found")]
    SweepstakeNotFound {
        /// The missing sweepstake identifier.
        id: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
