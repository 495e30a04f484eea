use dokoiko_core::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A newer search started before this one settled; its result was dropped.
    #[error("search round {round_id} was superseded")]
    Superseded { round_id: u64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadMoreError {
    #[error("no completed search to continue")]
    NoActiveSearch,

    #[error("a load-more request is already in flight")]
    InFlight,

    #[error("load-more round {round_id} was superseded")]
    Superseded { round_id: u64 },
}
