use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed: {status_text}")]
    Status { status: u16, status_text: String },

    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    GraphQl(String),

    #[error("Storefront access token is not configured")]
    MissingStorefrontToken,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

// Every variant ends up as the engine's `last_error` string.
#[derive(Error, Debug)]
pub enum VoteError {
    #[error("You have reached the maximum number of votes")]
    LimitReached,

    #[error("Voting is not enabled")]
    VotingDisabled,

    #[error("A vote is already being submitted")]
    SubmitInFlight,

    #[error(transparent)]
    Transport(#[from] ApiError),

    #[error("{0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum MountError {
    #[error("Invalid configuration for {container}: {reason}")]
    InvalidConfig { container: String, reason: String },
}
