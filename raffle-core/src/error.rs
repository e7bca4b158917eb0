use thiserror::Error;

pub type Result<T> = std::result::Result<T, RaffleError>;

/// EIP-1193 code a wallet returns when the user dismisses its prompt.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Error, Debug)]
pub enum RaffleError {
    #[error("Wrong network: expected chain {expected}, wallet is on chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Request rejected in wallet")]
    UserRejected,

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("Indexer query failed: {}", .0.join("; "))]
    IndexerQuery(Vec<String>),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Action unavailable while {state}")]
    ActionUnavailable { state: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),
}

impl RaffleError {
    pub fn wallet(msg: impl Into<String>) -> Self {
        Self::Wallet(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    pub fn indexer(msg: impl Into<String>) -> Self {
        Self::Indexer(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn dialog(msg: impl Into<String>) -> Self {
        Self::Dialog(msg.into())
    }

    /// Failures the user must act on rather than wait out.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::WrongNetwork { .. })
    }
}

/// Maps a JSON-RPC failure from the wallet or node onto the error taxonomy.
pub(crate) fn from_rpc_error(err: &impl ethers::providers::RpcError, context: &str) -> RaffleError {
    match err.as_error_response() {
        Some(resp) if resp.code == USER_REJECTED_CODE => RaffleError::UserRejected,
        Some(resp) => RaffleError::wallet(format!("{}: {} (code {})", context, resp.message, resp.code)),
        None => RaffleError::wallet(format!("{}: {}", context, err)),
    }
}
