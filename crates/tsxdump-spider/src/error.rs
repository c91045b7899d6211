/// Every failure the spider can surface.
///
/// Only [`Error::Storage`] is fatal to a run; the rest are reported against the page or symbol
/// being processed, and the run moves on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never completed; DNS, connection, or body transfer failures.
    #[error("failed to fetch {url}, error({source})")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} responded with HTTP {status}")]
    Http { url: String, status: u16 },

    /// The page did not have the expected layout.
    #[error("unexpected page structure, {reason}")]
    Parse { reason: String },

    #[error("storage failure, error({0})")]
    Storage(#[from] sqlx::Error),

    #[error("page cache failure, error({0})")]
    Cache(#[from] std::io::Error),

    #[error("no company stored under symbol {0}")]
    UnknownSymbol(String),

    #[error("failed to build http client, error({0})")]
    Client(#[source] reqwest::Error),
}

impl Error {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        Error::Parse {
            reason: reason.into(),
        }
    }

    /// Storage failures abort the whole run; continuing would fail every later write the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
