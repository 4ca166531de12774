use thiserror::Error;

/// Boxed error produced by an executor branch.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    /// The data or count branch of the underlying query failed. The
    /// original failure is forwarded unchanged; no partial envelope is
    /// ever produced from the surviving branch.
    #[error("upstream query failed: {0}")]
    Upstream(#[source] BoxError),
}

impl Error {
    pub fn upstream(err: impl Into<BoxError>) -> Self {
        Error::Upstream(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
