use std::time::Duration;

use thiserror::Error;

/// A single probe could not produce its measurement. Never fatal to a snapshot.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0}")]
    Unavailable(String),

    #[error("sampling did not finish within {0:?}")]
    TimedOut(Duration),
}

/// The process table could not be listed at all.
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("listing processes failed: {0}")]
    Listing(String),

    #[error("process enumeration worker failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = ProbeError::TimedOut(Duration::from_secs(5));
        assert_eq!(err.to_string(), "sampling did not finish within 5s");

        let err = EnumerationError::Listing("unsupported platform".into());
        assert!(err.to_string().contains("unsupported platform"));
    }
}
