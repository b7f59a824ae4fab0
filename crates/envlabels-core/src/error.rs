use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("fleet event bus is closed")]
    BusClosed,

    #[error("subscriber '{0}' terminated abnormally: {1}")]
    SubscriberFailed(&'static str, String),
}

/// Failure to obtain a node's environment while its connection is being set up.
///
/// Never fatal: the connection proceeds and the node contributes no labels for this session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("unable to load node environment: {0}")]
    Io(String),

    #[error("interrupted while loading node environment")]
    Interrupted,

    #[error("node channel closed before the environment was read")]
    Disconnected,
}

impl SnapshotError {
    /// Low-cardinality tag used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SnapshotError::Io(_) => "io",
            SnapshotError::Interrupted => "interrupted",
            SnapshotError::Disconnected => "disconnected",
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::Interrupted => SnapshotError::Interrupted,
            std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => SnapshotError::Disconnected,
            _ => SnapshotError::Io(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_snapshot_kinds() {
        let interrupted: SnapshotError =
            std::io::Error::new(std::io::ErrorKind::Interrupted, "signal").into();
        assert_eq!(interrupted, SnapshotError::Interrupted);

        let reset: SnapshotError =
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer").into();
        assert_eq!(reset.kind(), "disconnected");

        let other: SnapshotError = std::io::Error::other("boom").into();
        assert_eq!(other, SnapshotError::Io("boom".into()));
        assert_eq!(other.kind(), "io");
    }
}
