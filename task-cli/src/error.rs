use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("task with ID {0} not found")]
    NotFound(u32),
    #[error("invalid status '{0}', use one of: pending, in_progress, done")]
    InvalidStatus(String),
    #[error("no task IDs left to assign")]
    IdsExhausted,
    #[error("failed to write task file {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the error means a mutation could not be made durable.
    ///
    /// `NotFound` and `InvalidStatus` are reported to the user and the
    /// process still succeeds.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Persist { .. } | StoreError::Encode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_not_fatal() {
        assert!(!StoreError::NotFound(3).is_fatal());
        assert!(!StoreError::InvalidStatus("nope".to_string()).is_fatal());
        assert!(!StoreError::IdsExhausted.is_fatal());
    }

    #[test]
    fn test_persist_error_is_fatal_and_names_the_file() {
        let err = StoreError::Persist {
            path: PathBuf::from("/tmp/tasks.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "failed to write task file /tmp/tasks.json: denied"
        );
    }

    #[test]
    fn test_invalid_status_lists_valid_values() {
        let message = StoreError::InvalidStatus("finished".to_string()).to_string();
        assert!(message.contains("'finished'"));
        assert!(message.contains("pending, in_progress, done"));
    }
}
