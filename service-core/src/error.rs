use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AppError::ConfigError(anyhow::anyhow!("MONGO_URI is required but not set"));
        assert_eq!(
            err.to_string(),
            "Configuration error: MONGO_URI is required but not set"
        );
    }

    #[test]
    fn test_io_error_becomes_internal() {
        let err: AppError = std::io::Error::other("address in use").into();
        assert!(matches!(err, AppError::InternalError(_)));
    }

    #[test]
    fn test_app_error_into_io_error() {
        let err: std::io::Error =
            AppError::DatabaseError(anyhow::anyhow!("server selection timeout")).into();
        assert_eq!(err.kind(), std::io::ErrorKind::Other);
        assert_eq!(err.to_string(), "Database error: server selection timeout");
    }
}
