//! Configuration and startup error types

use thiserror::Error;

/// Errors raised while assembling process configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_includes_context() {
        let err = Error::Config("ACCESS_TOKEN_EXPIRE_MINUTES must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: ACCESS_TOKEN_EXPIRE_MINUTES must be greater than 0"
        );
    }

    #[test]
    fn missing_env_names_the_variable() {
        let err = Error::MissingEnv("SECRET_KEY");
        assert_eq!(
            err.to_string(),
            "missing required environment variable SECRET_KEY"
        );
    }

    #[test]
    fn io_error_converts() {
        let err: Error =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gateway.toml").into();
        assert!(err.to_string().starts_with("I/O error:"), "got: {err}");
    }
}
