use crate::config::Credentials;
use crate::error::SqlProxyError;

/// Translate proxy credentials into a driver config.
///
/// # Errors
/// Returns `SqlProxyError::ConfigError` if a required field is missing.
pub fn pg_config(credentials: &Credentials) -> Result<tokio_postgres::Config, SqlProxyError> {
    credentials.validate()?;

    let mut cfg = tokio_postgres::Config::new();
    cfg.host(&credentials.host)
        .port(credentials.port)
        .user(&credentials.user)
        .dbname(&credentials.database);
    if !credentials.password.is_empty() {
        cfg.password(&credentials.password);
    }
    Ok(cfg)
}
