use sea_orm::DbErr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Query(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,

    #[error("unsupported database backend: {0}")]
    UnsupportedBackend(String),

    #[error("table '{table}' references '{references}', which is not created before it")]
    DependencyOrder { table: String, references: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let e = Error::UnsupportedBackend("mysql".into());
        assert_eq!(e.to_string(), "unsupported database backend: mysql");

        let e = Error::DependencyOrder {
            table: "booking".into(),
            references: "seat".into(),
        };
        assert_eq!(
            e.to_string(),
            "table 'booking' references 'seat', which is not created before it"
        );

        let e = Error::MissingDatabaseUrl;
        assert_eq!(e.to_string(), "DATABASE_URL must be set");
    }

    #[test]
    fn database_errors_are_transparent() {
        let e: Error = DbErr::Custom("connection reset".into()).into();
        assert_eq!(e.to_string(), DbErr::Custom("connection reset".into()).to_string());

        let e: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(e.to_string(), sqlx::Error::RowNotFound.to_string());
    }
}
