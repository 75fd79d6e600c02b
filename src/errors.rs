use sea_orm::error::{DbErr, SqlErr};

/// Errors raised while populating the database.
///
/// Every variant is fatal for the run: the driver stops at the first error and
/// leaves already-committed phases in place.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Invalid catalog: {0}")]
    Catalog(String),

    #[error("No {0} available to reference")]
    EmptyPool(&'static str),

    #[error("Unknown {kind} referenced: {name}")]
    MissingReference { kind: &'static str, name: String },

    #[error("Could not generate a unique {kind} after {attempts} attempts")]
    UniqueExhausted { kind: &'static str, attempts: usize },
}

impl SeedError {
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    pub fn missing(kind: &'static str, name: impl Into<String>) -> Self {
        Self::MissingReference {
            kind,
            name: name.into(),
        }
    }

    /// True when the underlying database reported a unique-constraint
    /// violation, which is what a second run against a seeded schema hits.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return true;
                }
                let msg = err.to_string().to_ascii_lowercase();
                UNIQUE_VIOLATION_PHRASES
                    .iter()
                    .any(|phrase| msg.contains(phrase))
            }
            _ => false,
        }
    }
}

/// Driver wording for unique-constraint failures that reach us as plain text
const UNIQUE_VIOLATION_PHRASES: [&str; 2] = [
    "unique constraint failed",
    "duplicate key value violates unique constraint",
];

pub type SeedResult<T> = Result<T, SeedError>;
