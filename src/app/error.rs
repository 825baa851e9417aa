use thiserror::Error;

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The server could not be reached or rejected the credentials.
    #[error("failed to connect to database: {0}")]
    Connection(#[source] sqlx::Error),

    /// A catalog query failed; the extraction is abandoned.
    #[error("{operation} failed: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("No tables found in schema `{schema}`")]
    EmptySchema { schema: String },
}

impl ExtractError {
    pub(crate) fn query(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Query { operation, source }
    }
}
