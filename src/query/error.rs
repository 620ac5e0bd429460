use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid date filter {field}: '{value}' (expected yyyy-MM-ddTHH:mmZ)")]
    InvalidDate { field: String, value: String },

    #[error("Date filter {0} has already been normalized")]
    DateAlreadyNormalized(String),

    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}
