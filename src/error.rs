//! Ошибки предобработки данных

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PrepError {
    /// Обязательная колонка отсутствует в наборе данных
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column is not numeric: {0}")]
    NotNumeric(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Length mismatch in column {column}: expected {expected} rows, got {got}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid value in column {column}: {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, PrepError>;
