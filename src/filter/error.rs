use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid sort field: {0}")]
    InvalidColumn(String),

    #[error("Invalid filter value for {column}: {value}")]
    InvalidValue { column: String, value: String },
}
