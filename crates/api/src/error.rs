use ease_parser::ParserError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid API path for {handler}")]
    InvalidPath { handler: String },

    #[error("invalid API method {method:?} for {handler}")]
    InvalidMethod { handler: String, method: String },

    #[error(transparent)]
    Parser(#[from] ParserError),
}
