//! Compiler errors

use busmap_spec::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: unrecognized input near `{fragment}`")]
    Lex { line: usize, fragment: String },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: register declared before any page")]
    RegisterOutsidePage { line: usize },

    #[error("line {line}: field declared before any register")]
    FieldOutsideRegister { line: usize },

    #[error("line {line}: {source}")]
    Model {
        line: usize,
        #[source]
        source: ModelError,
    },
}

pub type Result<T> = std::result::Result<T, ParseError>;
