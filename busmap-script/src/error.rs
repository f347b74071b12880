//! Script parse errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: unrecognized input near `{fragment}`")]
    Lex { line: usize, fragment: String },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("unexpected end of script: {expected}")]
    UnexpectedEof { expected: String },
}

pub type Result<T> = std::result::Result<T, ScriptError>;
