//! Runtime error types

use busmap_spec::{LookupError, RangeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("range error: {0}")]
    Range(#[from] RangeError),

    #[error("sequence error: {0}")]
    Sequence(#[from] SequenceError),

    /// External driver failure (the virtual device never raises this).
    #[error("driver error: {0}")]
    Driver(String),

    #[error("line {line}: {source}")]
    At {
        line: usize,
        #[source]
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    /// Attach a script line to an error that does not carry one yet.
    pub fn at(self, line: usize) -> Self {
        match self {
            already @ RuntimeError::At { .. } => already,
            other => RuntimeError::At {
                line,
                source: Box::new(other),
            },
        }
    }
}

/// Execution fault inside a running function body. Aborts the enclosing
/// function; committed functions are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("`{path}` is {access}, not writable")]
    NotWritable { path: String, access: &'static str },

    #[error("`{path}` is {access}, not readable")]
    NotReadable { path: String, access: &'static str },

    #[error("unknown variable `{name}`")]
    UnknownVariable { name: String },

    #[error("function `{function}` exceeded the step limit of {limit}")]
    StepLimit { function: String, limit: u64 },
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_wraps_once() {
        let err = RuntimeError::from(LookupError::symbol("AG.control.bogus"))
            .at(12)
            .at(99);
        assert_eq!(
            err.to_string(),
            "line 12: lookup error: unknown symbol `AG.control.bogus`"
        );
    }

    #[test]
    fn test_sequence_error_display() {
        let err = SequenceError::NotWritable {
            path: "AG.status.lock".into(),
            access: "ro",
        };
        assert_eq!(err.to_string(), "`AG.status.lock` is ro, not writable");
    }
}
