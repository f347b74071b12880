//! Generation errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// Two distinct source names sanitize to the same accessor path. Only
    /// raised in strict mode; the default mode keeps the first and warns.
    #[error("accessor path `{path}` generated twice (from `{first}` and `{second}`)")]
    DuplicateAccessor {
        path: String,
        first: String,
        second: String,
    },
}

pub type Result<T> = std::result::Result<T, GenError>;
