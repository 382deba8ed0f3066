use thiserror::Error;

/// Failure of a keyed lookup (`at`, `at_mut`, `erase`).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    #[error("key not found")]
    KeyNotFound,
}
