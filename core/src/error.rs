//! Error taxonomy shared by the core engine, the stores and the facade.

use std::path::PathBuf;

/// Boxed source error for storage failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum VarnamError {
    /// The language's symbol table could not be located.
    #[error("symbol table not found: {0}")]
    ResourceNotFound(String),

    /// The symbol table lacks a rule the engine needs at initialization.
    #[error("malformed language rules: {0}")]
    MalformedLanguageRules(String),

    /// A read or write against a persistent store failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] BoxError),

    /// The handle was closed with `close()`.
    #[error("varnam handle is closed")]
    Closed,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = VarnamError> = std::result::Result<T, E>;

impl VarnamError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VarnamError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error came from a store round trip.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, VarnamError::StoreUnavailable(_))
    }
}

macro_rules! store_errors {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for VarnamError {
                fn from(e: $ty) -> Self {
                    VarnamError::StoreUnavailable(Box::new(e))
                }
            }
        )*
    };
}

store_errors!(
    redb::Error,
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
    fst::Error,
);

impl From<bincode::Error> for VarnamError {
    fn from(e: bincode::Error) -> Self {
        VarnamError::StoreUnavailable(e)
    }
}
