use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Invalid pipeline, registry, chunk or segment parameters. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unknown identifier or collection tag at resolution time.
    #[error("unknown {kind}: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Raw text unavailable for a resolved identifier.
    #[error("failed to load {identifier}: {reason}")]
    Load { identifier: String, reason: String },

    /// A transform rejected its input; aborts that document only.
    #[error("transform `{transform}` failed on {identifier}: {reason}")]
    TransformFailure {
        identifier: String,
        transform: String,
        reason: String,
    },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn load(identifier: &str, reason: impl std::fmt::Display) -> Self {
        Error::Load {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unknown_identifier(key: &str) -> Self {
        Error::NotFound {
            kind: "identifier",
            key: key.to_string(),
        }
    }

    pub fn unknown_collection(key: &str) -> Self {
        Error::NotFound {
            kind: "collection",
            key: key.to_string(),
        }
    }

    /// Stable tag used in batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::NotFound { .. } => "not_found",
            Error::Load { .. } => "load",
            Error::TransformFailure { .. } => "transform_failure",
        }
    }
}
