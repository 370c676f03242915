use thiserror::Error;

/// External collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Embedding,
    Generation,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Embedding => f.write_str("embedding"),
            Service::Generation => f.write_str("generation"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Vector index holds no categories")]
    EmptyIndex,

    #[error("Invalid rule tree: {0}")]
    InvalidTree(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Non-finite vector component in {0}")]
    NonFiniteVector(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("{service} service failed: {source}")]
    Collaborator {
        service: Service,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn embedding(source: anyhow::Error) -> Self {
        Self::Collaborator { service: Service::Embedding, source }
    }

    pub fn generation(source: anyhow::Error) -> Self {
        Self::Collaborator { service: Service::Generation, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
