use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("label atom must not be empty")]
    EmptyLabel,

    #[error("invalid label atom: {0:?}")]
    InvalidLabel(String),

    #[error("node id must not be empty")]
    EmptyNodeId,
}

pub type ModelResult<T> = Result<T, ModelError>;
