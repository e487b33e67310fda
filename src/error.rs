use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid position descriptor ({field}): {detail}")]
    InvalidDescriptor { field: &'static str, detail: String },

    #[error("invalid move text: {0}")]
    InvalidMoveText(String),

    #[error("cannot resolve best move")]
    CannotResolveMove,
}

impl EngineError {
    pub(crate) fn descriptor(field: &'static str, detail: impl Into<String>) -> Self {
        EngineError::InvalidDescriptor {
            field,
            detail: detail.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
