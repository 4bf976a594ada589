use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("visualization engine is not available")]
    EngineUnavailable,
    #[error("rendering surface `{0}` not found")]
    SurfaceNotFound(String),
    #[error("engine error: {0}")]
    Engine(String),
    #[error("surface error: {0}")]
    Surface(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid quote record: {0}")]
    InvalidRecord(String),
    #[error("no table loaded into the rendering surface")]
    TableNotLoaded,
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Serialization(err.to_string())
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
