use std::sync::Arc;

use lyric_sync_core::{SuggestionError, SyncError};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("核心库错误: {0}")]
    Sync(#[from] SyncError),

    #[error("歌词建议错误: {0}")]
    Suggestion(#[from] SuggestionError),

    #[error("IO 错误: {0}")]
    Io(Arc<std::io::Error>),

    #[error("JSON 序列化/反序列化错误: {0}")]
    Json(Arc<serde_json::Error>),

    #[error("配置错误: {0}")]
    Settings(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Arc::new(err))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
