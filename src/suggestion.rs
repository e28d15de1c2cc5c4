//! # 歌词建议端口
//!
//! 给定最近几行歌词，向外部的文本生成服务请求下一行。
//! 成功与失败用 `Result` 严格区分，失败不会伪装成一段占位文本。

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lyric_sync_core::{LyricLine, SuggestionError};

/// 统一的歌词建议接口
#[async_trait]
pub trait SuggestionProvider: Send + Sync + Debug {
    /// 根据按文档顺序排列的上文，返回候选的下一行。
    async fn suggest_next(&self, context: &[String]) -> Result<String, SuggestionError>;
}

/// 取出以 `index` 结尾（包含）的最多 `max` 行文本，保持文档顺序。
#[must_use]
pub fn suggestion_context(lines: &[LyricLine], index: usize, max: usize) -> Vec<String> {
    if lines.is_empty() || max == 0 {
        return Vec::new();
    }
    let end = index.min(lines.len() - 1) + 1;
    let start = end.saturating_sub(max);
    lines[start..end].iter().map(|l| l.text.clone()).collect()
}

/// 调用建议服务，并在 `timeout` 之后放弃等待。
pub async fn request_with_timeout(
    provider: &dyn SuggestionProvider,
    context: &[String],
    timeout: Duration,
) -> Result<String, SuggestionError> {
    match tokio::time::timeout(timeout, provider.suggest_next(context)).await {
        Ok(result) => {
            if let Err(e) = &result {
                warn!("[歌词建议] 请求失败: {e}");
            }
            result
        }
        Err(_) => {
            warn!("[歌词建议] 请求在 {timeout:?} 内没有完成");
            Err(SuggestionError::Timeout(timeout))
        }
    }
}

#[derive(Serialize)]
struct SuggestionRequestBody<'a> {
    context: &'a [String],
}

#[derive(Deserialize)]
struct SuggestionResponseBody {
    suggestion: String,
}

/// 通过 HTTP 调用外部建议服务。
///
/// 请求体为 `{"context": [...]}`，期望响应体为 `{"suggestion": "..."}`。
#[derive(Debug, Clone)]
pub struct HttpSuggestionProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSuggestionProvider {
    /// 创建一个新的 `HttpSuggestionProvider` 实例。
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SuggestionError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SuggestionError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SuggestionProvider for HttpSuggestionProvider {
    async fn suggest_next(&self, context: &[String]) -> Result<String, SuggestionError> {
        debug!(
            "[歌词建议] 向 {} 发送 {} 行上文",
            self.endpoint,
            context.len()
        );
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SuggestionRequestBody { context })
            .send()
            .await
            .map_err(|e| SuggestionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestionError::Http {
                status: status.as_u16(),
            });
        }

        let body: SuggestionResponseBody = response
            .json()
            .await
            .map_err(|e| SuggestionError::InvalidResponse(e.to_string()))?;
        Ok(body.suggestion)
    }
}
