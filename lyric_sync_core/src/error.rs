use std::time::Duration;

use thiserror::Error;

/// 定义编辑核心中可能暴露给调用方的错误。
///
/// 解析、存储和同步操作本身是全函数，不会返回这些错误；
/// 它们只出现在调用方主动请求校验的入口上（例如解析用户输入的时间）。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// 用户输入的时间字符串无效（非数字、负数或格式错误）。
    #[error("无效的时间输入: {0}")]
    InvalidTime(String),
    /// 编辑器选项的取值无效。
    #[error("无效的编辑器选项: {0}")]
    InvalidOptions(String),
}

/// 建议服务调用失败的原因。
///
/// 建议服务的成功结果和失败结果严格区分，调用方不需要通过检查文本内容来判断是否出错。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuggestionError {
    /// 网络层失败，例如连接被拒绝。
    #[error("网络请求失败: {0}")]
    Network(String),
    /// 服务返回了非成功的 HTTP 状态码。
    #[error("建议服务返回了 HTTP {status}")]
    Http {
        /// HTTP 状态码
        status: u16,
    },
    /// 响应体无法解析为预期的结构。
    #[error("建议服务的响应无效: {0}")]
    InvalidResponse(String),
    /// 请求在给定时间内没有完成。
    #[error("建议请求超时 ({0:?})")]
    Timeout(Duration),
    /// 没有配置可用的建议服务。
    #[error("未配置建议服务")]
    Unavailable,
}
