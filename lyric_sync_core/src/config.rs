use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::SyncError;

/// 编辑器的可调参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct EditorOptions {
    /// 判断当前行时向前放宽的时间窗口（秒），用来抵消播放进度回调的采样间隔。
    pub active_line_tolerance_secs: f64,
    /// 手动插入新行时，相对于上一行时间戳的偏移（秒）。
    pub manual_insert_offset_secs: f64,
    /// 插入建议行时，相对于上一行时间戳的偏移（秒）。
    pub suggestion_insert_offset_secs: f64,
    /// 发送给建议服务的上文行数上限。
    pub suggestion_context_lines: usize,
    /// 建议请求的超时时间（秒）。
    pub suggestion_timeout_secs: u64,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            active_line_tolerance_secs: 0.2,
            manual_insert_offset_secs: 2.0,
            suggestion_insert_offset_secs: 3.0,
            suggestion_context_lines: 4,
            suggestion_timeout_secs: 30,
        }
    }
}

impl EditorOptions {
    /// 检查各个时间参数是否为有限的非负数。
    pub fn validate(&self) -> Result<(), SyncError> {
        let checks = [
            ("active_line_tolerance_secs", self.active_line_tolerance_secs),
            ("manual_insert_offset_secs", self.manual_insert_offset_secs),
            (
                "suggestion_insert_offset_secs",
                self.suggestion_insert_offset_secs,
            ),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                warn!("[编辑器选项] {name} 的取值无效: {value}");
                return Err(SyncError::InvalidOptions(format!(
                    "{name} 必须是非负数，实际为 {value}"
                )));
            }
        }
        if self.suggestion_timeout_secs == 0 {
            warn!("[编辑器选项] suggestion_timeout_secs 为 0");
            return Err(SyncError::InvalidOptions(
                "suggestion_timeout_secs 不能为 0".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn suggestion_timeout(&self) -> Duration {
        Duration::from_secs(self.suggestion_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_defaults() {
        let options = EditorOptionsBuilder::default()
            .manual_insert_offset_secs(1.0)
            .build()
            .unwrap();
        assert!((options.manual_insert_offset_secs - 1.0).abs() < f64::EPSILON);
        assert!((options.suggestion_insert_offset_secs - 3.0).abs() < f64::EPSILON);
        assert_eq!(options.suggestion_context_lines, 4);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_tolerance() {
        let options = EditorOptions {
            active_line_tolerance_secs: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(SyncError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: EditorOptions =
            serde_json::from_str(r#"{"suggestion_context_lines": 2}"#).unwrap();
        assert_eq!(options.suggestion_context_lines, 2);
        assert!((options.active_line_tolerance_secs - 0.2).abs() < f64::EPSILON);
    }
}
