use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use lyric_sync_core::{EditorOptions, SuggestionError};

use crate::error::{AppError, AppResult};
use crate::suggestion::HttpSuggestionProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub enable_file_log: bool,
    /// `EnvFilter` 指令，例如 `info` 或 `lyric_sync=debug`
    pub console_log_level: String,
    pub file_log_level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enable_file_log: false,
            console_log_level: "info".to_string(),
            file_log_level: "debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub log_settings: LogSettings,
    pub editor: EditorOptions,
    /// 歌词建议服务的地址，未配置时不提供建议功能。
    pub suggestion_endpoint: Option<String>,
}

impl AppSettings {
    pub fn config_dir() -> Option<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "LyricSync", "LyricSync") {
            let config_dir = proj_dirs.data_dir();
            if !config_dir.exists()
                && let Err(e) = fs::create_dir_all(config_dir)
            {
                tracing::error!("无法创建配置目录 {config_dir:?}: {e}");
                return None;
            }
            Some(config_dir.to_path_buf())
        } else {
            tracing::error!("无法获取项目配置目录路径。");
            None
        }
    }

    fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("lyric_sync.json"))
    }

    /// 从默认位置加载配置。文件不存在或无法解析时使用默认配置，并尝试写回。
    pub fn load() -> Self {
        if let Some(path) = Self::config_file_path() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(settings) => return settings,
                    Err(e) => {
                        tracing::error!(
                            "[Settings] 加载配置文件 {path:?} 失败: {e}。将使用默认配置。"
                        );
                    }
                }
            } else {
                tracing::info!("[Settings] 配置文件 {path:?} 未找到。将创建并使用默认配置。");
            }
        }

        let default_settings = Self::default();
        if let Err(e) = default_settings.save() {
            tracing::error!("[Settings] 无法保存初始默认配置文件: {e}");
        }
        default_settings
    }

    /// 从指定文件加载配置，并校验编辑器选项。
    pub fn load_from(path: &Path) -> AppResult<Self> {
        tracing::info!("[Settings] 尝试从 {path:?} 加载 JSON 配置文件。");
        let content = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.editor.validate()?;
        Ok(settings)
    }

    /// 按配置的地址创建建议服务。未配置地址时返回 [`SuggestionError::Unavailable`]。
    pub fn suggestion_provider(&self) -> Result<HttpSuggestionProvider, SuggestionError> {
        match self.suggestion_endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => HttpSuggestionProvider::new(endpoint),
            _ => Err(SuggestionError::Unavailable),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let Some(path) = Self::config_file_path() else {
            let err_msg = "无法确定配置文件路径，保存失败。";
            tracing::error!("[Settings] {err_msg}");
            return Err(AppError::Settings(err_msg.to_string()));
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        tracing::info!("[Settings] 设置已成功保存到 {path:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = AppSettings {
            suggestion_endpoint: Some("http://localhost:8080/suggest".to_string()),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"editor": {"manual_insert_offset_secs": 1.0}}"#).unwrap();
        let settings = AppSettings::load_from(&path).unwrap();
        assert!((settings.editor.manual_insert_offset_secs - 1.0).abs() < f64::EPSILON);
        assert_eq!(settings.log_settings, LogSettings::default());
        assert_eq!(settings.suggestion_endpoint, None);
    }

    #[test]
    fn test_suggestion_provider_needs_an_endpoint() {
        let mut settings = AppSettings::default();
        assert!(matches!(
            settings.suggestion_provider(),
            Err(SuggestionError::Unavailable)
        ));
        settings.suggestion_endpoint = Some("   ".to_string());
        assert!(matches!(
            settings.suggestion_provider(),
            Err(SuggestionError::Unavailable)
        ));
        settings.suggestion_endpoint = Some(" http://localhost:8080/suggest ".to_string());
        let provider = settings.suggestion_provider().unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8080/suggest");
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"editor": {"active_line_tolerance_secs": -1.0}}"#).unwrap();
        assert!(matches!(
            AppSettings::load_from(&path),
            Err(AppError::Sync(_))
        ));
    }
}
