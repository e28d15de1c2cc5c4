use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app_settings::LogSettings;

fn get_log_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "LyricSync", "LyricSync") {
        proj_dirs.data_local_dir().join("logs")
    } else {
        let fallback = PathBuf::from("logs");
        eprintln!("无法获取项目日志目录，将在当前目录写入日志: {fallback:?}");
        fallback
    }
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化全局日志。`RUST_LOG` 环境变量优先于配置中的级别。
///
/// 启用文件日志时返回写入线程的 guard，调用方需要持有它直到程序退出，否则缓冲中的日志会丢失。
pub fn init_tracing(settings: &LogSettings) -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(build_filter(&settings.console_log_level));

    let (file_layer, guard) = if settings.enable_file_log {
        let log_dir = get_log_dir();
        let appender = tracing_appender::rolling::daily(&log_dir, "lyric_sync.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(build_filter(&settings.file_log_level));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("日志记录器初始化失败: {e}");
    } else if settings.enable_file_log {
        tracing::info!("日志记录器已初始化。日志目录: {:?}", get_log_dir());
    }
    guard
}
