use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use lyric_sync::app_settings::AppSettings;
use lyric_sync::lrc_generator::{format_display_time, generate_lrc, generate_lrc_document};
use lyric_sync::lrc_parser::{parse_lrc_document, parse_plain_text};
use lyric_sync::logger::init_tracing;
use lyric_sync::store::LyricStore;
use lyric_sync::suggestion::{request_with_timeout, suggestion_context};
use lyric_sync::sync_engine::compute_active_line;

#[derive(Parser, Debug)]
#[command(name = "lyric_sync", version, about = "LRC 歌词时间轴工具")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 重新输出规范格式的 LRC 文档
    Normalize {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 所有时间戳平移的秒数，可以为负
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<f64>,
        /// 应用文件中的 [offset:] 标签
        #[arg(long)]
        apply_offset_tag: bool,
        /// 不输出头部标签
        #[arg(long)]
        strip_tags: bool,
    },
    /// 把纯文本歌词转换为时间戳全为 0 的 LRC，便于之后打点
    FromText {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 请求歌词建议服务，为第 `index` 行之后续写一行
    Suggest {
        input: PathBuf,
        /// 从 0 开始的行号，默认为最后一行
        #[arg(long)]
        index: Option<usize>,
    },
    /// 显示某个时间点的当前行
    Inspect {
        input: PathBuf,
        #[arg(long)]
        at: f64,
    },
}

fn read_input(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("无法读取 {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, format!("{content}\n"))
                .with_context(|| format!("无法写入 {}", path.display()))?;
            info!("已写入 {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = AppSettings::load();
    let _log_guard = init_tracing(&settings.log_settings);

    match cli.command {
        Command::Normalize {
            input,
            output,
            offset,
            apply_offset_tag,
            strip_tags,
        } => {
            let mut parsed = parse_lrc_document(&read_input(&input)?);
            if apply_offset_tag && !parsed.apply_offset_tag() {
                info!("{} 中没有可用的 [offset:] 标签", input.display());
            }
            let mut store = LyricStore::from_lines(parsed.lines);
            store.shift_all(offset.unwrap_or(0.0));

            let content = if strip_tags {
                generate_lrc(store.lines())
            } else {
                generate_lrc_document(store.lines(), &parsed.metadata)
            };
            write_output(output.as_deref(), &content)?;
        }
        Command::FromText { input, output } => {
            let lines = parse_plain_text(&read_input(&input)?);
            write_output(output.as_deref(), &generate_lrc(&lines))?;
        }
        Command::Suggest { input, index } => {
            let lines = parse_lrc_document(&read_input(&input)?).lines;
            if lines.is_empty() {
                bail!("{} 中没有歌词行", input.display());
            }
            let index = index.unwrap_or(lines.len() - 1).min(lines.len() - 1);
            let provider = settings.suggestion_provider()?;
            let context = suggestion_context(
                &lines,
                index,
                settings.editor.suggestion_context_lines,
            );
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("无法创建异步运行时")?;
            let suggestion = runtime.block_on(request_with_timeout(
                &provider,
                &context,
                settings.editor.suggestion_timeout(),
            ))?;
            let suggestion = suggestion.trim();
            if suggestion.is_empty() {
                info!("建议服务没有给出建议");
            } else {
                println!("{suggestion}");
            }
        }
        Command::Inspect { input, at } => {
            let parsed = parse_lrc_document(&read_input(&input)?);
            let tolerance = settings.editor.active_line_tolerance_secs;
            let active = compute_active_line(&parsed.lines, at, tolerance)
                .and_then(|id| parsed.lines.iter().find(|l| l.id() == id));
            match active {
                Some(line) => println!("{} {}", format_display_time(line.timestamp), line.text),
                None => println!("{} 时没有当前行", format_display_time(at)),
            }
        }
    }
    Ok(())
}
