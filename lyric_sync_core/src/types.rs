use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};
use uuid::Uuid;

/// 歌词行的不透明唯一标识。
///
/// 创建后不可变，也不会被复用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    /// 生成一个新的随机 ID。
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一行带时间戳的歌词。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    id: LineId,
    /// 开始时间，单位为秒，非负。
    pub timestamp: f64,
    /// 歌词文本，可以为空。
    pub text: String,
}

impl LyricLine {
    /// 使用新生成的 ID 创建一行歌词。
    pub fn new(timestamp: f64, text: impl Into<String>) -> Self {
        Self {
            id: LineId::new(),
            timestamp,
            text: text.into(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> LineId {
        self.id
    }
}

/// 按时间戳对歌词行做稳定排序，相同时间戳的行保持原有的相对顺序。
pub fn sort_lines_by_timestamp(lines: &mut [LyricLine]) {
    lines.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
}

/// 检查歌词行是否按时间戳非递减排列。
#[must_use]
pub fn is_sorted_by_timestamp(lines: &[LyricLine]) -> bool {
    lines.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}

/// 播放器状态的快照。由播放端口持有，编辑核心只读取它。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    /// 当前播放位置（秒）
    pub current_time: f64,
    /// 是否正在播放
    pub is_playing: bool,
    /// 音频总时长（秒），未加载时为 0
    pub duration: f64,
}

/// 波形上的一个选区，可选循环播放。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub start: f64,
    pub end: f64,
    pub loop_enabled: bool,
}

impl Region {
    /// 创建选区，起止时间会被规范化为 `0 <= start <= end`。
    #[must_use]
    pub fn new(start: f64, end: f64, loop_enabled: bool) -> Self {
        let a = sanitize_seconds(start);
        let b = sanitize_seconds(end);
        Self {
            start: a.min(b),
            end: a.max(b),
            loop_enabled,
        }
    }

    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// 把任意浮点数规范化为合法的秒数：非有限值视为 0，负数截断为 0。
#[must_use]
pub fn sanitize_seconds(secs: f64) -> f64 {
    if secs.is_finite() { secs.max(0.0) } else { 0.0 }
}

/// 一次打点同步会话。`cursor` 指向下一次打点要写入的行。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncSession {
    pub cursor: usize,
}

impl SyncSession {
    /// 光标已越过最后一行时，会话耗尽。
    #[must_use]
    pub const fn is_exhausted(&self, line_count: usize) -> bool {
        self.cursor >= line_count
    }
}

/// 编辑器当前所处的模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncMode {
    /// 普通编辑模式
    #[default]
    Idle,
    /// 打点同步模式
    Syncing(SyncSession),
}

impl SyncMode {
    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing(_))
    }
}

/// LRC 头部标签的规范化键。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, AsRefStr, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum LrcMetadataKey {
    /// 标题
    #[strum(serialize = "ti")]
    Title,
    /// 艺术家
    #[strum(serialize = "ar")]
    Artist,
    /// 专辑
    #[strum(serialize = "al")]
    Album,
    /// 歌词作者
    #[strum(serialize = "by")]
    Author,
    /// 全局时间偏移，单位毫秒
    #[strum(serialize = "offset")]
    Offset,
    /// 歌曲长度
    #[strum(serialize = "length")]
    Length,
    /// 制作工具
    #[strum(serialize = "re")]
    Editor,
    /// 制作工具版本
    #[strum(serialize = "ve")]
    Version,
}

/// LRC 头部标签，保持它们在文件中出现的顺序。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LrcMetadata {
    entries: Vec<(LrcMetadataKey, String)>,
}

impl LrcMetadata {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 设置一个标签。已存在的键会被原位覆盖。
    pub fn set(&mut self, key: LrcMetadataKey, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// 移除一个标签，返回原来的值。
    pub fn remove(&mut self, key: LrcMetadataKey) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(index).1)
    }

    #[must_use]
    pub fn get(&self, key: LrcMetadataKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (LrcMetadataKey, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 把 `[offset:]` 标签解析为秒。无法解析时返回 `None`。
    #[must_use]
    pub fn offset_secs(&self) -> Option<f64> {
        let raw = self.get(LrcMetadataKey::Offset)?;
        match raw.trim().parse::<i64>() {
            Ok(ms) => Some(ms as f64 / 1000.0),
            Err(e) => {
                tracing::debug!("[LRC 标签] 无法解析 offset 标签 {raw:?}: {e}");
                None
            }
        }
    }
}
