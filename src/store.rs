//! # 歌词行存储
//!
//! 持有唯一的歌词序列，并负责所有修改操作。修改时间戳、追加新行后都会重新按时间戳稳定排序；
//! `insert_after` 是例外，它按位置插入，不重新排序。
//!
//! 所有操作都是全函数：对不存在的 ID 或无效的时间不会报错，只是什么都不做，并通过返回值告知调用方。

use tracing::{debug, trace};

use lyric_sync_core::{LineId, LyricLine, sanitize_seconds, sort_lines_by_timestamp};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricStore {
    lines: Vec<LyricLine>,
}

impl LyricStore {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// 原样安装给定的歌词行，不重新排序。
    #[must_use]
    pub const fn from_lines(lines: Vec<LyricLine>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<LyricLine> {
        self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: LineId) -> Option<&LyricLine> {
        self.lines.iter().find(|l| l.id() == id)
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    #[must_use]
    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|l| l.id() == id)
    }

    /// 丢弃当前序列，原样安装新序列。导入路径在调用前已经完成了排序。
    pub fn replace_all(&mut self, new_lines: Vec<LyricLine>) {
        debug!(
            "[歌词存储] 替换全部歌词：{} 行 -> {} 行",
            self.lines.len(),
            new_lines.len()
        );
        self.lines = new_lines;
    }

    /// 修改指定行的文本，不改变顺序。ID 不存在时不做任何事。
    pub fn update_text(&mut self, id: LineId, new_text: impl Into<String>) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.id() == id) else {
            debug!("[歌词存储] 修改文本时未找到行 {id}");
            return false;
        };
        line.text = new_text.into();
        true
    }

    /// 修改指定行的时间戳并重新排序。
    ///
    /// 负数或非有限值会被拒绝，该行保持不变。
    pub fn update_timestamp(&mut self, id: LineId, new_seconds: f64) -> bool {
        if !new_seconds.is_finite() || new_seconds < 0.0 {
            debug!("[歌词存储] 拒绝无效的时间戳 {new_seconds}（行 {id}）");
            return false;
        }
        let Some(line) = self.lines.iter_mut().find(|l| l.id() == id) else {
            debug!("[歌词存储] 修改时间戳时未找到行 {id}");
            return false;
        };
        line.timestamp = new_seconds;
        sort_lines_by_timestamp(&mut self.lines);
        true
    }

    /// 直接覆盖某个位置上的时间戳，不重新排序。
    ///
    /// 打点同步依赖这一点：光标按位置推进，已打点的行不能因为排序而移动。
    /// 同步结束时由 [`Self::restore_order`] 恢复顺序。
    pub(crate) fn set_timestamp_at(&mut self, index: usize, seconds: f64) -> Option<LineId> {
        let line = self.lines.get_mut(index)?;
        line.timestamp = sanitize_seconds(seconds);
        trace!("[歌词存储] 位置 {index} 的时间戳设为 {}", line.timestamp);
        Some(line.id())
    }

    /// 按时间戳重新稳定排序。打点同步结束时调用。
    pub fn restore_order(&mut self) {
        sort_lines_by_timestamp(&mut self.lines);
        trace!("[歌词存储] 已恢复时间顺序");
    }

    /// 在位置 `index` 之后插入新行，返回新行所在的位置。
    ///
    /// 不会重新排序；调用方需要自行给出合适的时间戳。`index` 越界时追加到末尾。
    pub fn insert_after(&mut self, index: usize, new_line: LyricLine) -> usize {
        let position = index.saturating_add(1).min(self.lines.len());
        self.lines.insert(position, new_line);
        position
    }

    /// 追加一行并重新排序，返回新行排序后所在的位置。
    pub fn append_sorted(&mut self, new_line: LyricLine) -> usize {
        let id = new_line.id();
        self.lines.push(new_line);
        sort_lines_by_timestamp(&mut self.lines);
        self.index_of(id).unwrap_or(self.lines.len() - 1)
    }

    /// 删除指定行，返回被删除的行。
    pub fn delete(&mut self, id: LineId) -> Option<LyricLine> {
        let index = self.index_of(id)?;
        Some(self.lines.remove(index))
    }

    /// 把所有时间戳平移 `delta_secs`，结果截断到 0。顺序保持不变。
    pub fn shift_all(&mut self, delta_secs: f64) -> bool {
        if !delta_secs.is_finite() || delta_secs == 0.0 || self.lines.is_empty() {
            return false;
        }
        for line in &mut self.lines {
            line.timestamp = sanitize_seconds(line.timestamp + delta_secs);
        }
        true
    }
}
