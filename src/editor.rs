//! # 编辑器状态
//!
//! 把歌词存储、同步引擎、播放快照和选区放在一个显式的 [`EditorState`] 里。
//! 展示层把用户操作和播放器事件包装成 [`EditorEvent`] 交给 [`EditorState::apply`]，
//! 每个事件都完整处理后才会处理下一个，因此不需要任何锁。

use tracing::{debug, info, warn};

use lyric_sync_core::{
    EditorOptions, LineId, LrcMetadata, LyricLine, PlaybackState, Region, SuggestionError,
    SyncMode, sanitize_seconds,
};

use crate::lrc_generator::{generate_lrc, generate_lrc_document};
use crate::lrc_parser::{parse_lrc_document, parse_plain_text};
use crate::playback::{PlaybackEvent, RegionLoop};
use crate::store::LyricStore;
use crate::suggestion::suggestion_context;
use crate::sync_engine::{ActiveLineTracker, TapOutcome, TapSync};
use crate::utils::parse_time_input;

/// 一次已发出的建议请求，记录请求时的位置和上文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub index: usize,
    pub context: Vec<String>,
}

/// 编辑器可以处理的事件
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// 导入 LRC 文档，替换当前全部歌词。
    ImportLrc(String),
    /// 导入纯文本歌词，每行时间戳为 0。
    ImportPlainText(String),
    /// 来自播放器的事件
    Playback(PlaybackEvent),
    /// 播放或暂停
    PlayingChanged(bool),
    EditText { id: LineId, text: String },
    /// 用户在编辑框里输入的时间，尚未解析。
    EditTimestamp { id: LineId, input: String },
    /// 在某一行之后插入空行（回车）。
    InsertLineAfter { index: usize },
    /// 在播放头位置添加空行。
    AddLineAtPlayhead { current_time: f64 },
    DeleteLine { id: LineId },
    ToggleSync,
    /// 打点，`current_time` 取自播放器。
    Tap { current_time: f64 },
    SetRegion(Region),
    SetRegionLoop(bool),
    ClearRegion,
    /// 建议服务返回了结果
    SuggestionResolved {
        request: SuggestionRequest,
        result: Result<String, SuggestionError>,
    },
}

/// 处理一个事件之后，展示层需要做出的反应
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    Unchanged,
    /// 歌词序列变了，需要重新渲染。
    LinesChanged,
    /// 新插入了一行，位于 `index`。
    LineInserted { id: LineId, index: usize },
    ActiveLineChanged(Option<LineId>),
    /// 同步模式下不允许手动编辑。
    ReadOnly,
    ModeChanged { syncing: bool },
    /// 打点成功，该行已成为当前行。
    Synced { id: LineId, index: usize },
    /// 所有行都已打点，需要提示用户。
    SyncEndReached,
    /// 选区循环要求播放器跳转。
    SeekRequested(f64),
    SuggestionFailed(SuggestionError),
}

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    store: LyricStore,
    metadata: LrcMetadata,
    sync: TapSync,
    active: ActiveLineTracker,
    playback: PlaybackState,
    region: RegionLoop,
    options: EditorOptions,
    suggestion_in_flight: bool,
}

impl EditorState {
    #[must_use]
    pub fn new(options: EditorOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn lines(&self) -> &[LyricLine] {
        self.store.lines()
    }

    #[must_use]
    pub const fn store(&self) -> &LyricStore {
        &self.store
    }

    #[must_use]
    pub const fn metadata(&self) -> &LrcMetadata {
        &self.metadata
    }

    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        self.sync.mode()
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.sync.is_read_only()
    }

    #[must_use]
    pub const fn sync_cursor(&self) -> Option<usize> {
        self.sync.cursor()
    }

    #[must_use]
    pub const fn active_line(&self) -> Option<LineId> {
        self.active.active()
    }

    #[must_use]
    pub const fn playback(&self) -> PlaybackState {
        self.playback
    }

    #[must_use]
    pub const fn region(&self) -> Option<Region> {
        self.region.region()
    }

    #[must_use]
    pub const fn options(&self) -> &EditorOptions {
        &self.options
    }

    #[must_use]
    pub const fn is_suggestion_in_flight(&self) -> bool {
        self.suggestion_in_flight
    }

    /// 导出规范的 LRC 正文。
    #[must_use]
    pub fn export_lrc(&self) -> String {
        generate_lrc(self.store.lines())
    }

    /// 导出带头部标签的 LRC 文档。
    #[must_use]
    pub fn export_lrc_document(&self) -> String {
        generate_lrc_document(self.store.lines(), &self.metadata)
    }

    /// 为位置 `index` 之后的一行发起建议请求。
    ///
    /// 已有请求未完成、或歌词为空时返回 `None`。这个限制只针对通过编辑器发起的请求，
    /// 建议端口本身不做去重。
    pub fn begin_suggestion(&mut self, index: usize) -> Option<SuggestionRequest> {
        if self.suggestion_in_flight {
            debug!("[歌词建议] 已有请求在进行中");
            return None;
        }
        if index >= self.store.len() {
            return None;
        }
        self.suggestion_in_flight = true;
        Some(SuggestionRequest {
            index,
            context: suggestion_context(
                self.store.lines(),
                index,
                self.options.suggestion_context_lines,
            ),
        })
    }

    /// 处理一个事件。
    pub fn apply(&mut self, event: EditorEvent) -> EditorOutcome {
        match event {
            EditorEvent::ImportLrc(content) => {
                let parsed = parse_lrc_document(&content);
                self.metadata = parsed.metadata;
                self.install(parsed.lines)
            }
            EditorEvent::ImportPlainText(content) => {
                self.metadata = LrcMetadata::new();
                self.install(parse_plain_text(&content))
            }
            EditorEvent::Playback(PlaybackEvent::Ready { duration }) => {
                self.playback.duration = sanitize_seconds(duration);
                info!("[编辑器] 音频已就绪，时长 {:.2}s", self.playback.duration);
                EditorOutcome::Unchanged
            }
            EditorEvent::Playback(PlaybackEvent::TimeUpdate { current_time }) => {
                self.on_time_update(current_time)
            }
            EditorEvent::PlayingChanged(is_playing) => {
                self.playback.is_playing = is_playing;
                EditorOutcome::Unchanged
            }
            EditorEvent::EditText { id, text } => {
                if self.is_read_only() {
                    return EditorOutcome::ReadOnly;
                }
                changed_if(self.store.update_text(id, text))
            }
            EditorEvent::EditTimestamp { id, input } => {
                if self.is_read_only() {
                    return EditorOutcome::ReadOnly;
                }
                self.edit_timestamp(id, &input)
            }
            EditorEvent::InsertLineAfter { index } => {
                if self.is_read_only() {
                    return EditorOutcome::ReadOnly;
                }
                let base = self.timestamp_at(index);
                self.insert_after(index, base + self.options.manual_insert_offset_secs, "")
            }
            EditorEvent::AddLineAtPlayhead { current_time } => {
                if self.is_read_only() {
                    return EditorOutcome::ReadOnly;
                }
                let line = LyricLine::new(sanitize_seconds(current_time), "");
                let id = line.id();
                let index = self.store.append_sorted(line);
                self.refresh_active();
                EditorOutcome::LineInserted { id, index }
            }
            EditorEvent::DeleteLine { id } => {
                if self.is_read_only() {
                    return EditorOutcome::ReadOnly;
                }
                let removed = self.store.delete(id).is_some();
                if removed {
                    self.refresh_active();
                }
                changed_if(removed)
            }
            EditorEvent::ToggleSync => {
                let syncing = self.sync.toggle(&mut self.store);
                if !syncing {
                    self.refresh_active();
                }
                EditorOutcome::ModeChanged { syncing }
            }
            EditorEvent::Tap { current_time } => self.tap(current_time),
            EditorEvent::SetRegion(region) => {
                self.region.set_region(region);
                EditorOutcome::Unchanged
            }
            EditorEvent::SetRegionLoop(enabled) => {
                self.region.set_loop(enabled);
                EditorOutcome::Unchanged
            }
            EditorEvent::ClearRegion => {
                self.region.clear_region();
                EditorOutcome::Unchanged
            }
            EditorEvent::SuggestionResolved { request, result } => {
                self.resolve_suggestion(&request, result)
            }
        }
    }

    fn install(&mut self, lines: Vec<LyricLine>) -> EditorOutcome {
        if self.sync.is_syncing() {
            self.sync.exit(&mut self.store);
        }
        info!("[编辑器] 导入了 {} 行歌词", lines.len());
        self.store.replace_all(lines);
        self.active.reset();
        self.refresh_active();
        EditorOutcome::LinesChanged
    }

    fn on_time_update(&mut self, current_time: f64) -> EditorOutcome {
        self.playback.current_time = sanitize_seconds(current_time);
        if let Some(start) = self.region.loop_target(self.playback.current_time) {
            return EditorOutcome::SeekRequested(start);
        }
        self.active
            .update(
                self.store.lines(),
                self.playback.current_time,
                self.options.active_line_tolerance_secs,
            )
            .map_or(EditorOutcome::Unchanged, |change| {
                EditorOutcome::ActiveLineChanged(change.current)
            })
    }

    fn edit_timestamp(&mut self, id: LineId, input: &str) -> EditorOutcome {
        match parse_time_input(input) {
            Ok(secs) => {
                let changed = self.store.update_timestamp(id, secs);
                if changed {
                    self.refresh_active();
                }
                changed_if(changed)
            }
            Err(e) => {
                debug!("[编辑器] 忽略无效的时间输入: {e}");
                EditorOutcome::Unchanged
            }
        }
    }

    fn tap(&mut self, current_time: f64) -> EditorOutcome {
        match self.sync.tap(&mut self.store, current_time) {
            TapOutcome::Synced { id, index } => {
                self.active.set(Some(id));
                EditorOutcome::Synced { id, index }
            }
            TapOutcome::EndReached => EditorOutcome::SyncEndReached,
            TapOutcome::NotSyncing => EditorOutcome::Unchanged,
        }
    }

    /// 使用请求时的位置，以及该位置当前的时间戳作为基准插入建议行。
    ///
    /// 如果请求期间歌词被编辑过，这个位置可能已经不是原来那一行了。
    fn resolve_suggestion(
        &mut self,
        request: &SuggestionRequest,
        result: Result<String, SuggestionError>,
    ) -> EditorOutcome {
        self.suggestion_in_flight = false;
        match result {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    debug!("[歌词建议] 服务没有给出建议");
                    return EditorOutcome::Unchanged;
                }
                let base = self.timestamp_at(request.index);
                self.insert_after(
                    request.index,
                    base + self.options.suggestion_insert_offset_secs,
                    text,
                )
            }
            Err(e) => {
                warn!("[歌词建议] 获取建议失败: {e}");
                EditorOutcome::SuggestionFailed(e)
            }
        }
    }

    fn insert_after(&mut self, index: usize, timestamp: f64, text: &str) -> EditorOutcome {
        let line = LyricLine::new(sanitize_seconds(timestamp), text);
        let id = line.id();
        let index = self.store.insert_after(index, line);
        self.refresh_active();
        EditorOutcome::LineInserted { id, index }
    }

    /// 位置 `index` 上的时间戳；越界时取最后一行，空序列取 0。
    fn timestamp_at(&self, index: usize) -> f64 {
        self.store
            .get_index(index)
            .or_else(|| self.store.lines().last())
            .map_or(0.0, |l| l.timestamp)
    }

    fn refresh_active(&mut self) {
        self.active.update(
            self.store.lines(),
            self.playback.current_time,
            self.options.active_line_tolerance_secs,
        );
    }
}

const fn changed_if(changed: bool) -> EditorOutcome {
    if changed {
        EditorOutcome::LinesChanged
    } else {
        EditorOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyric_sync_core::is_sorted_by_timestamp;

    fn editor_with(content: &str) -> EditorState {
        let mut editor = EditorState::new(EditorOptions::default());
        editor.apply(EditorEvent::ImportLrc(content.to_string()));
        editor
    }

    fn time_update(t: f64) -> EditorEvent {
        EditorEvent::Playback(PlaybackEvent::TimeUpdate { current_time: t })
    }

    #[test]
    fn test_time_update_reports_changes_once() {
        let mut editor = editor_with("[00:00.00]a\n[00:01.50]b\n[00:03.00]c");
        let second = editor.lines()[1].id();
        assert_eq!(
            editor.apply(time_update(1.6)),
            EditorOutcome::ActiveLineChanged(Some(second))
        );
        assert_eq!(editor.apply(time_update(1.7)), EditorOutcome::Unchanged);
    }

    #[test]
    fn test_invalid_timestamp_input_is_a_no_op() {
        let mut editor = editor_with("[00:01.00]a\n[00:02.00]b");
        let id = editor.lines()[0].id();
        let before = editor.lines().to_vec();
        let outcome = editor.apply(EditorEvent::EditTimestamp {
            id,
            input: "-3".to_string(),
        });
        assert_eq!(outcome, EditorOutcome::Unchanged);
        assert_eq!(editor.lines(), before.as_slice());

        let outcome = editor.apply(EditorEvent::EditTimestamp {
            id,
            input: "0:05.0".to_string(),
        });
        assert_eq!(outcome, EditorOutcome::LinesChanged);
        assert_eq!(editor.lines()[1].id(), id);
    }

    #[test]
    fn test_manual_insert_uses_offset() {
        let mut editor = editor_with("[00:01.00]a\n[00:10.00]b");
        let EditorOutcome::LineInserted { id, index } =
            editor.apply(EditorEvent::InsertLineAfter { index: 0 })
        else {
            panic!("应当插入新行");
        };
        assert_eq!(index, 1);
        let line = editor.store().get(id).unwrap();
        assert!((line.timestamp - 3.0).abs() < 1e-9);
        assert_eq!(line.text, "");
    }

    #[test]
    fn test_edits_are_rejected_while_syncing() {
        let mut editor = editor_with("[00:01.00]a");
        let id = editor.lines()[0].id();
        editor.apply(EditorEvent::ToggleSync);
        assert!(editor.is_read_only());
        assert_eq!(
            editor.apply(EditorEvent::EditText {
                id,
                text: "x".to_string()
            }),
            EditorOutcome::ReadOnly
        );
        assert_eq!(
            editor.apply(EditorEvent::DeleteLine { id }),
            EditorOutcome::ReadOnly
        );
        assert_eq!(editor.lines()[0].text, "a");
    }

    #[test]
    fn test_tap_highlights_immediately() {
        let mut editor = EditorState::new(EditorOptions::default());
        editor.apply(EditorEvent::ImportPlainText("one\ntwo".to_string()));
        assert_eq!(
            editor.apply(EditorEvent::Tap { current_time: 1.0 }),
            EditorOutcome::Unchanged
        );
        editor.apply(EditorEvent::ToggleSync);
        let first = editor.lines()[0].id();
        assert_eq!(
            editor.apply(EditorEvent::Tap { current_time: 1.0 }),
            EditorOutcome::Synced {
                id: first,
                index: 0
            }
        );
        assert_eq!(editor.active_line(), Some(first));
    }

    #[test]
    fn test_tick_after_tap_keeps_tapped_line_active() {
        let mut editor = EditorState::new(EditorOptions::default());
        editor.apply(EditorEvent::ImportPlainText("one\ntwo\nthree".to_string()));
        let first = editor.lines()[0].id();
        editor.apply(EditorEvent::ToggleSync);
        editor.apply(EditorEvent::Tap { current_time: 1.0 });

        assert_eq!(editor.apply(time_update(1.1)), EditorOutcome::Unchanged);
        assert_eq!(editor.active_line(), Some(first));

        editor.apply(EditorEvent::ToggleSync);
        assert!(is_sorted_by_timestamp(editor.lines()));
        assert_eq!(editor.lines()[2].id(), first);
        assert_eq!(editor.active_line(), Some(first));
        assert_eq!(
            editor.export_lrc(),
            "[00:00.00] two\n[00:00.00] three\n[00:01.00] one"
        );
    }

    #[test]
    fn test_region_loop_requests_seek() {
        let mut editor = editor_with("[00:01.00]a");
        editor.apply(EditorEvent::SetRegion(Region::new(1.0, 2.0, true)));
        assert_eq!(
            editor.apply(time_update(2.05)),
            EditorOutcome::SeekRequested(1.0)
        );
        editor.apply(EditorEvent::SetRegionLoop(false));
        assert_ne!(
            editor.apply(time_update(2.1)),
            EditorOutcome::SeekRequested(1.0)
        );
    }

    #[test]
    fn test_only_one_suggestion_in_flight() {
        let mut editor = editor_with("[00:01.00]a\n[00:02.00]b");
        let request = editor.begin_suggestion(1).unwrap();
        assert_eq!(request.context, vec!["a", "b"]);
        assert!(editor.begin_suggestion(0).is_none());
        editor.apply(EditorEvent::SuggestionResolved {
            request,
            result: Err(SuggestionError::Unavailable),
        });
        assert!(!editor.is_suggestion_in_flight());
        assert!(editor.begin_suggestion(0).is_some());
    }

    #[test]
    fn test_empty_suggestion_inserts_nothing() {
        let mut editor = editor_with("[00:01.00]a");
        let request = editor.begin_suggestion(0).unwrap();
        let outcome = editor.apply(EditorEvent::SuggestionResolved {
            request,
            result: Ok("   ".to_string()),
        });
        assert_eq!(outcome, EditorOutcome::Unchanged);
        assert_eq!(editor.lines().len(), 1);
    }
}
