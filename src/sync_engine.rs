//! # 同步引擎
//!
//! 负责两件事：
//! - 根据播放时间确定"当前行"；
//! - 打点同步的状态机，每次打点把当前播放时间写入光标所在的行，然后光标前进一行。

use tracing::{debug, info, trace};

use lyric_sync_core::{LineId, LyricLine, SyncMode, SyncSession};

use crate::store::LyricStore;

/// 返回时间戳不晚于 `current_time + tolerance` 的行中时间戳最大的一行的 ID。
///
/// 时间戳相同时取位置靠后的一行。打点同步期间序列可能暂时无序，所以这里不依赖排序。
/// 空序列、或当前时间早于所有行时返回 `None`。
#[must_use]
pub fn compute_active_line(
    lines: &[LyricLine],
    current_time: f64,
    tolerance: f64,
) -> Option<LineId> {
    if !current_time.is_finite() {
        return None;
    }
    let threshold = current_time + tolerance;
    // `max_by` 在相等时返回最后一个
    lines
        .iter()
        .filter(|line| line.timestamp <= threshold)
        .max_by(|a, b| a.timestamp.total_cmp(&b.timestamp))
        .map(LyricLine::id)
}

/// 当前行发生变化时的通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLineChange {
    pub previous: Option<LineId>,
    pub current: Option<LineId>,
}

/// 记住上一次的当前行，只有结果变化时才通知调用方，避免重复刷新和滚动抖动。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveLineTracker {
    active: Option<LineId>,
}

impl ActiveLineTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    #[must_use]
    pub const fn active(&self) -> Option<LineId> {
        self.active
    }

    /// 根据新的播放时间重新计算当前行。
    pub fn update(
        &mut self,
        lines: &[LyricLine],
        current_time: f64,
        tolerance: f64,
    ) -> Option<ActiveLineChange> {
        let resolved = compute_active_line(lines, current_time, tolerance);
        self.set(resolved)
    }

    /// 直接指定当前行，例如打点之后立即高亮刚打点的行。
    pub fn set(&mut self, id: Option<LineId>) -> Option<ActiveLineChange> {
        if self.active == id {
            return None;
        }
        let change = ActiveLineChange {
            previous: self.active,
            current: id,
        };
        trace!("[当前行] {:?} -> {:?}", change.previous, change.current);
        self.active = id;
        Some(change)
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}

/// 一次打点的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// 位置 `index` 上的行已写入时间戳，光标前进到 `index + 1`。
    Synced { id: LineId, index: usize },
    /// 所有行都已打点，本次打点没有任何效果。
    EndReached,
    /// 不在打点同步模式中。
    NotSyncing,
}

/// 打点同步状态机：`Idle` 与 `Syncing(cursor)`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TapSync {
    mode: SyncMode,
}

impl TapSync {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: SyncMode::Idle,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> SyncMode {
        self.mode
    }

    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        self.mode.is_syncing()
    }

    /// 同步进行期间，展示层应当禁止手动编辑歌词行。
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.is_syncing()
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        match self.mode {
            SyncMode::Idle => None,
            SyncMode::Syncing(session) => Some(session.cursor),
        }
    }

    /// 剩余待打点的行数
    #[must_use]
    pub fn remaining(&self, line_count: usize) -> Option<usize> {
        self.cursor().map(|c| line_count.saturating_sub(c))
    }

    /// 进入同步模式。光标总是从 0 开始，不会接续之前的会话。
    pub fn enter(&mut self) {
        self.mode = SyncMode::Syncing(SyncSession::default());
        info!("[打点同步] 进入同步模式");
    }

    /// 退出同步模式，丢弃光标，并把打点期间写入的时间戳重新稳定排序。
    pub fn exit(&mut self, store: &mut LyricStore) {
        if let SyncMode::Syncing(session) = self.mode {
            info!("[打点同步] 退出同步模式，光标停在 {}", session.cursor);
            store.restore_order();
        }
        self.mode = SyncMode::Idle;
    }

    /// 切换模式，返回切换后是否处于同步模式。
    pub fn toggle(&mut self, store: &mut LyricStore) -> bool {
        if self.is_syncing() {
            self.exit(store);
        } else {
            self.enter();
        }
        self.is_syncing()
    }

    /// 用当前播放时间给光标所在的行打点。
    ///
    /// 会话期间不重新排序，光标按位置推进；退出时才恢复时间顺序。
    pub fn tap(&mut self, store: &mut LyricStore, current_time: f64) -> TapOutcome {
        let SyncMode::Syncing(session) = &mut self.mode else {
            return TapOutcome::NotSyncing;
        };
        if session.is_exhausted(store.len()) {
            debug!("[打点同步] 已到达最后一行");
            return TapOutcome::EndReached;
        }

        let index = session.cursor;
        let Some(id) = store.set_timestamp_at(index, current_time) else {
            return TapOutcome::EndReached;
        };
        session.cursor += 1;
        debug!("[打点同步] 第 {} 行打点于 {current_time:.3}s", index + 1);
        TapOutcome::Synced { id, index }
    }
}
