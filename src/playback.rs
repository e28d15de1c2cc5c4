//! # 播放端口
//!
//! 音频解码和播放不在本 crate 内实现，这里只定义编辑器所需的能力，
//! 以及单选区循环的逻辑。[`ManualClock`] 是一个由调用方手动推进时间的实现，供命令行和测试使用。

use tracing::{debug, trace};

use lyric_sync_core::{PlaybackState, Region, sanitize_seconds};

/// 播放器需要向编辑器提供的能力
pub trait PlaybackPort {
    fn seek(&mut self, time_secs: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;

    /// 获取当前状态的快照。
    fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            current_time: self.current_time(),
            is_playing: self.is_playing(),
            duration: self.duration(),
        }
    }
}

/// 播放器发出的事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// 音频加载完成，只发出一次。
    Ready { duration: f64 },
    /// 播放过程中反复发出的进度更新。
    TimeUpdate { current_time: f64 },
}

/// 最多只有一个选区。设置新选区会隐式移除旧选区。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionLoop {
    region: Option<Region>,
}

impl RegionLoop {
    #[must_use]
    pub const fn new() -> Self {
        Self { region: None }
    }

    #[must_use]
    pub const fn region(&self) -> Option<Region> {
        self.region
    }

    pub fn set_region(&mut self, region: Region) {
        if let Some(old) = self.region.replace(region) {
            debug!(
                "[选区] 替换旧选区 {:.2}-{:.2} 为 {:.2}-{:.2}",
                old.start, old.end, region.start, region.end
            );
        }
    }

    pub fn set_loop(&mut self, enabled: bool) {
        if let Some(region) = &mut self.region {
            region.loop_enabled = enabled;
        }
    }

    pub fn clear_region(&mut self) {
        self.region = None;
    }

    /// 播放头越过选区终点且开启了循环时，返回应跳回的起点。
    ///
    /// 长度为 0 的选区不会循环。
    #[must_use]
    pub fn loop_target(&self, current_time: f64) -> Option<f64> {
        let region = self.region?;
        (region.loop_enabled && region.length() > 0.0 && current_time >= region.end)
            .then_some(region.start)
    }

    /// 处理一次进度更新，必要时让播放器跳回选区起点。返回是否发生了跳转。
    pub fn on_time_update(&self, current_time: f64, port: &mut impl PlaybackPort) -> bool {
        let Some(start) = self.loop_target(current_time) else {
            return false;
        };
        trace!("[选区] 循环回到 {start:.2}s");
        port.seek(start);
        true
    }
}

/// 由调用方手动推进的播放时钟。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    state: PlaybackState,
}

impl ManualClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: PlaybackState {
                current_time: 0.0,
                is_playing: false,
                duration: 0.0,
            },
        }
    }

    /// 模拟加载一段指定时长的音频。
    pub fn load(&mut self, duration: f64) -> PlaybackEvent {
        self.state = PlaybackState {
            current_time: 0.0,
            is_playing: false,
            duration: sanitize_seconds(duration),
        };
        PlaybackEvent::Ready {
            duration: self.state.duration,
        }
    }

    /// 推进 `delta_secs`。暂停时不产生事件；到达终点后自动暂停。
    pub fn advance(&mut self, delta_secs: f64) -> Option<PlaybackEvent> {
        if !self.state.is_playing {
            return None;
        }
        let next = sanitize_seconds(self.state.current_time + sanitize_seconds(delta_secs));
        self.state.current_time = self.clamp(next);
        if self.state.duration > 0.0 && self.state.current_time >= self.state.duration {
            self.state.is_playing = false;
        }
        Some(PlaybackEvent::TimeUpdate {
            current_time: self.state.current_time,
        })
    }

    fn clamp(&self, time: f64) -> f64 {
        if self.state.duration > 0.0 {
            time.min(self.state.duration)
        } else {
            time
        }
    }
}

impl PlaybackPort for ManualClock {
    fn seek(&mut self, time_secs: f64) {
        self.state.current_time = self.clamp(sanitize_seconds(time_secs));
    }

    fn play(&mut self) {
        self.state.is_playing = true;
    }

    fn pause(&mut self) {
        self.state.is_playing = false;
    }

    fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    fn current_time(&self) -> f64 {
        self.state.current_time
    }

    fn duration(&self) -> f64 {
        self.state.duration
    }
}
