//! # lyric_sync
//!
//! 歌词时间轴编辑器的核心：LRC 编解码、歌词行存储、根据播放进度确定当前行，以及打点同步。
//!
//! 音频播放和歌词建议都通过端口接入：[`playback::PlaybackPort`] 与 [`suggestion::SuggestionProvider`]。
//! 展示层只需要把事件交给 [`editor::EditorState::apply`]，再根据返回的 [`editor::EditorOutcome`] 刷新界面。
//!
//! ```rust
//! use lyric_sync::editor::{EditorEvent, EditorOutcome, EditorState};
//! use lyric_sync::playback::PlaybackEvent;
//! use lyric_sync_core::EditorOptions;
//!
//! let mut editor = EditorState::new(EditorOptions::default());
//! editor.apply(EditorEvent::ImportLrc(
//!     "[00:01.50]Hello\n[00:03.00]World\n[00:00.00]Start".to_string(),
//! ));
//!
//! let outcome = editor.apply(EditorEvent::Playback(PlaybackEvent::TimeUpdate {
//!     current_time: 1.6,
//! }));
//! let hello = editor.lines()[1].id();
//! assert_eq!(outcome, EditorOutcome::ActiveLineChanged(Some(hello)));
//!
//! assert_eq!(
//!     editor.export_lrc(),
//!     "[00:00.00] Start\n[00:01.50] Hello\n[00:03.00] World"
//! );
//! ```

pub mod app_settings;
pub mod editor;
pub mod error;
pub mod logger;
pub mod lrc_generator;
pub mod lrc_parser;
pub mod playback;
pub mod store;
pub mod suggestion;
pub mod sync_engine;
pub mod utils;

pub use editor::{EditorEvent, EditorOutcome, EditorState, SuggestionRequest};
pub use lrc_generator::{format_display_time, generate_lrc, generate_lrc_document};
pub use lrc_parser::{ParsedLrc, parse_lrc, parse_lrc_bytes, parse_lrc_document, parse_plain_text};
pub use store::LyricStore;
pub use sync_engine::{ActiveLineTracker, TapOutcome, TapSync, compute_active_line};
